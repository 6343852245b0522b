//! Fixed color palette and background resolution.

use serde::Serialize;

use crate::geometry::Color;
use crate::highlight::TokenKind;
use crate::style::StyleConfig;

pub const GRADIENT_ANGLE_DEG: f64 = 135.0;

const COMMENT_COLOR: Color = Color::rgb(0x6a, 0x99, 0x55);
const STRING_COLOR: Color = Color::rgb(0xce, 0x91, 0x78);
const KEYWORD_COLOR: Color = Color::rgb(0x56, 0x9c, 0xd6);
const FUNCTION_COLOR: Color = Color::rgb(0xdc, 0xdc, 0xaa);
const NUMBER_COLOR: Color = Color::rgb(0xb5, 0xce, 0xa8);
const OPERATOR_COLOR: Color = Color::rgb(0xd4, 0xd4, 0xd4);
const PUNCTUATION_COLOR: Color = Color::rgb(0xd4, 0xd4, 0xd4);

/// Decorative window dots, left to right.
pub const CHROME_DOT_COLORS: [Color; 3] = [
    Color::rgb(0xff, 0x5f, 0x56),
    Color::rgb(0xff, 0xbd, 0x2e),
    Color::rgb(0x27, 0xca, 0x3f),
];
pub const CHROME_LABEL_COLOR: Color = Color::rgba(0xff, 0xff, 0xff, 0xb3);
pub const SEPARATOR_COLOR: Color = Color::rgba(0xff, 0xff, 0xff, 0x1a);
pub const LINE_NUMBER_COLOR: Color = Color::rgba(0xff, 0xff, 0xff, 0x66);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientPreset {
    pub name: &'static str,
    pub from: Color,
    pub to: Color,
}

pub const GRADIENT_PRESETS: [GradientPreset; 6] = [
    GradientPreset {
        name: "Sunset",
        from: Color::rgb(0xff, 0x9a, 0x9e),
        to: Color::rgb(0xfa, 0xd0, 0xc4),
    },
    GradientPreset {
        name: "Ocean",
        from: Color::rgb(0x66, 0x7e, 0xea),
        to: Color::rgb(0x76, 0x4b, 0xa2),
    },
    GradientPreset {
        name: "Forest",
        from: Color::rgb(0x13, 0x4e, 0x5e),
        to: Color::rgb(0x71, 0xb2, 0x80),
    },
    GradientPreset {
        name: "Purple Rain",
        from: Color::rgb(0x66, 0x7e, 0xea),
        to: Color::rgb(0x76, 0x4b, 0xa2),
    },
    GradientPreset {
        name: "Orange Coral",
        from: Color::rgb(0xff, 0x9a, 0x9e),
        to: Color::rgb(0xfe, 0xcf, 0xef),
    },
    GradientPreset {
        name: "Blue Lagoon",
        from: Color::rgb(0x43, 0xe9, 0x7b),
        to: Color::rgb(0x38, 0xf9, 0xd7),
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackgroundSpec {
    Solid(Color),
    LinearGradient { from: Color, to: Color, angle_deg: f64 },
}

pub fn color_for(kind: TokenKind, text_color: Color) -> Color {
    match kind {
        TokenKind::Comment => COMMENT_COLOR,
        TokenKind::String => STRING_COLOR,
        TokenKind::Keyword => KEYWORD_COLOR,
        TokenKind::Function => FUNCTION_COLOR,
        TokenKind::Number => NUMBER_COLOR,
        TokenKind::Operator => OPERATOR_COLOR,
        TokenKind::Punctuation => PUNCTUATION_COLOR,
        TokenKind::Plain => text_color,
    }
}

/// Preset lookup; an out-of-range index resolves to the first preset.
pub fn gradient_preset(index: usize) -> &'static GradientPreset {
    GRADIENT_PRESETS.get(index).unwrap_or(&GRADIENT_PRESETS[0])
}

pub fn background_for(config: &StyleConfig) -> BackgroundSpec {
    if !config.gradient_enabled() {
        return BackgroundSpec::Solid(config.background_color());
    }
    let preset = gradient_preset(config.selected_gradient());
    BackgroundSpec::LinearGradient {
        from: preset.from,
        to: preset.to,
        angle_deg: GRADIENT_ANGLE_DEG,
    }
}
