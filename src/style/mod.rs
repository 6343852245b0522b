//! Snippet style configuration passed by value into every render pass.

use crate::geometry::Color;

pub const FONT_SIZE_RANGE_PX: (f64, f64) = (10.0, 24.0);
pub const BORDER_RADIUS_RANGE_PX: (f64, f64) = (0.0, 30.0);
pub const PADDING_RANGE_PX: (f64, f64) = (16.0, 64.0);
pub const EXPORT_SCALE_RANGE: (f64, f64) = (1.0, 4.0);

const DEFAULT_BACKGROUND_COLOR: Color = Color::rgb(0x2d, 0x37, 0x48);
const DEFAULT_TEXT_COLOR: Color = Color::rgb(0xe2, 0xe8, 0xf0);
const DEFAULT_FONT_SIZE_PX: f64 = 14.0;
const DEFAULT_BORDER_RADIUS_PX: f64 = 12.0;
const DEFAULT_PADDING_PX: f64 = 32.0;
const DEFAULT_EXPORT_SCALE: f64 = 2.0;

/// Immutable style value object.
///
/// Every numeric setter clamps into the documented range instead of failing,
/// so a `StyleConfig` is always renderable. Non-finite inputs fall back to the
/// field default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleConfig {
    background_color: Color,
    gradient_enabled: bool,
    selected_gradient: usize,
    text_color: Color,
    font_size_px: f64,
    border_radius_px: f64,
    padding_px: f64,
    show_line_numbers: bool,
    show_window_chrome: bool,
    export_scale: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND_COLOR,
            gradient_enabled: false,
            selected_gradient: 0,
            text_color: DEFAULT_TEXT_COLOR,
            font_size_px: DEFAULT_FONT_SIZE_PX,
            border_radius_px: DEFAULT_BORDER_RADIUS_PX,
            padding_px: DEFAULT_PADDING_PX,
            show_line_numbers: true,
            show_window_chrome: true,
            export_scale: DEFAULT_EXPORT_SCALE,
        }
    }
}

fn clamp_or_default(value: f64, (min, max): (f64, f64), default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

/// Clamps an export scale to `1..=4` and snaps it to the nearest half step.
pub fn clamp_export_scale(scale: f64) -> f64 {
    let clamped = clamp_or_default(scale, EXPORT_SCALE_RANGE, DEFAULT_EXPORT_SCALE);
    ((clamped * 2.0).round() / 2.0).clamp(EXPORT_SCALE_RANGE.0, EXPORT_SCALE_RANGE.1)
}

impl StyleConfig {
    pub fn with_background_color(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_gradient(mut self, enabled: bool, preset_index: usize) -> Self {
        self.gradient_enabled = enabled;
        self.selected_gradient = preset_index;
        self
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    pub fn with_font_size_px(mut self, size: f64) -> Self {
        self.font_size_px = clamp_or_default(size, FONT_SIZE_RANGE_PX, DEFAULT_FONT_SIZE_PX);
        self
    }

    pub fn with_border_radius_px(mut self, radius: f64) -> Self {
        self.border_radius_px =
            clamp_or_default(radius, BORDER_RADIUS_RANGE_PX, DEFAULT_BORDER_RADIUS_PX);
        self
    }

    pub fn with_padding_px(mut self, padding: f64) -> Self {
        self.padding_px = clamp_or_default(padding, PADDING_RANGE_PX, DEFAULT_PADDING_PX);
        self
    }

    pub fn with_line_numbers(mut self, show: bool) -> Self {
        self.show_line_numbers = show;
        self
    }

    pub fn with_window_chrome(mut self, show: bool) -> Self {
        self.show_window_chrome = show;
        self
    }

    pub fn with_export_scale(mut self, scale: f64) -> Self {
        self.export_scale = clamp_export_scale(scale);
        self
    }

    pub const fn background_color(&self) -> Color {
        self.background_color
    }

    pub const fn gradient_enabled(&self) -> bool {
        self.gradient_enabled
    }

    pub const fn selected_gradient(&self) -> usize {
        self.selected_gradient
    }

    pub const fn text_color(&self) -> Color {
        self.text_color
    }

    pub const fn font_size_px(&self) -> f64 {
        self.font_size_px
    }

    pub const fn border_radius_px(&self) -> f64 {
        self.border_radius_px
    }

    pub const fn padding_px(&self) -> f64 {
        self.padding_px
    }

    pub const fn show_line_numbers(&self) -> bool {
        self.show_line_numbers
    }

    pub const fn show_window_chrome(&self) -> bool {
        self.show_window_chrome
    }

    pub const fn export_scale(&self) -> f64 {
        self.export_scale
    }
}
