use gtk4::cairo;

use super::{RasterResult, RasterizationError};
use crate::layout::{MonospaceMetrics, TextMeasure};

/// Text advances measured with the same cairo toy font the rasterizer
/// paints with, so composed runs line up with the drawn glyphs.
#[derive(Debug)]
pub struct CairoMetrics {
    context: cairo::Context,
    font_family: String,
    fallback: MonospaceMetrics,
}

impl CairoMetrics {
    pub fn new(font_family: &str) -> RasterResult<Self> {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 1, 1).map_err(
            |source| RasterizationError::Cairo {
                stage: "create measuring surface",
                source,
            },
        )?;
        let context = cairo::Context::new(&surface).map_err(|source| RasterizationError::Cairo {
            stage: "create measuring context",
            source,
        })?;
        context.select_font_face(
            font_family,
            cairo::FontSlant::Normal,
            cairo::FontWeight::Normal,
        );

        Ok(Self {
            context,
            font_family: font_family.to_string(),
            fallback: MonospaceMetrics::default(),
        })
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }
}

impl TextMeasure for CairoMetrics {
    fn advance(&self, text: &str, font_size_px: f64) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        self.context.set_font_size(font_size_px);
        match self.context.text_extents(text) {
            Ok(extents) => extents.x_advance(),
            Err(err) => {
                tracing::debug!(?err, font = %self.font_family, "text extents failed; using fixed pitch");
                self.fallback.advance(text, font_size_px)
            }
        }
    }
}
