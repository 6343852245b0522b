//! Rasterizer: turns a composed [`Layout`] into PNG bytes at an export scale.
//!
//! Painting happens behind [`RenderTarget`], which only has to hand back an
//! RGBA snapshot of its current visual state. [`CairoTarget`] is the shipped
//! target; it paints a layout onto a cairo image surface.

mod cairo_target;
mod metrics;

use std::io::Cursor;

use image::RgbaImage;
use thiserror::Error;

use crate::layout::Layout;
use crate::style::clamp_export_scale;

pub use cairo_target::{css_gradient_line, CairoTarget, DEFAULT_FONT_FAMILY};
pub use metrics::CairoMetrics;

#[derive(Debug, Error)]
pub enum RasterizationError {
    #[error("invalid export scale {scale}")]
    InvalidScale { scale: f64 },
    #[error("image size {width}x{height} exceeds surface limits")]
    SurfaceTooLarge { width: u32, height: u32 },
    #[error("failed to {stage}: {source}")]
    Cairo {
        stage: &'static str,
        #[source]
        source: gtk4::cairo::Error,
    },
    #[error("failed to access surface pixels: {source}")]
    SurfaceData {
        #[source]
        source: gtk4::cairo::BorrowError,
    },
    #[error("snapshot is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    SizeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("render target snapshot failed: {message}")]
    Snapshot { message: String },
    #[error("failed to encode png: {source}")]
    Encode {
        #[source]
        source: image::ImageError,
    },
}

pub type RasterResult<T> = std::result::Result<T, RasterizationError>;

/// Something already laid out that can produce a pixel snapshot of itself.
pub trait RenderTarget {
    /// Logical (CSS pixel) size of the target.
    fn logical_size(&self) -> (u32, u32);

    /// Renders the current visual state at `scale`× the logical size.
    fn snapshot(&self, scale: f64) -> RasterResult<RgbaImage>;
}

/// Encoded PNG plus its pixel dimensions. Consumed once by the export step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

/// Pixel extent of a logical length at `scale`; fractional pixels round up.
pub fn pixel_extent(logical: u32, scale: f64) -> u32 {
    (f64::from(logical) * scale).ceil() as u32
}

pub fn rasterize<T: RenderTarget + ?Sized>(target: &T, scale: f64) -> RasterResult<RenderedImage> {
    let scale = clamp_export_scale(scale);
    let (logical_width, logical_height) = target.logical_size();
    let expected_width = pixel_extent(logical_width, scale);
    let expected_height = pixel_extent(logical_height, scale);

    let image = target.snapshot(scale)?;
    if image.dimensions() != (expected_width, expected_height) {
        return Err(RasterizationError::SizeMismatch {
            expected_width,
            expected_height,
            actual_width: image.width(),
            actual_height: image.height(),
        });
    }

    let png_data = encode_png(&image)?;
    tracing::debug!(
        width = expected_width,
        height = expected_height,
        scale,
        bytes = png_data.len(),
        "rasterized snippet"
    );
    Ok(RenderedImage {
        width: expected_width,
        height: expected_height,
        png_data,
    })
}

/// Paints `layout` with cairo and encodes the result.
pub fn rasterize_layout(
    layout: &Layout,
    font_family: &str,
    scale: f64,
) -> RasterResult<RenderedImage> {
    rasterize(&CairoTarget::new(layout, font_family), scale)
}

pub fn encode_png(image: &RgbaImage) -> RasterResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, image::ImageFormat::Png)
        .map_err(|source| RasterizationError::Encode { source })?;
    Ok(cursor.into_inner())
}
