use std::f64::consts::PI;

use gtk4::cairo;
use image::RgbaImage;

use super::{pixel_extent, RasterResult, RasterizationError, RenderTarget};
use crate::geometry::{Color, Point};
use crate::layout::{Chrome, Gutter, Layout};
use crate::theme::{self, BackgroundSpec};

pub const DEFAULT_FONT_FAMILY: &str = "monospace";

/// Cairo image surfaces are addressed with `i32` extents.
const MAX_SURFACE_EXTENT: u32 = 32_767;

/// Paints a [`Layout`] onto a cairo image surface.
#[derive(Debug, Clone, Copy)]
pub struct CairoTarget<'a> {
    layout: &'a Layout,
    font_family: &'a str,
}

impl<'a> CairoTarget<'a> {
    pub fn new(layout: &'a Layout, font_family: &'a str) -> Self {
        Self {
            layout,
            font_family,
        }
    }
}

impl RenderTarget for CairoTarget<'_> {
    fn logical_size(&self) -> (u32, u32) {
        (self.layout.width, self.layout.height)
    }

    fn snapshot(&self, scale: f64) -> RasterResult<RgbaImage> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RasterizationError::InvalidScale { scale });
        }
        let width = pixel_extent(self.layout.width, scale);
        let height = pixel_extent(self.layout.height, scale);
        if width == 0 || height == 0 || width > MAX_SURFACE_EXTENT || height > MAX_SURFACE_EXTENT {
            return Err(RasterizationError::SurfaceTooLarge { width, height });
        }

        let mut surface =
            cairo::ImageSurface::create(cairo::Format::ARgb32, width as i32, height as i32)
                .map_err(cairo_error("create image surface"))?;
        {
            let context = cairo::Context::new(&surface).map_err(cairo_error("create context"))?;
            context.scale(scale, scale);
            self.paint(&context)?;
        }
        surface_to_rgba_image(&mut surface)
    }
}

impl CairoTarget<'_> {
    fn paint(&self, context: &cairo::Context) -> RasterResult<()> {
        let layout = self.layout;
        let width = f64::from(layout.width);
        let height = f64::from(layout.height);

        rounded_rect_path(context, width, height, layout.border_radius_px);
        self.set_background_source(context, width, height)?;
        context
            .fill_preserve()
            .map_err(cairo_error("paint background"))?;
        context.clip();

        if let Some(chrome) = &layout.chrome {
            self.paint_chrome(context, chrome, width)?;
        }
        if let Some(gutter) = &layout.gutter {
            self.paint_gutter(context, gutter)?;
        }
        self.paint_code(context)
    }

    fn set_background_source(
        &self,
        context: &cairo::Context,
        width: f64,
        height: f64,
    ) -> RasterResult<()> {
        match self.layout.background {
            BackgroundSpec::Solid(color) => {
                set_source_color(context, color);
                Ok(())
            }
            BackgroundSpec::LinearGradient {
                from,
                to,
                angle_deg,
            } => {
                let (start, end) = css_gradient_line(width, height, angle_deg);
                let gradient = cairo::LinearGradient::new(start.x, start.y, end.x, end.y);
                let (r, g, b, a) = from.to_unit_rgba();
                gradient.add_color_stop_rgba(0.0, r, g, b, a);
                let (r, g, b, a) = to.to_unit_rgba();
                gradient.add_color_stop_rgba(1.0, r, g, b, a);
                context
                    .set_source(&*gradient)
                    .map_err(cairo_error("set gradient source"))
            }
        }
    }

    fn paint_chrome(&self, context: &cairo::Context, chrome: &Chrome, width: f64) -> RasterResult<()> {
        for dot in &chrome.dots {
            context.new_path();
            context.arc(dot.center.x, dot.center.y, dot.radius, 0.0, 2.0 * PI);
            set_source_color(context, dot.color);
            context.fill().map_err(cairo_error("paint chrome dot"))?;
        }

        self.select_font(context, chrome.label_font_size_px);
        let baseline = centered_baseline(context, chrome.bar_top, chrome.bar_height);
        set_source_color(context, theme::CHROME_LABEL_COLOR);
        context.move_to(chrome.label_x, baseline);
        context
            .show_text(&chrome.label)
            .map_err(cairo_error("draw chrome label"))?;

        let padding = self.layout.padding_px;
        context.rectangle(padding, chrome.separator_y, width - 2.0 * padding, 1.0);
        set_source_color(context, theme::SEPARATOR_COLOR);
        context.fill().map_err(cairo_error("paint chrome separator"))
    }

    fn paint_gutter(&self, context: &cairo::Context, gutter: &Gutter) -> RasterResult<()> {
        let layout = self.layout;
        self.select_font(context, gutter.font_size_px);
        set_source_color(context, theme::LINE_NUMBER_COLOR);
        for entry in &gutter.entries {
            let advance = text_advance(context, &entry.label);
            let baseline = centered_baseline(context, entry.y, layout.line_height);
            context.move_to(entry.right_x - advance, baseline);
            context
                .show_text(&entry.label)
                .map_err(cairo_error("draw line number"))?;
        }

        context.rectangle(
            gutter.separator_x,
            layout.code_top,
            1.0,
            layout.code_bottom() - layout.code_top,
        );
        set_source_color(context, theme::SEPARATOR_COLOR);
        context.fill().map_err(cairo_error("paint gutter separator"))
    }

    fn paint_code(&self, context: &cairo::Context) -> RasterResult<()> {
        let layout = self.layout;
        self.select_font(context, layout.font_size_px);
        for row in layout.lines.iter().flat_map(|line| line.rows.iter()) {
            let baseline = centered_baseline(context, row.y, layout.line_height);
            for run in row.runs.iter().filter(|run| !run.text.trim().is_empty()) {
                set_source_color(context, run.color);
                context.move_to(run.x, baseline);
                context
                    .show_text(&run.text)
                    .map_err(cairo_error("draw code run"))?;
            }
        }
        Ok(())
    }

    fn select_font(&self, context: &cairo::Context, size: f64) {
        context.select_font_face(
            self.font_family,
            cairo::FontSlant::Normal,
            cairo::FontWeight::Normal,
        );
        context.set_font_size(size);
    }
}

fn cairo_error(stage: &'static str) -> impl Fn(cairo::Error) -> RasterizationError {
    move |source| RasterizationError::Cairo { stage, source }
}

fn set_source_color(context: &cairo::Context, color: Color) {
    let (r, g, b, a) = color.to_unit_rgba();
    context.set_source_rgba(r, g, b, a);
}

fn text_advance(context: &cairo::Context, text: &str) -> f64 {
    context
        .text_extents(text)
        .map(|extents| extents.x_advance())
        .unwrap_or(0.0)
}

/// Baseline that vertically centers the current font inside a box, the way
/// CSS distributes half-leading above and below the glyphs.
fn centered_baseline(context: &cairo::Context, box_top: f64, box_height: f64) -> f64 {
    match context.font_extents() {
        Ok(extents) => {
            let glyph_height = extents.ascent() + extents.descent();
            box_top + (box_height - glyph_height) / 2.0 + extents.ascent()
        }
        Err(err) => {
            tracing::debug!(?err, "font extents unavailable; using box bottom");
            box_top + box_height * 0.75
        }
    }
}

fn rounded_rect_path(context: &cairo::Context, width: f64, height: f64, radius: f64) {
    let radius = radius.min(width / 2.0).min(height / 2.0).max(0.0);
    context.new_path();
    if radius <= 0.0 {
        context.rectangle(0.0, 0.0, width, height);
        return;
    }
    context.new_sub_path();
    context.arc(width - radius, radius, radius, -PI / 2.0, 0.0);
    context.arc(width - radius, height - radius, radius, 0.0, PI / 2.0);
    context.arc(radius, height - radius, radius, PI / 2.0, PI);
    context.arc(radius, radius, radius, PI, 1.5 * PI);
    context.close_path();
}

/// Start and end points of a CSS `linear-gradient(<angle>deg, ...)` line for
/// a box of the given size. Angles run clockwise from "to top", and the line
/// is long enough that the corners hit exactly 0% and 100%.
pub fn css_gradient_line(width: f64, height: f64, angle_deg: f64) -> (Point, Point) {
    let angle = angle_deg.to_radians();
    let (dx, dy) = (angle.sin(), -angle.cos());
    let half_length = (width * dx.abs() + height * dy.abs()) / 2.0;
    let (cx, cy) = (width / 2.0, height / 2.0);
    (
        Point::new(cx - dx * half_length, cy - dy * half_length),
        Point::new(cx + dx * half_length, cy + dy * half_length),
    )
}

/// Copies a premultiplied ARGB32 surface into a straight-alpha RGBA image.
fn surface_to_rgba_image(surface: &mut cairo::ImageSurface) -> RasterResult<RgbaImage> {
    surface.flush();
    let width = u32::try_from(surface.width()).unwrap_or(0);
    let height = u32::try_from(surface.height()).unwrap_or(0);
    let stride = usize::try_from(surface.stride()).unwrap_or(0);
    let row_len = width as usize * 4;

    let data = surface
        .data()
        .map_err(|source| RasterizationError::SurfaceData { source })?;
    let mut rgba_bytes = vec![0_u8; row_len * height as usize];

    for row in 0..height as usize {
        let src_offset = row * stride;
        let Some(src_row) = data.get(src_offset..src_offset + row_len) else {
            return Err(RasterizationError::SurfaceTooLarge { width, height });
        };
        let dst_row = &mut rgba_bytes[row * row_len..(row + 1) * row_len];

        for (src_pixel, dst_pixel) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
            let argb = u32::from_ne_bytes([src_pixel[0], src_pixel[1], src_pixel[2], src_pixel[3]]);
            let a = (argb >> 24) as u8;
            let r = (argb >> 16) as u8;
            let g = (argb >> 8) as u8;
            let b = argb as u8;
            match a {
                0 => dst_pixel.copy_from_slice(&[0, 0, 0, 0]),
                255 => dst_pixel.copy_from_slice(&[r, g, b, 255]),
                _ => {
                    let unpremultiply = |channel: u8| {
                        let alpha = u16::from(a);
                        ((u16::from(channel) * 255 + alpha / 2) / alpha).min(255) as u8
                    };
                    dst_pixel.copy_from_slice(&[unpremultiply(r), unpremultiply(g), unpremultiply(b), a]);
                }
            }
        }
    }

    RgbaImage::from_raw(width, height, rgba_bytes)
        .ok_or(RasterizationError::SurfaceTooLarge { width, height })
}
