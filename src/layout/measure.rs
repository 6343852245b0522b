/// Horizontal text metrics used while composing a layout.
pub trait TextMeasure {
    /// Advance width of `text` in logical pixels at `font_size_px`.
    fn advance(&self, text: &str, font_size_px: f64) -> f64;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn advance(&self, text: &str, font_size_px: f64) -> f64 {
        (**self).advance(text, font_size_px)
    }
}

/// Fixed-pitch metrics: every character advances by the same fraction of
/// the font size. Pure, so layouts built with it are reproducible anywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    advance_em: f64,
}

impl MonospaceMetrics {
    pub const DEFAULT_ADVANCE_EM: f64 = 0.6;

    pub const fn new(advance_em: f64) -> Self {
        Self { advance_em }
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ADVANCE_EM)
    }
}

impl TextMeasure for MonospaceMetrics {
    fn advance(&self, text: &str, font_size_px: f64) -> f64 {
        text.chars().count() as f64 * font_size_px * self.advance_em
    }
}
