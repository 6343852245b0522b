//! Layout composer: resolution-independent geometry for a styled snippet.
//!
//! The same [`Layout`] feeds the live preview and the rasterizer, so nothing
//! here depends on the output scale. All coordinates are logical pixels with
//! the origin at the top-left corner of the snippet container.

mod measure;

use serde::Serialize;

use crate::geometry::{Color, Point};
use crate::highlight::{LanguageId, Token, TokenKind};
use crate::style::StyleConfig;
use crate::theme::{self, BackgroundSpec};

pub use measure::{MonospaceMetrics, TextMeasure};

pub const DEFAULT_CONTAINER_WIDTH: u32 = 880;
pub const MIN_CONTAINER_WIDTH: u32 = 240;

const LINE_HEIGHT_FACTOR: f64 = 1.5;
const TAB_SIZE: usize = 8;

const GUTTER_FONT_FACTOR: f64 = 0.9;
const GUTTER_MIN_WIDTH: f64 = 40.0;
const GUTTER_PADDING_RIGHT: f64 = 16.0;
const GUTTER_MARGIN_RIGHT: f64 = 16.0;
const SEPARATOR_WIDTH: f64 = 1.0;

const CHROME_BAR_HEIGHT: f64 = 20.0;
const CHROME_DOT_DIAMETER: f64 = 12.0;
const CHROME_DOT_GAP: f64 = 8.0;
const CHROME_LABEL_GAP: f64 = 16.0;
const CHROME_LABEL_FONT_SIZE: f64 = 12.0;
const CHROME_PADDING_BOTTOM: f64 = 16.0;
const CHROME_MARGIN_BOTTOM: f64 = 16.0;

/// A colored span of text placed on one visual row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    pub kind: TokenKind,
    pub text: String,
    pub color: Color,
    pub x: f64,
    pub width: f64,
}

/// One visual row. A source line owns several rows once it wraps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Top edge of the row box.
    pub y: f64,
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    /// 1-based source line number.
    pub number: usize,
    pub rows: Vec<Row>,
}

impl Line {
    pub fn text(&self) -> String {
        self.rows
            .iter()
            .flat_map(|row| row.runs.iter())
            .map(|run| run.text.as_str())
            .collect()
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.rows.iter().flat_map(|row| row.runs.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GutterEntry {
    pub label: String,
    /// Right edge the label is aligned against.
    pub right_x: f64,
    /// Top edge of the row box the label sits in.
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gutter {
    /// Gutter box width including its right padding, excluding the separator.
    pub width: f64,
    pub font_size_px: f64,
    pub separator_x: f64,
    pub entries: Vec<GutterEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChromeDot {
    pub center: Point,
    pub radius: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chrome {
    /// Total vertical space the chrome consumes, including its separator and
    /// bottom margin.
    pub height: f64,
    pub bar_top: f64,
    pub bar_height: f64,
    pub dots: [ChromeDot; 3],
    pub label: String,
    pub label_x: f64,
    pub label_font_size_px: f64,
    pub separator_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub padding_px: f64,
    pub border_radius_px: f64,
    pub background: BackgroundSpec,
    pub font_size_px: f64,
    pub line_height: f64,
    /// Left edge of the code column.
    pub code_x: f64,
    /// Top edge of the first code row.
    pub code_top: f64,
    pub code_width: f64,
    pub lines: Vec<Line>,
    pub gutter: Option<Gutter>,
    pub chrome: Option<Chrome>,
}

impl Layout {
    pub fn gutter_width(&self) -> f64 {
        self.gutter.as_ref().map_or(0.0, |gutter| gutter.width)
    }

    pub fn chrome_height(&self) -> f64 {
        self.chrome.as_ref().map_or(0.0, |chrome| chrome.height)
    }

    pub fn row_count(&self) -> usize {
        self.lines.iter().map(|line| line.rows.len()).sum()
    }

    pub fn code_bottom(&self) -> f64 {
        self.code_top + self.row_count() as f64 * self.line_height
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.lines.iter().flat_map(Line::runs)
    }
}

/// Builds layouts for a fixed container width with a given text measurer.
#[derive(Debug, Clone)]
pub struct LayoutComposer<M> {
    measure: M,
    container_width: u32,
}

impl Default for LayoutComposer<MonospaceMetrics> {
    fn default() -> Self {
        Self::new(MonospaceMetrics::default(), DEFAULT_CONTAINER_WIDTH)
    }
}

impl<M: TextMeasure> LayoutComposer<M> {
    pub fn new(measure: M, container_width: u32) -> Self {
        Self {
            measure,
            container_width: container_width.max(MIN_CONTAINER_WIDTH),
        }
    }

    pub fn container_width(&self) -> u32 {
        self.container_width
    }

    pub fn measure(&self) -> &M {
        &self.measure
    }

    pub fn compose(
        &self,
        tokens: &[Token],
        config: &StyleConfig,
        language: LanguageId,
        source_text: &str,
    ) -> Layout {
        let fallback;
        let tokens = if tokens_cover_source(tokens, source_text) {
            tokens
        } else {
            tracing::warn!(
                token_count = tokens.len(),
                source_len = source_text.len(),
                "tokens do not reproduce source text; composing as plain text"
            );
            fallback = [Token::plain(source_text)];
            &fallback[..]
        };

        let width = f64::from(self.container_width);
        let padding = config.padding_px();
        let font_size = config.font_size_px();
        let line_height = font_size * LINE_HEIGHT_FACTOR;
        let source_lines = split_lines(tokens);

        let chrome = config
            .show_window_chrome()
            .then(|| self.chrome(padding, language));
        let code_top = padding + chrome.as_ref().map_or(0.0, |chrome| chrome.height);

        let gutter_width = config
            .show_line_numbers()
            .then(|| self.gutter_width(source_lines.len(), font_size));
        let code_x = match gutter_width {
            Some(gutter_width) => {
                padding + gutter_width + SEPARATOR_WIDTH + GUTTER_MARGIN_RIGHT
            }
            None => padding,
        };
        let code_width = (width - padding - code_x).max(font_size);

        let mut lines = Vec::with_capacity(source_lines.len());
        let mut row_top = code_top;
        for (index, pieces) in source_lines.iter().enumerate() {
            let mut rows = Vec::new();
            for runs in self.wrap_line(pieces, config, code_width) {
                let runs = runs
                    .into_iter()
                    .map(|run| Run {
                        x: run.x + code_x,
                        ..run
                    })
                    .collect();
                rows.push(Row { y: row_top, runs });
                row_top += line_height;
            }
            lines.push(Line {
                number: index + 1,
                rows,
            });
        }

        let gutter = gutter_width.map(|gutter_width| Gutter {
            width: gutter_width,
            font_size_px: font_size * GUTTER_FONT_FACTOR,
            separator_x: padding + gutter_width,
            entries: lines
                .iter()
                .map(|line| GutterEntry {
                    label: line.number.to_string(),
                    right_x: padding + gutter_width - GUTTER_PADDING_RIGHT,
                    y: line.rows.first().map_or(code_top, |row| row.y),
                })
                .collect(),
        });

        let height = row_top + padding;
        Layout {
            width: self.container_width,
            height: height.ceil().max(1.0) as u32,
            padding_px: padding,
            border_radius_px: config.border_radius_px(),
            background: theme::background_for(config),
            font_size_px: font_size,
            line_height,
            code_x,
            code_top,
            code_width,
            lines,
            gutter,
            chrome,
        }
    }

    fn gutter_width(&self, line_count: usize, font_size: f64) -> f64 {
        let last_label = line_count.max(1).to_string();
        let digits_width = self
            .measure
            .advance(&last_label, font_size * GUTTER_FONT_FACTOR);
        // The minimum width already includes the right padding.
        (digits_width + GUTTER_PADDING_RIGHT).max(GUTTER_MIN_WIDTH)
    }

    fn chrome(&self, padding: f64, language: LanguageId) -> Chrome {
        let radius = CHROME_DOT_DIAMETER / 2.0;
        let center_y = padding + CHROME_BAR_HEIGHT / 2.0;
        let dot = |index: usize| ChromeDot {
            center: Point::new(
                padding + radius + index as f64 * (CHROME_DOT_DIAMETER + CHROME_DOT_GAP),
                center_y,
            ),
            radius,
            color: theme::CHROME_DOT_COLORS[index],
        };
        let dots_width = 3.0 * CHROME_DOT_DIAMETER + 2.0 * CHROME_DOT_GAP;
        let separator_y = padding + CHROME_BAR_HEIGHT + CHROME_PADDING_BOTTOM;
        Chrome {
            height: CHROME_BAR_HEIGHT
                + CHROME_PADDING_BOTTOM
                + SEPARATOR_WIDTH
                + CHROME_MARGIN_BOTTOM,
            bar_top: padding,
            bar_height: CHROME_BAR_HEIGHT,
            dots: [dot(0), dot(1), dot(2)],
            label: language.chrome_label(),
            label_x: padding + dots_width + CHROME_LABEL_GAP,
            label_font_size_px: CHROME_LABEL_FONT_SIZE,
            separator_y,
        }
    }

    /// Breaks one source line into rows. Rows break at any character once the
    /// next glyph would overflow `available`; words are never kept together.
    /// Run `x` values are relative to the code column.
    fn wrap_line(&self, pieces: &[Token], config: &StyleConfig, available: f64) -> Vec<Vec<Run>> {
        let font_size = config.font_size_px();
        let text_color = config.text_color();
        let mut rows: Vec<Vec<Run>> = Vec::new();
        let mut current: Vec<Run> = Vec::new();
        let mut x = 0.0;
        let mut column = 0usize;
        let mut glyph = String::new();

        for piece in pieces {
            for ch in piece.text.chars() {
                let mut cells = expand_glyph(&mut glyph, ch, column);
                let mut advance = self.measure.advance(&glyph, font_size);

                if x > 0.0 && x + advance > available {
                    rows.push(std::mem::take(&mut current));
                    x = 0.0;
                    column = 0;
                    if ch == '\t' {
                        cells = expand_glyph(&mut glyph, ch, column);
                        advance = self.measure.advance(&glyph, font_size);
                    }
                }

                match current.last_mut() {
                    Some(run) if run.kind == piece.kind => {
                        run.text.push_str(&glyph);
                        run.width += advance;
                    }
                    _ => current.push(Run {
                        kind: piece.kind,
                        text: glyph.clone(),
                        color: theme::color_for(piece.kind, text_color),
                        x,
                        width: advance,
                    }),
                }
                x += advance;
                column += cells;
            }
        }

        rows.push(current);
        rows
    }
}

/// Writes the visible form of `ch` at `column` into `glyph` and returns the
/// number of cells it spans. Tabs run to the next stop.
fn expand_glyph(glyph: &mut String, ch: char, column: usize) -> usize {
    glyph.clear();
    if ch == '\t' {
        let spaces = TAB_SIZE - column % TAB_SIZE;
        glyph.extend(std::iter::repeat(' ').take(spaces));
        spaces
    } else {
        glyph.push(ch);
        1
    }
}

/// Re-splits tokens at every `\n`, keeping each fragment's kind. The result
/// always has `newline count + 1` entries, matching `str::split('\n')`.
/// A `\r` directly before a line break is part of the break, not the line.
fn split_lines(tokens: &[Token]) -> Vec<Vec<Token>> {
    let mut lines: Vec<Vec<Token>> = vec![Vec::new()];
    for token in tokens {
        for (index, fragment) in token.text.split('\n').enumerate() {
            if index > 0 {
                lines.push(Vec::new());
            }
            if fragment.is_empty() {
                continue;
            }
            if let Some(line) = lines.last_mut() {
                line.push(Token::new(token.kind, fragment));
            }
        }
    }
    let terminated = lines.len() - 1;
    for line in &mut lines[..terminated] {
        strip_carriage_return(line);
    }
    lines
}

fn strip_carriage_return(line: &mut Vec<Token>) {
    let Some(last) = line.last_mut() else {
        return;
    };
    if last.text.ends_with('\r') {
        last.text.pop();
        if last.text.is_empty() {
            line.pop();
        }
    }
}

fn tokens_cover_source(tokens: &[Token], source: &str) -> bool {
    let mut rest = source;
    for token in tokens {
        match rest.strip_prefix(token.text.as_str()) {
            Some(remaining) => rest = remaining,
            None => return false,
        }
    }
    rest.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer(width: u32) -> LayoutComposer<MonospaceMetrics> {
        LayoutComposer::new(MonospaceMetrics::default(), width)
    }

    fn plain_tokens(source: &str) -> Vec<Token> {
        if source.is_empty() {
            Vec::new()
        } else {
            vec![Token::plain(source)]
        }
    }

    #[test]
    fn gutter_has_one_entry_per_source_line() {
        let source = "a\nb\nc";
        let tokens = vec![
            Token::new(TokenKind::Keyword, "a\nb"),
            Token::new(TokenKind::String, "\nc"),
        ];
        let layout = composer(880).compose(
            &tokens,
            &StyleConfig::default(),
            LanguageId::Python,
            source,
        );
        let gutter = layout.gutter.as_ref().expect("line numbers enabled");
        let labels: Vec<_> = gutter.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["1", "2", "3"]);
        assert_eq!(layout.lines.len(), source.split('\n').count());
    }

    #[test]
    fn trailing_newline_keeps_empty_final_line() {
        let source = "x = 1\n";
        let layout = composer(880).compose(
            &plain_tokens(source),
            &StyleConfig::default(),
            LanguageId::Python,
            source,
        );
        assert_eq!(layout.lines.len(), 2);
        assert_eq!(layout.lines[1].text(), "");
        assert_eq!(layout.lines[1].rows.len(), 1);
    }

    #[test]
    fn tokens_crossing_newlines_keep_their_kind_on_each_line() {
        let source = "/* a\nb */x";
        let tokens = vec![
            Token::new(TokenKind::Comment, "/* a\nb */"),
            Token::plain("x"),
        ];
        let layout = composer(880).compose(
            &tokens,
            &StyleConfig::default(),
            LanguageId::Javascript,
            source,
        );
        let first: Vec<_> = layout.lines[0].runs().map(|run| run.kind).collect();
        let second: Vec<_> = layout.lines[1].runs().map(|run| run.kind).collect();
        assert_eq!(first, [TokenKind::Comment]);
        assert_eq!(second, [TokenKind::Comment, TokenKind::Plain]);
        assert_eq!(layout.lines[1].text(), "b */x");
    }

    #[test]
    fn compose_is_idempotent() {
        let source = "def f(x):\n\treturn x + 1\n";
        let tokens = vec![
            Token::new(TokenKind::Keyword, "def"),
            Token::plain(" "),
            Token::new(TokenKind::Function, "f"),
            Token::new(TokenKind::Punctuation, "(x):\n\t"),
            Token::new(TokenKind::Keyword, "return"),
            Token::plain(" x "),
            Token::new(TokenKind::Operator, "+"),
            Token::plain(" "),
            Token::new(TokenKind::Number, "1"),
            Token::plain("\n"),
        ];
        let composer = composer(880);
        let config = StyleConfig::default();
        let first = composer.compose(&tokens, &config, LanguageId::Python, source);
        let second = composer.compose(&tokens, &config, LanguageId::Python, source);
        assert_eq!(first, second);
    }

    #[test]
    fn long_lines_break_anywhere_not_at_words() {
        // 240px container, 16px padding, no gutter: 208px of code fits 24
        // chars of 8.4px each.
        let config = StyleConfig::default()
            .with_padding_px(16.0)
            .with_line_numbers(false)
            .with_window_chrome(false);
        let source = "alpha beta gamma delta epsilon zeta";
        let layout = composer(240).compose(
            &plain_tokens(source),
            &config,
            LanguageId::Javascript,
            source,
        );
        let rows: Vec<String> = layout.lines[0]
            .rows
            .iter()
            .map(|row| row.runs.iter().map(|run| run.text.as_str()).collect())
            .collect();
        assert_eq!(rows, ["alpha beta gamma delta e", "psilon zeta"]);
        assert_eq!(layout.lines[0].text(), source);
    }

    #[test]
    fn short_lines_never_wrap() {
        let config = StyleConfig::default();
        let source = "print('hello world')";
        let layout = composer(880).compose(
            &plain_tokens(source),
            &config,
            LanguageId::Python,
            source,
        );
        assert_eq!(layout.row_count(), 1);
    }

    #[test]
    fn gutter_width_grows_with_digit_count() {
        let config = StyleConfig::default().with_font_size_px(24.0);
        let short_source = "x";
        let long_source = "x\n".repeat(99_999);
        let short = composer(880).compose(
            &plain_tokens(short_source),
            &config,
            LanguageId::Python,
            short_source,
        );
        let long = composer(880).compose(
            &plain_tokens(&long_source),
            &config,
            LanguageId::Python,
            &long_source,
        );
        assert_eq!(short.gutter_width(), 40.0);
        // 6 digits at 21.6px font, 0.6em each.
        assert!((long.gutter_width() - (6.0 * 21.6 * 0.6 + 16.0)).abs() < 1e-9);
        assert!(long.code_x > short.code_x);
    }

    #[test]
    fn disabled_gutter_and_chrome_take_no_space() {
        let config = StyleConfig::default()
            .with_line_numbers(false)
            .with_window_chrome(false);
        let source = "a";
        let layout = composer(880).compose(&plain_tokens(source), &config, LanguageId::Css, source);
        assert!(layout.gutter.is_none());
        assert!(layout.chrome.is_none());
        assert_eq!(layout.gutter_width(), 0.0);
        assert_eq!(layout.chrome_height(), 0.0);
        assert_eq!(layout.code_x, 32.0);
        assert_eq!(layout.code_top, 32.0);
        // 32 + 21 + 32
        assert_eq!(layout.height, 85);
    }

    #[test]
    fn chrome_geometry_and_label() {
        let source = "a";
        let layout = composer(880).compose(
            &plain_tokens(source),
            &StyleConfig::default(),
            LanguageId::Html,
            source,
        );
        let chrome = layout.chrome.as_ref().expect("chrome enabled");
        assert_eq!(chrome.height, 53.0);
        assert_eq!(chrome.label, "html.txt");
        let colors: Vec<_> = chrome.dots.iter().map(|dot| dot.color.to_hex()).collect();
        assert_eq!(colors, ["#ff5f56", "#ffbd2e", "#27ca3f"]);
        assert_eq!(chrome.dots[1].center.x - chrome.dots[0].center.x, 20.0);
        assert_eq!(layout.code_top, 32.0 + 53.0);
    }

    #[test]
    fn tabs_expand_to_eight_column_stops() {
        let config = StyleConfig::default()
            .with_line_numbers(false)
            .with_window_chrome(false);
        let source = "ab\tc";
        let layout = composer(880).compose(&plain_tokens(source), &config, LanguageId::Bash, source);
        assert_eq!(layout.lines[0].text(), format!("ab{}c", " ".repeat(6)));
    }

    #[test]
    fn tab_moved_to_next_row_expands_from_column_zero() {
        // 218px of code fits 25 cells; the tab at column 25 wraps and then
        // spans a full stop on the new row.
        let config = StyleConfig::default()
            .with_padding_px(16.0)
            .with_line_numbers(false)
            .with_window_chrome(false);
        let source = format!("{}\tz", "x".repeat(25));
        let layout = composer(250).compose(&plain_tokens(&source), &config, LanguageId::Bash, &source);
        let rows: Vec<String> = layout.lines[0]
            .rows
            .iter()
            .map(|row| row.runs.iter().map(|run| run.text.as_str()).collect())
            .collect();
        assert_eq!(rows, ["x".repeat(25), format!("{}z", " ".repeat(8))]);
    }

    #[test]
    fn crlf_line_endings_do_not_reach_run_text() {
        let source = "a = 1\r\nb = 2\r\n";
        let tokens = vec![
            Token::plain("a = "),
            Token::new(TokenKind::Number, "1"),
            Token::plain("\r"),
            Token::plain("\nb = "),
            Token::new(TokenKind::Number, "2"),
            Token::plain("\r\n"),
        ];
        let layout = composer(880).compose(
            &tokens,
            &StyleConfig::default(),
            LanguageId::Python,
            source,
        );
        let lines: Vec<String> = layout.lines.iter().map(Line::text).collect();
        assert_eq!(lines, ["a = 1", "b = 2", ""]);
        assert!(layout.runs().all(|run| !run.text.contains('\r')));
    }

    #[test]
    fn lone_carriage_return_inside_a_line_is_kept() {
        let source = "a\rb";
        let layout = composer(880).compose(
            &plain_tokens(source),
            &StyleConfig::default(),
            LanguageId::Bash,
            source,
        );
        assert_eq!(layout.lines[0].text(), "a\rb");
    }

    #[test]
    fn run_colors_follow_theme_palette() {
        let config = StyleConfig::default();
        let source = "# hi\nx";
        let tokens = vec![Token::new(TokenKind::Comment, "# hi\n"), Token::plain("x")];
        let layout = composer(880).compose(&tokens, &config, LanguageId::Python, source);
        let colors: Vec<_> = layout.runs().map(|run| run.color.to_hex()).collect();
        assert_eq!(colors, ["#6a9955", "#e2e8f0"]);
    }

    #[test]
    fn mismatched_tokens_fall_back_to_source_text() {
        let source = "one\ntwo";
        let tokens = vec![Token::plain("unrelated")];
        let layout = composer(880).compose(
            &tokens,
            &StyleConfig::default(),
            LanguageId::Json,
            source,
        );
        assert_eq!(layout.lines.len(), 2);
        assert_eq!(layout.lines[1].text(), "two");
    }

    #[test]
    fn empty_source_has_single_numbered_line() {
        let layout = composer(880).compose(&[], &StyleConfig::default(), LanguageId::Sql, "");
        assert_eq!(layout.lines.len(), 1);
        let gutter = layout.gutter.as_ref().expect("line numbers enabled");
        assert_eq!(gutter.entries.len(), 1);
    }
}
