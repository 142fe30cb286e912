// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text layout for text-to-PDF conversion: tokenising, greedy line wrapping
// against a width measurer, and pagination into fixed-height pages.

use docuhub_core::config::TextLayoutConfig;
use tracing::{debug, instrument, warn};

// -- Width measurement --------------------------------------------------------

/// Measures the rendered width of a string in points.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> f32;
}

impl<F> TextMeasure for F
where
    F: Fn(&str) -> f32,
{
    fn measure(&self, text: &str) -> f32 {
        self(text)
    }
}

/// The standard PDF fonts with built-in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    Courier,
}

/// Width of a glyph outside the Helvetica table, in 1/1000 em.
const FALLBACK_GLYPH_WIDTH: u16 = 556;

/// Helvetica advance widths for code points 32..=126 (WinAnsi), 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Measurer backed by the AFM widths of a standard font at a given size.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    font: StandardFont,
    size: f32,
}

impl StandardFontMetrics {
    pub fn new(font: StandardFont, size: f32) -> Self {
        Self { font, size }
    }

    pub fn helvetica(size: f32) -> Self {
        Self::new(StandardFont::Helvetica, size)
    }

    fn glyph_width(&self, ch: char) -> u16 {
        match self.font {
            StandardFont::Courier => 600,
            StandardFont::Helvetica => {
                let code = ch as u32;
                if (32..=126).contains(&code) {
                    HELVETICA_WIDTHS[(code - 32) as usize]
                } else {
                    FALLBACK_GLYPH_WIDTH
                }
            }
        }
    }
}

impl TextMeasure for StandardFontMetrics {
    fn measure(&self, text: &str) -> f32 {
        let units: u32 = text.chars().map(|ch| self.glyph_width(ch) as u32).sum();
        units as f32 * self.size / 1000.0
    }
}

/// Every character has the same width. Handy for predictable layouts.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthMeasure {
    pub char_width: f32,
}

impl TextMeasure for FixedWidthMeasure {
    fn measure(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width
    }
}

// -- Lines and pages ----------------------------------------------------------

/// A wrapped line: its tokens joined by single spaces with a trailing space,
/// plus the width the measurer gave it.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    text: String,
    width: f32,
}

impl Line {
    /// A line with no tokens (paragraph break).
    pub fn blank() -> Self {
        Self {
            text: String::new(),
            width: 0.0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// One output page of lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<Line>,
}

/// Result of pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub pages: Vec<Page>,
    /// Lines that did not fit under a `max_pages` cap. Always 0 when uncapped.
    pub truncated_lines: usize,
}

impl Pagination {
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|page| page.lines.len()).sum()
    }
}

// -- Wrapping -----------------------------------------------------------------

/// Split text on whitespace, dropping empty tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Greedy word wrap.
///
/// Each token is tentatively appended to the current line together with a
/// trailing space. If the tentative line is wider than `max_width` and the
/// current line already holds something, the current line is closed and the
/// token starts the next one. A token wider than `max_width` is never split.
pub fn wrap<M, S>(tokens: &[S], measure: &M, max_width: f32) -> Vec<Line>
where
    M: TextMeasure + ?Sized,
    S: AsRef<str>,
{
    let mut lines = Vec::new();
    let mut buffer = String::new();
    let mut buffer_width = 0.0;

    for token in tokens {
        let token = token.as_ref();
        let tentative = format!("{buffer}{token} ");
        let tentative_width = measure.measure(&tentative);

        if tentative_width > max_width && !buffer.is_empty() {
            lines.push(Line {
                text: std::mem::take(&mut buffer),
                width: buffer_width,
            });
            buffer = format!("{token} ");
            buffer_width = measure.measure(&buffer);
        } else {
            buffer = tentative;
            buffer_width = tentative_width;
        }
    }

    if !buffer.is_empty() {
        lines.push(Line {
            text: buffer,
            width: buffer_width,
        });
    }

    lines
}

/// Wrap a whole text.
///
/// With `preserve_paragraphs` off the text is one token stream. With it on,
/// each newline-separated paragraph is wrapped on its own and a blank line is
/// placed between consecutive non-empty paragraphs.
pub fn wrap_paragraphs<M>(
    text: &str,
    measure: &M,
    max_width: f32,
    preserve_paragraphs: bool,
) -> Vec<Line>
where
    M: TextMeasure + ?Sized,
{
    if !preserve_paragraphs {
        return wrap(&tokenize(text), measure, max_width);
    }

    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let tokens = tokenize(paragraph);
        if tokens.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(Line::blank());
        }
        lines.extend(wrap(&tokens, measure, max_width));
    }
    lines
}

// -- Pagination ---------------------------------------------------------------

/// How many lines fit between the top and bottom margins. Never less than 1.
pub fn lines_per_page(page_height: f32, margin: f32, line_pitch: f32) -> usize {
    let available = page_height - 2.0 * margin;
    if line_pitch <= 0.0 || available <= 0.0 {
        return 1;
    }
    ((available / line_pitch).floor() as usize).max(1)
}

/// Split lines into pages in order.
///
/// Uncapped (`max_pages = None`) every line lands on some page. With a cap,
/// lines past the last allowed page are dropped and counted. An empty input
/// gives one empty page.
pub fn paginate(
    lines: Vec<Line>,
    page_height: f32,
    margin: f32,
    line_pitch: f32,
    max_pages: Option<usize>,
) -> Pagination {
    let per_page = lines_per_page(page_height, margin, line_pitch);
    let total_lines = lines.len();

    let mut pages: Vec<Page> = Vec::with_capacity(total_lines.div_ceil(per_page).max(1));
    let mut current = Page::default();
    for line in lines {
        if current.lines.len() == per_page {
            pages.push(std::mem::take(&mut current));
        }
        current.lines.push(line);
    }
    if !current.lines.is_empty() || pages.is_empty() {
        pages.push(current);
    }

    let mut truncated_lines = 0;
    if let Some(cap) = max_pages {
        let cap = cap.max(1);
        if pages.len() > cap {
            truncated_lines = pages
                .drain(cap..)
                .map(|page| page.lines.len())
                .sum::<usize>();
            warn!(
                kept_pages = cap,
                truncated_lines, "text exceeds page cap, trailing lines dropped"
            );
        }
    }

    Pagination {
        pages,
        truncated_lines,
    }
}

/// Wrap and paginate `text` with the given layout settings.
#[instrument(skip(text, measure, config), fields(text_len = text.len()))]
pub fn layout_text<M>(text: &str, measure: &M, config: &TextLayoutConfig) -> Pagination
where
    M: TextMeasure + ?Sized,
{
    let lines = wrap_paragraphs(
        text,
        measure,
        config.max_line_width(),
        config.preserve_paragraphs,
    );
    let pagination = paginate(
        lines,
        config.page_height,
        config.margin,
        config.line_pitch(),
        config.max_pages,
    );
    debug!(
        pages = pagination.pages.len(),
        lines = pagination.line_count(),
        truncated = pagination.truncated_lines,
        "text laid out"
    );
    pagination
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_per_char(text: &str) -> f32 {
        10.0 * text.len() as f32
    }

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(Line::text).collect()
    }

    #[test]
    fn narrow_width_puts_each_word_on_its_own_line() {
        let tokens = tokenize("alpha beta gamma delta");
        let lines = wrap(&tokens, &ten_per_char, 45.0);
        assert_eq!(texts(&lines), vec!["alpha ", "beta ", "gamma ", "delta "]);
    }

    #[test]
    fn wide_width_packs_words() {
        let tokens = tokenize("alpha beta gamma delta");
        let lines = wrap(&tokens, &ten_per_char, 120.0);
        assert_eq!(texts(&lines), vec!["alpha beta ", "gamma delta "]);
    }

    #[test]
    fn overlong_token_sits_alone() {
        let tokens = tokenize("a supercalifragilistic b");
        let lines = wrap(&tokens, &ten_per_char, 50.0);
        assert_eq!(texts(&lines), vec!["a ", "supercalifragilistic ", "b "]);
    }

    #[test]
    fn no_line_exceeds_width_unless_single_token() {
        let text = "The quick brown fox jumps over the lazy dog while an extraordinarily \
                    long_identifier_without_breaks keeps going past the margin";
        let measure = StandardFontMetrics::helvetica(12.0);
        let max = 120.0;
        for line in wrap(&tokenize(text), &measure, max) {
            assert!(
                line.width() <= max || line.tokens().count() == 1,
                "line too wide: {:?}",
                line
            );
        }
    }

    #[test]
    fn wrapping_preserves_token_sequence() {
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let lines = wrap(&tokenize(text), &FixedWidthMeasure { char_width: 7.0 }, 60.0);
        let rejoined: Vec<&str> = lines.iter().flat_map(Line::tokens).collect();
        assert_eq!(rejoined, tokenize(text));
    }

    #[test]
    fn empty_input_has_no_lines() {
        assert!(wrap::<_, &str>(&[], &ten_per_char, 100.0).is_empty());
        assert!(tokenize("  \n\t ").is_empty());
    }

    #[test]
    fn paragraphs_are_separated_when_preserved() {
        let text = "first para\n\n\nsecond para";
        let lines = wrap_paragraphs(text, &ten_per_char, 1000.0, true);
        assert_eq!(texts(&lines), vec!["first para ", "", "second para "]);

        let flat = wrap_paragraphs(text, &ten_per_char, 1000.0, false);
        assert_eq!(texts(&flat), vec!["first para second para "]);
    }

    #[test]
    fn helvetica_widths() {
        let metrics = StandardFontMetrics::helvetica(10.0);
        // H=722, i=222
        assert!((metrics.measure("Hi") - 9.44).abs() < 1e-4);
        assert!((metrics.measure("é") - 5.56).abs() < 1e-4);

        let courier = StandardFontMetrics::new(StandardFont::Courier, 10.0);
        assert!((courier.measure("abc") - 18.0).abs() < 1e-4);
    }

    fn lines(n: usize) -> Vec<Line> {
        (0..n)
            .map(|i| Line {
                text: format!("l{i} "),
                width: 0.0,
            })
            .collect()
    }

    #[test]
    fn lines_per_page_matches_a4_defaults() {
        // (842 - 100) / 18 = 41.2
        assert_eq!(lines_per_page(842.0, 50.0, 18.0), 41);
        assert_eq!(lines_per_page(100.0, 60.0, 18.0), 1);
    }

    #[test]
    fn paginate_never_drops_lines_by_default() {
        let result = paginate(lines(100), 842.0, 50.0, 18.0, None);
        assert_eq!(result.pages.len(), 3);
        assert_eq!(result.pages[0].lines.len(), 41);
        assert_eq!(result.pages[2].lines.len(), 18);
        assert_eq!(result.line_count(), 100);
        assert_eq!(result.truncated_lines, 0);
    }

    #[test]
    fn paginate_cap_reports_dropped_lines() {
        let result = paginate(lines(100), 842.0, 50.0, 18.0, Some(1));
        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.truncated_lines, 59);
    }

    #[test]
    fn paginate_empty_gives_one_blank_page() {
        let result = paginate(Vec::new(), 842.0, 50.0, 18.0, None);
        assert_eq!(result.pages.len(), 1);
        assert!(result.pages[0].lines.is_empty());
    }

    #[test]
    fn exact_fit_does_not_open_an_extra_page() {
        let result = paginate(lines(41), 842.0, 50.0, 18.0, None);
        assert_eq!(result.pages.len(), 1);
    }

    #[test]
    fn layout_text_uses_config() {
        let config = TextLayoutConfig::default();
        let text = "word ".repeat(2_000);
        let result = layout_text(&text, &StandardFontMetrics::helvetica(12.0), &config);
        assert!(result.pages.len() > 1);
        assert_eq!(
            result.pages.iter().flat_map(|p| &p.lines).flat_map(Line::tokens).count(),
            2_000
        );
    }
}
