//! Line-by-line document layout: word wrap and pagination.
//!
//! # Rules
//! - blank line (after trimming) → advance the cursor by `paragraph_spacing_lines` rows, emit nothing
//! - non-blank line → one `TextBlock`, trimmed, left-aligned at the margin, wrapped to the text width
//! - a row that would cross the bottom margin moves to the top of a new page
//!
//! Markup characters (`**`, `*`, `-`) are plain text here: they are measured and printed as-is.
//! Characters the built-in fonts cannot encode become `?` and are counted in `replaced_chars`.
//! Pure and CPU-bound; the renderer runs it inside `spawn_blocking`.

use std::borrow::Cow;

use serde::Serialize;

use crate::layout::font_metrics::{
    get_metrics, is_encodable, FontMetricTable, PageConfig, REPLACEMENT_CHAR,
};

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// One printed row of text, positioned on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedRow {
    /// Zero-based page index.
    pub page: usize,
    pub x_pt: f32,
    /// Baseline distance from the top edge of the page.
    pub baseline_pt: f32,
    pub text: String,
}

/// One non-blank input line after layout. Long lines wrap into several rows,
/// possibly across a page break.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    /// 1-based position of the source line in the input.
    pub line_number: usize,
    pub rows: Vec<PlacedRow>,
}

impl TextBlock {
    /// The block's text with its rows rejoined by single spaces.
    #[cfg(test)]
    pub fn text(&self) -> String {
        self.rows
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentLayout {
    /// Always at least 1: an empty document is a single blank page.
    pub page_count: usize,
    pub blocks: Vec<TextBlock>,
    /// Characters printed as `?` because the font has no glyph for them.
    pub replaced_chars: usize,
}

impl DocumentLayout {
    pub fn row_count(&self) -> usize {
        self.blocks.iter().map(|b| b.rows.len()).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

/// Lays out `lines` top to bottom, in order, starting at the top margin of page 0.
pub fn layout_document<S: AsRef<str>>(lines: &[S], config: &PageConfig) -> DocumentLayout {
    let metrics = get_metrics(&config.font);
    let row_advance = config.row_advance_pt();
    let ascent = metrics.ascent_em * config.font_size_pt;
    let text_width = config.text_width_pt();

    let mut page = 0usize;
    let mut cursor = config.margin_pt;
    let mut blocks = Vec::new();
    let mut replaced_chars = 0usize;

    for (idx, line) in lines.iter().enumerate() {
        let text = line.as_ref().trim();
        if text.is_empty() {
            cursor += row_advance * config.paragraph_spacing_lines;
            continue;
        }

        let mut rows = Vec::new();
        for row_text in wrap_text(text, metrics, config.font_size_pt, text_width) {
            let (printable, replaced) = replace_unencodable(&row_text);
            replaced_chars += replaced;

            // Never break before the first row of a page, even if a row is taller than the page.
            if cursor + row_advance > config.bottom_limit_pt() && cursor > config.margin_pt {
                page += 1;
                cursor = config.margin_pt;
            }
            rows.push(PlacedRow {
                page,
                x_pt: config.margin_pt,
                baseline_pt: cursor + ascent,
                text: printable.into_owned(),
            });
            cursor += row_advance;
        }

        blocks.push(TextBlock {
            line_number: idx + 1,
            rows,
        });
    }

    DocumentLayout {
        page_count: page + 1,
        blocks,
        replaced_chars,
    }
}

/// Swaps every character outside the font's encoding for `REPLACEMENT_CHAR`.
/// Borrows when nothing needs replacing.
pub fn replace_unencodable(text: &str) -> (Cow<'_, str>, usize) {
    if text.chars().all(is_encodable) {
        return (Cow::Borrowed(text), 0);
    }
    let mut replaced = 0usize;
    let out = text
        .chars()
        .map(|c| {
            if is_encodable(c) {
                c
            } else {
                replaced += 1;
                REPLACEMENT_CHAR
            }
        })
        .collect();
    (Cow::Owned(out), replaced)
}

/// Greedy word wrap. Runs of whitespace collapse to a single space; a word wider than
/// the whole line is split between characters.
pub fn wrap_text(
    text: &str,
    metrics: &FontMetricTable,
    font_size_pt: f32,
    max_width_pt: f32,
) -> Vec<String> {
    let space_w = metrics.space_width * font_size_pt;
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in text.split_whitespace() {
        for piece in split_overlong_word(word, metrics, font_size_pt, max_width_pt) {
            let piece_w = metrics.measure_pt(piece, font_size_pt);

            if current.is_empty() {
                current.push_str(piece);
                current_width = piece_w;
            } else if current_width + space_w + piece_w > max_width_pt {
                rows.push(std::mem::take(&mut current));
                current.push_str(piece);
                current_width = piece_w;
            } else {
                current.push(' ');
                current.push_str(piece);
                current_width += space_w + piece_w;
            }
        }
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

fn split_overlong_word<'a>(
    word: &'a str,
    metrics: &FontMetricTable,
    font_size_pt: f32,
    max_width_pt: f32,
) -> Vec<&'a str> {
    if metrics.measure_pt(word, font_size_pt) <= max_width_pt {
        return vec![word];
    }

    let mut pieces = Vec::new();
    let mut start = 0usize;
    let mut width = 0.0_f32;
    let mut buf = [0u8; 4];

    for (idx, ch) in word.char_indices() {
        let ch_w = metrics.measure_pt(ch.encode_utf8(&mut buf), font_size_pt);
        if idx > start && width + ch_w > max_width_pt {
            pieces.push(&word[start..idx]);
            start = idx;
            width = 0.0;
        }
        width += ch_w;
    }
    pieces.push(&word[start..]);
    pieces
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
