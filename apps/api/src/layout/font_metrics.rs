//! Static font-metric tables for the PDF built-in fonts used by the renderer.
//!
//! Character widths are in em units (relative to font size), taken from the standard
//! Type 1 AFM files. Only the body fonts the renderer can select are covered.
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

/// Body fonts available without embedding (PDF standard 14).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    /// Default proportional sans-serif.
    Helvetica,
    /// Fixed-pitch, every glyph is 0.6em wide.
    Courier,
}

impl FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "helvetica" => Ok(FontFamily::Helvetica),
            "courier" => Ok(FontFamily::Courier),
            other => Err(format!(
                "unsupported font '{other}' (expected Helvetica or Courier)"
            )),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

/// Page geometry and body text settings, all in PDF points (1/72 inch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub font: FontFamily,
    pub font_size_pt: f32,
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    /// Same margin on all four sides.
    pub margin_pt: f32,
    /// Extra space added below every row on top of the font's natural line height.
    pub line_gap_pt: f32,
    /// Vertical advance of a blank input line, as a fraction of one row.
    pub paragraph_spacing_lines: f32,
}

pub const US_LETTER_WIDTH_PT: f32 = 612.0;
pub const US_LETTER_HEIGHT_PT: f32 = 792.0;

/// US Letter, 50pt margins, 2pt line gap and half-row paragraph spacing.
pub fn default_page_config(font: FontFamily, font_size_pt: f32) -> PageConfig {
    PageConfig {
        font,
        font_size_pt,
        page_width_pt: US_LETTER_WIDTH_PT,
        page_height_pt: US_LETTER_HEIGHT_PT,
        margin_pt: 50.0,
        line_gap_pt: 2.0,
        paragraph_spacing_lines: 0.5,
    }
}

impl PageConfig {
    /// Usable width between the left and right margins.
    pub fn text_width_pt(&self) -> f32 {
        self.page_width_pt - 2.0 * self.margin_pt
    }

    /// Lowest point (from the page top) a row may reach.
    pub fn bottom_limit_pt(&self) -> f32 {
        self.page_height_pt - self.margin_pt
    }

    /// Distance between the tops of two consecutive rows.
    pub fn row_advance_pt(&self) -> f32 {
        get_metrics(&self.font).line_height_em * self.font_size_pt + self.line_gap_pt
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a font family.
///
/// `widths[i]` = width of ASCII character `(i + 32)`, covering 0x20 (space) through 0x7E (~).
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for characters outside the table.
    pub average_char_width: f32,
    pub space_width: f32,
    /// Ascender height; the baseline sits this far below the top of a row.
    pub ascent_em: f32,
    /// Natural line height (font bounding box height).
    pub line_height_em: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Measures a string in points at the given font size.
    pub fn measure_pt(&self, s: &str, font_size_pt: f32) -> f32 {
        self.measure_str(s) * font_size_pt
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0     1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :     ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A     B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N     O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [     \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a     b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n     o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {     |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
    ascent_em: 0.718,
    line_height_em: 1.156,
};

static COURIER_TABLE: FontMetricTable = FontMetricTable {
    widths: [0.600; 95],
    average_char_width: 0.600,
    space_width: 0.600,
    ascent_em: 0.629,
    line_height_em: 1.055,
};

// ────────────────────────────────────────────────────────────────────────────
// Character set
// ────────────────────────────────────────────────────────────────────────────

/// Printed in place of a character the built-in fonts cannot show.
pub const REPLACEMENT_CHAR: char = '?';

/// WinAnsiEncoding code points 0x80..=0x9F that map outside Latin-1.
const WINANSI_EXTRAS: [char; 27] = [
    '€', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '‘', '’', '“', '”', '•', '–',
    '—', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

/// Whether `c` can be drawn with a standard-14 font (WinAnsiEncoding).
pub fn is_encodable(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}') || WINANSI_EXTRAS.contains(&c)
}

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: &FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Helvetica => &HELVETICA_TABLE,
        FontFamily::Courier => &COURIER_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        let metrics = get_metrics(&FontFamily::Helvetica);
        assert_eq!(metrics.measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        let metrics = get_metrics(&FontFamily::Helvetica);
        // "Rust" = R(0.722) + u(0.556) + s(0.500) + t(0.278) = 2.056
        let width = metrics.measure_str("Rust");
        assert!(
            (width - 2.056).abs() < 1e-3,
            "Rust width should be ~2.056, got {width}"
        );
    }

    #[test]
    fn test_measure_str_non_ascii_falls_back() {
        let metrics = get_metrics(&FontFamily::Helvetica);
        let width = metrics.measure_str("é");
        assert!((width - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_courier_is_fixed_pitch() {
        let metrics = get_metrics(&FontFamily::Courier);
        assert_eq!(metrics.measure_str("iiii"), metrics.measure_str("WWWW"));
        assert!((metrics.measure_pt("abc", 10.0) - 18.0).abs() < 1e-3);
    }

    #[test]
    fn test_font_family_from_str_is_case_insensitive() {
        assert_eq!("helvetica".parse::<FontFamily>(), Ok(FontFamily::Helvetica));
        assert_eq!(" Courier ".parse::<FontFamily>(), Ok(FontFamily::Courier));
        assert!("Comic Sans".parse::<FontFamily>().is_err());
    }

    #[test]
    fn test_encodable_covers_latin1_and_winansi_punctuation() {
        for c in ['A', '~', ' ', 'é', 'ß', '•', '–', '—', '€', '“', '”'] {
            assert!(is_encodable(c), "{c:?} should be encodable");
        }
        for c in ['ש', 'Ж', '中', '🚀', '\t', '\u{2003}'] {
            assert!(!is_encodable(c), "{c:?} should not be encodable");
        }
    }

    #[test]
    fn test_default_page_config_sanity() {
        let config = default_page_config(FontFamily::Helvetica, 12.0);
        assert_eq!(config.text_width_pt(), 512.0);
        assert_eq!(config.bottom_limit_pt(), 742.0);
        // 1.156 * 12 + 2
        assert!((config.row_advance_pt() - 15.872).abs() < 1e-3);
    }
}
