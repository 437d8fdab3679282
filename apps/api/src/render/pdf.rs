//! PDF encoding of a finished `DocumentLayout` via printpdf built-in fonts.

use printpdf::{BuiltinFont, Mm, PdfDocument, PdfLayerReference};

use crate::layout::{DocumentLayout, FontFamily, PageConfig};
use crate::render::RenderError;

const MM_PER_PT: f32 = 25.4 / 72.0;

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * MM_PER_PT)
}

fn builtin_font(font: FontFamily) -> BuiltinFont {
    match font {
        FontFamily::Helvetica => BuiltinFont::Helvetica,
        FontFamily::Courier => BuiltinFont::Courier,
    }
}

/// Encodes the layout into PDF bytes. PDF y coordinates grow upwards from the bottom
/// edge, so each baseline is flipped against the page height.
pub fn encode_pdf(
    layout: &DocumentLayout,
    config: &PageConfig,
    title: &str,
) -> Result<Vec<u8>, RenderError> {
    let width = pt_to_mm(config.page_width_pt);
    let height = pt_to_mm(config.page_height_pt);

    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Layer 1");
    let font = doc
        .add_builtin_font(builtin_font(config.font))
        .map_err(|e| RenderError::Encode(format!("failed to load built-in font: {e}")))?;

    let mut layers: Vec<PdfLayerReference> = vec![doc.get_page(first_page).get_layer(first_layer)];
    for page_number in 2..=layout.page_count {
        let (page, layer) = doc.add_page(width, height, format!("Layer {page_number}"));
        layers.push(doc.get_page(page).get_layer(layer));
    }

    for row in layout.blocks.iter().flat_map(|b| &b.rows) {
        let layer = layers.get(row.page).ok_or_else(|| {
            RenderError::Encode(format!(
                "row placed on page {} of a {}-page layout",
                row.page + 1,
                layout.page_count
            ))
        })?;
        layer.use_text(
            row.text.as_str(),
            config.font_size_pt,
            pt_to_mm(row.x_pt),
            pt_to_mm(config.page_height_pt - row.baseline_pt),
            &font,
        );
    }

    doc.save_to_bytes()
        .map_err(|e| RenderError::Encode(format!("failed to serialize PDF: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{default_page_config, layout_document};

    #[test]
    fn test_encodes_valid_pdf_header() {
        let config = default_page_config(FontFamily::Helvetica, 12.0);
        let layout = layout_document(&["Jane Doe", "Senior Engineer"], &config);
        let bytes = encode_pdf(&layout, &config, "test").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_empty_layout_still_encodes() {
        let config = default_page_config(FontFamily::Courier, 10.0);
        let layout = layout_document::<&str>(&[], &config);
        let bytes = encode_pdf(&layout, &config, "empty").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_multi_page_layout_encodes() {
        let config = default_page_config(FontFamily::Helvetica, 12.0);
        let lines: Vec<String> = (0..100).map(|i| format!("Line {i}")).collect();
        let layout = layout_document(&lines, &config);
        assert!(layout.page_count > 1);
        assert!(encode_pdf(&layout, &config, "long").is_ok());
    }

    #[test]
    fn test_non_latin_lines_encode_with_placeholders() {
        let config = default_page_config(FontFamily::Helvetica, 12.0);
        let layout = layout_document(&["שלום עולם", "emoji 🚀"], &config);
        assert_eq!(layout.blocks[0].rows[0].text, "???? ????");
        let bytes = encode_pdf(&layout, &config, "non-latin").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_row_outside_page_range_is_rejected() {
        let config = default_page_config(FontFamily::Helvetica, 12.0);
        let mut layout = layout_document(&["only line"], &config);
        layout.blocks[0].rows[0].page = 5;
        assert!(matches!(
            encode_pdf(&layout, &config, "broken"),
            Err(RenderError::Encode(_))
        ));
    }

    #[test]
    fn test_pt_to_mm() {
        assert!((pt_to_mm(72.0).0 - 25.4).abs() < 1e-4);
    }
}
