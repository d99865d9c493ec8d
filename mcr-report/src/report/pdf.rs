//! PDF drawing for a planned [`ReportLayout`]
//!
//! Uses the built-in Helvetica faces so no font files are embedded. Row fills
//! are pre-blended against the white page to get the translucent look. Cell
//! text goes through [`super::text`] first: unencodable characters are
//! replaced (and logged) and long values are cut to their column.

use mcr_common::config::ReportConfig;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb,
};
use thiserror::Error;

use super::layout::{PageLayout, ReportLayout, RowLayout};
use super::text::{fit_to_width, to_winansi};

const LAYER_NAME: &str = "Report";
const CELL_PADDING_PT: f32 = 5.0;

/// Rendering failures
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Font error: {0}")]
    Font(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

fn pt(value: f32) -> Mm {
    Mm(value * 25.4 / 72.0)
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Draw the layout into an in-memory PDF
pub fn render(layout: &ReportLayout, config: &ReportConfig) -> Result<Vec<u8>, RenderError> {
    let width = pt(layout.page_width);
    let height = pt(layout.page_height);

    let (doc, first_page, first_layer) =
        PdfDocument::new(layout.title.clone(), width, height, LAYER_NAME);

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Font(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Font(e.to_string()))?,
    };

    for (index, page) in layout.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(width, height, LAYER_NAME);
            doc.get_page(page_index).get_layer(layer_index)
        };
        draw_page(&layer, page, layout.page_height, config, &fonts);
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| RenderError::Serialize(e.to_string()))?;

    tracing::debug!(
        pages = layout.pages.len(),
        bytes = bytes.len(),
        "Rendered report document"
    );
    Ok(bytes)
}

fn draw_page(
    layer: &PdfLayerReference,
    page: &PageLayout,
    page_height: f32,
    config: &ReportConfig,
    fonts: &Fonts,
) {
    // Layout measures from the top, PDF from the bottom
    let flip = |y: f32| page_height - y;

    if let Some((title, top)) = &page.title {
        layer.set_fill_color(black());
        layer.use_text(
            to_winansi(title),
            config.title_font_size,
            pt(config.table_left),
            pt(flip(top + config.title_font_size)),
            &fonts.bold,
        );
    }

    for row in &page.rows {
        let row_top = flip(row.top);
        let row_bottom = flip(row.top + config.row_height);

        if let Some(fill) = row.fill {
            let [r, g, b] = fill.over_white(config.fill_opacity);
            layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
            layer.add_rect(Rect::new(
                pt(config.table_left),
                pt(row_bottom),
                pt(config.table_left + config.table_width),
                pt(row_top),
            ));
        }

        // Vertically centre the baseline inside the row
        let baseline = row_bottom + (config.row_height - config.font_size * 0.7) / 2.0;
        let font = if row.is_header { &fonts.bold } else { &fonts.regular };

        layer.set_fill_color(black());
        for (index, offset) in config.column_offsets.into_iter().enumerate() {
            layer.use_text(
                cell_text(row, index, config),
                config.font_size,
                pt(config.table_left + offset + CELL_PADDING_PT),
                pt(baseline),
                font,
            );
        }
    }
}

/// Usable text width of a column, padding removed on both sides
fn column_width(config: &ReportConfig, index: usize) -> f32 {
    let offsets = config.column_offsets;
    let end = offsets.get(index + 1).copied().unwrap_or(config.table_width);
    (end - offsets[index] - 2.0 * CELL_PADDING_PT).max(0.0)
}

/// Encoded and fitted text for one cell
fn cell_text(row: &RowLayout, index: usize, config: &ReportConfig) -> String {
    let cell = &row.cells[index];
    let encoded = to_winansi(cell);
    if encoded != cell.as_str() {
        tracing::warn!(
            row = %row.cells[0],
            cell = %cell,
            "Replaced characters the report font cannot encode"
        );
    }

    let fitted = fit_to_width(&encoded, config.font_size, column_width(config, index));
    if fitted != encoded {
        tracing::debug!(row = %row.cells[0], cell = %cell, "Cut cell text to column width");
    }
    fitted.into_owned()
}
