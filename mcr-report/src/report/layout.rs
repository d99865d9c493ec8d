//! Report page layout
//!
//! Pure geometry: decides which page each row lands on, where it sits and
//! how it is coloured. Coordinates are PDF points measured from the top-left
//! corner of the page; [`super::pdf`] flips them when drawing.

use mcr_common::config::{ReportConfig, A4_HEIGHT_PT, A4_WIDTH_PT};
use mcr_common::ClassifiedRecord;

pub const HEADER_CELLS: [&str; 3] = ["Name", "Segmentation", "Missing"];

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Colour as seen when painted at `opacity` over a white page
    pub fn over_white(self, opacity: f32) -> [f32; 3] {
        let blend = |c: u8| 1.0 - opacity + opacity * (f32::from(c) / 255.0);
        [blend(self.r), blend(self.g), blend(self.b)]
    }
}

const SEGMENT_PALETTE: [(&str, Rgb8); 5] = [
    ("A", Rgb8::from_hex(0xb6d7a8)),
    ("B", Rgb8::from_hex(0x9fc5e8)),
    ("C", Rgb8::from_hex(0xfff2cc)),
    ("D", Rgb8::from_hex(0xf9cb9c)),
    ("Red Flag", Rgb8::from_hex(0xea9999)),
];

/// Fill for segmentations without a palette entry, "Unknown" included
pub const NEUTRAL_FILL: Rgb8 = Rgb8::from_hex(0xcccccc);

/// Row background for a segmentation
pub fn segment_fill(segmentation: &str) -> Rgb8 {
    SEGMENT_PALETTE
        .iter()
        .find(|(name, _)| *name == segmentation)
        .map(|(_, color)| *color)
        .unwrap_or(NEUTRAL_FILL)
}

/// One table row
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    /// Top edge of the row background
    pub top: f32,
    pub fill: Option<Rgb8>,
    pub cells: [String; 3],
    pub is_header: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    /// Title and its top edge, first page only
    pub title: Option<(String, f32)>,
    pub rows: Vec<RowLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<PageLayout>,
}

impl ReportLayout {
    /// Record rows across all pages, header rows excluded
    pub fn record_rows(&self) -> impl Iterator<Item = &RowLayout> {
        self.pages
            .iter()
            .flat_map(|page| page.rows.iter())
            .filter(|row| !row.is_header)
    }
}

/// Lay out the title, header row and one row per record
///
/// A row that would cross the bottom margin moves whole to a new page whose
/// cursor starts at the top margin.
pub fn plan(records: &[ClassifiedRecord], config: &ReportConfig) -> ReportLayout {
    let bottom = A4_HEIGHT_PT - config.margin;

    let mut first = PageLayout {
        title: Some((config.title.clone(), config.margin)),
        rows: Vec::with_capacity(records.len() + 1),
    };
    first.rows.push(RowLayout {
        top: config.table_top,
        fill: None,
        cells: HEADER_CELLS.map(str::to_string),
        is_header: true,
    });

    let mut pages = vec![first];
    let mut y = config.table_top + config.row_height;

    for record in records {
        if y + config.row_height > bottom {
            pages.push(PageLayout::default());
            y = config.margin;
        }

        if let Some(page) = pages.last_mut() {
            page.rows.push(RowLayout {
                top: y,
                fill: Some(segment_fill(&record.segmentation)),
                cells: [
                    record.name.clone(),
                    record.segmentation.clone(),
                    record.missing.clone(),
                ],
                is_header: false,
            });
        }
        y += config.row_height;
    }

    ReportLayout {
        title: config.title.clone(),
        page_width: A4_WIDTH_PT,
        page_height: A4_HEIGHT_PT,
        pages,
    }
}
