//! Report rendering: layout planning, cell text fitting and PDF drawing

pub mod layout;
pub mod pdf;
pub mod text;

pub use layout::{plan, segment_fill, PageLayout, ReportLayout, Rgb8, RowLayout};
pub use pdf::{render, RenderError};
pub use text::{fit_to_width, to_winansi};

use mcr_common::config::ReportConfig;
use mcr_common::ClassifiedRecord;

/// Lay out and draw sorted records as a PDF document
pub fn build_report(
    records: &[ClassifiedRecord],
    config: &ReportConfig,
) -> Result<Vec<u8>, RenderError> {
    let layout = plan(records, config);
    render(&layout, config)
}
