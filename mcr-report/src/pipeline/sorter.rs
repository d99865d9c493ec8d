//! Segmentation ordering

use mcr_common::ClassifiedRecord;

/// Presentation order of known segmentations
pub const SEGMENT_PRIORITY: [&str; 6] = ["A", "B", "C", "D", "Red Flag", "Unknown"];

/// Rank of a segmentation; unlisted values rank after every listed one
pub fn segment_rank(segmentation: &str) -> usize {
    SEGMENT_PRIORITY
        .iter()
        .position(|s| *s == segmentation)
        .unwrap_or(SEGMENT_PRIORITY.len())
}

/// Stable sort by segmentation rank
pub fn sort_by_segment(records: &mut [ClassifiedRecord]) {
    records.sort_by_key(|r| segment_rank(&r.segmentation));
}
