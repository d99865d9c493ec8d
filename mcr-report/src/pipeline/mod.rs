//! Missing-contact pipeline: extract → classify → aggregate → sort

pub mod aggregator;
pub mod classifier;
pub mod extractor;
pub mod sorter;

pub use aggregator::{aggregate, collect_missing_contacts, AggregateOptions, PipelineError};
pub use classifier::{classify, missing_description};
pub use extractor::{extract, ExtractedFields, UNKNOWN_SEGMENTATION};
pub use sorter::{segment_rank, sort_by_segment, SEGMENT_PRIORITY};
