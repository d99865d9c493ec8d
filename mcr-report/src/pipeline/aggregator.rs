//! Record aggregation across containers
//!
//! Walks containers in order, fetches each one's records through the
//! [`RecordSource`], and keeps the records missing a phone or email.
//!
//! Fetches run with bounded concurrency through an order-preserving buffered
//! stream, so output order is container order then record order no matter
//! how many fetches are in flight.

use futures::stream::{self, StreamExt};
use mcr_common::config::{ContainerErrorPolicy, FieldNames, TomlConfig};
use mcr_common::{ClassifiedRecord, Container};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::classifier::classify;
use super::extractor::extract;
use super::sorter::sort_by_segment;
use crate::services::{RecordSource, SourceError};

/// Pipeline failures surfaced to the HTTP layer
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Knobs for one aggregation run
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    pub field_names: FieldNames,
    pub max_concurrent_fetches: usize,
    pub on_container_error: ContainerErrorPolicy,
    /// Upper bound for listing plus fetching
    pub timeout: Duration,
}

impl AggregateOptions {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            field_names: config.fields.clone(),
            max_concurrent_fetches: config.aggregation.max_concurrent_fetches,
            on_container_error: config.aggregation.on_container_error,
            timeout: Duration::from_secs(config.aggregation.timeout_secs),
        }
    }
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self::from_config(&TomlConfig::default())
    }
}

/// Flatten containers into classified records, in container-then-record order
///
/// With [`ContainerErrorPolicy::Abort`] the first failed fetch ends the run
/// and records collected so far are dropped; in-flight fetches are cancelled.
pub async fn aggregate(
    source: &dyn RecordSource,
    containers: &[Container],
    options: &AggregateOptions,
) -> Result<Vec<ClassifiedRecord>, SourceError> {
    let mut classified = Vec::new();
    if containers.is_empty() {
        return Ok(classified);
    }

    let mut fetches = stream::iter(containers.iter().cloned())
        .map(|container| async move {
            let result = source.fetch_records(&container).await;
            (container, result)
        })
        .buffered(options.max_concurrent_fetches.max(1));

    let mut skipped = 0usize;

    while let Some((container, result)) = fetches.next().await {
        let records = match result {
            Ok(records) => records,
            Err(e) => match options.on_container_error {
                ContainerErrorPolicy::Abort => {
                    warn!(container = %container.id, error = %e, "Record fetch failed, aborting");
                    return Err(e);
                }
                ContainerErrorPolicy::Skip => {
                    warn!(container = %container.id, error = %e, "Record fetch failed, skipping container");
                    skipped += 1;
                    continue;
                }
            },
        };

        let before = classified.len();
        classified.extend(records.iter().filter_map(|record| {
            classify(&record.name, extract(&record.custom_fields, &options.field_names))
        }));

        debug!(
            container = %container.id,
            name = %container.name,
            records = records.len(),
            missing = classified.len() - before,
            "Processed container"
        );
    }

    info!(
        containers = containers.len(),
        skipped,
        missing = classified.len(),
        "Aggregation complete"
    );
    Ok(classified)
}

/// List a collection's containers, aggregate and sort, within the timeout
pub async fn collect_missing_contacts(
    source: &dyn RecordSource,
    collection_id: &str,
    options: &AggregateOptions,
) -> Result<Vec<ClassifiedRecord>, PipelineError> {
    let work = async {
        let containers = source.list_containers(collection_id).await?;
        let mut records = aggregate(source, &containers, options).await?;
        sort_by_segment(&mut records);
        Ok::<_, SourceError>(records)
    };

    match tokio::time::timeout(options.timeout, work).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            warn!(timeout = ?options.timeout, "Aggregation timed out");
            Err(PipelineError::Timeout(options.timeout))
        }
    }
}
