//! Test Helper Utilities
//!
//! In-memory record source and record builders shared by mcr-report tests

#![allow(dead_code)]

use async_trait::async_trait;
use mcr_common::{Container, CustomField, Record};
use mcr_report::{RecordSource, SourceError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scripted fetch outcome for one container
pub enum Fetch {
    Records(Vec<Record>),
    Fail(String),
}

/// Record source backed by fixed data
#[derive(Default)]
pub struct FakeSource {
    containers: Vec<Container>,
    fetches: HashMap<String, Fetch>,
    list_error: Option<String>,
    delay: Option<Duration>,
    fetch_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, container_id: &str, records: Vec<Record>) -> Self {
        self.containers.push(Container::new(container_id, container_id));
        self.fetches
            .insert(container_id.to_string(), Fetch::Records(records));
        self
    }

    pub fn with_failure(mut self, container_id: &str, message: &str) -> Self {
        self.containers.push(Container::new(container_id, container_id));
        self.fetches
            .insert(container_id.to_string(), Fetch::Fail(message.to_string()));
        self
    }

    pub fn with_list_error(mut self, message: &str) -> Self {
        self.list_error = Some(message.to_string());
        self
    }

    /// Delay every record fetch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSource for FakeSource {
    async fn list_containers(&self, _collection_id: &str) -> Result<Vec<Container>, SourceError> {
        match &self.list_error {
            Some(message) => Err(SourceError::NotFound(message.clone())),
            None => Ok(self.containers.clone()),
        }
    }

    async fn fetch_records(&self, container: &Container) -> Result<Vec<Record>, SourceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.fetches.get(&container.id) {
            Some(Fetch::Records(records)) => Ok(records.clone()),
            Some(Fetch::Fail(message)) => Err(SourceError::ApiError(500, message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

/// Build a record with the standard field names
pub fn client(name: &str, segmentation: Option<&str>, email: &str, phone: &str) -> Record {
    let mut fields = Vec::new();
    if let Some(segmentation) = segmentation {
        fields.push(CustomField::new("Lead Client Segmentation", Some(segmentation)));
    }
    fields.push(CustomField::new("HOH Email", Some(email)));
    fields.push(CustomField::new("Phone Number", Some(phone)));
    Record::new(name, fields)
}
