//! Asana REST API client
//!
//! Implements [`RecordSource`] for two container layouts:
//! - `members`: portfolio members, records are tasks assigned to each member
//! - `projects`: portfolio items, records are tasks in each project
//!
//! Task listings are paginated upstream; `fetch_records` follows
//! `next_page.offset` until the last page.

use async_trait::async_trait;
use mcr_common::config::{AsanaConfig, ContainerSource};
use mcr_common::{Container, Record};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::record_source::{RecordSource, SourceError};

const USER_AGENT: &str = concat!("mcr-report/", env!("CARGO_PKG_VERSION"));
const TASK_OPT_FIELDS: &str = "name,custom_fields.name,custom_fields.display_value";

/// Standard `{ "data": ... }` envelope
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Paginated list envelope
#[derive(Debug, Deserialize)]
struct PageEnvelope<T> {
    data: Vec<T>,
    #[serde(default)]
    next_page: Option<NextPage>,
}

#[derive(Debug, Deserialize)]
struct NextPage {
    offset: String,
}

/// Compact resource reference (`gid` plus optional name)
#[derive(Debug, Deserialize)]
struct CompactResource {
    gid: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Portfolio {
    #[serde(default)]
    members: Option<Vec<CompactResource>>,
    #[serde(default)]
    workspace: Option<CompactResource>,
}

/// `{ "errors": [{ "message": ... }] }` body returned on failures
#[derive(Debug, Deserialize)]
struct ErrorBody {
    errors: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Hands out request start times at least `min_interval` apart
///
/// Each caller reserves the next free slot and sleeps until it outside the
/// lock, so concurrent container fetches queue in reservation order.
struct RequestPacer {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RequestPacer {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval: Duration::from_millis(min_interval_ms),
            next_slot: Mutex::new(None),
        }
    }

    async fn wait_turn(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next_slot {
                Some(next) if next > now => next,
                _ => now,
            };
            *next_slot = Some(slot + self.min_interval);
            slot
        };

        let now = Instant::now();
        if slot > now {
            tracing::trace!(delay = ?(slot - now), "Pacing Asana request");
            tokio::time::sleep_until(slot).await;
        }
    }
}

/// Asana API client
pub struct AsanaClient {
    http_client: reqwest::Client,
    pacer: RequestPacer,
    base_url: String,
    access_token: String,
    container_source: ContainerSource,
    page_size: u32,
}

impl AsanaClient {
    pub fn new(access_token: String, config: &AsanaConfig) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SourceError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            pacer: RequestPacer::new(config.min_request_interval_ms),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token,
            container_source: config.container_source,
            page_size: config.page_size,
        })
    }

    /// GET a single resource and unwrap its data envelope
    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let envelope: DataEnvelope<T> = self.get_json(path, query).await?;
        Ok(envelope.data)
    }

    /// GET every page of a list endpoint
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, SourceError> {
        let mut items = Vec::new();
        let mut offset: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut page_query = query.to_vec();
            page_query.push(("limit", self.page_size.to_string()));
            if let Some(offset) = offset.take() {
                page_query.push(("offset", offset));
            }

            let page: PageEnvelope<T> = self.get_json(path, &page_query).await?;
            pages += 1;
            items.extend(page.data);

            match page.next_page {
                Some(next) => offset = Some(next.offset),
                None => break,
            }
        }

        tracing::debug!(path = %path, pages, items = items.len(), "Fetched paginated listing");
        Ok(items)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        self.pacer.wait_turn().await;

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Querying Asana API");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::NetworkError(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            return Err(match status.as_u16() {
                401 | 403 => SourceError::Unauthorized(message),
                404 => SourceError::NotFound(format!("{}: {}", path, message)),
                code => SourceError::ApiError(code, message),
            });
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))
    }

    async fn list_members(&self, portfolio_id: &str) -> Result<Vec<Container>, SourceError> {
        let portfolio: Portfolio = self
            .get_data(
                &format!("/portfolios/{}", portfolio_id),
                &[("opt_fields", "name,members.name,workspace".to_string())],
            )
            .await?;

        let workspace = portfolio.workspace.map(|w| w.gid);
        let members = portfolio.members.unwrap_or_default();

        Ok(members
            .into_iter()
            .map(|member| {
                let container = Container::new(member.gid, member.name.unwrap_or_default());
                match &workspace {
                    Some(ws) => container.with_workspace(ws.clone()),
                    None => container,
                }
            })
            .collect())
    }

    async fn list_projects(&self, portfolio_id: &str) -> Result<Vec<Container>, SourceError> {
        let items: Vec<CompactResource> = self
            .get_all_pages(
                &format!("/portfolios/{}/items", portfolio_id),
                &[("opt_fields", "name".to_string())],
            )
            .await?;

        Ok(items
            .into_iter()
            .map(|item| Container::new(item.gid, item.name.unwrap_or_default()))
            .collect())
    }
}

#[async_trait]
impl RecordSource for AsanaClient {
    async fn list_containers(&self, collection_id: &str) -> Result<Vec<Container>, SourceError> {
        let containers = match self.container_source {
            ContainerSource::Members => self.list_members(collection_id).await?,
            ContainerSource::Projects => self.list_projects(collection_id).await?,
        };

        tracing::info!(
            portfolio = %collection_id,
            source = ?self.container_source,
            containers = containers.len(),
            "Listed portfolio containers"
        );
        Ok(containers)
    }

    async fn fetch_records(&self, container: &Container) -> Result<Vec<Record>, SourceError> {
        let opt_fields = ("opt_fields", TASK_OPT_FIELDS.to_string());

        match self.container_source {
            ContainerSource::Members => {
                let workspace = container.workspace.clone().ok_or_else(|| {
                    SourceError::InvalidContainer(
                        container.id.clone(),
                        "assignee lookup requires a workspace".to_string(),
                    )
                })?;
                self.get_all_pages(
                    "/tasks",
                    &[
                        ("assignee", container.id.clone()),
                        ("workspace", workspace),
                        opt_fields,
                    ],
                )
                .await
            }
            ContainerSource::Projects => {
                self.get_all_pages(&format!("/projects/{}/tasks", container.id), &[opt_fields])
                    .await
            }
        }
    }
}

/// Pull the first upstream error message out of a failure body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; "),
        _ => body.trim().to_string(),
    }
}
