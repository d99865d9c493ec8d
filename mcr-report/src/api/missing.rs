//! JSON listing of clients missing contact details
//!
//! Runs the same pipeline as `/generatePDF` and returns the sorted rows
//! instead of a document.

use axum::{extract::State, Json};
use mcr_common::ClassifiedRecord;
use serde::Serialize;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::pipeline::collect_missing_contacts;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MissingContactsResponse {
    pub count: usize,
    pub records: Vec<ClassifiedRecord>,
}

/// GET /api/missing-contacts
pub async fn list_missing_contacts(
    State(state): State<AppState>,
) -> ApiResult<Json<MissingContactsResponse>> {
    let request_id = Uuid::new_v4();

    let records = collect_missing_contacts(
        state.source.as_ref(),
        &state.settings.portfolio_id,
        &state.settings.aggregate,
    )
    .instrument(info_span!("list_missing_contacts", %request_id))
    .await?;

    Ok(Json(MissingContactsResponse {
        count: records.len(),
        records,
    }))
}
