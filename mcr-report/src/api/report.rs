//! PDF report endpoint

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::ReportError;
use crate::pipeline::collect_missing_contacts;
use crate::report::build_report;
use crate::AppState;

/// Body returned when every client has both phone and email
pub const NO_RESULTS_MESSAGE: &str = "No clients missing phone or email found.";

/// GET /generatePDF
///
/// Responds with the PDF as an attachment, a plain-text notice when nothing
/// is missing, or a plain-text 500 on upstream/render failure. No partial
/// document is ever sent.
pub async fn generate_pdf(State(state): State<AppState>) -> Result<Response, ReportError> {
    let request_id = Uuid::new_v4();

    respond(state)
        .instrument(info_span!("generate_pdf", %request_id))
        .await
}

async fn respond(state: AppState) -> Result<Response, ReportError> {
    let settings = state.settings.clone();
    let records = collect_missing_contacts(
        state.source.as_ref(),
        &settings.portfolio_id,
        &settings.aggregate,
    )
    .await?;

    if records.is_empty() {
        info!("No clients missing contact details");
        return Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            NO_RESULTS_MESSAGE,
        )
            .into_response());
    }

    let row_count = records.len();
    let render_settings = settings.clone();
    let document = tokio::task::spawn_blocking(move || {
        build_report(&records, &render_settings.report)
    })
    .await
    .map_err(|e| ReportError::Internal(e.to_string()))??;

    info!(rows = row_count, bytes = document.len(), "Report generated");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, settings.content_disposition()),
        ],
        document,
    )
        .into_response())
}
