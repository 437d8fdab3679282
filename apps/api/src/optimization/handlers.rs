//! Axum route handlers for the optimization API.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::optimization::partition::partition;
use crate::optimization::prompts::build_optimize_prompt;
use crate::optimization::upload::read_optimize_form;
use crate::state::AppState;
use crate::storage::{DocumentHandle, StoredDocument};

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResponse {
    /// Handle for `GET /api/download/:filename`.
    pub filename: DocumentHandle,
    /// Evaluation text, starting with the marker. Empty if the model supplied none.
    pub frontend_content: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/optimize
///
/// Pipeline: read form → build prompt → generate → partition → render → respond.
/// Strictly sequential; either a complete (filename, evaluation) pair or a single error.
pub async fn handle_optimize(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OptimizeResponse>, AppError> {
    let form = read_optimize_form(&mut multipart, state.config.max_upload_bytes).await?;

    let cv = form
        .cv
        .ok_or_else(|| AppError::Validation("No PDF file uploaded.".to_string()))?;
    let job_description = form
        .job
        .unwrap_or_else(|| state.config.default_job_description.clone());

    info!(
        file_name = %cv.file_name,
        size_bytes = cv.document.data.len(),
        "Optimizing CV"
    );

    let prompt = build_optimize_prompt(&job_description, &state.config.evaluation_marker);
    let raw = state
        .generator
        .generate(&prompt, &cv.document)
        .await
        .map_err(|e| AppError::Llm(format!("CV optimization failed: {e}")))?;

    let parts = partition(&raw, &state.config.evaluation_marker);
    if !parts.has_evaluation() {
        warn!(
            marker = %state.config.evaluation_marker,
            "Generator response has no evaluation section"
        );
    }

    let lines: Vec<&str> = parts.primary.lines().collect();
    let rendered = state.renderer.render(&lines).await?;

    info!(
        document = %rendered.handle,
        pages = rendered.layout.page_count,
        rows = rendered.layout.row_count(),
        size_bytes = rendered.size_bytes,
        replaced_chars = rendered.layout.replaced_chars,
        has_evaluation = parts.has_evaluation(),
        "CV optimized"
    );

    Ok(Json(OptimizeResponse {
        filename: rendered.handle,
        frontend_content: parts.secondary.to_string(),
    }))
}

/// GET /api/download/:filename
///
/// Streams a previously rendered PDF as an attachment. Names that are not valid handles
/// are reported exactly like missing files.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let not_found = || AppError::NotFound("File not found.".to_string());

    let handle = DocumentHandle::parse(&filename).map_err(|_| not_found())?;
    let document = state.store.open(&handle).await?.ok_or_else(not_found)?;

    Ok(build_download_response(&handle, document))
}

fn build_download_response(handle: &DocumentHandle, document: StoredDocument) -> Response {
    let mut response = Response::new(Body::from_stream(document.body));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(document.size_bytes));

    // Handles are restricted to [A-Za-z0-9._-], so the header value is always valid.
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{handle}\"")) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    response
}
