//! Multipart form parsing for `POST /api/optimize`.
//!
//! Fields: `cv` (the resume file) and `job` (job description text). Unknown fields are
//! skipped. The CV is read chunk by chunk and rejected as soon as it passes the limit.

use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::BytesMut;
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::InlineDocument;

const CV_FIELD: &str = "cv";
const JOB_FIELD: &str = "job";
const DEFAULT_MIME_TYPE: &str = "application/pdf";

#[derive(Debug)]
pub struct UploadedCv {
    pub file_name: String,
    pub document: InlineDocument,
}

#[derive(Debug, Default)]
pub struct OptimizeForm {
    pub cv: Option<UploadedCv>,
    /// Job description as sent; blank values are normalized to `None`.
    pub job: Option<String>,
}

pub async fn read_optimize_form(
    multipart: &mut Multipart,
    max_upload_bytes: usize,
) -> Result<OptimizeForm, AppError> {
    let mut form = OptimizeForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some(CV_FIELD) => {
                let file_name = field
                    .file_name()
                    .map(|value| value.to_string())
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| "cv.pdf".to_string());
                let mime_type = field
                    .content_type()
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
                let data = read_limited(field, max_upload_bytes).await?;

                if data.is_empty() {
                    return Err(AppError::Validation("Uploaded CV file is empty.".to_string()));
                }

                form.cv = Some(UploadedCv {
                    file_name,
                    document: InlineDocument { mime_type, data },
                });
            }
            Some(JOB_FIELD) => {
                let text = field.text().await.map_err(multipart_error)?;
                form.job = Some(text).filter(|t| !t.trim().is_empty());
            }
            _ => continue,
        }
    }

    Ok(form)
}

async fn read_limited(mut field: Field<'_>, limit: usize) -> Result<bytes::Bytes, AppError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if buf.len() + chunk.len() > limit {
            warn!(limit, "CV upload exceeds size limit");
            return Err(AppError::PayloadTooLarge(format!(
                "CV file exceeds the {limit} byte limit."
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the upload limit.".to_string())
    } else {
        AppError::Validation(format!("Invalid multipart payload: {}", err.body_text()))
    }
}
