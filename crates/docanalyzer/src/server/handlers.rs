use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::analysis::document_prompt;
use crate::config::DocumentFormat;
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub analysis: String,
}

#[derive(Serialize)]
pub struct ExtractPdfResponse {
    pub text: String,
    pub pages: usize,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
        }),
    )
}

#[tracing::instrument(skip(state, payload))]
pub async fn analyze_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let text = match payload {
        Ok(Json(AnalyzeRequest {
            text: Some(serde_json::Value::String(text)),
        })) if !text.is_empty() => text,
        Ok(_) => {
            tracing::warn!("Analyze request without text");
            return error_response(StatusCode::BAD_REQUEST, "Text content is required");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Malformed analyze request");
            return error_response(StatusCode::BAD_REQUEST, "Text content is required");
        }
    };

    tracing::debug!(chars = text.len(), "Analyzing submitted text");

    match state.client.generate(&document_prompt(&text)).await {
        Ok(analysis) => (StatusCode::OK, Json(AnalyzeResponse { analysis })).into_response(),
        Err(e) if e.is_connection() => {
            tracing::error!(error = %e, "Inference server unreachable");
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                format!(
                    "Unable to connect to the inference server. Please ensure it is running at {}",
                    state.endpoint
                ),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Analysis failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to analyze document",
            )
        }
    }
}

#[tracing::instrument(skip(state, multipart))]
pub async fn extract_pdf_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                tracing::warn!("Extract request with no file");
                return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read multipart");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read multipart: {}", e),
                );
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let format = DocumentFormat::detect(&filename, field.content_type());
        if format != Some(DocumentFormat::Pdf) {
            tracing::warn!(filename = %filename, "Rejected non-PDF upload");
            return error_response(StatusCode::BAD_REQUEST, "File must be a PDF");
        }

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read upload");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read file: {}", e),
                );
            }
        };

        tracing::debug!(filename = %filename, bytes = data.len(), "Extracting uploaded PDF");

        return match state
            .extractors
            .clone()
            .extract_bytes_blocking(DocumentFormat::Pdf, data.to_vec())
            .await
        {
            Ok(extracted) => (
                StatusCode::OK,
                Json(ExtractPdfResponse {
                    text: extracted.text,
                    pages: extracted.pages.unwrap_or_default(),
                }),
            )
                .into_response(),
            Err(e) => {
                tracing::error!(filename = %filename, error = %e, "PDF extraction failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract text from PDF",
                )
            }
        };
    }
}
