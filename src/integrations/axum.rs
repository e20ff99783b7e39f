//! Axum integration.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use page2pdf_api::integrations::{AppState, axum::router};
//!
//! let state = AppState::from_config(&config)?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router(state)).await?;
//! ```
//!
//! # Blocking Work
//!
//! Conversions block for seconds, so handlers run them with
//! [`tokio::task::spawn_blocking`] under [`AppState::request_timeout`]. When
//! the deadline passes the client gets a 500 while the blocking task runs to
//! completion and releases its browser session.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};

use super::AppState;
use crate::service::{
    self, ConversionRequest, ErrorResponse, HealthResponse, PdfResponse, PdfServiceError,
};

/// Router with the conversion and health routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pdf_from_url))
        .route("/pdf", get(pdf_from_url))
        .route("/health", get(health_check))
        .with_state(state)
}

/// `GET /pdf?url=...`
///
/// The query is read raw so that malformed or repeated parameters still get
/// a JSON error body.
pub async fn pdf_from_url(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let request = ConversionRequest::from_query(query.as_deref().unwrap_or_default());
    let backend = Arc::clone(&state.backend);
    let deadline = state.request_timeout;

    log::debug!("PDF request: {:?}", request.url);

    let result = tokio::time::timeout(
        deadline,
        tokio::task::spawn_blocking(move || service::convert(backend.as_ref(), &request)),
    )
    .await;

    match result {
        Ok(Ok(Ok(response))) => build_pdf_response(response),
        Ok(Ok(Err(e))) => build_error_response(e),
        Ok(Err(join_err)) => {
            log::error!("Blocking task error: {}", join_err);
            build_error_response(PdfServiceError::Internal(join_err.to_string()))
        }
        Err(_timeout) => {
            log::error!("PDF generation timed out after {:?}", deadline);
            build_error_response(PdfServiceError::Timeout(format!(
                "Operation timed out after {} seconds",
                deadline.as_secs_f64()
            )))
        }
    }
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(state.backend.name()))
}

// ============================================================================
// Response Builders (Internal)
// ============================================================================

fn build_pdf_response(response: PdfResponse) -> Response {
    log::info!(
        "PDF generated successfully: {} bytes, filename={}",
        response.size(),
        response.filename
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
            (header::CONTENT_DISPOSITION, response.content_disposition()),
        ],
        response.data,
    )
        .into_response()
}

fn build_error_response(error: PdfServiceError) -> Response {
    let status = StatusCode::from_u16(error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    log::warn!(
        "PDF generation error: {} ({}, HTTP {})",
        error,
        error.error_code(),
        status.as_u16()
    );

    (status, Json(ErrorResponse::from(&error))).into_response()
}

// ============================================================================
// Tests
// ============================================================================
