//! Actix-web integration.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use actix_web::{App, HttpServer, web};
//! use page2pdf_api::integrations::{AppState, actix::configure_routes};
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = page2pdf_api::config::env::from_env().expect("invalid configuration");
//!     let state = AppState::from_config(&config).expect("backend unavailable");
//!
//!     HttpServer::new(move || {
//!         App::new()
//!             .app_data(web::Data::new(state.clone()))
//!             .configure(configure_routes)
//!     })
//!     .bind("0.0.0.0:8080")?
//!     .run()
//!     .await
//! }
//! ```

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, http::header, web};

use super::AppState;
use crate::service::{
    self, ConversionRequest, ErrorResponse, HealthResponse, PdfResponse, PdfServiceError,
};

/// Handler state as registered with `App::app_data`.
pub type AppData = web::Data<AppState>;

// ============================================================================
// Pre-built Handlers
// ============================================================================

/// `GET /pdf?url=...`
///
/// The query is read raw so that malformed or repeated parameters still get
/// a JSON error body.
pub async fn pdf_from_url(state: AppData, req: HttpRequest) -> impl Responder {
    let request = ConversionRequest::from_query(req.query_string());
    let backend = Arc::clone(&state.backend);
    let deadline = state.request_timeout;

    log::debug!("PDF request: {:?}", request.url);

    let result = tokio::time::timeout(
        deadline,
        web::block(move || service::convert(backend.as_ref(), &request)),
    )
    .await;

    match result {
        Ok(Ok(Ok(response))) => build_pdf_response(response),
        Ok(Ok(Err(e))) => build_error_response(e),
        Ok(Err(blocking_err)) => {
            log::error!("Blocking task error: {}", blocking_err);
            build_error_response(PdfServiceError::Internal(blocking_err.to_string()))
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
pub async fn health_check(state: AppData) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse::new(state.backend.name()))
}

// ============================================================================
// Route Configuration
// ============================================================================

/// Register `/`, `/pdf` and `/health`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(pdf_from_url))
        .route("/pdf", web::get().to(pdf_from_url))
        .route("/health", web::get().to(health_check));
}

// ============================================================================
// Response Builders (Internal)
// ============================================================================

fn build_pdf_response(response: PdfResponse) -> HttpResponse {
    log::info!(
        "PDF generated successfully: {} bytes, filename={}",
        response.size(),
        response.filename
    );

    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header((header::CONTENT_DISPOSITION, response.content_disposition()))
        .body(response.data)
}

fn build_error_response(error: PdfServiceError) -> HttpResponse {
    let status_code = error.status_code();
    let body = ErrorResponse::from(&error);

    log::warn!(
        "PDF generation error: {} ({}, HTTP {})",
        error,
        error.error_code(),
        status_code
    );

    match status_code {
        400 => HttpResponse::BadRequest().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BrowserBackend, BrowserSettings};
    use crate::session::mock::{MockBehavior, MockSessionFactory};
    use actix_web::{App, http::StatusCode, test};
    use std::time::Duration;

    fn app_state(behavior: MockBehavior) -> AppState {
        let settings = BrowserSettings {
            settle_delay: Duration::ZERO,
            ..BrowserSettings::default()
        };
        let backend = Arc::new(BrowserBackend::new(
            MockSessionFactory::with_behavior(behavior),
            settings,
        ));
        AppState::new(backend, Duration::from_secs(5))
    }

    #[actix_web::test]
    async fn test_pdf_success() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state(MockBehavior::default())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/pdf?url=https://example.com")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"documentation.pdf\""
        );
        let body = test::read_body(resp).await;
        assert!(body.starts_with(b"%PDF-"));
    }

    #[actix_web::test]
    async fn test_missing_url_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state(MockBehavior::default())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body, serde_json::json!({ "error": "Please provide a URL" }));
    }

    #[actix_web::test]
    async fn test_render_failure_is_server_error() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state(MockBehavior {
                    fail_print: Some("Printing failed".to_string()),
                    ..Default::default()
                })))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/pdf?url=https://example.com")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Failed to generate PDF");
        assert_eq!(body["details"], "Render failed: Printing failed");
    }

    #[actix_web::test]
    async fn test_repeated_url_uses_first_value() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state(MockBehavior::default())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/pdf?url=https://a.example.com&url=https://b.example.com")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state(MockBehavior::default())))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend"], "mock");
    }
}
