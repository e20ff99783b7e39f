//! Hosted PDF endpoint backend.
//!
//! Instead of driving a browser over DevTools, [`HostedPdfBackend`] sends one
//! HTTP request describing the whole conversion to a browserless-style
//! `/pdf` endpoint: the target URL, the expansion script, the print
//! stylesheet, the settle delay and the PDF layout. The service performs the
//! steps in that order and answers with the PDF bytes.
//!
//! The site gate cannot be expressed in such a request, so this backend is
//! rejected at configuration time when a site password is set.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;

use super::{BrowserSettings, RenderBackend};
use crate::config::ConverterConfig;
use crate::error::{BackendError, Result};
use crate::page::{PdfRenderOptions, expansion_script};

/// Time allowed on top of navigation and settling for the export itself.
const EXPORT_MARGIN: Duration = Duration::from_secs(30);

/// Longest error body quoted in a [`BackendError::Render`] message.
const MAX_ERROR_BODY: usize = 200;

/// Renders through a hosted `/pdf` endpoint.
pub struct HostedPdfBackend {
    endpoint: String,
    token: Option<String>,
    settings: BrowserSettings,
    request_timeout: Duration,
}

impl HostedPdfBackend {
    /// Backend posting to `endpoint` with `token`.
    ///
    /// Each request may take the navigation timeout plus the settle delay plus
    /// a fixed margin for the export.
    pub fn new<S: Into<String>>(endpoint: S, token: Option<String>, settings: BrowserSettings) -> Self {
        let request_timeout = settings.navigation_timeout + settings.settle_delay + EXPORT_MARGIN;
        Self {
            endpoint: endpoint.into(),
            token,
            settings,
            request_timeout,
        }
    }

    /// Replace the HTTP timeout for each request.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Backend matching `config`.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(
            config.hosted_pdf_endpoint.clone(),
            config.access_token.clone(),
            BrowserSettings::from_config(config),
        )
    }

    /// Request body for converting `url`.
    ///
    /// # Errors
    ///
    /// [`BackendError::Render`] if the body cannot be serialized.
    pub fn payload(&self, url: &str, options: &PdfRenderOptions) -> Result<serde_json::Value> {
        let request = HostedPdfRequest {
            url,
            goto_options: GotoOptions {
                wait_until: "networkidle0",
                timeout: millis(self.settings.navigation_timeout),
            },
            add_script_tag: vec![TagContent {
                content: expansion_script(),
            }],
            add_style_tag: vec![TagContent {
                content: self.settings.style.css(),
            }],
            wait_for_timeout: millis(self.settings.settle_delay),
            options: HostedPdfOptions::from(options),
        };

        serde_json::to_value(request)
            .map_err(|e| BackendError::Render(format!("failed to encode hosted request: {}", e)))
    }

    /// HTTP timeout for each request.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl RenderBackend for HostedPdfBackend {
    fn name(&self) -> &'static str {
        "hosted"
    }

    fn render_as(&self, id: &str, url: &str, options: &PdfRenderOptions) -> Result<Vec<u8>> {
        let token = self.token.as_deref().ok_or_else(|| {
            BackendError::BackendUnavailable(
                "BROWSERLESS_TOKEN is not set; the hosted backend needs an access token"
                    .to_string(),
            )
        })?;

        // Built per request: the blocking client owns a runtime that must not
        // be created or dropped on an async worker.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.request_timeout())
            .build()
            .map_err(|e| BackendError::Configuration(format!("HTTP client: {}", e)))?;

        let payload = self.payload(url, options)?;

        log::debug!("[{}] Posting conversion of {} to {}", id, url, self.endpoint);
        let response = client
            .post(&self.endpoint)
            .query(&[("token", token)])
            .json(&payload)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Navigation(format!(
                        "hosted renderer timed out after {:?}",
                        self.request_timeout()
                    ))
                } else {
                    log::error!("[{}] ❌ Hosted renderer unreachable: {}", id, e);
                    BackendError::BackendUnavailable(format!(
                        "failed to reach {}: {}",
                        self.endpoint, e
                    ))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            log::debug!("[{}] Hosted renderer answered HTTP {}", id, status.as_u16());
            return Err(error_for_status(status, &body));
        }

        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|e| BackendError::Render(format!("failed to read PDF body: {}", e)))
    }
}

/// Map a non-success status from the hosted endpoint.
pub fn error_for_status(status: StatusCode, body: &str) -> BackendError {
    let detail: String = body.trim().chars().take(MAX_ERROR_BODY).collect();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::BackendUnavailable(
            format!("hosted renderer rejected the access token (HTTP {})", status.as_u16()),
        ),
        StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => {
            BackendError::BackendUnavailable(format!(
                "hosted renderer is busy (HTTP {})",
                status.as_u16()
            ))
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            BackendError::Navigation(format!("HTTP {}: {}", status.as_u16(), detail))
        }
        _ => BackendError::Render(format!("HTTP {}: {}", status.as_u16(), detail)),
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HostedPdfRequest<'a> {
    url: &'a str,
    goto_options: GotoOptions,
    add_script_tag: Vec<TagContent>,
    add_style_tag: Vec<TagContent>,
    wait_for_timeout: u64,
    options: HostedPdfOptions<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GotoOptions {
    wait_until: &'static str,
    timeout: u64,
}

#[derive(Serialize)]
struct TagContent {
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HostedPdfOptions<'a> {
    format: &'static str,
    print_background: bool,
    margin: HostedMargins,
    display_header_footer: bool,
    header_template: &'a str,
    footer_template: &'a str,
}

#[derive(Serialize)]
struct HostedMargins {
    top: String,
    bottom: String,
    left: String,
    right: String,
}

impl<'a> From<&'a PdfRenderOptions> for HostedPdfOptions<'a> {
    fn from(options: &'a PdfRenderOptions) -> Self {
        let inches = |value: f64| format!("{}in", value);
        Self {
            format: options.page_format.name(),
            print_background: options.print_background,
            margin: HostedMargins {
                top: inches(options.margins.top),
                bottom: inches(options.margins.bottom),
                left: inches(options.margins.left),
                right: inches(options.margins.right),
            },
            display_header_footer: options.show_header_footer,
            header_template: &options.header_template,
            footer_template: &options.footer_template,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::FOOTER_TEMPLATE;

    fn backend(token: Option<&str>) -> HostedPdfBackend {
        HostedPdfBackend::new(
            "https://pdf.example.com/pdf",
            token.map(str::to_string),
            BrowserSettings::default(),
        )
    }

    #[test]
    fn test_payload_describes_whole_conversion() {
        let payload = backend(Some("t"))
            .payload("https://docs.example.com", &PdfRenderOptions::default())
            .unwrap();

        assert_eq!(payload["url"], "https://docs.example.com");
        assert_eq!(payload["gotoOptions"]["waitUntil"], "networkidle0");
        assert_eq!(payload["gotoOptions"]["timeout"], 30_000);
        assert_eq!(payload["waitForTimeout"], 2_000);

        let script = payload["addScriptTag"][0]["content"].as_str().unwrap();
        assert!(script.contains("aria-expanded"));

        let css = payload["addStyleTag"][0]["content"].as_str().unwrap();
        assert!(css.contains("@media print"));
    }

    #[test]
    fn test_payload_pdf_options() {
        let payload = backend(Some("t"))
            .payload("https://docs.example.com", &PdfRenderOptions::default())
            .unwrap();
        let options = &payload["options"];

        assert_eq!(options["format"], "A4");
        assert_eq!(options["printBackground"], true);
        assert_eq!(options["displayHeaderFooter"], true);
        assert_eq!(options["margin"]["top"], "0.75in");
        assert_eq!(options["margin"]["left"], "0.6in");
        assert_eq!(options["footerTemplate"], FOOTER_TEMPLATE);
    }

    #[test]
    fn test_request_timeout() {
        assert_eq!(backend(Some("t")).request_timeout(), Duration::from_secs(62));

        let backend = backend(Some("t")).with_request_timeout(Duration::from_secs(5));
        assert_eq!(backend.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_missing_token_is_unavailable() {
        let result = backend(None).render("https://docs.example.com", &PdfRenderOptions::default());

        match result {
            Err(BackendError::BackendUnavailable(msg)) => assert!(msg.contains("BROWSERLESS_TOKEN")),
            other => panic!("Expected BackendUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_error_for_status() {
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, ""),
            BackendError::BackendUnavailable(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::TOO_MANY_REQUESTS, ""),
            BackendError::BackendUnavailable(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::REQUEST_TIMEOUT, "Navigation timeout"),
            BackendError::Navigation(_)
        ));

        match error_for_status(StatusCode::BAD_REQUEST, "  \"url\" must be a valid uri  ") {
            BackendError::Render(msg) => assert_eq!(msg, "HTTP 400: \"url\" must be a valid uri"),
            other => panic!("Expected Render, got {:?}", other),
        }
    }

    #[test]
    fn test_error_body_is_truncated() {
        let body = "x".repeat(1000);

        match error_for_status(StatusCode::INTERNAL_SERVER_ERROR, &body) {
            BackendError::Render(msg) => assert_eq!(msg.len(), "HTTP 500: ".len() + MAX_ERROR_BODY),
            other => panic!("Expected Render, got {:?}", other),
        }
    }
}
