//! Chrome sessions over the DevTools protocol.
//!
//! Two factories produce [`ChromeSession`]s:
//!
//! | Factory | Acquire | Release |
//! |---------|---------|---------|
//! | [`LocalChromeFactory`] | Launch a headless Chrome process | Close the tab, kill the process |
//! | [`RemoteChromeFactory`] | Connect to a browser service over WebSocket | Close the tab, drop the connection |
//!
//! Both hand out one browser per conversion.
//!
//! # Example
//!
//! ```rust,ignore
//! use page2pdf_api::backend::{BrowserBackend, BrowserSettings, LocalChromeFactory};
//!
//! // Auto-detect Chrome
//! let backend = BrowserBackend::new(LocalChromeFactory::with_defaults(), BrowserSettings::default());
//!
//! // Or use a custom binary
//! let factory = LocalChromeFactory::with_path("/usr/bin/chromium".to_string());
//! ```

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use headless_chrome::browser::tab::EventListener;
use headless_chrome::protocol::cdp::Network;
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};

use crate::config::ConverterConfig;
use crate::error::{BackendError, Result};
use crate::page::{
    DOCUMENT_READY_SCRIPT, ExpandAction, IDLE_POLL_INTERVAL, IdleTracker, InFlightRequests,
    PageStyleOverride, PdfRenderOptions,
};
use crate::session::{PageSession, SessionFactory};

/// Viewport used for locally launched browsers.
pub const WINDOW_SIZE: (u32, u32) = (1200, 800);

/// Selector locating the site gate's password field.
pub const PASSWORD_FIELD_SELECTOR: &str = "input[type=\"password\"]";

/// Extra time a browser may sit silent beyond the navigation timeout before
/// the DevTools connection is dropped.
const IDLE_BROWSER_MARGIN: Duration = Duration::from_secs(30);

type NetworkListener = dyn EventListener<Event> + Send + Sync;

// ============================================================================
// ChromeSession
// ============================================================================

/// One browser with one tab, owned by a single conversion.
pub struct ChromeSession {
    tab: Arc<Tab>,
    browser: Browser,
    in_flight: InFlightRequests,
    listener: Weak<NetworkListener>,
}

impl ChromeSession {
    /// Open a fresh tab in `browser` and start following its network
    /// requests.
    pub fn open_in(browser: Browser) -> Result<Self> {
        let tab = browser.new_tab().map_err(|e| {
            log::error!("❌ Failed to create tab: {}", e);
            BackendError::BackendUnavailable(format!("failed to open tab: {}", e))
        })?;

        tab.call_method(Network::Enable {
            max_total_buffer_size: None,
            max_resource_buffer_size: None,
            max_post_data_size: None,
            report_direct_socket_traffic: None,
            enable_durable_messages: None,
        })
        .map_err(|e| {
            BackendError::BackendUnavailable(format!("failed to enable network events: {}", e))
        })?;

        let in_flight = InFlightRequests::new();
        let events = in_flight.clone();
        let listener = tab
            .add_event_listener(Arc::new(move |event: &Event| match event {
                Event::NetworkRequestWillBeSent(e) => events.started(&e.params.request_id),
                Event::NetworkLoadingFinished(e) => events.finished(&e.params.request_id),
                Event::NetworkLoadingFailed(e) => events.finished(&e.params.request_id),
                _ => {}
            }))
            .map_err(|e| {
                BackendError::BackendUnavailable(format!("failed to watch network events: {}", e))
            })?;

        Ok(Self {
            tab,
            browser,
            in_flight,
            listener,
        })
    }

    /// Poll the page until [`IdleTracker`] reports idle or `budget` runs out.
    fn wait_for_network_idle(&self, budget: Duration) -> Result<()> {
        let start = Instant::now();
        let mut tracker = IdleTracker::default();
        let mut last_error = None;

        loop {
            let ready = match self.tab.evaluate(DOCUMENT_READY_SCRIPT, false) {
                Ok(result) => result.value.and_then(|v| v.as_bool()).unwrap_or(false),
                Err(e) => {
                    log::trace!("Ready-state probe failed: {}", e);
                    last_error = Some(e.to_string());
                    false
                }
            };
            let in_flight = ready.then(|| self.in_flight.count());

            if tracker.observe(in_flight, Instant::now()) {
                log::trace!("Network idle after {:?}", start.elapsed());
                return Ok(());
            }

            if start.elapsed() >= budget {
                return Err(BackendError::Navigation(idle_timeout_message(
                    budget,
                    in_flight,
                    last_error.as_deref(),
                )));
            }

            std::thread::sleep(IDLE_POLL_INTERVAL);
        }
    }

    fn match_count(&self, selector: &str) -> Result<i64> {
        let literal = serde_json::to_string(selector)
            .map_err(|e| BackendError::Render(format!("invalid selector '{}': {}", selector, e)))?;
        let expression = format!("document.querySelectorAll({}).length", literal);

        let result = self.tab.evaluate(&expression, false).map_err(|e| {
            BackendError::Render(format!("failed to query '{}': {}", selector, e))
        })?;

        Ok(result.value.and_then(|v| v.as_i64()).unwrap_or(0))
    }
}

impl PageSession for ChromeSession {
    type Target<'a> = Element<'a>;

    fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        self.tab.set_default_timeout(timeout);

        self.in_flight.clear();
        self.tab
            .navigate_to(url)
            .map_err(|e| BackendError::Navigation(e.to_string()))?
            .wait_until_navigated()
            .map_err(|e| BackendError::Navigation(format!("page did not finish loading: {}", e)))?;

        self.wait_for_network_idle(timeout.saturating_sub(start.elapsed()))
    }

    fn submit_password(&self, password: &str, timeout: Duration) -> Result<bool> {
        let field = match self.tab.find_element(PASSWORD_FIELD_SELECTOR) {
            Ok(field) => field,
            Err(e) => {
                log::trace!("No password field: {}", e);
                return Ok(false);
            }
        };

        let start = Instant::now();
        field
            .type_into(password)
            .map_err(|e| BackendError::Navigation(format!("failed to enter site password: {}", e)))?;
        self.tab
            .press_key("Enter")
            .map_err(|e| BackendError::Navigation(format!("failed to submit site password: {}", e)))?
            .wait_until_navigated()
            .map_err(|e| BackendError::Navigation(format!("site gate did not respond: {}", e)))?;

        self.wait_for_network_idle(timeout.saturating_sub(start.elapsed()))?;
        Ok(true)
    }

    fn find_targets(&self, selector: &str) -> Result<Vec<Element<'_>>> {
        if self.match_count(selector)? == 0 {
            return Ok(Vec::new());
        }

        match self.tab.find_elements(selector) {
            Ok(elements) => Ok(elements),
            Err(e) => {
                // Matches vanished between the count and the lookup.
                log::warn!("Could not resolve elements for '{}': {}", selector, e);
                Ok(Vec::new())
            }
        }
    }

    fn apply(&self, target: &Element<'_>, action: ExpandAction) -> Result<()> {
        target
            .call_js_fn(&action.js_function(), vec![], false)
            .map(|_| ())
            .map_err(|e| BackendError::Render(format!("{:?} failed: {}", action, e)))
    }

    fn inject_style(&self, style: &PageStyleOverride) -> Result<()> {
        self.tab
            .evaluate(&style.injection_script(), false)
            .map(|_| ())
            .map_err(|e| BackendError::Render(format!("failed to inject print stylesheet: {}", e)))
    }

    fn print_pdf(&self, options: &PdfRenderOptions) -> Result<Vec<u8>> {
        self.tab
            .print_to_pdf(Some(options.to_print_options()))
            .map_err(|e| BackendError::Render(e.to_string()))
    }

    fn close(self) -> Result<()> {
        let Self {
            tab,
            browser,
            listener,
            ..
        } = self;
        if let Err(e) = tab.remove_event_listener(&listener) {
            log::trace!("Failed to remove network listener: {}", e);
        }

        let result = tab
            .close(true)
            .map(|_| ())
            .map_err(|e| BackendError::Render(format!("failed to close tab: {}", e)));

        // Dropping the browser ends the process or the connection.
        drop(browser);
        result
    }
}

/// Timeout message for [`ChromeSession::wait_for_network_idle`].
///
/// `in_flight` is the last poll (`None` while loading); `last_error` is the
/// most recent failed page evaluation, which is often the real cause.
fn idle_timeout_message(
    budget: Duration,
    in_flight: Option<usize>,
    last_error: Option<&str>,
) -> String {
    let state = match in_flight {
        Some(count) => format!("{} requests still in flight", count),
        None => "document still loading".to_string(),
    };
    let mut message = format!(
        "timed out after {:?} waiting for network idle ({})",
        budget, state
    );
    if let Some(error) = last_error {
        message.push_str(&format!("; last page evaluation error: {}", error));
    }
    message
}

// ============================================================================
// LocalChromeFactory
// ============================================================================

/// Launches a new headless Chrome process per session.
pub struct LocalChromeFactory {
    chrome_path: Option<String>,
    idle_timeout: Duration,
}

impl LocalChromeFactory {
    /// Auto-detect the Chrome binary.
    ///
    /// The `headless_chrome` crate searches common installation paths:
    ///
    /// | Platform | Paths Searched |
    /// |----------|----------------|
    /// | Linux | `/usr/bin/google-chrome`, `/usr/bin/chromium`, etc. |
    /// | macOS | `/Applications/Google Chrome.app/...` |
    /// | Windows | `C:\Program Files\Google\Chrome\...` |
    pub fn with_defaults() -> Self {
        log::debug!("Creating LocalChromeFactory with auto-detect");
        Self {
            chrome_path: None,
            idle_timeout: ConverterConfig::default().navigation_timeout + IDLE_BROWSER_MARGIN,
        }
    }

    /// Use the Chrome binary at `chrome_path`.
    pub fn with_path(chrome_path: String) -> Self {
        log::debug!("Creating LocalChromeFactory with custom path: {}", chrome_path);
        Self {
            chrome_path: Some(chrome_path),
            ..Self::with_defaults()
        }
    }

    /// Factory matching `config`.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            chrome_path: config.chrome_path.clone(),
            idle_timeout: config.navigation_timeout + IDLE_BROWSER_MARGIN,
        }
    }
}

impl SessionFactory for LocalChromeFactory {
    type Session = ChromeSession;

    fn name(&self) -> &'static str {
        "local"
    }

    fn open(&self) -> Result<ChromeSession> {
        let options = create_chrome_options(self.chrome_path.as_deref(), self.idle_timeout)?;

        log::debug!("Launching Chrome browser...");
        let browser = Browser::new(options).map_err(|e| {
            log::error!("❌ Chrome launch failed: {}", e);
            BackendError::BackendUnavailable(format!("failed to launch Chrome: {}", e))
        })?;

        ChromeSession::open_in(browser)
    }
}

/// Launch options for a container-friendly headless Chrome.
///
/// # Chrome Flags Applied
///
/// ## Memory and Performance
/// - `--disable-dev-shm-usage` - Use /tmp instead of /dev/shm
/// - `--disable-crash-reporter`
///
/// ## GPU and Rendering
/// - `--disable-gpu-compositing`
/// - `--disable-software-rasterizer`
/// - `--disable-accelerated-2d-canvas`
///
/// ## Disabled Features
/// - `--disable-extensions`
/// - `--disable-sync`
/// - `--disable-default-apps`
///
/// ## Stability
/// - `--disable-background-timer-throttling`
/// - `--disable-backgrounding-occluded-windows`
/// - `--disable-renderer-backgrounding`
/// - `--disable-hang-monitor`
///
/// # Errors
///
/// [`BackendError::Configuration`] if the options builder rejects the
/// settings.
pub fn create_chrome_options(
    chrome_path: Option<&str>,
    idle_timeout: Duration,
) -> Result<LaunchOptions<'static>> {
    let mut builder = LaunchOptions::default_builder();

    if let Some(path) = chrome_path {
        builder.path(Some(path.to_string().into()));
        log::trace!("Chrome path set to: {}", path);
    } else {
        log::trace!("Chrome path: auto-detect");
    }

    builder
        .headless(true)
        .sandbox(false) // required in containers
        .window_size(Some(WINDOW_SIZE))
        .idle_browser_timeout(idle_timeout)
        .args(vec![
            // ===== Memory and Performance =====
            "--disable-dev-shm-usage".as_ref(),
            "--disable-crash-reporter".as_ref(),
            // ===== GPU and Rendering =====
            "--disable-gpu-compositing".as_ref(),
            "--disable-software-rasterizer".as_ref(),
            "--disable-accelerated-2d-canvas".as_ref(),
            // ===== Disabled Features =====
            "--disable-extensions".as_ref(),
            "--disable-sync".as_ref(),
            "--disable-default-apps".as_ref(),
            // ===== Stability =====
            "--disable-background-timer-throttling".as_ref(),
            "--disable-backgrounding-occluded-windows".as_ref(),
            "--disable-renderer-backgrounding".as_ref(),
            "--disable-hang-monitor".as_ref(),
        ])
        .build()
        .map_err(|e| {
            let path_msg = chrome_path.unwrap_or("auto-detect");
            log::error!("❌ Failed to build Chrome launch options (path: {}): {}", path_msg, e);
            BackendError::Configuration(e.to_string())
        })
}

// ============================================================================
// RemoteChromeFactory
// ============================================================================

/// Connects to a hosted browser service per session.
///
/// The access token is appended to the endpoint as `?token=...`. A missing
/// token is reported when a session is requested, not at construction.
pub struct RemoteChromeFactory {
    endpoint: String,
    token: Option<String>,
    idle_timeout: Duration,
}

impl RemoteChromeFactory {
    /// Factory for `endpoint` authenticated with `token`.
    pub fn new<S: Into<String>>(endpoint: S, token: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token,
            idle_timeout: ConverterConfig::default().navigation_timeout + IDLE_BROWSER_MARGIN,
        }
    }

    /// Factory matching `config`.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            endpoint: config.remote_endpoint.clone(),
            token: config.access_token.clone(),
            idle_timeout: config.navigation_timeout + IDLE_BROWSER_MARGIN,
        }
    }

    /// The endpoint without credentials.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SessionFactory for RemoteChromeFactory {
    type Session = ChromeSession;

    fn name(&self) -> &'static str {
        "remote"
    }

    fn open(&self) -> Result<ChromeSession> {
        let token = self.token.as_deref().ok_or_else(|| {
            BackendError::BackendUnavailable(
                "BROWSERLESS_TOKEN is not set; the remote backend needs an access token"
                    .to_string(),
            )
        })?;

        log::debug!("Connecting to remote browser at {}", self.endpoint);
        let browser = Browser::connect_with_timeout(
            endpoint_with_token(&self.endpoint, token),
            self.idle_timeout,
        )
        .map_err(|e| {
            log::error!("❌ Remote browser connection failed: {}", e);
            BackendError::BackendUnavailable(format!(
                "failed to connect to {}: {}",
                self.endpoint, e
            ))
        })?;

        ChromeSession::open_in(browser)
    }
}

/// Append `token` to `endpoint` as a query parameter.
pub fn endpoint_with_token(endpoint: &str, token: &str) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!(
        "{}{}token={}",
        endpoint,
        separator,
        urlencoding::encode(token)
    )
}

// ============================================================================
// Unit Tests
// ============================================================================
