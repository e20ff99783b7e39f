//! What happens to a page between loading and export.
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`PdfRenderOptions`] | Fixed PDF layout (A4, margins, page-number footer) |
//! | [`PageStyleOverride`] | Print stylesheet injected before export |
//! | [`EXPAND_RULES`] / [`expand_page`] | Best-effort pass opening collapsed content |
//! | [`IdleTracker`] | Network-idle detection for browser sessions |

mod expand;
mod idle;
mod options;
mod style;

pub use expand::{
    EXPAND_RULES, ExpandAction, ExpandOutcome, ExpandRule, apply_best_effort, expand_page,
    expansion_script,
};
pub use idle::{
    DOCUMENT_READY_SCRIPT, IDLE_POLL_INTERVAL, IdleTracker, InFlightRequests, MAX_IDLE_CONNECTIONS,
    NETWORK_IDLE_WINDOW,
};
pub use options::{FOOTER_TEMPLATE, HEADER_TEMPLATE, Margins, PageFormat, PdfRenderOptions};
pub use style::{LINK_URL_STYLESHEET, PRINT_STYLESHEET, PageStyleOverride};
