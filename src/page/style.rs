//! Print stylesheet injected before export.

/// Rules applied to every printed page.
///
/// Hides navigation chrome, lets content use the full page width and keeps
/// code blocks, images and tables from splitting across pages.
pub const PRINT_STYLESHEET: &str = r#"
@media print {
    nav, .sidebar, header.fixed, .nav-header {
        display: none !important;
    }
    main, article, .content {
        max-width: 100% !important;
        margin: 0 !important;
    }
    pre, code, img, table {
        page-break-inside: avoid;
    }
}
"#;

/// Prints the target of every external link after its text.
pub const LINK_URL_STYLESHEET: &str = r#"
@media print {
    a[href^="http"]:after {
        content: " (" attr(href) ")";
        font-size: 0.8em;
        color: #666;
    }
}
"#;

/// The stylesheet override applied to a page before it is exported.
///
/// # Example
///
/// ```rust
/// use page2pdf_api::page::PageStyleOverride;
///
/// let css = PageStyleOverride::default().css();
/// assert!(css.contains("@media print"));
/// assert!(css.contains("attr(href)"));
///
/// let css = PageStyleOverride { show_link_urls: false }.css();
/// assert!(!css.contains("attr(href)"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageStyleOverride {
    /// Append ` (href)` after external links.
    pub show_link_urls: bool,
}

impl Default for PageStyleOverride {
    fn default() -> Self {
        Self {
            show_link_urls: true,
        }
    }
}

impl PageStyleOverride {
    /// Full CSS text to inject.
    pub fn css(&self) -> String {
        let mut css = String::from(PRINT_STYLESHEET);
        if self.show_link_urls {
            css.push_str(LINK_URL_STYLESHEET);
        }
        css
    }

    /// Script that appends the stylesheet to the document as a `<style>`
    /// element and evaluates to `true`.
    pub fn injection_script(&self) -> String {
        // A JSON string literal is a valid JS string literal.
        let literal = serde_json::Value::String(self.css()).to_string();
        format!(
            "(() => {{ const style = document.createElement('style'); \
             style.setAttribute('data-page2pdf', 'print'); \
             style.textContent = {}; \
             (document.head || document.documentElement).appendChild(style); \
             return true; }})()",
            literal
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheet_hides_navigation_chrome() {
        let css = PageStyleOverride::default().css();
        assert!(css.contains("nav, .sidebar, header.fixed, .nav-header"));
        assert!(css.contains("display: none !important"));
    }

    #[test]
    fn test_stylesheet_widens_content() {
        let css = PageStyleOverride::default().css();
        assert!(css.contains("main, article, .content"));
        assert!(css.contains("max-width: 100% !important"));
    }

    #[test]
    fn test_stylesheet_avoids_breaks() {
        let css = PageStyleOverride::default().css();
        assert!(css.contains("pre, code, img, table"));
        assert!(css.contains("page-break-inside: avoid"));
    }

    #[test]
    fn test_link_urls_toggle() {
        assert!(PageStyleOverride::default().css().contains("a[href^=\"http\"]:after"));
        assert!(
            !PageStyleOverride {
                show_link_urls: false
            }
            .css()
            .contains("a[href^=\"http\"]:after")
        );
    }

    #[test]
    fn test_injection_script_escapes_css() {
        let script = PageStyleOverride::default().injection_script();

        assert!(script.starts_with("(() => {"));
        assert!(script.contains("document.createElement('style')"));
        // Quotes and newlines inside the CSS are escaped, not raw.
        assert!(script.contains(r#"a[href^=\"http\"]:after"#));
        assert!(script.contains("\\n"));
    }
}
