//! PDF export options.
//!
//! [`PdfRenderOptions`] is the fixed print layout every backend uses: A4,
//! printed backgrounds, 0.75in top/bottom and 0.6in left/right margins, and a
//! "Page N of M" footer.

use headless_chrome::types::PrintToPdfOptions;

/// Footer rendered on every page.
///
/// Chrome fills the `pageNumber` and `totalPages` spans while printing.
pub const FOOTER_TEMPLATE: &str = r#"<div style="font-size: 9px; text-align: center; width: 100%; color: #666; padding-top: 5px;">Page <span class="pageNumber"></span> of <span class="totalPages"></span></div>"#;

/// Blank header. Chrome prints the date and title when header/footer
/// display is on and no header template is given.
pub const HEADER_TEMPLATE: &str = "<span></span>";

/// Paper size of the exported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageFormat {
    /// 210mm x 297mm.
    #[default]
    A4,
}

impl PageFormat {
    /// Paper `(width, height)` in inches.
    pub fn dimensions_in(&self) -> (f64, f64) {
        match self {
            PageFormat::A4 => (8.27, 11.69),
        }
    }

    /// Format name as understood by hosted renderers.
    pub fn name(&self) -> &'static str {
        match self {
            PageFormat::A4 => "A4",
        }
    }
}

/// Page margins in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    /// Top margin.
    pub top: f64,
    /// Bottom margin.
    pub bottom: f64,
    /// Left margin.
    pub left: f64,
    /// Right margin.
    pub right: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 0.75,
            bottom: 0.75,
            left: 0.6,
            right: 0.6,
        }
    }
}

/// Layout used when exporting a page to PDF.
///
/// Not exposed for per-request customization; every conversion uses
/// [`PdfRenderOptions::default()`].
///
/// # Example
///
/// ```rust
/// use page2pdf_api::page::{PageFormat, PdfRenderOptions};
///
/// let options = PdfRenderOptions::default();
/// assert_eq!(options.page_format, PageFormat::A4);
/// assert!(options.print_background);
/// assert!(options.footer_template.contains("totalPages"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PdfRenderOptions {
    /// Paper size.
    pub page_format: PageFormat,
    /// Print CSS backgrounds.
    pub print_background: bool,
    /// Page margins.
    pub margins: Margins,
    /// Render header and footer templates.
    pub show_header_footer: bool,
    /// Header HTML template.
    pub header_template: String,
    /// Footer HTML template.
    pub footer_template: String,
}

impl Default for PdfRenderOptions {
    fn default() -> Self {
        Self {
            page_format: PageFormat::A4,
            print_background: true,
            margins: Margins::default(),
            show_header_footer: true,
            header_template: HEADER_TEMPLATE.to_string(),
            footer_template: FOOTER_TEMPLATE.to_string(),
        }
    }
}

impl PdfRenderOptions {
    /// Convert to the DevTools `Page.printToPDF` parameters.
    pub fn to_print_options(&self) -> PrintToPdfOptions {
        let (paper_width, paper_height) = self.page_format.dimensions_in();

        PrintToPdfOptions {
            landscape: Some(false),
            display_header_footer: Some(self.show_header_footer),
            print_background: Some(self.print_background),
            paper_width: Some(paper_width),
            paper_height: Some(paper_height),
            margin_top: Some(self.margins.top),
            margin_bottom: Some(self.margins.bottom),
            margin_left: Some(self.margins.left),
            margin_right: Some(self.margins.right),
            header_template: Some(self.header_template.clone()),
            footer_template: Some(self.footer_template.clone()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_contract() {
        let options = PdfRenderOptions::default();

        assert_eq!(options.page_format, PageFormat::A4);
        assert!(options.print_background);
        assert!(options.show_header_footer);
        assert_eq!(options.margins.top, 0.75);
        assert_eq!(options.margins.bottom, 0.75);
        assert_eq!(options.margins.left, 0.6);
        assert_eq!(options.margins.right, 0.6);
    }

    #[test]
    fn test_footer_shows_page_n_of_m() {
        let footer = PdfRenderOptions::default().footer_template;
        assert!(footer.contains("Page <span class=\"pageNumber\"></span>"));
        assert!(footer.contains("of <span class=\"totalPages\"></span>"));
    }

    #[test]
    fn test_print_options_a4() {
        let print = PdfRenderOptions::default().to_print_options();

        assert_eq!(print.paper_width, Some(8.27));
        assert_eq!(print.paper_height, Some(11.69));
        assert_eq!(print.landscape, Some(false));
        assert_eq!(print.print_background, Some(true));
        assert_eq!(print.display_header_footer, Some(true));
    }

    #[test]
    fn test_print_options_margins() {
        let print = PdfRenderOptions::default().to_print_options();

        assert_eq!(print.margin_top, Some(0.75));
        assert_eq!(print.margin_bottom, Some(0.75));
        assert_eq!(print.margin_left, Some(0.6));
        assert_eq!(print.margin_right, Some(0.6));
    }

    #[test]
    fn test_print_options_templates() {
        let print = PdfRenderOptions::default().to_print_options();

        assert_eq!(print.header_template.as_deref(), Some(HEADER_TEMPLATE));
        assert_eq!(print.footer_template.as_deref(), Some(FOOTER_TEMPLATE));
    }

    #[test]
    fn test_a4_dimensions() {
        assert_eq!(PageFormat::A4.dimensions_in(), (8.27, 11.69));
        assert_eq!(PageFormat::A4.name(), "A4");
    }
}
