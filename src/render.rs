//! HTML to PDF rendering.
//!
//! [`ChromePdf`] writes the document to a temporary file, opens it in a fresh
//! headless Chrome session and prints it: A4 portrait, 0.85 cm margins and a
//! footer with the configured label on the left and `page of pages` on the
//! right.

use headless_chrome::types::PrintToPdfOptions;
use std::io::Write;
use tracing::{info, instrument};

use crate::browser::BrowserSession;
use crate::config::{BrowserConfig, Config};
use crate::dom::escape;
use crate::error::ExtractError;

const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;
/// 0.85 cm.
const MARGIN_IN: f64 = 0.3346;
/// Margin plus room for the 1 cm footer.
const FOOTER_MARGIN_IN: f64 = 0.7283;

/// Something that turns a self-contained HTML document into PDF bytes.
pub trait Render {
    async fn render(&self, html: &str) -> Result<Vec<u8>, ExtractError>;
}

/// Footer shown on every page. Chrome fills the `pageNumber` and `totalPages`
/// spans itself.
pub fn footer_template(label: &str) -> String {
    format!(
        "<div style=\"width: 100%; margin: 0 0.5cm; font-size: 7pt; color: #888; \
         border-top: 1px solid #ccc; padding-top: 4px; display: flex; justify-content: space-between;\">\
         <span>{}</span><span><span class=\"pageNumber\"></span> of <span class=\"totalPages\"></span></span></div>",
        escape(label)
    )
}

/// Headless Chrome renderer.
#[derive(Debug, Clone)]
pub struct ChromePdf {
    browser: BrowserConfig,
    footer_label: String,
}

impl ChromePdf {
    pub fn new(config: &Config) -> Self {
        Self {
            browser: config.browser.clone(),
            footer_label: config.pdf.footer_label.clone(),
        }
    }

    pub fn print_options(&self) -> PrintToPdfOptions {
        PrintToPdfOptions {
            landscape: Some(false),
            display_header_footer: Some(true),
            print_background: Some(true),
            paper_width: Some(A4_WIDTH_IN),
            paper_height: Some(A4_HEIGHT_IN),
            margin_top: Some(MARGIN_IN),
            margin_bottom: Some(FOOTER_MARGIN_IN),
            margin_left: Some(MARGIN_IN),
            margin_right: Some(MARGIN_IN),
            header_template: Some("<span></span>".to_string()),
            footer_template: Some(footer_template(&self.footer_label)),
            ..Default::default()
        }
    }
}

impl Render for ChromePdf {
    #[instrument(level = "info", skip_all, fields(bytes = html.len()))]
    async fn render(&self, html: &str) -> Result<Vec<u8>, ExtractError> {
        let config = self.browser.clone();
        let options = self.print_options();
        let html = html.to_string();
        let pdf = tokio::task::spawn_blocking(move || {
            let mut file = tempfile::Builder::new().suffix(".html").tempfile()?;
            file.write_all(html.as_bytes())?;
            file.flush()?;
            let session = BrowserSession::launch(&config)?;
            session.print_file(file.path(), options)
        })
        .await
        .map_err(|e| ExtractError::Render(format!("render task did not complete: {e}")))??;
        info!(pdf_bytes = pdf.len(), "Rendered PDF");
        Ok(pdf)
    }
}
