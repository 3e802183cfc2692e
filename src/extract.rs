//! Text extraction for policy documents.
//!
//! Turns raw document bytes into plain UTF-8 text, one string per page.
//! PDFs are parsed page by page with `pdf-extract`; plain-text and
//! Markdown files are split on form feeds (`\x0c`), which is how
//! `pdftotext`-style exports mark page breaks.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_MARKDOWN: &str = "text/markdown";

const PAGE_BREAK: char = '\u{c}';

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("document is not valid UTF-8: {0}")]
    Encoding(String),
}

/// Infer the content type from a file extension (case-insensitive).
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(MIME_PDF),
        "txt" | "text" => Some(MIME_TEXT),
        "md" | "markdown" => Some(MIME_MARKDOWN),
        _ => None,
    }
}

/// Extract per-page text. Page order is preserved; empty pages are kept so
/// page numbers stay aligned with the source.
pub fn extract_pages(bytes: &[u8], content_type: &str) -> Result<Vec<String>, ExtractError> {
    match content_type {
        MIME_PDF => extract_pdf(bytes),
        MIME_TEXT | MIME_MARKDOWN => extract_plain(bytes),
        _ => Err(ExtractError::UnsupportedContentType(
            content_type.to_string(),
        )),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    // pdf-extract panics on some malformed inputs
    let pages = catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| ExtractError::Pdf("PDF parser panicked on malformed input".to_string()))?
    .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(pages.into_iter().map(|p| normalize_newlines(&p)).collect())
}

fn extract_plain(bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ExtractError::Encoding(e.to_string()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Ok(text.split(PAGE_BREAK).map(normalize_newlines).collect())
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
