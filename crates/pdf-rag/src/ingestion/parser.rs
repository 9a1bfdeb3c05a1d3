//! Page-level document parsing

use lopdf::Document as PdfDocument;

use crate::error::{Error, Result};
use crate::types::{DocumentFormat, PageRecord};

use super::staging::ScopedStaging;

/// Parses an uploaded blob into ordered page records.
///
/// Only formats [`DocumentFormat`] declares support for are accepted;
/// anything else is rejected with `UnsupportedFormat` before the blob is
/// staged. Page order follows the source document and `page_index` is
/// 0-based and contiguous.
pub struct DocumentParser;

impl DocumentParser {
    /// Parse a raw blob into page records
    pub fn parse(data: &[u8], filename: &str) -> Result<Vec<PageRecord>> {
        match DocumentFormat::from_filename(filename) {
            DocumentFormat::Pdf => Self::parse_pdf(data, filename),
            DocumentFormat::Txt | DocumentFormat::Markdown => {
                Ok(Self::parse_text(data, filename))
            }
            DocumentFormat::Unknown => {
                let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
                Err(Error::UnsupportedFormat(extension))
            }
        }
    }

    /// Extract per-page text from a PDF staged to disk
    fn parse_pdf(data: &[u8], filename: &str) -> Result<Vec<PageRecord>> {
        let staged = ScopedStaging::write(data)?;

        let doc = PdfDocument::load(staged.path())
            .map_err(|e| Error::parse(filename, format!("not a readable PDF: {}", e)))?;

        let mut pages = Vec::new();
        for (page_index, page_number) in doc.get_pages().keys().enumerate() {
            // Pages with no extractable text become empty records; the
            // chunker drops them.
            let text = doc.extract_text(&[*page_number]).unwrap_or_default();
            pages.push(PageRecord {
                text,
                page_index: page_index as u32,
                source_filename: filename.to_string(),
            });
        }

        Ok(pages)
        // `staged` drops here on every exit path, releasing the temp file
    }

    /// Treat the whole blob as a single page of text
    fn parse_text(data: &[u8], filename: &str) -> Vec<PageRecord> {
        let text = String::from_utf8_lossy(data).into_owned();
        if text.is_empty() {
            return Vec::new();
        }
        vec![PageRecord {
            text,
            page_index: 0,
            source_filename: filename.to_string(),
        }]
    }
}
