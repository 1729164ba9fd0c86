//! Text-layer PDF source using lopdf and pdf-extract.

use lopdf::Document;
use tracing::debug;

use super::{DocumentSource, DocumentUnit};
use crate::error::SourceError;

/// A PDF statement with an extractable text layer.
///
/// All parsing happens in [`PdfSource::load`]; scanned/image-only PDFs
/// yield empty page texts and therefore an empty field map downstream,
/// they are not OCR'd here.
pub struct PdfSource {
    pages: Vec<String>,
}

impl PdfSource {
    /// Load a PDF from a file path.
    pub fn from_path(path: &std::path::Path) -> Result<Self, SourceError> {
        let data = std::fs::read(path).map_err(|e| SourceError::Parse(e.to_string()))?;
        Self::load(&data)
    }

    /// Load a PDF from raw bytes.
    pub fn load(data: &[u8]) -> Result<Self, SourceError> {
        let mut doc = Document::load_mem(data).map_err(|e| SourceError::Parse(e.to_string()))?;

        // Handle PDFs with empty-password encryption; anything stronger
        // is a hard failure for this document.
        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(SourceError::Encrypted);
            }
            debug!("decrypted PDF with empty password");
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| SourceError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(SourceError::Empty);
        }
        debug!("loaded PDF with {} pages", page_count);

        let text = pdf_extract::extract_text_from_mem(&raw_data)
            .map_err(|e| SourceError::TextExtraction(e.to_string()))?;

        Ok(Self {
            pages: split_pages(&text, page_count),
        })
    }
}

/// Split extracted text into per-page chunks.
///
/// pdf-extract emits form feeds between pages when it can; otherwise
/// fall back to dividing lines evenly across the page count.
fn split_pages(text: &str, page_count: usize) -> Vec<String> {
    let by_form_feed: Vec<String> = text.split('\u{c}').map(|p| p.to_string()).collect();
    if by_form_feed.len() >= page_count {
        return by_form_feed;
    }

    let lines: Vec<&str> = text.lines().collect();
    let per_page = (lines.len() / page_count).max(1);
    (0..page_count)
        .map(|page| {
            let start = (page * per_page).min(lines.len());
            let end = if page + 1 == page_count {
                lines.len()
            } else {
                ((page + 1) * per_page).min(lines.len())
            };
            lines[start..end].join("\n")
        })
        .collect()
}

impl DocumentSource for PdfSource {
    fn unit_count(&self) -> usize {
        self.pages.len()
    }

    fn unit(&self, index: usize) -> Option<DocumentUnit> {
        self.pages.get(index).map(|text| DocumentUnit {
            text: text.clone(),
            grid: None,
        })
    }
}
