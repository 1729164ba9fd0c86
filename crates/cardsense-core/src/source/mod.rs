//! Document source abstractions.
//!
//! A source exposes an ordered sequence of units (pages or rows), each
//! yielding extractable plain text and, optionally, a 2-D grid of cell
//! strings. All I/O happens when a source is constructed; the engine
//! itself never blocks on I/O once harvesting begins.

mod pdf;
mod table;

pub use pdf::PdfSource;
pub use table::CsvSource;

/// One page or row of a document.
#[derive(Debug, Clone, Default)]
pub struct DocumentUnit {
    /// Extracted plain text for this unit.
    pub text: String,
    /// Table cell grid, where the source has one.
    pub grid: Option<Vec<Vec<String>>>,
}

/// An ordered sequence of document units.
pub trait DocumentSource {
    /// Number of units in the document.
    fn unit_count(&self) -> usize;

    /// The unit at `index`, or `None` when that unit is malformed.
    /// Malformed units are skipped by the harvester, never retried.
    fn unit(&self, index: usize) -> Option<DocumentUnit>;
}

/// An in-memory source of pre-extracted page texts.
///
/// Used for tests and for callers that run their own text extraction.
#[derive(Debug, Clone, Default)]
pub struct TextSource {
    pages: Vec<String>,
}

impl TextSource {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// Build from a single blob, splitting pages on form feeds (the
    /// page separator `pdftotext` emits).
    pub fn from_text(text: &str) -> Self {
        Self {
            pages: text.split('\u{c}').map(|p| p.to_string()).collect(),
        }
    }
}

impl DocumentSource for TextSource {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_source_pages() {
        let source = TextSource::new(vec!["page one".into(), "page two".into()]);
        assert_eq!(source.unit_count(), 2);
        assert_eq!(source.unit(1).unwrap().text, "page two");
        assert!(source.unit(2).is_none());
    }

    #[test]
    fn test_from_text_splits_on_form_feed() {
        let source = TextSource::from_text("first\u{c}second");
        assert_eq!(source.unit_count(), 2);
        assert_eq!(source.unit(0).unwrap().text, "first");
    }
}
