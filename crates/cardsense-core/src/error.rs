//! Error types for the cardsense-core library.

use thiserror::Error;

/// Main error type for the cardsense library.
#[derive(Error, Debug)]
pub enum CardsenseError {
    /// Document source error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Issuer profile error.
    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading a document source.
///
/// A source error fails the extraction for that one document; callers
/// processing a batch are expected to record it and continue with the
/// next document.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Failed to open/parse the document.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// Failed to extract text from the document.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The document is encrypted and cannot be processed.
    #[error("document is encrypted")]
    Encrypted,

    /// The document is empty or has no readable units.
    #[error("document has no readable pages or rows")]
    Empty,

    /// Malformed tabular input.
    #[error("malformed table data: {0}")]
    Table(String),
}

/// Errors related to issuer profile data.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Failed to read a profile file.
    #[error("failed to read profile file: {0}")]
    Read(String),

    /// Profile data did not deserialize or failed validation.
    #[error("invalid profile data: {0}")]
    Invalid(String),
}

/// Result type for the cardsense library.
pub type Result<T> = std::result::Result<T, CardsenseError>;
