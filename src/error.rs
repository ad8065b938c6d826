//! Error types for chapsplit.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for chapsplit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while splitting a PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source document does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The source path exists but is not a regular file.
    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// The source cannot be read (permissions, corruption, not a PDF).
    #[error("Unreadable document: {0}")]
    Unreadable(String),

    /// The source is a zero-byte file or has no pages.
    #[error("Document is empty: {0}")]
    Empty(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// A user pattern is not a valid regular expression.
    #[error("Invalid pattern '{pattern}': {reason}")]
    PatternInvalid {
        /// The rejected pattern text
        pattern: String,
        /// Why the regex engine rejected it
        reason: String,
    },

    /// A user pattern was blank.
    #[error("Pattern is empty")]
    EmptyPattern,

    /// Error extracting text from a page.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// A single page could not be carried into an output document.
    #[error("Page {0} could not be copied: {1}")]
    PageCopy(usize, String),

    /// No page of a range could be copied.
    #[error("No pages could be copied from range {}-{}", .start + 1, .end + 1)]
    ExtractionEmpty {
        /// First page of the range (0-based)
        start: usize,
        /// Last page of the range (0-based, inclusive)
        end: usize,
    },

    /// The written artifact is missing or empty.
    #[error("Output verification failed: {}", .0.display())]
    OutputVerificationFailed(PathBuf),

    /// Unexpected error while accessing the document.
    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
