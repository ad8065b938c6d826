//! # chapsplit
//!
//! Split a PDF into one file per chapter.
//!
//! The library scans each page for chapter headings ("Chapter 3",
//! "第三章", "2. Methods", ...), cuts the document at every detected
//! heading and writes each chapter to its own PDF. When fewer than two
//! headings are found it falls back to fixed-size page blocks.
//!
//! ## Quick Start
//!
//! ```no_run
//! use chapsplit::Splitter;
//!
//! fn main() -> chapsplit::Result<()> {
//!     let report = Splitter::new("book.pdf").split()?;
//!     for output in &report.outputs {
//!         println!("{}", output.path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Heading detection**: built-in English and Chinese heading patterns,
//!   extensible with custom regular expressions
//! - **Fallback splitting**: fixed-size blocks when no chapters are found
//! - **Safe output**: sanitized filenames, never overwrites existing files
//! - **Partial results**: a failing chapter doesn't stop the others

pub mod backend;
pub mod detect;
pub mod error;
pub mod extract;
pub mod info;
pub mod normalize;
pub mod options;
pub mod pattern;
pub mod sanitize;
pub mod scanner;
pub mod split;
mod text;

// Re-export commonly used types
pub use backend::{LopdfBackend, PdfBackend};
pub use error::{Error, Result};
pub use extract::{OutputFile, PageExtractor};
pub use info::DocumentInfo;
pub use normalize::normalize_text;
pub use options::{ScanOptions, SplitOptions, DEFAULT_PAGES_PER_BLOCK};
pub use pattern::{Pattern, PatternSet, PatternSource};
pub use sanitize::sanitize_filename;
pub use scanner::{BoundaryRecord, BoundaryScanner};
pub use split::{
    chapter_ranges, even_ranges, ChapterRange, RangeFailure, SplitMode, SplitPlan, SplitReport,
    Splitter,
};

use std::path::Path;

/// Split a PDF file into chapters using default options.
///
/// Output goes to `<stem>_chapters` next to the source.
///
/// # Example
///
/// ```no_run
/// let report = chapsplit::split_file("book.pdf").unwrap();
/// assert!(report.is_success());
/// ```
pub fn split_file<P: AsRef<Path>>(path: P) -> Result<SplitReport> {
    Splitter::new(path).split()
}

/// Split a PDF file into chapters with custom options.
///
/// # Example
///
/// ```no_run
/// use chapsplit::{split_file_with_options, SplitOptions};
///
/// let options = SplitOptions::new()
///     .with_output_dir("chapters")
///     .with_pages_per_block(20);
/// let report = split_file_with_options("book.pdf", options).unwrap();
/// println!("{} files", report.outputs.len());
/// ```
pub fn split_file_with_options<P: AsRef<Path>>(
    path: P,
    options: SplitOptions,
) -> Result<SplitReport> {
    Splitter::with_options(path, options).split()
}

/// Read basic metadata from a PDF file.
///
/// Never fails: an unreadable document reports zero pages.
pub fn document_info<P: AsRef<Path>>(path: P) -> DocumentInfo {
    Splitter::new(path).get_info()
}
