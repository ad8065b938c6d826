//! PDF header sniffing.
//!
//! Used during validation to tell a corrupt or foreign file apart from a
//! PDF before handing it to the parser.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// How far into the file the header may start. Some producers emit a few
/// junk bytes (BOMs, whitespace) before `%PDF-`.
const HEADER_SEARCH_LEN: usize = 1024;

/// Read the start of a file and return the declared PDF version.
///
/// # Example
/// ```no_run
/// use chapsplit::detect::pdf_version_from_path;
///
/// let version = pdf_version_from_path("book.pdf").unwrap();
/// println!("PDF {}", version);
/// ```
pub fn pdf_version_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file).take(HEADER_SEARCH_LEN as u64);
    let mut header = Vec::with_capacity(HEADER_SEARCH_LEN);
    reader.read_to_end(&mut header)?;
    pdf_version_from_bytes(&header)
}

/// Find the `%PDF-x.y` header in a byte prefix and return `x.y`.
pub fn pdf_version_from_bytes(data: &[u8]) -> Result<String> {
    let window = &data[..data.len().min(HEADER_SEARCH_LEN)];
    let start = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or_else(|| Error::Unreadable("missing %PDF- header".to_string()))?;

    let version: String = window[start + PDF_MAGIC.len()..]
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .map(|&b| b as char)
        .collect();

    if version.is_empty() {
        return Err(Error::Unreadable("malformed PDF version".to_string()));
    }
    Ok(version)
}
