//! Document metadata.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::text::decode_bytes;

/// Basic information about a source PDF.
///
/// Reading it is best-effort: a document that cannot be opened reports
/// `total_pages: 0` and no other fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Total number of pages
    pub total_pages: usize,

    /// Document title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Document author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Document subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Creator application
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,

    /// PDF producer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,

    /// PDF version (e.g., "1.7")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_version: Option<String>,

    /// Creation date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl DocumentInfo {
    /// Info for a document that could not be read.
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Decode a PDF text string or name object.
pub(crate) fn decode_pdf_string(obj: &lopdf::Object) -> Option<String> {
    let decoded = match obj {
        lopdf::Object::String(bytes, _) => Some(decode_bytes(bytes)),
        lopdf::Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    };
    decoded
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm') into UTC.
///
/// A missing offset is read as UTC.
pub(crate) fn parse_pdf_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);

    // At minimum we need YYYY
    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    let local = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    let offset = s.get(14..).map_or(Some(Utc.fix()), parse_utc_offset)?;
    local
        .and_local_timezone(offset)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse the `Z`, `+HH'mm'` or `-HH'mm'` suffix of a PDF date.
fn parse_utc_offset(suffix: &str) -> Option<FixedOffset> {
    let mut chars = suffix.chars();
    let sign = match chars.next() {
        None | Some('Z') => return Some(Utc.fix()),
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => return None,
    };

    let digits: String = chars.filter(char::is_ascii_digit).collect();
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..4).and_then(|m| m.parse().ok()).unwrap_or(0);
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
