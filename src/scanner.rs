//! Chapter boundary detection.
//!
//! The scanner walks every page, picks a handful of candidate lines per
//! page and tests them against a [`PatternSet`]. The first matching line
//! on a page becomes that page's boundary.

use std::collections::HashSet;

use serde::Serialize;

use crate::backend::PdfBackend;
use crate::normalize::normalize_text;
use crate::options::ScanOptions;
use crate::pattern::PatternSet;

/// A page where a chapter heading was detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundaryRecord {
    /// 0-based page index
    pub page: usize,
    /// The heading line, cut to the title length cap
    pub title: String,
}

impl BoundaryRecord {
    /// Create a new boundary record.
    pub fn new(page: usize, title: impl Into<String>) -> Self {
        Self {
            page,
            title: title.into(),
        }
    }
}

/// Scans a document for chapter boundaries.
pub struct BoundaryScanner<'a> {
    patterns: &'a PatternSet,
    options: &'a ScanOptions,
}

impl<'a> BoundaryScanner<'a> {
    /// Create a scanner over the given patterns.
    pub fn new(patterns: &'a PatternSet, options: &'a ScanOptions) -> Self {
        Self { patterns, options }
    }

    /// Scan every page and return boundaries, unique by page and sorted.
    ///
    /// Pages whose text cannot be extracted are logged and treated as empty.
    pub fn scan<B: PdfBackend + ?Sized>(&self, doc: &B) -> Vec<BoundaryRecord> {
        let total = doc.page_count();
        log::info!("Scanning {} pages for chapter headings", total);

        let mut records = Vec::new();
        for page in 0..total {
            let text = match doc.page_text(page) {
                Ok(raw) => normalize_text(&raw),
                Err(e) => {
                    log::warn!("Failed to extract text from page {}: {}", page + 1, e);
                    continue;
                }
            };

            if let Some(title) = self.scan_page(&text) {
                log::info!("Found chapter on page {}: {}", page + 1, title);
                records.push(BoundaryRecord::new(page, title));
            }
        }

        let records = dedup_and_sort(records);
        log::info!("Found {} chapter boundaries", records.len());
        records
    }

    /// Return the title of the first heading found in one page's text.
    pub fn scan_page(&self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }

        let lines: Vec<&str> = text.split('\n').collect();
        self.candidate_lines(&lines)
            .map(str::trim)
            .filter(|line| {
                let chars = line.chars().count();
                chars >= self.options.min_line_chars && chars <= self.options.max_line_chars
            })
            .find(|line| self.patterns.matches(line))
            .map(|line| truncate_chars(line, self.options.max_title_chars).trim().to_string())
    }

    /// Header lines, then a small window around the page midpoint for long pages.
    fn candidate_lines<'l>(&self, lines: &[&'l str]) -> impl Iterator<Item = &'l str> {
        let header_end = lines.len().min(self.options.header_lines);
        let header = lines[..header_end].to_vec();

        let mid = if lines.len() > self.options.long_page_lines && self.options.mid_window > 0 {
            let half = self.options.mid_window / 2;
            let start = (lines.len() / 2).saturating_sub(half);
            let end = (start + self.options.mid_window).min(lines.len());
            lines[start..end].to_vec()
        } else {
            Vec::new()
        };

        header.into_iter().chain(mid)
    }
}

/// Keep the first record per page, ordered by page.
fn dedup_and_sort(records: Vec<BoundaryRecord>) -> Vec<BoundaryRecord> {
    let mut seen = HashSet::new();
    let mut unique: Vec<BoundaryRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.page))
        .collect();
    unique.sort_by_key(|r| r.page);
    unique
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;

    fn scan(doc: &MockBackend) -> Vec<BoundaryRecord> {
        let patterns = PatternSet::with_builtins();
        let options = ScanOptions::default();
        BoundaryScanner::new(&patterns, &options).scan(doc)
    }

    #[test]
    fn test_scan_finds_headings() {
        let doc = MockBackend::new([
            "Chapter 1 Beginnings\nIt was a dark night.",
            "more prose",
            "Chapter 2 Middles\nand so on",
        ]);
        let records = scan(&doc);
        assert_eq!(
            records,
            vec![
                BoundaryRecord::new(0, "Chapter 1 Beginnings"),
                BoundaryRecord::new(2, "Chapter 2 Middles"),
            ]
        );
    }

    #[test]
    fn test_one_boundary_per_page() {
        let doc = MockBackend::new(["Chapter 1\nChapter 2\nSection 3"]);
        let records = scan(&doc);
        assert_eq!(records, vec![BoundaryRecord::new(0, "Chapter 1")]);
    }

    #[test]
    fn test_heading_below_header_lines_is_ignored() {
        let mut text: Vec<String> = (0..12).map(|i| format!("line {}", i)).collect();
        text.push("Chapter 9".to_string());
        let doc = MockBackend::new([text.join("\n")]);
        assert!(scan(&doc).is_empty());
    }

    #[test]
    fn test_tuned_scan_options() {
        let patterns = PatternSet::with_builtins();
        let mut lines: Vec<String> = (0..30).map(|i| format!("prose line {}", i)).collect();
        lines[12] = "Chapter 2".to_string();
        lines[15] = "Section 4".to_string();
        let doc = MockBackend::new([lines.join("\n")]);

        let wide = ScanOptions::new().with_header_lines(15).header_only();
        let records = BoundaryScanner::new(&patterns, &wide).scan(&doc);
        assert_eq!(records, vec![BoundaryRecord::new(0, "Chapter 2")]);

        let narrow = ScanOptions::new().header_only();
        assert!(BoundaryScanner::new(&patterns, &narrow).scan(&doc).is_empty());

        let short_titles = ScanOptions::new()
            .with_mid_window(3, 20)
            .with_line_chars(2, 100)
            .with_max_title_chars(7);
        let records = BoundaryScanner::new(&patterns, &short_titles).scan(&doc);
        assert_eq!(records, vec![BoundaryRecord::new(0, "Section")]);
    }

    #[test]
    fn test_mid_page_window_on_long_pages() {
        let mut lines: Vec<String> = (0..30).map(|i| format!("prose line {}", i)).collect();
        lines[15] = "Section 4 Results".to_string();
        let doc = MockBackend::new([lines.join("\n")]);
        assert_eq!(scan(&doc), vec![BoundaryRecord::new(0, "Section 4 Results")]);

        // Same heading on a short page sits outside both windows
        let mut lines: Vec<String> = (0..18).map(|i| format!("prose line {}", i)).collect();
        lines[14] = "Section 4 Results".to_string();
        let doc = MockBackend::new([lines.join("\n")]);
        assert!(scan(&doc).is_empty());
    }

    #[test]
    fn test_line_length_limits() {
        let long = format!("Chapter 1 {}", "x".repeat(120));
        let doc = MockBackend::new([long.as_str(), "1", "   "]);
        assert!(scan(&doc).is_empty());
    }

    #[test]
    fn test_title_truncated_to_sixty_chars() {
        let heading = format!("Chapter 7 {}", "é".repeat(80));
        let doc = MockBackend::new([heading]);
        let records = scan(&doc);
        assert_eq!(records[0].title.chars().count(), 60);
        assert!(records[0].title.starts_with("Chapter 7 "));
    }

    #[test]
    fn test_extraction_failure_is_skipped() {
        let mut doc = MockBackend::new(["Chapter 1", "Chapter 2", "Chapter 3"]);
        doc.bad_text.insert(1);
        let pages: Vec<usize> = scan(&doc).iter().map(|r| r.page).collect();
        assert_eq!(pages, vec![0, 2]);
    }

    #[test]
    fn test_control_characters_and_crlf() {
        let doc = MockBackend::new(["\u{0}\r\n  Chapter\u{7} 3 Heat\r\nbody"]);
        assert_eq!(scan(&doc), vec![BoundaryRecord::new(0, "Chapter 3 Heat")]);
    }

    #[test]
    fn test_user_pattern() {
        let patterns = PatternSet::with_builtins().with_pattern("^Appendix").unwrap();
        let options = ScanOptions::default();
        let doc = MockBackend::new(["Preface", "Appendix A Tables"]);
        let records = BoundaryScanner::new(&patterns, &options).scan(&doc);
        assert_eq!(records, vec![BoundaryRecord::new(1, "Appendix A Tables")]);
    }

    #[test]
    fn test_dedup_and_sort() {
        let records = vec![
            BoundaryRecord::new(5, "b"),
            BoundaryRecord::new(1, "a"),
            BoundaryRecord::new(5, "c"),
        ];
        assert_eq!(
            dedup_and_sort(records),
            vec![BoundaryRecord::new(1, "a"), BoundaryRecord::new(5, "b")]
        );
    }
}
