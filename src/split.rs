//! Split orchestration.
//!
//! A split runs through a fixed sequence of phases:
//!
//! ```text
//! Validating -> Scanning -> BoundarySplit | EvenSplit -> Done
//! ```
//!
//! Any phase may end in `Failed`. Validation and document-open errors abort
//! the whole operation; a failing range or block is recorded in the
//! [`SplitReport`] and the remaining ranges are still attempted.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::backend::{LopdfBackend, PdfBackend};
use crate::detect::pdf_version_from_path;
use crate::error::{Error, Result};
use crate::extract::{OutputFile, PageExtractor};
use crate::info::DocumentInfo;
use crate::options::{effective_block_size, SplitOptions};
use crate::pattern::PatternSet;
use crate::sanitize::sanitize_filename;
use crate::scanner::{BoundaryRecord, BoundaryScanner};

/// Phases of a split operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitPhase {
    Validating,
    Scanning,
    BoundarySplit,
    EvenSplit,
    Done,
}

impl fmt::Display for SplitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SplitPhase::Validating => "validating",
            SplitPhase::Scanning => "scanning",
            SplitPhase::BoundarySplit => "boundary split",
            SplitPhase::EvenSplit => "even split",
            SplitPhase::Done => "done",
        };
        f.write_str(name)
    }
}

fn enter(phase: SplitPhase) {
    log::debug!("Split phase: {}", phase);
}

fn failed(phase: SplitPhase, err: Error) -> Error {
    log::error!("Split failed while {}: {}", phase, err);
    err
}

/// How a document was divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// One file per detected chapter
    Chapters,
    /// Fixed-size page blocks
    Even,
}

/// A contiguous, inclusive page span destined for one output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterRange {
    /// 1-based position in the output sequence
    pub ordinal: usize,
    /// First page (0-based)
    pub start_page: usize,
    /// Last page (0-based, inclusive)
    pub end_page: usize,
    /// Chapter title; `None` for even-split blocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ChapterRange {
    /// Number of pages in the range; 0 for a skipped, inverted range.
    pub fn len(&self) -> usize {
        (self.end_page + 1).saturating_sub(self.start_page)
    }

    /// Whether the range covers no pages (never true for a valid range).
    pub fn is_empty(&self) -> bool {
        self.end_page < self.start_page
    }

    /// Output filename: `NN_<title>.pdf` for chapters,
    /// `NN_pages_<first>-<last>.pdf` (1-based) for blocks.
    pub fn file_name(&self) -> String {
        match &self.title {
            Some(title) => format!("{:02}_{}.pdf", self.ordinal, sanitize_filename(title)),
            None => format!(
                "{:02}_pages_{}-{}.pdf",
                self.ordinal,
                self.start_page + 1,
                self.end_page + 1
            ),
        }
    }
}

/// Ranges a split would produce, computed without writing anything.
#[derive(Debug, Clone, Serialize)]
pub struct SplitPlan {
    /// Chosen split mode
    pub mode: SplitMode,
    /// Boundaries found by the scanner (empty for a direct even split)
    pub boundaries: Vec<BoundaryRecord>,
    /// Ranges to extract
    pub ranges: Vec<ChapterRange>,
    /// Ranges dropped because their page span is invalid
    pub skipped: Vec<ChapterRange>,
}

/// A range whose output could not be produced.
#[derive(Debug, Clone, Serialize)]
pub struct RangeFailure {
    /// The range that failed
    pub range: ChapterRange,
    /// Why it failed
    pub error: String,
}

/// Outcome of a split operation.
///
/// Partial output may exist on disk even when [`is_success`](Self::is_success)
/// is false.
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    /// Chosen split mode
    pub mode: SplitMode,
    /// Directory holding the outputs
    pub output_dir: PathBuf,
    /// Pages in the source document
    pub total_pages: usize,
    /// Boundaries found by the scanner
    pub boundaries: Vec<BoundaryRecord>,
    /// Files written
    pub outputs: Vec<OutputFile>,
    /// Ranges that failed
    pub failures: Vec<RangeFailure>,
    /// Ranges skipped because their page span is invalid
    pub skipped: Vec<ChapterRange>,
}

impl SplitReport {
    /// Whether every attempted range produced a file.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of ranges attempted.
    pub fn attempted(&self) -> usize {
        self.outputs.len() + self.failures.len()
    }
}

/// Compute chapter ranges from sorted boundaries.
///
/// Each range runs from its boundary to the page before the next one; the
/// last runs to the end of the document. Ranges with an invalid span are
/// returned separately.
pub fn chapter_ranges(
    boundaries: &[BoundaryRecord],
    total_pages: usize,
) -> (Vec<ChapterRange>, Vec<ChapterRange>) {
    let mut ranges = Vec::with_capacity(boundaries.len());
    let mut skipped = Vec::new();

    for (i, boundary) in boundaries.iter().enumerate() {
        let end = match boundaries.get(i + 1) {
            Some(next) => next.page.checked_sub(1),
            None => total_pages.checked_sub(1),
        };

        let range = ChapterRange {
            ordinal: i + 1,
            start_page: boundary.page,
            end_page: end.unwrap_or(0),
            title: Some(boundary.title.clone()),
        };

        match end {
            Some(end) if boundary.page <= end && boundary.page < total_pages => ranges.push(range),
            _ => {
                log::warn!(
                    "Chapter {} has an invalid page range: {}-{}",
                    i + 1,
                    boundary.page,
                    end.map_or_else(|| "?".to_string(), |e| e.to_string())
                );
                skipped.push(range);
            }
        }
    }

    (ranges, skipped)
}

/// Partition `total_pages` into blocks of `pages_per_block` (0 selects the
/// default). The last block may be shorter.
pub fn even_ranges(total_pages: usize, pages_per_block: usize) -> Vec<ChapterRange> {
    let block = effective_block_size(pages_per_block);
    (0..total_pages)
        .step_by(block)
        .enumerate()
        .map(|(i, start)| ChapterRange {
            ordinal: i + 1,
            start_page: start,
            end_page: (start + block - 1).min(total_pages - 1),
            title: None,
        })
        .collect()
}

/// Splits one PDF into chapter files.
///
/// Each splitter owns its pattern set; nothing is shared between instances.
///
/// # Example
///
/// ```no_run
/// use chapsplit::Splitter;
///
/// let mut splitter = Splitter::new("book.pdf");
/// splitter.add_pattern(r"^Appendix\s+[A-Z]")?;
/// let report = splitter.split()?;
/// println!(
///     "{} of {} chapters written to {}",
///     report.outputs.len(),
///     report.attempted(),
///     report.output_dir.display()
/// );
/// # Ok::<(), chapsplit::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Splitter {
    source: PathBuf,
    output_dir: PathBuf,
    patterns: PatternSet,
    options: SplitOptions,
}

impl Splitter {
    /// Create a splitter with default options and built-in patterns.
    pub fn new<P: AsRef<Path>>(source: P) -> Self {
        Self::with_options(source, SplitOptions::new())
    }

    /// Create a splitter with custom options.
    pub fn with_options<P: AsRef<Path>>(source: P, options: SplitOptions) -> Self {
        let source = source.as_ref().to_path_buf();
        let output_dir = options
            .output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(&source));
        Self {
            source,
            output_dir,
            patterns: PatternSet::with_builtins(),
            options,
        }
    }

    /// Path of the source document.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Directory outputs are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Active patterns in precedence order.
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Add a user heading pattern, evaluated after every existing pattern.
    ///
    /// An invalid or blank pattern is reported and leaves the set unchanged.
    pub fn add_pattern(&mut self, pattern: &str) -> Result<()> {
        match self.patterns.push(pattern) {
            Ok(()) => {
                log::info!("Added custom pattern: {}", pattern.trim());
                Ok(())
            }
            Err(e) => {
                log::error!("Rejected pattern: {}", e);
                Err(e)
            }
        }
    }

    /// Split along detected chapters, falling back to even blocks when
    /// fewer than two chapters are found.
    pub fn split(&self) -> Result<SplitReport> {
        let doc = self.open()?;
        self.split_document(&doc)
    }

    /// Split into fixed-size blocks without looking for chapters.
    pub fn split_evenly(&self, pages_per_block: usize) -> Result<SplitReport> {
        let doc = self.open()?;
        self.split_document_evenly(&doc, pages_per_block)
    }

    /// Detect chapter boundaries without writing anything.
    pub fn find_boundaries(&self) -> Result<Vec<BoundaryRecord>> {
        let doc = self.open()?;
        validate_document(&doc).map_err(|e| failed(SplitPhase::Validating, e))?;
        Ok(self.scan(&doc))
    }

    /// Compute the ranges [`split`](Self::split) would write.
    pub fn plan(&self) -> Result<SplitPlan> {
        let doc = self.open()?;
        validate_document(&doc).map_err(|e| failed(SplitPhase::Validating, e))?;
        Ok(self.plan_document(&doc))
    }

    /// Best-effort metadata; reports zero pages if the document can't be read.
    pub fn get_info(&self) -> DocumentInfo {
        match LopdfBackend::load_file(&self.source) {
            Ok(doc) => doc.info(),
            Err(e) => {
                log::error!("Failed to read document info: {}", e);
                DocumentInfo::unavailable()
            }
        }
    }

    /// Validate the source file and open it.
    ///
    /// The returned backend owns the document; it is released when dropped,
    /// whichever way the operation ends.
    fn open(&self) -> Result<LopdfBackend> {
        enter(SplitPhase::Validating);
        validate_source(&self.source).map_err(|e| failed(SplitPhase::Validating, e))?;
        LopdfBackend::load_file(&self.source)
            .map_err(|e| match e {
                Error::Io(io) => Error::Unreadable(io.to_string()),
                e => e,
            })
            .map_err(|e| failed(SplitPhase::Validating, e))
    }

    fn scan<B: PdfBackend + ?Sized>(&self, doc: &B) -> Vec<BoundaryRecord> {
        enter(SplitPhase::Scanning);
        BoundaryScanner::new(&self.patterns, &self.options.scan).scan(doc)
    }

    fn plan_document<B: PdfBackend + ?Sized>(&self, doc: &B) -> SplitPlan {
        let boundaries = self.scan(doc);
        let total = doc.page_count();

        if boundaries.len() < 2 {
            if boundaries.is_empty() {
                log::warn!("No chapter headings found, splitting evenly");
            } else {
                log::warn!("Only one chapter heading found, splitting evenly");
            }
            return SplitPlan {
                mode: SplitMode::Even,
                boundaries,
                ranges: even_ranges(total, self.options.block_size()),
                skipped: Vec::new(),
            };
        }

        let (ranges, skipped) = chapter_ranges(&boundaries, total);
        SplitPlan {
            mode: SplitMode::Chapters,
            boundaries,
            ranges,
            skipped,
        }
    }

    pub(crate) fn split_document<B: PdfBackend + ?Sized>(&self, doc: &B) -> Result<SplitReport> {
        validate_document(doc).map_err(|e| failed(SplitPhase::Validating, e))?;
        self.create_output_dir()?;
        let plan = self.plan_document(doc);
        self.execute(doc, plan)
    }

    pub(crate) fn split_document_evenly<B: PdfBackend + ?Sized>(
        &self,
        doc: &B,
        pages_per_block: usize,
    ) -> Result<SplitReport> {
        validate_document(doc).map_err(|e| failed(SplitPhase::Validating, e))?;
        self.create_output_dir()?;
        let plan = SplitPlan {
            mode: SplitMode::Even,
            boundaries: Vec::new(),
            ranges: even_ranges(doc.page_count(), pages_per_block),
            skipped: Vec::new(),
        };
        self.execute(doc, plan)
    }

    fn create_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            failed(
                SplitPhase::Validating,
                Error::Fatal(format!(
                    "cannot create output directory {}: {}",
                    self.output_dir.display(),
                    e
                )),
            )
        })?;
        log::info!("Output directory: {}", self.output_dir.display());
        Ok(())
    }

    fn execute<B: PdfBackend + ?Sized>(&self, doc: &B, plan: SplitPlan) -> Result<SplitReport> {
        let phase = match plan.mode {
            SplitMode::Chapters => SplitPhase::BoundarySplit,
            SplitMode::Even => SplitPhase::EvenSplit,
        };
        enter(phase);

        let extractor = PageExtractor::new(doc);
        let mut report = SplitReport {
            mode: plan.mode,
            output_dir: self.output_dir.clone(),
            total_pages: doc.page_count(),
            boundaries: plan.boundaries,
            outputs: Vec::new(),
            failures: Vec::new(),
            skipped: plan.skipped,
        };

        for range in plan.ranges {
            let target = self.output_dir.join(range.file_name());
            match extractor.extract(range.start_page, range.end_page, &target) {
                Ok(output) => report.outputs.push(output),
                Err(e) => {
                    log::error!("Failed to write {}: {}", target.display(), e);
                    report.failures.push(RangeFailure {
                        range,
                        error: e.to_string(),
                    });
                }
            }
        }

        enter(SplitPhase::Done);
        if report.is_success() {
            log::info!(
                "Split complete: {} files in {}",
                report.outputs.len(),
                self.output_dir.display()
            );
        } else {
            log::warn!(
                "Split finished with errors: {} of {} ranges written",
                report.outputs.len(),
                report.attempted()
            );
        }
        Ok(report)
    }
}

fn default_output_dir(source: &Path) -> PathBuf {
    let stem = source.file_stem().unwrap_or_default().to_string_lossy();
    source
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(format!("{}_chapters", stem))
}

/// File-level checks done before the parser sees the document.
fn validate_source(path: &Path) -> Result<()> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(Error::Unreadable(e.to_string())),
    };

    if !meta.is_file() {
        return Err(Error::NotAFile(path.to_path_buf()));
    }
    if meta.len() == 0 {
        return Err(Error::Empty(format!("{} is zero bytes", path.display())));
    }

    pdf_version_from_path(path).map_err(|e| match e {
        Error::Io(io) => Error::Unreadable(io.to_string()),
        e => e,
    })?;
    Ok(())
}

/// Document-level checks on an opened document.
fn validate_document<B: PdfBackend + ?Sized>(doc: &B) -> Result<()> {
    if doc.page_count() == 0 {
        return Err(Error::Empty("document has no pages".to_string()));
    }
    if let Err(e) = doc.page_text(0) {
        log::warn!("Text extraction on the first page may be unreliable: {}", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use tempfile::TempDir;

    fn splitter_in(dir: &TempDir) -> Splitter {
        Splitter::with_options(
            dir.path().join("book.pdf"),
            SplitOptions::new().with_output_dir(dir.path().join("out")),
        )
    }

    fn names(report: &SplitReport) -> Vec<String> {
        report
            .outputs
            .iter()
            .map(|o| o.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_default_output_dir() {
        let splitter = Splitter::new("/data/books/novel.pdf");
        assert_eq!(
            splitter.output_dir(),
            Path::new("/data/books/novel_chapters")
        );
    }

    #[test]
    fn test_chapter_ranges_cover_document() {
        let boundaries = vec![
            BoundaryRecord::new(0, "Chapter 1"),
            BoundaryRecord::new(4, "Chapter 2"),
            BoundaryRecord::new(9, "Chapter 3"),
        ];
        let (ranges, skipped) = chapter_ranges(&boundaries, 12);
        assert!(skipped.is_empty());

        let spans: Vec<(usize, usize)> =
            ranges.iter().map(|r| (r.start_page, r.end_page)).collect();
        assert_eq!(spans, vec![(0, 3), (4, 8), (9, 11)]);
        assert_eq!(ranges.iter().map(ChapterRange::len).sum::<usize>(), 12);
    }

    #[test]
    fn test_chapter_ranges_skip_invalid() {
        let boundaries = vec![
            BoundaryRecord::new(2, "Chapter 1"),
            BoundaryRecord::new(2, "dup"),
            BoundaryRecord::new(7, "Chapter 9"),
        ];
        let (ranges, skipped) = chapter_ranges(&boundaries, 5);
        assert_eq!(skipped.len(), 2);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].ordinal, 2);
        assert_eq!((ranges[0].start_page, ranges[0].end_page), (2, 6));
        assert_eq!(ranges[0].len(), 5);

        for range in &skipped {
            assert!(range.is_empty());
            assert_eq!(range.len(), 0);
        }
    }

    #[test]
    fn test_even_ranges() {
        let ranges = even_ranges(25, 10);
        let spans: Vec<(usize, usize)> =
            ranges.iter().map(|r| (r.start_page, r.end_page)).collect();
        assert_eq!(spans, vec![(0, 9), (10, 19), (20, 24)]);
        assert_eq!(ranges[2].file_name(), "03_pages_21-25.pdf");
    }

    #[test]
    fn test_even_ranges_zero_block_uses_default() {
        assert_eq!(even_ranges(25, 0), even_ranges(25, 10));
    }

    #[test]
    fn test_chapter_file_name_is_sanitized() {
        let range = ChapterRange {
            ordinal: 3,
            start_page: 0,
            end_page: 1,
            title: Some("Chapter 3: What/Why?".to_string()),
        };
        assert_eq!(range.file_name(), "03_Chapter 3_ What_Why_.pdf");
    }

    #[test]
    fn test_split_by_chapters() {
        let dir = TempDir::new().unwrap();
        let doc = MockBackend::new(["Chapter 1 Start", "prose", "Chapter 2 End"]);
        let report = splitter_in(&dir).split_document(&doc).unwrap();

        assert_eq!(report.mode, SplitMode::Chapters);
        assert!(report.is_success());
        assert_eq!(
            names(&report),
            vec!["01_Chapter 1 Start.pdf", "02_Chapter 2 End.pdf"]
        );
        assert_eq!(
            (report.outputs[0].start_page, report.outputs[0].end_page),
            (0, 1)
        );
        assert_eq!(
            (report.outputs[1].start_page, report.outputs[1].end_page),
            (2, 2)
        );
    }

    #[test]
    fn test_single_boundary_falls_back_to_even() {
        let dir = TempDir::new().unwrap();
        let mut pages: Vec<String> = (0..23).map(|i| format!("page {}", i)).collect();
        pages[5] = "Chapter 1".to_string();
        let doc = MockBackend::new(pages);
        let report = splitter_in(&dir).split_document(&doc).unwrap();

        assert_eq!(report.mode, SplitMode::Even);
        assert_eq!(report.boundaries.len(), 1);
        assert_eq!(
            names(&report),
            vec![
                "01_pages_1-10.pdf",
                "02_pages_11-20.pdf",
                "03_pages_21-23.pdf"
            ]
        );
    }

    #[test]
    fn test_no_boundaries_matches_split_evenly() {
        let doc = MockBackend::blank(14);

        let dir_a = TempDir::new().unwrap();
        let auto = splitter_in(&dir_a).split_document(&doc).unwrap();
        let dir_b = TempDir::new().unwrap();
        let even = splitter_in(&dir_b).split_document_evenly(&doc, 10).unwrap();

        assert_eq!(names(&auto), names(&even));
        assert_eq!(auto.mode, SplitMode::Even);
    }

    #[test]
    fn test_configured_block_size_used_for_fallback() {
        let dir = TempDir::new().unwrap();
        let splitter = Splitter::with_options(
            dir.path().join("book.pdf"),
            SplitOptions::new()
                .with_output_dir(dir.path().join("out"))
                .with_pages_per_block(4),
        );
        let report = splitter.split_document(&MockBackend::blank(9)).unwrap();
        assert_eq!(report.outputs.len(), 3);
    }

    #[test]
    fn test_failed_range_does_not_stop_others() {
        let dir = TempDir::new().unwrap();
        let mut doc = MockBackend::new(["Chapter 1", "Chapter 2", "Chapter 3"]);
        doc.bad_pages.insert(1);
        let report = splitter_in(&dir).split_document(&doc).unwrap();

        assert!(!report.is_success());
        assert_eq!(report.outputs.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].range.ordinal, 2);
        assert_eq!(report.attempted(), 3);
    }

    #[test]
    fn test_empty_document_fails_before_output_dir() {
        let dir = TempDir::new().unwrap();
        let splitter = splitter_in(&dir);
        let err = splitter
            .split_document(&MockBackend::new(Vec::<String>::new()))
            .unwrap_err();

        assert!(matches!(err, Error::Empty(_)));
        assert!(!splitter.output_dir().exists());
    }

    #[test]
    fn test_unreadable_first_page_is_only_a_warning() {
        let dir = TempDir::new().unwrap();
        let mut doc = MockBackend::blank(3);
        doc.bad_text.insert(0);
        let report = splitter_in(&dir).split_document(&doc).unwrap();
        assert!(report.is_success());
    }

    #[test]
    fn test_repeated_split_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let splitter = splitter_in(&dir);
        let doc = MockBackend::blank(3);

        splitter.split_document(&doc).unwrap();
        let second = splitter.split_document(&doc).unwrap();
        assert_eq!(names(&second), vec!["01_pages_1-3_1.pdf"]);
    }

    #[test]
    fn test_add_pattern_reports_invalid() {
        let mut splitter = Splitter::new("book.pdf");
        let before = splitter.patterns().len();
        assert!(splitter.add_pattern("[unclosed").is_err());
        assert_eq!(splitter.patterns().len(), before);
        assert!(splitter.add_pattern("^Appendix").is_ok());
        assert_eq!(splitter.patterns().len(), before + 1);
    }

    #[test]
    fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let splitter = splitter_in(&dir);
        assert!(matches!(splitter.split(), Err(Error::NotFound(_))));
        assert_eq!(splitter.get_info().total_pages, 0);
    }

    #[test]
    fn test_zero_byte_source() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("book.pdf"), b"").unwrap();
        let splitter = splitter_in(&dir);
        assert!(matches!(splitter.split(), Err(Error::Empty(_))));
        assert!(!splitter.output_dir().exists());
    }

    #[test]
    fn test_not_a_pdf() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("book.pdf"), b"hello world").unwrap();
        let splitter = splitter_in(&dir);
        assert!(matches!(splitter.split(), Err(Error::Unreadable(_))));
    }

    #[test]
    fn test_directory_source() {
        let dir = TempDir::new().unwrap();
        let splitter = Splitter::new(dir.path());
        assert!(matches!(splitter.split(), Err(Error::NotAFile(_))));
    }
}
