//! Splitting options and configuration.

use std::path::PathBuf;

/// Page count per block used when no chapters are detected.
pub const DEFAULT_PAGES_PER_BLOCK: usize = 10;

/// Tuning knobs for the boundary scanner.
///
/// The defaults reproduce the classic heuristic: look at the first ten
/// lines of each page, plus a five-line window around the middle of pages
/// longer than twenty lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Lines checked at the top of every page
    pub header_lines: usize,

    /// Pages with more lines than this also get a mid-page window
    pub long_page_lines: usize,

    /// Size of the mid-page window (0 disables it)
    pub mid_window: usize,

    /// Shortest candidate line, in characters
    pub min_line_chars: usize,

    /// Longest candidate line, in characters; longer lines are body text
    pub max_line_chars: usize,

    /// Titles are cut to this many characters
    pub max_title_chars: usize,
}

impl ScanOptions {
    /// Create scan options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many lines at the top of a page are checked.
    pub fn with_header_lines(mut self, lines: usize) -> Self {
        self.header_lines = lines;
        self
    }

    /// Set the mid-page window size and the page length that enables it.
    pub fn with_mid_window(mut self, window: usize, long_page_lines: usize) -> Self {
        self.mid_window = window;
        self.long_page_lines = long_page_lines;
        self
    }

    /// Disable the mid-page window.
    pub fn header_only(mut self) -> Self {
        self.mid_window = 0;
        self
    }

    /// Set the accepted candidate line length.
    pub fn with_line_chars(mut self, min: usize, max: usize) -> Self {
        self.min_line_chars = min;
        self.max_line_chars = max;
        self
    }

    /// Set the title length cap.
    pub fn with_max_title_chars(mut self, chars: usize) -> Self {
        self.max_title_chars = chars;
        self
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            header_lines: 10,
            long_page_lines: 20,
            mid_window: 5,
            min_line_chars: 2,
            max_line_chars: 100,
            max_title_chars: 60,
        }
    }
}

/// Options for a split operation.
#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    /// Output directory (defaults to `<stem>_chapters` beside the source)
    pub output_dir: Option<PathBuf>,

    /// Pages per block for the even-split fallback
    pub pages_per_block: usize,

    /// Boundary scanner tuning
    pub scan: ScanOptions,
}

impl SplitOptions {
    /// Create split options with defaults.
    pub fn new() -> Self {
        Self {
            pages_per_block: DEFAULT_PAGES_PER_BLOCK,
            ..Default::default()
        }
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set pages per fallback block. Zero selects the default.
    pub fn with_pages_per_block(mut self, pages: usize) -> Self {
        self.pages_per_block = pages;
        self
    }

    /// Set scanner options.
    pub fn with_scan_options(mut self, scan: ScanOptions) -> Self {
        self.scan = scan;
        self
    }

    /// Pages per block with non-positive values coerced to the default.
    pub fn block_size(&self) -> usize {
        effective_block_size(self.pages_per_block)
    }
}

/// Coerce a requested block size, replacing 0 with the default.
pub fn effective_block_size(requested: usize) -> usize {
    if requested == 0 {
        DEFAULT_PAGES_PER_BLOCK
    } else {
        requested
    }
}
