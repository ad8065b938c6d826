//! Page-range extraction into standalone PDF files.

use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::backend::PdfBackend;
use crate::error::{Error, Result};
use crate::sanitize::unique_path;

/// A PDF written to disk for one range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    /// Where the file was written
    pub path: PathBuf,
    /// First page of the range (0-based)
    pub start_page: usize,
    /// Last page of the range (0-based, inclusive)
    pub end_page: usize,
    /// Pages actually copied
    pub pages_copied: usize,
    /// Pages in the range that could not be copied
    pub pages_skipped: usize,
}

impl OutputFile {
    /// Whether some pages of the range were left out.
    pub fn is_partial(&self) -> bool {
        self.pages_skipped > 0
    }
}

/// Writes contiguous page ranges of a document to new PDF files.
pub struct PageExtractor<'a, B: PdfBackend + ?Sized> {
    doc: &'a B,
}

impl<'a, B: PdfBackend + ?Sized> PageExtractor<'a, B> {
    /// Create an extractor over an open document.
    pub fn new(doc: &'a B) -> Self {
        Self { doc }
    }

    /// Write pages `start..=end` to `path`, or to a suffixed variant of it
    /// if `path` already exists.
    ///
    /// Pages that cannot be copied are skipped. The call fails when no page
    /// could be copied, or when the written file turns out empty. A failed
    /// write leaves nothing behind at `path`.
    pub fn extract(&self, start: usize, end: usize, path: &Path) -> Result<OutputFile> {
        let total = self.doc.page_count();
        let mut pages = Vec::with_capacity(end.saturating_sub(start) + 1);
        let mut skipped = 0;

        for page in start..=end {
            if page >= total {
                log::warn!("Page {} is out of range ({} pages)", page + 1, total);
                skipped += 1;
                continue;
            }
            match self.doc.check_page(page) {
                Ok(()) => pages.push(page),
                Err(e) => {
                    log::warn!("Skipping page {}: {}", page + 1, e);
                    skipped += 1;
                }
            }
        }

        if pages.is_empty() {
            log::error!("No pages could be copied for pages {}-{}", start + 1, end + 1);
            return Err(Error::ExtractionEmpty { start, end });
        }

        let path = self.write(&pages, path)?;

        log::info!(
            "Created {} (pages {}-{}, {} pages)",
            path.file_name().unwrap_or_default().to_string_lossy(),
            start + 1,
            end + 1,
            pages.len()
        );
        if skipped > 0 {
            log::warn!("{} page(s) missing from {}", skipped, path.display());
        }

        Ok(OutputFile {
            path,
            start_page: start,
            end_page: end,
            pages_copied: pages.len(),
            pages_skipped: skipped,
        })
    }

    /// Write into a temporary file next to `path`, then move it into place
    /// under the first free name. The temporary file is removed on any error.
    fn write(&self, pages: &[usize], path: &Path) -> Result<PathBuf> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            self.doc.write_pages(pages, &mut writer)?;
            writer.flush()?;
        }
        verify_output(tmp.as_file(), path)?;
        persist_unique(tmp, path, unique_path(path))
    }
}

/// The artifact must hold at least one byte.
fn verify_output(file: &File, path: &Path) -> Result<()> {
    match file.metadata() {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => {
            log::error!("Output file empty: {}", path.display());
            Err(Error::OutputVerificationFailed(path.to_path_buf()))
        }
    }
}

/// Move `tmp` to `target`. If another file claimed `target` in the meantime,
/// move on to the next free suffixed variant of `path`. Existing files are
/// never replaced.
fn persist_unique(mut tmp: NamedTempFile, path: &Path, mut target: PathBuf) -> Result<PathBuf> {
    loop {
        match tmp.persist_noclobber(&target) {
            Ok(_) => return Ok(target),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                log::debug!("{} appeared while writing, retrying", target.display());
                tmp = e.file;
                target = unique_path(path);
            }
            Err(e) => return Err(e.error.into()),
        }
    }
}
