//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for the handful of document operations
//! the splitter needs, isolating the concrete PDF library (lopdf) from the
//! scanning and splitting logic.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::info::{decode_pdf_string, parse_pdf_date, DocumentInfo};
use crate::text;

/// Abstract interface for an open PDF document.
///
/// Pages are addressed by 0-based index. Implementations own the open
/// document; dropping the backend releases it.
pub trait PdfBackend {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Extracted text of one page, one line per text baseline.
    fn page_text(&self, index: usize) -> Result<String>;

    /// Check that a page can be carried into a new document.
    fn check_page(&self, index: usize) -> Result<()>;

    /// Write a new standalone PDF holding exactly `pages`, in the given order.
    fn write_pages(&self, pages: &[usize], out: &mut dyn Write) -> Result<()>;

    /// Best-effort document metadata.
    fn info(&self) -> DocumentInfo;
}

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    /// Page object ids in page order.
    pages: Vec<ObjectId>,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path).map_err(|e| match e {
            lopdf::Error::IO(e) => Error::Io(e),
            e => Error::Unreadable(e.to_string()),
        })?;
        Ok(Self::from_document(doc))
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data).map_err(|e| Error::Unreadable(e.to_string()))?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already-built `lopdf::Document`.
    pub fn from_document(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self { doc, pages }
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.pages
            .get(index)
            .copied()
            .ok_or_else(|| Error::PageCopy(index, "page index out of range".to_string()))
    }

    fn info_dict(&self) -> Option<&lopdf::Dictionary> {
        match self.doc.trailer.get(b"Info").ok()? {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let id = self
            .pages
            .get(index)
            .copied()
            .ok_or_else(|| Error::TextExtract(format!("page {} is out of range", index + 1)))?;
        text::page_text(&self.doc, id).map_err(|e| match e {
            Error::TextExtract(msg) => Error::TextExtract(format!("page {}: {}", index + 1, msg)),
            e => e,
        })
    }

    fn check_page(&self, index: usize) -> Result<()> {
        let id = self.page_id(index)?;
        let dict = self
            .doc
            .get_dictionary(id)
            .map_err(|e| Error::PageCopy(index, e.to_string()))?;

        match dict.get(b"Type").and_then(Object::as_name) {
            Ok(b"Page") => Ok(()),
            _ => Err(Error::PageCopy(index, "object is not a page".to_string())),
        }
    }

    fn write_pages(&self, pages: &[usize], mut out: &mut dyn Write) -> Result<()> {
        let mut doc = self.doc.clone();

        // lopdf numbers pages from 1
        let keep: HashSet<u32> = pages.iter().map(|&i| i as u32 + 1).collect();
        let removed: Vec<u32> = (1..=self.pages.len() as u32)
            .filter(|n| !keep.contains(n))
            .collect();
        if !removed.is_empty() {
            doc.delete_pages(&removed);
        }

        // Bookmarks would still point at the deleted pages.
        if let Ok(root) = doc.trailer.get(b"Root").and_then(Object::as_reference) {
            if let Ok(catalog) = doc.get_object_mut(root).and_then(Object::as_dict_mut) {
                catalog.remove(b"Outlines");
            }
        }

        doc.prune_objects();
        doc.renumber_objects();
        doc.compress();
        doc.save_to(&mut out)?;
        Ok(())
    }

    fn info(&self) -> DocumentInfo {
        let mut info = DocumentInfo {
            total_pages: self.pages.len(),
            pdf_version: Some(self.doc.version.to_string()),
            ..Default::default()
        };

        if let Some(dict) = self.info_dict() {
            let field = |key: &[u8]| dict.get(key).ok().and_then(decode_pdf_string);
            info.title = field(b"Title");
            info.author = field(b"Author");
            info.subject = field(b"Subject");
            info.creator = field(b"Creator");
            info.producer = field(b"Producer");
            info.created = field(b"CreationDate").and_then(|d| parse_pdf_date(&d));
            info.modified = field(b"ModDate").and_then(|d| parse_pdf_date(&d));
        }

        info
    }
}
