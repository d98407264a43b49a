//! Turning bulletin files into [`DocumentContent`]
//!
//! The file extension decides the content shape: `.txt` gives text lines,
//! `.docx` gives word-processor tables and spreadsheet extensions give the
//! first worksheet. Reference data loaders live in [`reference`].

pub mod docx;
pub mod reference;
pub mod sheet;
pub mod text;

pub use reference::{load_canonical_set, load_rename_table};

use crate::content::DocumentContent;
use crate::error::{BulletinError, Result};
use encoding_rs::Encoding;
use std::path::Path;
use tracing::debug;

/// Document container, by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    WordTables,
    Spreadsheet,
}

impl DocumentKind {
    /// Kind of a document path, or `None` for files that are not bulletins.
    ///
    /// Legacy `.doc` files are reported as unsupported rather than ignored,
    /// since they are bulletins that need converting first.
    pub fn from_path(path: &Path) -> Result<Option<Self>> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "txt" => Ok(Some(DocumentKind::Text)),
            "docx" => Ok(Some(DocumentKind::WordTables)),
            "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => Ok(Some(DocumentKind::Spreadsheet)),
            "doc" => Err(BulletinError::UnsupportedDocument {
                path: path.to_path_buf(),
                reason: "legacy .doc files must be converted to .docx".to_string(),
            }),
            _ => Ok(None),
        }
    }
}

/// Loads bulletin files of every supported kind
#[derive(Debug, Clone, Copy)]
pub struct DocumentLoader {
    fallback: &'static Encoding,
}

impl DocumentLoader {
    /// `fallback` decodes text bulletins that are not valid UTF-8
    pub fn new(fallback: &'static Encoding) -> Self {
        Self { fallback }
    }

    pub fn from_label(label: &str) -> Result<Self> {
        Ok(Self::new(text::encoding_for_label(label)?))
    }

    pub fn load(&self, path: &Path) -> Result<DocumentContent> {
        let kind = DocumentKind::from_path(path)?.ok_or_else(|| {
            BulletinError::UnsupportedDocument {
                path: path.to_path_buf(),
                reason: "unrecognised file extension".to_string(),
            }
        })?;
        debug!("Loading {} as {:?}", path.display(), kind);

        match kind {
            DocumentKind::Text => text::read_text(path, self.fallback),
            DocumentKind::WordTables => docx::read_docx(path),
            DocumentKind::Spreadsheet => sheet::read_sheet(path),
        }
    }
}
