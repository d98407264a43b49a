//! Bulletin discovery in the input directory
//!
//! Only the top level of the input directory is scanned. Editor lock files
//! (`~$name.docx`) and files with unrelated extensions are skipped; legacy
//! `.doc` files are kept so that processing reports them as unsupported.

use crate::constants::LOCK_FILE_PREFIX;
use crate::error::{BulletinError, Result};
use crate::loader::DocumentKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Finds bulletin documents in one directory
#[derive(Debug)]
pub struct DocumentDiscovery {
    input_dir: PathBuf,
    skipped: usize,
}

impl DocumentDiscovery {
    pub fn new(input_dir: PathBuf) -> Self {
        Self {
            input_dir,
            skipped: 0,
        }
    }

    /// Files passed over by the last discovery
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Candidate bulletins, sorted by path
    pub async fn discover_documents(&mut self) -> Result<Vec<PathBuf>> {
        if !self.input_dir.is_dir() {
            return Err(BulletinError::InputNotFound {
                path: self.input_dir.clone(),
            });
        }

        debug!("Searching for bulletins in: {}", self.input_dir.display());

        let mut documents = Vec::new();
        self.skipped = 0;

        let mut dir = fs::read_dir(&self.input_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            if is_candidate(&path) {
                documents.push(path);
            } else {
                self.skipped += 1;
            }
        }

        documents.sort();
        debug!(
            "Found {} bulletins, skipped {} other files",
            documents.len(),
            self.skipped
        );

        Ok(documents)
    }
}

fn is_candidate(path: &Path) -> bool {
    let is_lock_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with(LOCK_FILE_PREFIX));
    if is_lock_file {
        return false;
    }
    // Unsupported-but-recognised documents still count as bulletins
    !matches!(DocumentKind::from_path(path), Ok(None))
}
