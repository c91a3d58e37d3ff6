//! Changelog document model
//!
//! Parses a "Keep a Changelog" style markdown file into an [Unreleased]
//! section and a list of dated [Release] entries, and writes it back out.
//! Only the structure needed to cut a release is modelled; section bodies
//! are kept as opaque text.

pub mod document;
pub mod parser;
mod render;

pub use document::{Changelog, Link, Release, Unreleased};
pub use parser::parse;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ReleaseError, Result};

/// A parsed changelog together with the file it was read from.
#[derive(Debug, Clone)]
pub struct ChangelogFile {
    pub path: PathBuf,
    pub document: Changelog,
}

impl ChangelogFile {
    /// Reads and parses the changelog at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path).map_err(|e| ReleaseError::io(&path, e))?;
        let document = parse(&text)?;
        debug!(
            path = %path.display(),
            releases = document.releases.len(),
            "parsed changelog"
        );
        Ok(ChangelogFile { path, document })
    }

    /// Overwrites the file with the current document.
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.document.to_string())
            .map_err(|e| ReleaseError::io(&self.path, e))
    }
}
