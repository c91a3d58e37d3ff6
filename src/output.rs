use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::{ReleaseError, Result};
use crate::ui;

/// Values handed to later pipeline steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutputs {
    /// Id of the release commit.
    pub hash: String,
    /// The exact version tag.
    pub tag: String,
}

impl RunOutputs {
    pub fn pairs(&self) -> [(&'static str, &str); 2] {
        [("hash", self.hash.as_str()), ("tag", self.tag.as_str())]
    }
}

/// Appends `key=value` lines to the step output file.
///
/// Without an output file the pairs are only printed.
pub fn write_outputs(sink: Option<&Path>, outputs: &RunOutputs) -> Result<()> {
    for (key, value) in outputs.pairs() {
        ui::display_step(&format!("creating output: {}={}", key, value));

        if let Some(path) = sink {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| ReleaseError::io(path, e))?;
            writeln!(file, "{}={}", key, value).map_err(|e| ReleaseError::io(path, e))?;
            debug!(path = %path.display(), key, "wrote output");
        }
    }

    Ok(())
}
