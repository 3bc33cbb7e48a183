use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A file whose processing failed; the batch carried on without it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FailedFile {
    /// Stem shared by the audio and alignment files.
    pub file_id: String,
    /// Error chain, outermost context first.
    pub error: String,
}

/// Counts and outcome of one batch run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BatchSummary {
    /// Audio files with an alignment file.
    pub paired: usize,
    /// Stems of audio files without an alignment file.
    pub skipped_unpaired: Vec<String>,
    /// Paired files processed successfully.
    pub processed: usize,
    /// Paired files whose processing failed.
    pub failed: Vec<FailedFile>,
    /// Rows written to the table.
    pub rows: usize,
    /// Path of the table.
    pub output: PathBuf,
}

impl BatchSummary {
    /// Write the summary as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write summary: {}", path.display()))?;
        log::info!("Summary written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let summary = BatchSummary {
            paired: 3,
            skipped_unpaired: vec!["S009_orphan".into()],
            processed: 2,
            failed: vec![FailedFile {
                file_id: "S002_story".into(),
                error: "Invalid TextGrid".into(),
            }],
            rows: 120,
            output: PathBuf::from("out/formants.csv"),
        };
        summary.write_json(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"skipped_unpaired\""));
        let back: BatchSummary = serde_json::from_str(&text).unwrap();
        assert_eq!(back, summary);
    }
}
