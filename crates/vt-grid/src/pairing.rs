use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// One audio file and its alignment file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePair {
    pub audio: PathBuf,
    pub alignment: PathBuf,
    /// Shared file stem.
    pub file_id: String,
}

/// Result of pairing an audio directory against an alignment directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PairingReport {
    /// Paired files, sorted by audio path.
    pub pairs: Vec<FilePair>,
    /// Stems of audio files without an alignment file.
    pub skipped: Vec<String>,
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Fichiers réguliers de `dir` portant l'extension `ext` (non récursif).
fn scan_dir(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, ext) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Match every `*.audio_ext` file in `audio_dir` with `<stem>.alignment_ext`
/// in `alignment_dir`.
///
/// Extensions compare case-insensitively; stems must match exactly. Audio
/// files without an alignment are skipped and listed in
/// [`PairingReport::skipped`]. A missing alignment directory leaves every
/// file unpaired.
///
/// # Errors
/// Returns an error if `audio_dir` cannot be read.
///
/// # Example
/// ```no_run
/// use vt_grid::pair_files;
/// let report = pair_files("corpus/wav".as_ref(), "corpus/grids".as_ref(), "wav", "TextGrid").unwrap();
/// for pair in &report.pairs {
///     println!("{} -> {}", pair.audio.display(), pair.alignment.display());
/// }
/// ```
pub fn pair_files(
    audio_dir: &Path,
    alignment_dir: &Path,
    audio_ext: &str,
    alignment_ext: &str,
) -> Result<PairingReport> {
    let audio = scan_dir(audio_dir, audio_ext)
        .with_context(|| format!("Cannot read audio directory: {}", audio_dir.display()))?;

    let alignments: HashMap<String, PathBuf> = match scan_dir(alignment_dir, alignment_ext) {
        Ok(files) => files.into_iter().map(|p| (stem_of(&p), p)).collect(),
        Err(e) => {
            log::warn!(
                "Cannot read alignment directory {}: {e}",
                alignment_dir.display()
            );
            HashMap::new()
        }
    };

    let mut report = PairingReport::default();
    for path in audio {
        let stem = stem_of(&path);
        if let Some(alignment) = alignments.get(&stem) {
            report.pairs.push(FilePair {
                audio: path,
                alignment: alignment.clone(),
                file_id: stem,
            });
        } else {
            log::debug!("No alignment for {}, skipped", path.display());
            report.skipped.push(stem);
        }
    }

    log::info!(
        "Paired {} audio files ({} without alignment)",
        report.pairs.len(),
        report.skipped.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn pairs_by_stem_and_skips_orphans() {
        let audio = tempfile::tempdir().unwrap();
        let grids = tempfile::tempdir().unwrap();
        touch(audio.path(), "S002_story.wav");
        touch(audio.path(), "S001_reading.WAV");
        touch(audio.path(), "S003_orphan.wav");
        touch(audio.path(), "notes.txt");
        touch(grids.path(), "S001_reading.TextGrid");
        touch(grids.path(), "S002_story.textgrid");

        let report = pair_files(audio.path(), grids.path(), "wav", "TextGrid").unwrap();
        let ids: Vec<&str> = report.pairs.iter().map(|p| p.file_id.as_str()).collect();
        assert_eq!(ids, ["S001_reading", "S002_story"]);
        assert_eq!(report.pairs[0].alignment, grids.path().join("S001_reading.TextGrid"));
        assert_eq!(report.skipped, ["S003_orphan"]);
    }

    #[test]
    fn same_directory_for_both_kinds() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.wav");
        touch(dir.path(), "a.TextGrid");
        let report = pair_files(dir.path(), dir.path(), "wav", "TextGrid").unwrap();
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.pairs[0].audio, dir.path().join("a.wav"));
    }

    #[test]
    fn stems_are_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Speaker.wav");
        touch(dir.path(), "speaker.TextGrid");
        let report = pair_files(dir.path(), dir.path(), "wav", "TextGrid").unwrap();
        assert!(report.pairs.is_empty());
        assert_eq!(report.skipped, ["Speaker"]);
    }

    #[test]
    fn missing_alignment_dir_skips_everything() {
        let audio = tempfile::tempdir().unwrap();
        touch(audio.path(), "a.wav");
        let report =
            pair_files(audio.path(), &audio.path().join("nope"), "wav", "TextGrid").unwrap();
        assert!(report.pairs.is_empty());
        assert_eq!(report.skipped, ["a"]);
    }

    #[test]
    fn missing_audio_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(pair_files(&dir.path().join("nope"), dir.path(), "wav", "TextGrid").is_err());
    }
}
