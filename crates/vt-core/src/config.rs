use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Configuration complète d'un traitement par lots.
///
/// Sérialisable en TOML. Les répertoires et les tiers de phones n'ont pas de
/// valeur par défaut utile : [`BatchConfig::validate`] les exige.
///
/// # Example
/// ```
/// use vt_core::config::BatchConfig;
/// let config = BatchConfig::default();
/// assert!((config.segment_window - 0.005).abs() < f64::EPSILON);
/// assert!(config.validate().is_err()); // no directories yet
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BatchConfig {
    // === Chemins ===
    /// Directory holding the alignment (TextGrid) files.
    pub alignment_dir: PathBuf,
    /// Directory holding the audio files.
    pub audio_dir: PathBuf,
    /// Directory the output table is written to.
    pub output_dir: PathBuf,
    /// File name of the output table inside `output_dir`.
    pub output_file: String,
    /// Audio extension to enumerate (case-insensitive, without dot).
    pub audio_extension: String,
    /// Extension of the companion alignment file (without dot).
    pub alignment_extension: String,

    // === Tiers ===
    /// Names of the tiers eligible for vowel-token extraction.
    pub phone_tiers: Vec<String>,
    /// Tier used for the word-at-midpoint lookup.
    pub word_tier: WordTier,

    // === Analyse acoustique ===
    /// Parameters forwarded verbatim to the acoustic front-end.
    pub formant: FormantSettings,

    // === Échantillonnage ===
    /// Fixed re-sampling step inside each vowel token, in seconds.
    pub segment_window: f64,

    // === Métadonnées ===
    /// Number of leading characters of the file stem that form the participant id.
    pub participant_id_len: usize,
    /// Delimiter between participant id and task id in the file stem.
    pub task_delimiter: String,

    // === Exécution ===
    /// Worker count. 0 = rayon default, 1 = sequential.
    pub jobs: usize,
}

/// How the word tier is addressed inside a grid.
///
/// Deserializes from either an integer (position) or a string (tier name).
///
/// # Example
/// ```
/// use vt_core::config::WordTier;
/// assert_eq!(WordTier::default(), WordTier::Index(0));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum WordTier {
    /// Positional addressing. Assumes every grid puts the words at this index.
    Index(usize),
    /// First tier carrying this name.
    Name(String),
}

impl Default for WordTier {
    fn default() -> Self {
        Self::Index(0)
    }
}

/// Formant analysis parameters (Burg method).
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct FormantSettings {
    /// Time between analysis frames in seconds. 0.0 = automatic (window / 4).
    pub time_step: f64,
    /// Maximum number of formants per frame.
    pub max_formants: usize,
    /// Formant ceiling in Hz (~5000 for female, ~5500 for male voices).
    pub max_formant_hz: f64,
    /// Analysis window length in seconds.
    pub window_length: f64,
    /// Pre-emphasis cut-on frequency in Hz.
    pub pre_emphasis_hz: f64,
}

impl Default for FormantSettings {
    fn default() -> Self {
        Self {
            time_step: 0.0,
            max_formants: 5,
            max_formant_hz: 5500.0,
            window_length: 0.025,
            pre_emphasis_hz: 50.0,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            alignment_dir: PathBuf::new(),
            audio_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            output_file: "formants.csv".to_string(),
            audio_extension: "wav".to_string(),
            alignment_extension: "TextGrid".to_string(),
            phone_tiers: Vec::new(),
            word_tier: WordTier::Index(0),
            formant: FormantSettings::default(),
            segment_window: 0.005,
            participant_id_len: 4,
            task_delimiter: "_".to_string(),
            jobs: 0,
        }
    }
}

impl BatchConfig {
    /// Full path of the output table.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }

    /// Check that every required setting is present and in range.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        let required_dirs = [
            ("paths.alignment_dir", &self.alignment_dir),
            ("paths.audio_dir", &self.audio_dir),
            ("paths.output_dir", &self.output_dir),
        ];
        for (key, dir) in required_dirs {
            if dir.as_os_str().is_empty() {
                return Err(CoreError::Config(format!("{key} est requis")));
            }
        }
        if self.output_file.trim().is_empty() {
            return Err(CoreError::Config("paths.output_file est vide".into()));
        }
        if self.phone_tiers.is_empty() {
            return Err(CoreError::Config(
                "tiers.phone_tiers doit contenir au moins un nom".into(),
            ));
        }
        if !positive(self.segment_window) {
            return Err(CoreError::Config(format!(
                "sampling.segment_window doit être > 0 (reçu {})",
                self.segment_window
            )));
        }
        let f = &self.formant;
        if f.max_formants == 0 {
            return Err(CoreError::Config("formant.max_formants doit être >= 1".into()));
        }
        if !positive(f.max_formant_hz) {
            return Err(CoreError::Config(format!(
                "formant.max_formant_hz doit être > 0 (reçu {})",
                f.max_formant_hz
            )));
        }
        if !positive(f.window_length) {
            return Err(CoreError::Config(format!(
                "formant.window_length doit être > 0 (reçu {})",
                f.window_length
            )));
        }
        if !non_negative(f.time_step) {
            return Err(CoreError::Config(format!(
                "formant.time_step doit être >= 0 (reçu {})",
                f.time_step
            )));
        }
        if !non_negative(f.pre_emphasis_hz) {
            return Err(CoreError::Config(format!(
                "formant.pre_emphasis_hz doit être >= 0 (reçu {})",
                f.pre_emphasis_hz
            )));
        }
        Ok(())
    }
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    paths: Option<PathsSection>,
    tiers: Option<TiersSection>,
    formant: Option<FormantSection>,
    sampling: Option<SamplingSection>,
    metadata: Option<MetadataSection>,
    run: Option<RunSection>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PathsSection {
    alignment_dir: Option<PathBuf>,
    audio_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    output_file: Option<String>,
    audio_extension: Option<String>,
    alignment_extension: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TiersSection {
    phone_tiers: Option<Vec<String>>,
    word_tier: Option<WordTier>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FormantSection {
    time_step: Option<f64>,
    max_formants: Option<usize>,
    max_formant_hz: Option<f64>,
    window_length: Option<f64>,
    pre_emphasis_hz: Option<f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SamplingSection {
    segment_window: Option<f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MetadataSection {
    participant_id_len: Option<usize>,
    task_delimiter: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RunSection {
    jobs: Option<usize>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// The result is not validated: CLI overrides are applied first, then the
/// caller runs [`BatchConfig::validate`].
///
/// # Errors
/// Returns [`CoreError::FileNotFound`] if `path` does not exist, or an error
/// if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use vt_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<BatchConfig> {
    if !path.exists() {
        return Err(CoreError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))
}

/// Parse TOML text into a [`BatchConfig`], overlaying defaults.
///
/// # Errors
/// Returns an error on invalid TOML or unknown keys.
pub fn parse_config(content: &str) -> Result<BatchConfig> {
    let file: ConfigFile = toml::from_str(content)?;
    let mut config = BatchConfig::default();

    if let Some(p) = file.paths {
        if let Some(v) = p.alignment_dir {
            config.alignment_dir = v;
        }
        if let Some(v) = p.audio_dir {
            config.audio_dir = v;
        }
        if let Some(v) = p.output_dir {
            config.output_dir = v;
        }
        if let Some(v) = p.output_file {
            config.output_file = v;
        }
        if let Some(v) = p.audio_extension {
            config.audio_extension = v.trim_start_matches('.').to_string();
        }
        if let Some(v) = p.alignment_extension {
            config.alignment_extension = v.trim_start_matches('.').to_string();
        }
    }

    if let Some(t) = file.tiers {
        if let Some(v) = t.phone_tiers {
            config.phone_tiers = v;
        }
        if let Some(v) = t.word_tier {
            config.word_tier = v;
        }
    }

    if let Some(f) = file.formant {
        if let Some(v) = f.time_step {
            config.formant.time_step = v;
        }
        if let Some(v) = f.max_formants {
            config.formant.max_formants = v;
        }
        if let Some(v) = f.max_formant_hz {
            config.formant.max_formant_hz = v;
        }
        if let Some(v) = f.window_length {
            config.formant.window_length = v;
        }
        if let Some(v) = f.pre_emphasis_hz {
            config.formant.pre_emphasis_hz = v;
        }
    }

    if let Some(s) = file.sampling {
        if let Some(v) = s.segment_window {
            config.segment_window = v;
        }
    }

    if let Some(m) = file.metadata {
        if let Some(v) = m.participant_id_len {
            config.participant_id_len = v;
        }
        if let Some(v) = m.task_delimiter {
            config.task_delimiter = v;
        }
    }

    if let Some(r) = file.run {
        if let Some(v) = r.jobs {
            config.jobs = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[paths]
alignment_dir = "tg"
audio_dir = "wav"
output_dir = "out"
audio_extension = ".WAV"

[tiers]
phone_tiers = ["phones", "MAU"]
word_tier = "words"

[formant]
max_formant_hz = 5000.0

[sampling]
segment_window = 0.01

[metadata]
participant_id_len = 3
"#;

    #[test]
    fn sections_overlay_defaults() -> Result<()> {
        let config = parse_config(FULL)?;
        assert_eq!(config.alignment_dir, PathBuf::from("tg"));
        assert_eq!(config.audio_extension, "WAV");
        assert_eq!(config.phone_tiers, vec!["phones", "MAU"]);
        assert_eq!(config.word_tier, WordTier::Name("words".into()));
        assert!((config.formant.max_formant_hz - 5000.0).abs() < f64::EPSILON);
        // untouched keys keep their defaults
        assert_eq!(config.formant.max_formants, 5);
        assert_eq!(config.output_file, "formants.csv");
        assert_eq!(config.participant_id_len, 3);
        assert_eq!(config.task_delimiter, "_");
        config.validate()?;
        Ok(())
    }

    #[test]
    fn word_tier_accepts_index() -> Result<()> {
        let config = parse_config("[tiers]\nword_tier = 2\n")?;
        assert_eq!(config.word_tier, WordTier::Index(2));
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_config("[sampling]\nsegment_windw = 0.01\n").is_err());
    }

    #[test]
    fn validate_rejects_missing_tiers_and_bad_window() -> Result<()> {
        let mut config = parse_config(FULL)?;
        config.phone_tiers.clear();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = parse_config(FULL)?;
        config.segment_window = 0.0;
        assert!(config.validate().is_err());

        let mut config = parse_config(FULL)?;
        config.formant.time_step = -0.01;
        assert!(config.validate().is_err());
        Ok(())
    }

    #[test]
    fn load_config_reads_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("batch.toml");
        std::fs::write(&path, FULL)?;
        let config = load_config(&path)?;
        assert_eq!(config.output_path(), PathBuf::from("out").join("formants.csv"));
        Ok(())
    }

    #[test]
    fn shipped_default_config_is_valid() -> Result<()> {
        let config = parse_config(include_str!("../../../config/default.toml"))?;
        assert_eq!(config.word_tier, WordTier::Index(0));
        assert!((config.segment_window - 0.005).abs() < f64::EPSILON);
        config.validate()?;
        Ok(())
    }

    #[test]
    fn load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/vowtrack.toml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::FileNotFound { .. })
        ));
    }
}
