use std::path::PathBuf;

use clap::Parser;
use vt_core::config::{BatchConfig, WordTier};

/// vowtrack: vowel formant trajectories from audio + TextGrid pairs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Dossier des fichiers audio.
    #[arg(long)]
    pub audio_dir: Option<PathBuf>,

    /// Dossier des fichiers TextGrid.
    #[arg(long)]
    pub alignment_dir: Option<PathBuf>,

    /// Dossier de sortie du tableau CSV.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Nom du fichier CSV.
    #[arg(long)]
    pub output_file: Option<String>,

    /// Tier de phones (répétable). Remplace la liste du fichier de config.
    #[arg(long = "phone-tier")]
    pub phone_tiers: Vec<String>,

    /// Tier de mots : index (0 = premier tier) ou nom.
    #[arg(long)]
    pub word_tier: Option<String>,

    /// Pas d'échantillonnage dans chaque voyelle, en secondes.
    #[arg(long)]
    pub segment_window: Option<f64>,

    /// Threads de traitement (0 = automatique, 1 = séquentiel).
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Écrire un résumé JSON de l'exécution.
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Apply command-line overrides on top of `config`.
    pub fn apply(&self, config: &mut BatchConfig) {
        if let Some(ref v) = self.audio_dir {
            config.audio_dir.clone_from(v);
        }
        if let Some(ref v) = self.alignment_dir {
            config.alignment_dir.clone_from(v);
        }
        if let Some(ref v) = self.output_dir {
            config.output_dir.clone_from(v);
        }
        if let Some(ref v) = self.output_file {
            config.output_file.clone_from(v);
        }
        if !self.phone_tiers.is_empty() {
            config.phone_tiers.clone_from(&self.phone_tiers);
        }
        if let Some(ref v) = self.word_tier {
            config.word_tier = v
                .parse::<usize>()
                .map_or_else(|_| WordTier::Name(v.clone()), WordTier::Index);
        }
        if let Some(v) = self.segment_window {
            config.segment_window = v;
        }
        if let Some(v) = self.jobs {
            config.jobs = v;
        }
    }
}
