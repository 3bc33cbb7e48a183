use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Referenced file or directory does not exist.
    #[error("Fichier introuvable : {path}")]
    FileNotFound {
        /// Path that was not found.
        path: String,
    },

    /// A tier index outside the grid was requested.
    #[error("Tier {index} hors limites (la grille contient {count} tiers)")]
    TierOutOfRange {
        /// Requested tier index.
        index: usize,
        /// Number of tiers in the grid.
        count: usize,
    },
}
