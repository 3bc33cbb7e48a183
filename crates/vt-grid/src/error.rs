use thiserror::Error;

/// Errors raised while reading an alignment grid.
#[derive(Error, Debug)]
pub enum GridError {
    /// Unsupported or undecodable text encoding.
    #[error("Encodage invalide : {0}")]
    Encoding(String),

    /// Not a text TextGrid (binary file, other object class).
    #[error("Format non supporté : {0}")]
    Unsupported(String),

    /// Malformed content.
    #[error("Erreur de syntaxe ligne {line} : {message}")]
    Parse { line: usize, message: String },
}
