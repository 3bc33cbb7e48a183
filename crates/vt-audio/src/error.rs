use thiserror::Error;

/// Errors originating from the audio module.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Unsupported audio format.
    #[error("Format audio non supporté : {0}")]
    UnsupportedFormat(String),

    /// Audio decode error.
    #[error("Erreur de décodage : {0}")]
    DecodeError(String),

    /// The file decoded to zero samples.
    #[error("Signal vide : {0}")]
    EmptySignal(String),

    /// FFT planning or processing failed.
    #[error("Erreur FFT : {0}")]
    Fft(String),
}
