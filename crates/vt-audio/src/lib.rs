// Audio decoding and Burg formant analysis for vowtrack.

pub mod decode;
pub mod error;
pub mod formant;
pub mod frontend;
pub mod lpc;
pub mod resample;
pub mod signal;

pub use error::AudioError;
pub use formant::BurgTrack;
pub use frontend::BurgFrontEnd;
pub use signal::Signal;
