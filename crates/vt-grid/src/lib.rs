/// Alignment input for vowtrack: Praat TextGrid reading and audio/alignment file pairing.

pub mod error;
pub mod pairing;
pub mod textgrid;

pub use error::GridError;
pub use pairing::{FilePair, PairingReport, pair_files};
pub use textgrid::{TextGridReader, parse_textgrid, read_textgrid};
