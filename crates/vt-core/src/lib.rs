/// Configuration, types, and the vowel segmentation core for vowtrack.
///
/// This crate contains the shared types, the collaborator traits, and the
/// segmentation logic used across the vowtrack workspace. It has no audio
/// or file-format dependencies: grids and formant tracks come in through
/// [`traits::AlignmentGrid`] and [`traits::FormantTrack`].

pub mod config;
pub mod error;
pub mod grid;
pub mod row;
pub mod segment;
pub mod tiers;
pub mod traits;

pub use config::{BatchConfig, FormantSettings, WordTier};
pub use error::CoreError;
pub use grid::{AnnotationGrid, Interval, Tier};
pub use row::{DatasetRow, FileId};
pub use segment::{VowelSegmenter, VowelToken};
