use std::path::Path;

use anyhow::{Context, Result};
use vt_core::config::FormantSettings;
use vt_core::traits::AcousticFrontEnd;

use crate::decode::decode_file;
use crate::formant::BurgTrack;

/// Decode an audio file and track its formants with Burg LPC.
///
/// # Example
/// ```no_run
/// use vt_audio::BurgFrontEnd;
/// use vt_core::config::FormantSettings;
/// use vt_core::traits::{AcousticFrontEnd, FormantTrack};
///
/// let track = BurgFrontEnd
///     .analyze("S001_reading.wav".as_ref(), &FormantSettings::default())
///     .unwrap();
/// println!("F1 at 0.5 s: {:?}", track.value_at(1, 0.5));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct BurgFrontEnd;

impl AcousticFrontEnd for BurgFrontEnd {
    type Track = BurgTrack;

    fn analyze(&self, path: &Path, settings: &FormantSettings) -> Result<BurgTrack> {
        let signal = decode_file(path)?;
        let track = BurgTrack::analyze(&signal, settings)
            .with_context(|| format!("Formant analysis failed for {}", path.display()))?;
        log::debug!(
            "{}: {} formant frames over {:.3}s",
            path.display(),
            track.frame_count(),
            signal.duration()
        );
        Ok(track)
    }
}
