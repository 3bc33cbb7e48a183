use std::path::Path;

use anyhow::Result;

use crate::config::FormantSettings;
use crate::grid::Interval;

/// Lecture d'une grille d'alignement multi-tiers.
///
/// Implémenté par : `AnnotationGrid` (en mémoire, produit par le lecteur TextGrid).
///
/// # Example
/// ```
/// use vt_core::traits::AlignmentGrid;
/// use vt_core::grid::Interval;
///
/// struct Empty;
/// impl AlignmentGrid for Empty {
///     fn tier_count(&self) -> usize { 0 }
///     fn tier_name(&self, _tier: usize) -> Option<&str> { None }
///     fn interval_count(&self, _tier: usize) -> usize { 0 }
///     fn interval(&self, _tier: usize, _index: usize) -> Option<&Interval> { None }
/// }
/// assert_eq!(Empty.interval_at_time(0, 1.0), None);
/// ```
pub trait AlignmentGrid {
    /// Nombre de tiers dans la grille.
    fn tier_count(&self) -> usize;

    /// Nom du tier `tier`, `None` hors limites.
    fn tier_name(&self, tier: usize) -> Option<&str>;

    /// Nombre d'intervalles du tier (0 hors limites ou pour un tier de points).
    fn interval_count(&self, tier: usize) -> usize;

    /// Intervalle `index` du tier `tier`.
    fn interval(&self, tier: usize, index: usize) -> Option<&Interval>;

    /// Index of the interval on `tier` that contains `time`.
    ///
    /// An interval contains `time` when `start <= time < end`; the last
    /// interval also contains its own `end`. Intervals are assumed ordered and
    /// non-overlapping, which lets the default implementation binary-search.
    fn interval_at_time(&self, tier: usize, time: f64) -> Option<usize> {
        let count = self.interval_count(tier);
        if count == 0 || !time.is_finite() {
            return None;
        }

        // First interval whose end is strictly after `time`.
        let (mut lo, mut hi) = (0, count);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.interval(tier, mid) {
                Some(iv) if iv.end <= time => lo = mid + 1,
                Some(_) => hi = mid,
                None => return None,
            }
        }

        if lo < count {
            let iv = self.interval(tier, lo)?;
            return (iv.start <= time).then_some(lo);
        }
        // time >= end of the last interval: only an exact hit on the end counts
        let last = self.interval(tier, count - 1)?;
        (time == last.end).then_some(count - 1)
    }
}

/// Charge une grille d'alignement depuis un fichier.
pub trait GridReader: Send + Sync {
    /// Type de grille produit.
    type Grid: AlignmentGrid;

    /// Load the grid stored at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is malformed.
    fn load(&self, path: &Path) -> Result<Self::Grid>;
}

/// Trajectoire de formants interrogeable dans le temps.
pub trait FormantTrack {
    /// Value of formant `formant` (1 = F1, 2 = F2, ...) at `time`, in Hz.
    ///
    /// `None` when the value is undefined (signal edge, no candidate found).
    fn value_at(&self, formant: usize, time: f64) -> Option<f64>;
}

/// Front-end acoustique : transforme un fichier audio en trajectoire de formants.
///
/// Les paramètres de [`FormantSettings`] sont transmis tels quels.
pub trait AcousticFrontEnd: Send + Sync {
    /// Type de trajectoire produit.
    type Track: FormantTrack;

    /// Analyse the audio file at `path`.
    ///
    /// # Errors
    /// Returns an error if the audio cannot be decoded or analysed.
    fn analyze(&self, path: &Path, settings: &FormantSettings) -> Result<Self::Track>;
}
