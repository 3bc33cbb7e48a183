//! Vowel-token segmentation and fixed-step sampling.
//!
//! A phone interval is a vowel token when its label starts with one of
//! [`VOWEL_INITIALS`]. Each token is resampled every `segment_window`
//! seconds, starting one window after its onset, and every sample is joined
//! with the formant values at that time and the word covering the token.

use crate::config::{BatchConfig, WordTier};
use crate::row::{DatasetRow, FileId, WORD_NOT_FOUND};
use crate::tiers::{resolve_phone_tiers, resolve_word_tier};
use crate::traits::{AlignmentGrid, FormantTrack};

/// Label initials that mark a vowel-bearing interval (glides `j`/`w` included).
pub const VOWEL_INITIALS: [char; 7] = ['a', 'e', 'i', 'o', 'u', 'j', 'w'];

/// Vowel character of `label`, or `None` if the label is not a vowel.
///
/// Only the first character is constrained; an optional `+` marker and
/// anything after it are ignored. Matching is case-sensitive.
///
/// # Example
/// ```
/// use vt_core::segment::vowel_label;
/// assert_eq!(vowel_label("o+"), Some('o'));
/// assert_eq!(vowel_label("e12"), Some('e'));
/// assert_eq!(vowel_label("p"), None);
/// assert_eq!(vowel_label(""), None);
/// ```
#[must_use]
pub fn vowel_label(label: &str) -> Option<char> {
    let first = label.chars().next()?;
    VOWEL_INITIALS.contains(&first).then_some(first)
}

/// Number of whole `window`s inside `duration` (truncated, never rounded).
///
/// Non-finite or non-positive inputs give 0.
///
/// # Example
/// ```
/// use vt_core::segment::segment_count;
/// assert_eq!(segment_count(0.045, 0.005), 9);
/// assert_eq!(segment_count(0.005, 0.005), 1);
/// assert_eq!(segment_count(0.0049, 0.005), 0);
/// ```
#[must_use]
pub fn segment_count(duration: f64, window: f64) -> usize {
    if !(duration.is_finite() && window.is_finite()) || duration <= 0.0 || window <= 0.0 {
        return 0;
    }
    (duration / window).floor() as usize
}

/// A phone interval recognised as a vowel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VowelToken {
    /// First character of the interval label.
    pub label: char,
    /// Token onset (s).
    pub start: f64,
    /// Token offset (s).
    pub end: f64,
    /// Tier the token was found on.
    pub tier: usize,
    /// Interval index on that tier.
    pub index: usize,
}

impl VowelToken {
    /// `end - start`.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Time used for the word lookup.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// `(offset, absolute time)` of every sample point, in increasing time.
    ///
    /// The k-th point (1-based) sits at `start + k * window`; the onset itself
    /// is never sampled.
    pub fn sample_times(&self, window: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
        let start = self.start;
        (1..=segment_count(self.duration(), window)).map(move |k| {
            let time = start + k as f64 * window;
            (time - start, time)
        })
    }
}

/// Vowel tokens on `tiers`, tier by tier, in interval order.
pub fn vowel_tokens<G: AlignmentGrid + ?Sized>(grid: &G, tiers: &[usize]) -> Vec<VowelToken> {
    let mut tokens = Vec::new();
    for &tier in tiers {
        for index in 0..grid.interval_count(tier) {
            let Some(interval) = grid.interval(tier, index) else {
                continue;
            };
            if interval.label.is_empty() {
                continue;
            }
            if let Some(label) = vowel_label(&interval.label) {
                tokens.push(VowelToken {
                    label,
                    start: interval.start,
                    end: interval.end,
                    tier,
                    index,
                });
            }
        }
    }
    tokens
}

/// Label of the `word_tier` interval covering `time`.
///
/// A missing tier, no covering interval and an empty label all give
/// [`WORD_NOT_FOUND`].
pub fn word_at<G: AlignmentGrid + ?Sized>(grid: &G, word_tier: Option<usize>, time: f64) -> String {
    word_tier
        .and_then(|tier| {
            let index = grid.interval_at_time(tier, time)?;
            grid.interval(tier, index)
        })
        .map(|iv| iv.label.as_str())
        .filter(|label| !label.is_empty())
        .unwrap_or(WORD_NOT_FOUND)
        .to_string()
}

/// Turns one grid + formant track into dataset rows.
///
/// # Example
/// ```
/// use vt_core::grid::{AnnotationGrid, Tier};
/// use vt_core::row::FileId;
/// use vt_core::segment::VowelSegmenter;
/// use vt_core::traits::FormantTrack;
/// use vt_core::config::WordTier;
///
/// struct Flat;
/// impl FormantTrack for Flat {
///     fn value_at(&self, formant: usize, _t: f64) -> Option<f64> {
///         Some(500.0 * formant as f64)
///     }
/// }
///
/// let grid = AnnotationGrid::new(0.0, 1.0)
///     .with_tier(Tier::new("words").with_interval("no", 0.15, 0.25))
///     .with_tier(Tier::new("phones").with_interval("o", 0.19, 0.22));
/// let seg = VowelSegmenter::new(vec!["phones".into()], WordTier::Index(0), 0.005);
/// let rows = seg.segment(&grid, &Flat, &FileId::from_stem("S001_read", 4, "_"));
/// assert_eq!(rows.len(), 6);
/// assert_eq!(rows[0].word, "no");
/// ```
#[derive(Clone, Debug)]
pub struct VowelSegmenter {
    phone_tiers: Vec<String>,
    word_tier: WordTier,
    segment_window: f64,
}

impl VowelSegmenter {
    /// Create a segmenter.
    #[must_use]
    pub fn new(phone_tiers: Vec<String>, word_tier: WordTier, segment_window: f64) -> Self {
        Self {
            phone_tiers,
            word_tier,
            segment_window,
        }
    }

    /// Create a segmenter from the batch configuration.
    #[must_use]
    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(
            config.phone_tiers.clone(),
            config.word_tier.clone(),
            config.segment_window,
        )
    }

    /// Produce every row for one file.
    pub fn segment<G, T>(&self, grid: &G, track: &T, file: &FileId) -> Vec<DatasetRow>
    where
        G: AlignmentGrid + ?Sized,
        T: FormantTrack + ?Sized,
    {
        let phone_tiers = resolve_phone_tiers(grid, &self.phone_tiers);
        if phone_tiers.is_empty() {
            log::warn!(
                "{}: aucun tier de phones parmi {:?}, fichier ignoré",
                file.stem,
                self.phone_tiers
            );
            return Vec::new();
        }

        let word_tier = resolve_word_tier(grid, &self.word_tier);
        if word_tier.is_none() {
            log::warn!(
                "{}: tier de mots {:?} introuvable, mots marqués {WORD_NOT_FOUND}",
                file.stem,
                self.word_tier
            );
        }

        let mut rows = Vec::new();
        for token in vowel_tokens(grid, &phone_tiers) {
            let word = word_at(grid, word_tier, token.midpoint());
            let vowel = token.label.to_string();
            for (offset, time) in token.sample_times(self.segment_window) {
                rows.push(DatasetRow {
                    file_id: file.stem.clone(),
                    vowel: vowel.clone(),
                    token_start: token.start,
                    time,
                    offset,
                    f1: track.value_at(1, time).unwrap_or(f64::NAN),
                    f2: track.value_at(2, time).unwrap_or(f64::NAN),
                    participant: file.participant.clone(),
                    task: file.task.clone(),
                    word: word.clone(),
                });
            }
        }

        log::debug!("{}: {} lignes", file.stem, rows.len());
        rows
    }
}
