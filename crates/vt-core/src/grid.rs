use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::traits::AlignmentGrid;

/// A labelled time span on one tier, in seconds.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Interval {
    /// Label text, possibly empty.
    pub label: String,
    /// Start time (s).
    pub start: f64,
    /// End time (s).
    pub end: f64,
}

impl Interval {
    /// Create a new interval.
    ///
    /// # Example
    /// ```
    /// use vt_core::grid::Interval;
    /// let iv = Interval::new("o", 0.19, 0.22);
    /// assert_eq!(iv.label, "o");
    /// ```
    #[must_use]
    pub fn new(label: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }
}

/// One named track of intervals.
///
/// Point tiers (TextTier) are kept with an empty interval list so that tier
/// indices match the source file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Tier {
    /// Tier name (not necessarily unique inside a grid).
    pub name: String,
    /// Ordered, non-overlapping intervals.
    pub intervals: Vec<Interval>,
}

impl Tier {
    /// Create an empty tier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            intervals: Vec::new(),
        }
    }

    /// Builder-style interval append.
    #[must_use]
    pub fn with_interval(mut self, label: impl Into<String>, start: f64, end: f64) -> Self {
        self.intervals.push(Interval::new(label, start, end));
        self
    }
}

/// In-memory alignment grid.
///
/// # Example
/// ```
/// use vt_core::grid::{AnnotationGrid, Tier};
/// use vt_core::traits::AlignmentGrid;
///
/// let grid = AnnotationGrid::new(0.0, 1.0)
///     .with_tier(Tier::new("words").with_interval("no", 0.15, 0.25));
/// assert_eq!(grid.tier_name(0), Some("words"));
/// assert_eq!(grid.interval_at_time(0, 0.2), Some(0));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct AnnotationGrid {
    /// Start of the annotated span (s).
    pub xmin: f64,
    /// End of the annotated span (s).
    pub xmax: f64,
    /// Tiers in file order.
    pub tiers: Vec<Tier>,
}

impl AnnotationGrid {
    /// Create an empty grid spanning `[xmin, xmax]`.
    #[must_use]
    pub fn new(xmin: f64, xmax: f64) -> Self {
        Self {
            xmin,
            xmax,
            tiers: Vec::new(),
        }
    }

    /// Builder-style tier append.
    #[must_use]
    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tiers.push(tier);
        self
    }

    /// Append an interval to an existing tier.
    ///
    /// # Errors
    /// Returns [`CoreError::TierOutOfRange`] if `tier` does not exist.
    pub fn push_interval(&mut self, tier: usize, interval: Interval) -> Result<(), CoreError> {
        let count = self.tiers.len();
        let target = self
            .tiers
            .get_mut(tier)
            .ok_or(CoreError::TierOutOfRange { index: tier, count })?;
        target.intervals.push(interval);
        Ok(())
    }
}

impl AlignmentGrid for AnnotationGrid {
    fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    fn tier_name(&self, tier: usize) -> Option<&str> {
        self.tiers.get(tier).map(|t| t.name.as_str())
    }

    fn interval_count(&self, tier: usize) -> usize {
        self.tiers.get(tier).map_or(0, |t| t.intervals.len())
    }

    fn interval(&self, tier: usize, index: usize) -> Option<&Interval> {
        self.tiers.get(tier)?.intervals.get(index)
    }
}
