//! Tier resolution: configured names/positions to tier indices.

use crate::config::WordTier;
use crate::traits::AlignmentGrid;

/// Indices of the tiers whose name is one of `names`, in grid order.
///
/// Duplicated tier names are all returned. An empty result is not an error:
/// the file simply yields no vowel tokens.
///
/// # Example
/// ```
/// use vt_core::grid::{AnnotationGrid, Tier};
/// use vt_core::tiers::resolve_phone_tiers;
///
/// let grid = AnnotationGrid::new(0.0, 1.0)
///     .with_tier(Tier::new("words"))
///     .with_tier(Tier::new("phones"));
/// assert_eq!(resolve_phone_tiers(&grid, &["phones".to_string()]), vec![1]);
/// ```
pub fn resolve_phone_tiers<G: AlignmentGrid + ?Sized>(grid: &G, names: &[String]) -> Vec<usize> {
    (0..grid.tier_count())
        .filter(|&i| {
            grid.tier_name(i)
                .is_some_and(|name| names.iter().any(|n| n == name))
        })
        .collect()
}

/// Index of the word tier, or `None` if it cannot be found in this grid.
///
/// # Example
/// ```
/// use vt_core::config::WordTier;
/// use vt_core::grid::{AnnotationGrid, Tier};
/// use vt_core::tiers::resolve_word_tier;
///
/// let grid = AnnotationGrid::new(0.0, 1.0)
///     .with_tier(Tier::new("phones"))
///     .with_tier(Tier::new("words"));
/// assert_eq!(resolve_word_tier(&grid, &WordTier::Index(0)), Some(0));
/// assert_eq!(resolve_word_tier(&grid, &WordTier::Name("words".into())), Some(1));
/// ```
pub fn resolve_word_tier<G: AlignmentGrid + ?Sized>(grid: &G, word_tier: &WordTier) -> Option<usize> {
    match word_tier {
        WordTier::Index(i) => (*i < grid.tier_count()).then_some(*i),
        WordTier::Name(name) => (0..grid.tier_count()).find(|&i| grid.tier_name(i) == Some(name.as_str())),
    }
}
