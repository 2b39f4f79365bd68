//! Gap filling: tops a validated target list up to the exact requested count
//! with positions drawn from the snippet's catalog.

use std::collections::HashSet;

use rand::Rng;
use tracing::debug;

use crate::domain::{Position, Target};
use crate::error::GenerationFailure;

use super::MIN_PLAYABLE_TARGETS;

/// First occurrence of each position, truncated to `limit` (generator order is kept).
pub fn distinct_prefix(accepted: Vec<Target>, limit: usize) -> Vec<Target> {
  let mut seen = HashSet::new();
  accepted
    .into_iter()
    .filter(|t| seen.insert(t.position))
    .take(limit)
    .collect()
}

/// Append synthetic targets drawn uniformly without replacement from the
/// unused catalog positions until `requested` is reached.
///
/// `kept` must already be position-distinct (see `distinct_prefix`); anything
/// past `requested` is dropped.
pub fn fill_targets<R: Rng + ?Sized>(
  kept: Vec<Target>,
  catalog: &[Position],
  requested: usize,
  rng: &mut R,
) -> Result<Vec<Target>, GenerationFailure> {
  let mut targets = kept;
  targets.truncate(requested);
  if targets.len() == requested {
    return Ok(targets);
  }

  let used: HashSet<Position> = targets.iter().map(|t| t.position).collect();
  let mut available: Vec<Position> = catalog.iter().copied().filter(|p| !used.contains(p)).collect();
  // Catalog entries are already unique, but callers may pass any slice.
  let mut dedup = HashSet::new();
  available.retain(|p| dedup.insert(*p));

  let from_generator = targets.len();
  while targets.len() < requested && !available.is_empty() {
    let idx = rng.gen_range(0..available.len());
    targets.push(Target::synthetic(available.swap_remove(idx)));
  }

  debug!(
    target: "challenge",
    from_generator,
    synthetic = targets.len() - from_generator,
    requested,
    "Filled target gaps"
  );

  if targets.len() < MIN_PLAYABLE_TARGETS {
    return Err(GenerationFailure::TooFewTargets { available: targets.len() });
  }
  if targets.len() < requested {
    return Err(GenerationFailure::CatalogExhausted { requested, available: targets.len() });
  }
  Ok(targets)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::SYNTHETIC_DESCRIPTION;
  use rand::{rngs::StdRng, SeedableRng};

  fn t(line: usize, column: usize) -> Target {
    Target::new(Position::new(line, column), "keys".into(), "gen".into())
  }

  fn catalog() -> Vec<Position> {
    vec![Position::new(0, 0), Position::new(0, 1), Position::new(1, 0), Position::new(1, 1)]
  }

  #[test]
  fn truncates_without_sampling() {
    let mut rng = StdRng::seed_from_u64(7);
    let out = fill_targets(vec![t(0, 0), t(0, 1), t(1, 0), t(1, 1)], &catalog(), 3, &mut rng).unwrap();
    let positions: Vec<_> = out.iter().map(|t| t.position).collect();
    assert_eq!(positions, vec![Position::new(0, 0), Position::new(0, 1), Position::new(1, 0)]);
    assert!(out.iter().all(|t| t.description == "gen"));
  }

  #[test]
  fn fills_from_unused_positions() {
    let mut rng = StdRng::seed_from_u64(1);
    let out = fill_targets(vec![t(0, 1), t(1, 0)], &catalog(), 3, &mut rng).unwrap();
    assert_eq!(out.len(), 3);
    let extra = &out[2];
    assert!(extra.position == Position::new(0, 0) || extra.position == Position::new(1, 1));
    assert_eq!(extra.description, SYNTHETIC_DESCRIPTION);
    assert!(extra.optimal_keys.is_empty());
  }

  #[test]
  fn duplicates_collapse_before_filling() {
    let mut rng = StdRng::seed_from_u64(3);
    let kept = distinct_prefix(vec![t(0, 0), t(0, 0), t(0, 0)], 3);
    assert_eq!(kept.len(), 1);
    let out = fill_targets(kept, &catalog(), 3, &mut rng).unwrap();
    let unique: HashSet<_> = out.iter().map(|t| t.position).collect();
    assert_eq!(unique.len(), 3);
    assert_eq!(out[0].description, "gen");
  }

  #[test]
  fn same_seed_same_fill() {
    let a = fill_targets(vec![], &catalog(), 3, &mut StdRng::seed_from_u64(42)).unwrap();
    let b = fill_targets(vec![], &catalog(), 3, &mut StdRng::seed_from_u64(42)).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn empty_catalog_fails_below_floor() {
    let mut rng = StdRng::seed_from_u64(0);
    let err = fill_targets(vec![], &[], 3, &mut rng).unwrap_err();
    assert_eq!(err, GenerationFailure::TooFewTargets { available: 0 });
  }

  #[test]
  fn single_position_fails_below_floor() {
    let mut rng = StdRng::seed_from_u64(0);
    let err = fill_targets(vec![], &[Position::new(0, 0)], 3, &mut rng).unwrap_err();
    assert_eq!(err, GenerationFailure::TooFewTargets { available: 1 });
  }

  #[test]
  fn exhausted_catalog_above_floor() {
    let mut rng = StdRng::seed_from_u64(0);
    let err = fill_targets(vec![], &catalog(), 5, &mut rng).unwrap_err();
    assert_eq!(err, GenerationFailure::CatalogExhausted { requested: 5, available: 4 });
  }
}
