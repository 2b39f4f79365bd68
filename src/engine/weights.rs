//! Per-motion sampling multipliers derived from cumulative weaknesses.
//! Advisory only: handed to the generator as a placement hint.

use std::collections::BTreeMap;

use super::aggregator::WeaknessCounts;
use super::taxonomy::MotionCategory;

pub type WeightVector = BTreeMap<MotionCategory, f64>;

pub const BASE_WEIGHT: f64 = 1.0;

/// Extra weight a weakness contributes at a given cumulative count.
pub fn weight_bonus(count: u64) -> f64 {
  match count {
    c if c > 10 => 3.0,
    c if c > 5 => 2.0,
    c if c > 2 => 1.0,
    _ => 0.0,
  }
}

/// All nine motion categories start at 1.0; bonuses add up when several
/// weaknesses feed the same motion category.
pub fn weight_vector(profile: &WeaknessCounts) -> WeightVector {
  let mut weights: WeightVector = MotionCategory::ALL.into_iter().map(|m| (m, BASE_WEIGHT)).collect();
  for (cat, &count) in profile {
    if let Some(w) = weights.get_mut(&cat.info().motion) {
      *w += weight_bonus(count);
    }
  }
  weights
}
