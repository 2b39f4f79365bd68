//! Turns a per-test weakness tally into an increment for the user's cumulative
//! counters, and renders those counters for display.
//!
//! The store applies increments; this module never reads-then-writes.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::taxonomy::{severity, MotionCategory, Severity, WeaknessCategory};

/// Counts keyed by the closed weakness taxonomy (profile or per-test delta).
pub type WeaknessCounts = BTreeMap<WeaknessCategory, u64>;

/// Parse a submitted tally. Unknown categories, non-positive counts and values
/// that are not whole numbers are skipped.
pub fn weakness_delta(submitted: &HashMap<String, Value>) -> WeaknessCounts {
  let mut delta = WeaknessCounts::new();
  for (name, raw) in submitted {
    let Ok(cat) = name.parse::<WeaknessCategory>() else {
      debug!(target: "weakness", category = %name, "Ignoring unknown weakness category");
      continue;
    };
    let Some(count) = tally_count(raw) else {
      debug!(target: "weakness", category = %name, value = %raw, "Ignoring non-integer weakness count");
      continue;
    };
    if count == 0 { continue; }
    let slot = delta.entry(cat).or_insert(0);
    *slot = slot.saturating_add(count);
  }
  delta
}

/// Non-negative whole number, accepting integral floats such as `2.0`.
fn tally_count(raw: &Value) -> Option<u64> {
  if let Some(n) = raw.as_u64() {
    return Some(n);
  }
  let f = raw.as_f64()?;
  (f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}

/// Add `delta` onto `profile`. Categories not in `delta` are untouched.
pub fn apply_delta(profile: &mut WeaknessCounts, delta: &WeaknessCounts) {
  for (&cat, &n) in delta {
    let slot = profile.entry(cat).or_insert(0);
    *slot = slot.saturating_add(n);
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeaknessDetail {
  pub category: WeaknessCategory,
  pub label: &'static str,
  pub count: u64,
  pub severity: Severity,
  pub tip: &'static str,
  pub practice: &'static str,
  pub motion: MotionCategory,
}

/// Listed weaknesses, most frequent first. Zero counts are omitted.
pub fn weakness_details(profile: &WeaknessCounts) -> Vec<WeaknessDetail> {
  let mut out: Vec<WeaknessDetail> = profile
    .iter()
    .filter_map(|(cat, &count)| {
      let severity = severity(count)?;
      let info = cat.info();
      Some(WeaknessDetail {
        category: info.category,
        label: info.label,
        count,
        severity,
        tip: info.tip,
        practice: info.practice,
        motion: info.motion,
      })
    })
    .collect();
  // stable: ties keep taxonomy order
  out.sort_by(|a, b| b.count.cmp(&a.count));
  out
}
