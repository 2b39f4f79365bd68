//! Filters generator candidates down to targets that land on real characters.
//!
//! Rejected candidates are dropped silently; order is preserved and duplicates
//! are left for the filler to collapse.

use tracing::debug;

use crate::domain::{CandidateTarget, Position, Snippet, Target};

/// Position of a candidate if it is in range and not whitespace.
fn checked_position(snippet: &Snippet, cand: &CandidateTarget) -> Option<Position> {
  let line = usize::try_from(cand.line).ok()?;
  let column = usize::try_from(cand.column).ok()?;
  let pos = Position::new(line, column);
  match snippet.char_at(pos) {
    Some(ch) if !ch.is_whitespace() => Some(pos),
    _ => None,
  }
}

pub fn validate_candidates(snippet: &Snippet, candidates: &[CandidateTarget]) -> Vec<Target> {
  let accepted: Vec<Target> = candidates
    .iter()
    .filter_map(|cand| {
      checked_position(snippet, cand)
        .map(|pos| Target::new(pos, cand.optimal_keys.clone(), cand.description.clone()))
    })
    .collect();

  debug!(
    target: "challenge",
    candidates = candidates.len(),
    accepted = accepted.len(),
    "Validated generator candidates"
  );
  accepted
}
