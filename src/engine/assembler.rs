//! Challenge assembly: validate candidates, trim, fill, then re-verify the result.

use std::collections::HashSet;

use rand::Rng;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{CandidateTarget, Challenge, Snippet, Target};
use crate::error::GenerationFailure;

use super::catalog::position_catalog;
use super::filler::{distinct_prefix, fill_targets};
use super::validator::validate_candidates;
use super::RequestedCount;

/// Build a challenge with exactly `requested` distinct, non-whitespace targets.
///
/// `from_generator` marks whether `candidates` came from the external generator;
/// the result is flagged `ai_generated` only if at least one of them survived.
#[instrument(
  level = "debug",
  skip(snippet, candidates, rng),
  fields(lines = snippet.line_count(), candidates = candidates.len(), requested = requested.get())
)]
pub fn assemble_challenge<R: Rng + ?Sized>(
  language: &str,
  snippet: Snippet,
  candidates: &[CandidateTarget],
  requested: RequestedCount,
  from_generator: bool,
  rng: &mut R,
) -> Result<Challenge, GenerationFailure> {
  let n = requested.get();
  let kept = distinct_prefix(validate_candidates(&snippet, candidates), n);
  let ai_generated = from_generator && !kept.is_empty();

  let catalog = position_catalog(&snippet);
  let targets = fill_targets(kept, &catalog, n, rng)?;
  verify_targets(&snippet, &targets, n)?;

  let ch = Challenge {
    id: Uuid::new_v4().to_string(),
    language: language.to_string(),
    snippet,
    targets,
    ai_generated,
  };
  info!(target: "challenge", id = %ch.id, %language, targets = n, ai_generated, "Challenge assembled");
  Ok(ch)
}

fn verify_targets(snippet: &Snippet, targets: &[Target], requested: usize) -> Result<(), GenerationFailure> {
  if targets.len() != requested {
    return Err(GenerationFailure::Inconsistent(format!(
      "{} targets for a request of {requested}",
      targets.len()
    )));
  }
  let mut seen = HashSet::new();
  for t in targets {
    if !seen.insert(t.position) {
      return Err(GenerationFailure::Inconsistent(format!("duplicate position {:?}", t.position)));
    }
    match snippet.char_at(t.position) {
      Some(ch) if !ch.is_whitespace() => {}
      _ => return Err(GenerationFailure::Inconsistent(format!("unusable position {:?}", t.position))),
    }
  }
  Ok(())
}
