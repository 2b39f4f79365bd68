//! Caller-facing operations shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Generating a challenge through the external generator (with weakness hints)
//!   - Building a static challenge when no generator is configured
//!   - Saving results and aggregating their weakness tallies
//!   - Computing the weakness report (trend, details, weights)

use std::collections::HashMap;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::Prompts;
use crate::domain::{Challenge, Snippet};
use crate::engine::aggregator::{weakness_delta, weakness_details, WeaknessCounts, WeaknessDetail};
use crate::engine::assembler::assemble_challenge;
use crate::engine::trend::{efficiency_trend, EFFICIENCY_WINDOW};
use crate::engine::weights::{weight_vector, WeightVector};
use crate::engine::RequestedCount;
use crate::error::EngineError;
use crate::generator::TargetSource;
use crate::protocol::ResultIn;
use crate::seeds::seed_snippets;
use crate::state::AppState;
use crate::store::{ProgressStore, StoredResult};

/// One attempt against the generator, validated and filled to exactly `requested` targets.
/// No retry: any generator failure is returned as-is.
#[instrument(level = "info", skip(source, prompts, hints, rng))]
pub async fn generate_challenge<S: TargetSource, R: Rng + ?Sized>(
  source: Option<&S>,
  prompts: &Prompts,
  language: &str,
  requested: usize,
  hints: &WeightVector,
  rng: &mut R,
) -> Result<Challenge, EngineError> {
  let count = RequestedCount::new(requested)?;
  let source = source.ok_or(EngineError::ConfigurationUnavailable)?;

  let payload = source.generate(prompts, language, count.get(), hints).await?;
  let ch = assemble_challenge(language, payload.snippet, &payload.candidates, count, true, rng)?;
  Ok(ch)
}

/// Fully synthetic challenge over a corpus snippet. `None` for an unsupported language.
#[instrument(level = "info", skip(state, rng), fields(requested = requested.get()))]
pub fn static_challenge<R: Rng + ?Sized>(
  state: &AppState,
  language: &str,
  requested: RequestedCount,
  rng: &mut R,
) -> Option<Result<Challenge, EngineError>> {
  let code = state.random_snippet(language, rng)?;
  let result = assemble_challenge(language, Snippet::from_code(&code), &[], requested, false, rng)
    .map_err(EngineError::from);
  Some(result)
}

/// Challenge for a request: generator first, static corpus when no generator is configured.
/// `None` when the language is unsupported, whichever path would have served it.
pub async fn challenge_for_request<R: Rng + Send>(
  state: &AppState,
  language: &str,
  requested: RequestedCount,
  user_id: Option<&str>,
  rng: &mut R,
) -> Option<Result<(Challenge, &'static str), EngineError>> {
  if seed_snippets(language).is_none() {
    warn!(target: "challenge", %language, "Unsupported language requested");
    return None;
  }

  let hints = match user_id {
    Some(uid) => weight_vector(&state.store.read_weakness_profile(uid).await),
    None => weight_vector(&WeaknessCounts::new()),
  };

  match generate_challenge(state.generator.as_ref(), &state.prompts, language, requested.get(), &hints, rng).await {
    Ok(ch) => Some(Ok((ch, "generated"))),
    Err(EngineError::ConfigurationUnavailable) => {
      warn!(target: "challenge", %language, "Generator not configured; serving static snippet");
      static_challenge(state, language, requested, rng).map(|r| r.map(|ch| (ch, "static_corpus")))
    }
    Err(e) => Some(Err(e)),
  }
}

/// Parse a tally and hand the increment to the store. Returns what was applied.
#[instrument(level = "info", skip(store, tally), fields(%user_id, submitted = tally.len()))]
pub async fn classify_and_aggregate<S: ProgressStore>(
  store: &S,
  user_id: &str,
  tally: &HashMap<String, Value>,
) -> WeaknessCounts {
  let delta = weakness_delta(tally);
  store.increment_weakness_counters(user_id, &delta).await;
  info!(target: "weakness", %user_id, categories = delta.len(), "Weakness tally aggregated");
  delta
}

/// Store a finished test and aggregate its weaknesses, if any.
#[instrument(level = "info", skip(store, body), fields(user_id = %body.user_id, mode = %body.mode))]
pub async fn submit_result<S: ProgressStore>(store: &S, body: ResultIn) -> (StoredResult, WeaknessCounts) {
  let applied = match &body.weaknesses {
    Some(tally) => classify_and_aggregate(store, &body.user_id, tally).await,
    None => WeaknessCounts::new(),
  };

  let result = StoredResult {
    id: Uuid::new_v4().to_string(),
    user_id: body.user_id,
    mode: body.mode,
    language: body.language,
    wpm: body.wpm,
    raw_wpm: body.raw_wpm,
    accuracy: body.accuracy,
    correct_chars: body.correct_chars,
    incorrect_chars: body.incorrect_chars,
    extra_chars: body.extra_chars,
    missed_chars: body.missed_chars,
    test_duration: body.test_duration,
    lines_completed: body.lines_completed,
    efficiency: body.efficiency.map(|e| e.clamp(0.0, 100.0)),
    created_at: Utc::now(),
  };
  store.save_result(result.clone()).await;
  (result, applied)
}

#[derive(Clone, Debug, Serialize)]
pub struct WeaknessReport {
  pub avg_efficiency: f64,
  pub trend: f64,
  pub tests_analyzed: usize,
  pub weaknesses: Vec<WeaknessDetail>,
  pub weights: WeightVector,
}

#[instrument(level = "info", skip(store), fields(%user_id))]
pub async fn compute_weakness_report<S: ProgressStore>(store: &S, user_id: &str) -> WeaknessReport {
  let efficiencies = store.read_recent_efficiencies(user_id, EFFICIENCY_WINDOW).await;
  let profile = store.read_weakness_profile(user_id).await;
  let trend = efficiency_trend(&efficiencies);

  let report = WeaknessReport {
    avg_efficiency: trend.average,
    trend: trend.trend,
    tests_analyzed: efficiencies.len(),
    weaknesses: weakness_details(&profile),
    weights: weight_vector(&profile),
  };
  info!(
    target: "weakness",
    %user_id,
    avg = report.avg_efficiency,
    trend = report.trend,
    listed = report.weaknesses.len(),
    "Weakness report computed"
  );
  report
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::EngineConfig;
  use crate::domain::CandidateTarget;
  use crate::engine::taxonomy::{MotionCategory, Severity, WeaknessCategory};
  use crate::error::GenerationFailure;
  use crate::generator::{GeneratedPayload, OpenAI};
  use crate::store::MemoryStore;
  use rand::{rngs::StdRng, SeedableRng};
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::{Arc, Mutex};

  /// Canned generator that records the hints it was given.
  struct FakeSource {
    reply: Result<GeneratedPayload, GenerationFailure>,
    seen_weights: Mutex<Option<WeightVector>>,
  }

  impl FakeSource {
    fn new(reply: Result<GeneratedPayload, GenerationFailure>) -> Self {
      Self { reply, seen_weights: Mutex::new(None) }
    }
  }

  impl TargetSource for FakeSource {
    async fn generate(
      &self,
      _prompts: &Prompts,
      _language: &str,
      _count: usize,
      weights: &WeightVector,
    ) -> Result<GeneratedPayload, GenerationFailure> {
      *self.seen_weights.lock().unwrap() = Some(weights.clone());
      self.reply.clone()
    }
  }

  fn payload(lines: &[&str], cands: &[(i64, i64)]) -> GeneratedPayload {
    GeneratedPayload {
      snippet: Snippet::new(lines.iter().map(|l| l.to_string()).collect()),
      candidates: cands
        .iter()
        .map(|&(line, column)| CandidateTarget { line, column, optimal_keys: "j".into(), description: String::new() })
        .collect(),
    }
  }

  fn vim_result(user: &str, efficiency: f64, weaknesses: &[(&str, i64)]) -> ResultIn {
    ResultIn {
      user_id: user.into(),
      mode: "vim".into(),
      language: "python".into(),
      wpm: 30.0,
      raw_wpm: 31.0,
      accuracy: 99.0,
      correct_chars: 50,
      incorrect_chars: 1,
      extra_chars: 0,
      missed_chars: 0,
      test_duration: 20.0,
      lines_completed: 3,
      efficiency: Some(efficiency),
      weaknesses: Some(weaknesses.iter().map(|(k, v)| (k.to_string(), serde_json::json!(v))).collect()),
    }
  }

  #[tokio::test]
  async fn generated_challenge_has_exact_count() {
    let src = FakeSource::new(Ok(payload(&["ab", "cd", ""], &[(0, 1), (5, 0), (1, 0)])));
    let mut rng = StdRng::seed_from_u64(1);
    let hints = weight_vector(&WeaknessCounts::new());
    let ch = generate_challenge(Some(&src), &Prompts::default(), "python", 3, &hints, &mut rng)
      .await
      .unwrap();
    assert_eq!(ch.targets.len(), 3);
    assert!(ch.ai_generated);
  }

  #[tokio::test]
  async fn missing_generator_is_configuration_unavailable() {
    let mut rng = StdRng::seed_from_u64(1);
    let hints = weight_vector(&WeaknessCounts::new());
    let err = generate_challenge(None::<&FakeSource>, &Prompts::default(), "python", 3, &hints, &mut rng)
      .await
      .unwrap_err();
    assert_eq!(err, EngineError::ConfigurationUnavailable);
  }

  #[tokio::test]
  async fn count_is_checked_before_generation() {
    let src = FakeSource::new(Ok(payload(&["abcdef"], &[])));
    let mut rng = StdRng::seed_from_u64(1);
    let hints = weight_vector(&WeaknessCounts::new());
    let err = generate_challenge(Some(&src), &Prompts::default(), "python", 12, &hints, &mut rng)
      .await
      .unwrap_err();
    assert_eq!(err, EngineError::InvalidRequestedCount(12));
    assert!(src.seen_weights.lock().unwrap().is_none());
  }

  #[tokio::test]
  async fn upstream_failure_is_passed_through() {
    let src = FakeSource::new(Err(GenerationFailure::Upstream("timeout".into())));
    let mut rng = StdRng::seed_from_u64(1);
    let hints = weight_vector(&WeaknessCounts::new());
    let err = generate_challenge(Some(&src), &Prompts::default(), "python", 3, &hints, &mut rng)
      .await
      .unwrap_err();
    assert_eq!(err, EngineError::GenerationFailure(GenerationFailure::Upstream("timeout".into())));
  }

  #[tokio::test]
  async fn whitespace_payload_fails() {
    let src = FakeSource::new(Ok(payload(&[" "], &[])));
    let mut rng = StdRng::seed_from_u64(1);
    let hints = weight_vector(&WeaknessCounts::new());
    let err = generate_challenge(Some(&src), &Prompts::default(), "python", 3, &hints, &mut rng)
      .await
      .unwrap_err();
    assert!(matches!(err, EngineError::GenerationFailure(GenerationFailure::TooFewTargets { .. })));
  }

  #[tokio::test]
  async fn hints_reach_the_generator() {
    let src = FakeSource::new(Ok(payload(&["abcdef"], &[])));
    let profile = WeaknessCounts::from([(WeaknessCategory::MissingFindMotions, 7)]);
    let hints = weight_vector(&profile);
    let mut rng = StdRng::seed_from_u64(1);
    generate_challenge(Some(&src), &Prompts::default(), "rust", 4, &hints, &mut rng).await.unwrap();
    let seen = src.seen_weights.lock().unwrap().clone().unwrap();
    assert_eq!(seen[&MotionCategory::Find], 3.0);
  }

  #[tokio::test]
  async fn static_fallback_without_generator() {
    let state = AppState::from_parts(EngineConfig::default(), None);
    let mut rng = StdRng::seed_from_u64(2);
    let (ch, origin) = challenge_for_request(&state, "go", RequestedCount::clamped(Some(4)), None, &mut rng)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(origin, "static_corpus");
    assert_eq!(ch.targets.len(), 4);
    assert!(!ch.ai_generated);

    let unsupported = challenge_for_request(&state, "cobol", RequestedCount::clamped(None), None, &mut rng).await;
    assert!(unsupported.is_none());
  }

  /// Local OpenAI-compatible endpoint that always answers with one python snippet.
  async fn mock_generator(hits: Arc<AtomicUsize>) -> OpenAI {
    use axum::{routing::post, Json, Router};

    let app = Router::new().route(
      "/chat/completions",
      post(move || {
        let hits = hits.clone();
        async move {
          hits.fetch_add(1, Ordering::SeqCst);
          let content = serde_json::json!({
            "lines": ["def add(a, b):", "    return a + b"],
            "targets": [{"line": 0, "column": 4, "optimal_keys": "w", "description": "name"}]
          });
          Json(serde_json::json!({
            "choices": [{"message": {"content": content.to_string()}}]
          }))
        }
      }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    OpenAI {
      client: reqwest::Client::new(),
      api_key: "test-key".into(),
      base_url: format!("http://{addr}"),
      model: "mock".into(),
    }
  }

  #[tokio::test]
  async fn unsupported_language_is_rejected_with_a_generator() {
    let hits = Arc::new(AtomicUsize::new(0));
    let state = AppState::from_parts(EngineConfig::default(), Some(mock_generator(hits.clone()).await));
    let mut rng = StdRng::seed_from_u64(4);

    let cobol = challenge_for_request(&state, "cobol", RequestedCount::clamped(Some(3)), None, &mut rng).await;
    assert!(cobol.is_none());
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let (ch, origin) = challenge_for_request(&state, "python", RequestedCount::clamped(Some(3)), None, &mut rng)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(origin, "generated");
    assert_eq!(ch.targets.len(), 3);
    assert_eq!(ch.targets[0].position, crate::domain::Position::new(0, 4));
    assert!(ch.ai_generated);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn empty_user_report() {
    let store = MemoryStore::new();
    let report = compute_weakness_report(&store, "nobody").await;
    assert_eq!(report.avg_efficiency, 0.0);
    assert_eq!(report.trend, 0.0);
    assert!(report.weaknesses.is_empty());
    assert!(report.weights.values().all(|&w| w == 1.0));
  }

  #[tokio::test]
  async fn repeated_word_weakness_becomes_high() {
    let store = MemoryStore::new();
    submit_result(&store, vim_result("u1", 70.0, &[("missing_word_motions", 6)])).await;
    submit_result(&store, vim_result("u1", 75.0, &[("missing_word_motions", 6)])).await;

    let report = compute_weakness_report(&store, "u1").await;
    assert_eq!(report.weaknesses.len(), 1);
    assert_eq!(report.weaknesses[0].category, WeaknessCategory::MissingWordMotions);
    assert_eq!(report.weaknesses[0].count, 12);
    assert_eq!(report.weaknesses[0].severity, Severity::High);
    assert_eq!(report.weights[&MotionCategory::Word], 4.0);
    assert_eq!(report.avg_efficiency, 72.5);
    assert_eq!(report.tests_analyzed, 2);
  }

  #[tokio::test]
  async fn unknown_categories_do_not_fail_submission() {
    let store = MemoryStore::new();
    let (saved, applied) =
      submit_result(&store, vim_result("u2", 150.0, &[("missing_teleport", 3), ("missing_search", 2)])).await;
    assert_eq!(saved.efficiency, Some(100.0));
    assert_eq!(applied.len(), 1);
    assert_eq!(store.read_weakness_profile("u2").await[&WeaknessCategory::MissingSearch], 2);
  }

  #[tokio::test]
  async fn trend_over_stored_history() {
    let store = MemoryStore::new();
    // oldest first, so the newest-first view is 80, 82, 85, 90, 91, 70, 71, 69, 68, 72, 60, 65
    for e in [65.0, 60.0, 72.0, 68.0, 69.0, 71.0, 70.0, 91.0, 90.0, 85.0, 82.0, 80.0] {
      submit_result(&store, vim_result("u3", e, &[])).await;
    }
    let report = compute_weakness_report(&store, "u3").await;
    assert_eq!(report.trend, 15.6);
    assert_eq!(report.tests_analyzed, 12);
  }
}
