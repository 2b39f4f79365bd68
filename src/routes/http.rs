//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{error, info, instrument};

use crate::domain::Snippet;
use crate::engine::RequestedCount;
use crate::logic::{challenge_for_request, compute_weakness_report, submit_result};
use crate::protocol::*;
use crate::seeds::{SUPPORTED_LANGUAGES, VIM_COMMANDS};
use crate::state::AppState;
use crate::store::{ProgressStore, ResultFilter};

const DEFAULT_SNIPPETS: usize = 3;
const MAX_SNIPPETS: usize = 10;
const MIN_COMMANDS: usize = 5;
const DEFAULT_COMMANDS: usize = 10;
const DEFAULT_PER_PAGE: usize = 20;
const MAX_PER_PAGE: usize = 100;

fn unsupported_language(language: &str) -> Response {
  let msg = format!("Unsupported language '{}'. Choose from: {}", language, SUPPORTED_LANGUAGES.join(", "));
  (StatusCode::BAD_REQUEST, Json(ErrorOut { error: msg })).into_response()
}

fn language_or_default(language: Option<String>) -> String {
  language.map(|l| l.to_lowercase()).unwrap_or_else(|| "python".into())
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info")]
pub async fn http_get_languages() -> impl IntoResponse {
  Json(LanguagesOut { languages: SUPPORTED_LANGUAGES.iter().map(|l| l.to_string()).collect() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_snippet(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SnippetQuery>,
) -> Response {
  let language = language_or_default(q.language);
  let mut rng = StdRng::from_entropy();
  let Some(code) = state.random_snippet(&language, &mut rng) else {
    return unsupported_language(&language);
  };
  let snippet = SnippetBody::from(&Snippet::from_code(&code));
  Json(SnippetOut { language, snippet }).into_response()
}

/// Several distinct snippets for one session, drawn without replacement.
#[instrument(level = "info", skip(state))]
pub async fn http_get_snippets(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SnippetsQuery>,
) -> Response {
  let language = language_or_default(q.language);
  let Some(pool) = state.snippets_for(&language) else {
    return unsupported_language(&language);
  };
  let count = q.count.unwrap_or(DEFAULT_SNIPPETS).clamp(1, MAX_SNIPPETS);
  let mut rng = StdRng::from_entropy();
  let snippets: Vec<SnippetBody> = pool
    .choose_multiple(&mut rng, count)
    .map(|code| SnippetBody::from(&Snippet::from_code(code)))
    .collect();
  info!(target: "vimtrainer_backend", %language, requested = count, served = snippets.len(), "HTTP snippets served");
  Json(SnippetsOut { language, snippets }).into_response()
}

#[instrument(level = "info")]
pub async fn http_get_vim_commands(Query(q): Query<CommandsQuery>) -> impl IntoResponse {
  let count = q.count.unwrap_or(DEFAULT_COMMANDS).clamp(MIN_COMMANDS, VIM_COMMANDS.len());
  let mut rng = StdRng::from_entropy();
  let commands = VIM_COMMANDS.choose_multiple(&mut rng, count).copied().collect();
  Json(CommandsOut { commands })
}

#[instrument(level = "info", skip(state), fields(language = ?q.language, count = ?q.count))]
pub async fn http_get_challenge(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ChallengeQuery>,
) -> Response {
  let language = language_or_default(q.language);
  let requested = RequestedCount::clamped(q.count);
  let mut rng = StdRng::from_entropy();

  match challenge_for_request(&state, &language, requested, q.user_id.as_deref(), &mut rng).await {
    None => unsupported_language(&language),
    Some(Ok((ch, origin))) => {
      info!(target: "challenge", %language, id = %ch.id, %origin, targets = ch.targets.len(), "HTTP challenge served");
      Json(to_out(&ch)).into_response()
    }
    Some(Err(e)) => {
      error!(target: "challenge", %language, error = %e, "HTTP challenge generation failed");
      e.into_response()
    }
  }
}

#[instrument(level = "info", skip(state, body), fields(user_id = %body.user_id, mode = %body.mode))]
pub async fn http_post_result(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ResultIn>,
) -> impl IntoResponse {
  let (result, applied) = submit_result(&state.store, body).await;
  info!(target: "weakness", id = %result.id, user_id = %result.user_id, applied = applied.len(), "HTTP result saved");
  (
    StatusCode::CREATED,
    Json(ResultOut { message: "Result saved successfully".into(), result, applied }),
  )
}

#[instrument(level = "info", skip(state), fields(user_id = %q.user_id))]
pub async fn http_get_results(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ResultsQuery>,
) -> impl IntoResponse {
  let page = q.page.unwrap_or(1).max(1);
  let per_page = q.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
  let filter = ResultFilter { mode: q.mode, language: q.language };
  let (results, total) = state.store.list_results(&q.user_id, &filter, page, per_page).await;
  Json(ResultsOut { results, total, pages: total.div_ceil(per_page), current_page: page })
}

#[instrument(level = "info", skip(state), fields(user_id = %q.user_id))]
pub async fn http_get_stats(
  State(state): State<Arc<AppState>>,
  Query(q): Query<UserQuery>,
) -> impl IntoResponse {
  let (tests_completed, stats_by_language) = state.store.read_stats(&q.user_id).await;
  Json(StatsOut { user_id: q.user_id, tests_completed, stats_by_language })
}

#[instrument(level = "info", skip(state), fields(user_id = %q.user_id))]
pub async fn http_get_weaknesses(
  State(state): State<Arc<AppState>>,
  Query(q): Query<UserQuery>,
) -> impl IntoResponse {
  Json(compute_weakness_report(&state.store, &q.user_id).await)
}
