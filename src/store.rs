//! Storage boundary: per-user weakness counters and stored test results.
//!
//! `ProgressStore` is what the engine consumes. `MemoryStore` keeps everything
//! in process behind a tokio `RwLock`; a weakness increment is applied inside a
//! single write guard, so concurrent submissions for one user never lose updates.

use std::{
  collections::{BTreeMap, HashMap},
  sync::Arc,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::engine::aggregator::{apply_delta, WeaknessCounts};

/// One saved typing or Vim test.
#[derive(Clone, Debug, Serialize)]
pub struct StoredResult {
  pub id: String,
  pub user_id: String,
  pub mode: String,
  pub language: String,
  pub wpm: f64,
  pub raw_wpm: f64,
  pub accuracy: f64,
  pub correct_chars: u64,
  pub incorrect_chars: u64,
  pub extra_chars: u64,
  pub missed_chars: u64,
  pub test_duration: f64,
  pub lines_completed: u64,
  /// Vim mode only: optimal / actual keystrokes, 0-100.
  pub efficiency: Option<f64>,
  pub created_at: DateTime<Utc>,
}

/// Optional filters for result history.
#[derive(Clone, Debug, Default)]
pub struct ResultFilter {
  pub mode: Option<String>,
  pub language: Option<String>,
}

impl ResultFilter {
  fn matches(&self, r: &StoredResult) -> bool {
    self.mode.as_deref().map_or(true, |m| r.mode == m)
      && self.language.as_deref().map_or(true, |l| r.language == l)
  }
}

/// How many of a language's fastest results feed its best/average figures.
pub const STATS_TOP_RESULTS: usize = 10;

/// Per-language summary of a user's history.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LanguageStats {
  pub best_wpm: f64,
  pub best_accuracy: f64,
  /// Every result in this language, not only the top ones.
  pub tests_count: usize,
  pub avg_wpm: f64,
}

/// Summaries keyed by language. Best and average figures use the
/// `STATS_TOP_RESULTS` fastest results of each language.
pub fn language_stats<'a>(results: impl IntoIterator<Item = &'a StoredResult>) -> BTreeMap<String, LanguageStats> {
  let mut by_language: BTreeMap<&str, Vec<&StoredResult>> = BTreeMap::new();
  for r in results {
    by_language.entry(r.language.as_str()).or_default().push(r);
  }

  by_language
    .into_iter()
    .map(|(language, mut rs)| {
      let tests_count = rs.len();
      rs.sort_by(|a, b| b.wpm.total_cmp(&a.wpm));
      rs.truncate(STATS_TOP_RESULTS);
      let stats = LanguageStats {
        best_wpm: rs[0].wpm,
        best_accuracy: rs.iter().map(|r| r.accuracy).fold(f64::MIN, f64::max),
        tests_count,
        avg_wpm: rs.iter().map(|r| r.wpm).sum::<f64>() / rs.len() as f64,
      };
      (language.to_string(), stats)
    })
    .collect()
}

pub trait ProgressStore {
  /// Atomically add `delta` to the user's cumulative counters.
  async fn increment_weakness_counters(&self, user_id: &str, delta: &WeaknessCounts);
  async fn read_weakness_profile(&self, user_id: &str) -> WeaknessCounts;
  /// Efficiency of the user's Vim-mode results, newest first.
  async fn read_recent_efficiencies(&self, user_id: &str, limit: usize) -> Vec<f64>;
  async fn save_result(&self, result: StoredResult);
  /// One page of results (newest first) plus the total matching count.
  async fn list_results(
    &self,
    user_id: &str,
    filter: &ResultFilter,
    page: usize,
    per_page: usize,
  ) -> (Vec<StoredResult>, usize);
  /// Total result count plus per-language summaries.
  async fn read_stats(&self, user_id: &str) -> (usize, BTreeMap<String, LanguageStats>);
}

#[derive(Debug, Default)]
struct UserRecord {
  weaknesses: WeaknessCounts,
  results: Vec<StoredResult>,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
  users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Results of one user, newest first.
  fn newest_first(rec: &UserRecord) -> Vec<&StoredResult> {
    let mut out: Vec<&StoredResult> = rec.results.iter().collect();
    // created_at ties keep reverse insertion order
    out.reverse();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
  }
}

impl ProgressStore for MemoryStore {
  async fn increment_weakness_counters(&self, user_id: &str, delta: &WeaknessCounts) {
    if delta.is_empty() {
      return;
    }
    let mut users = self.users.write().await;
    let rec = users.entry(user_id.to_string()).or_default();
    apply_delta(&mut rec.weaknesses, delta);
    debug!(target: "weakness", %user_id, "Weakness counters incremented");
  }

  async fn read_weakness_profile(&self, user_id: &str) -> WeaknessCounts {
    let users = self.users.read().await;
    users.get(user_id).map(|r| r.weaknesses.clone()).unwrap_or_default()
  }

  async fn read_recent_efficiencies(&self, user_id: &str, limit: usize) -> Vec<f64> {
    let users = self.users.read().await;
    let Some(rec) = users.get(user_id) else { return Vec::new() };
    Self::newest_first(rec)
      .into_iter()
      .filter(|r| r.mode == "vim")
      .filter_map(|r| r.efficiency)
      .take(limit)
      .collect()
  }

  async fn save_result(&self, result: StoredResult) {
    let mut users = self.users.write().await;
    debug!(target: "vimtrainer_backend", user_id = %result.user_id, mode = %result.mode, "Result stored");
    users.entry(result.user_id.clone()).or_default().results.push(result);
  }

  async fn list_results(
    &self,
    user_id: &str,
    filter: &ResultFilter,
    page: usize,
    per_page: usize,
  ) -> (Vec<StoredResult>, usize) {
    let users = self.users.read().await;
    let Some(rec) = users.get(user_id) else { return (Vec::new(), 0) };
    let matching: Vec<&StoredResult> =
      Self::newest_first(rec).into_iter().filter(|r| filter.matches(r)).collect();
    let total = matching.len();
    let skip = page.saturating_sub(1).saturating_mul(per_page);
    let items = matching.into_iter().skip(skip).take(per_page).cloned().collect();
    (items, total)
  }

  async fn read_stats(&self, user_id: &str) -> (usize, BTreeMap<String, LanguageStats>) {
    let users = self.users.read().await;
    let Some(rec) = users.get(user_id) else { return (0, BTreeMap::new()) };
    (rec.results.len(), language_stats(&rec.results))
  }
}
