//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Challenge, Snippet, Target};
use crate::engine::aggregator::WeaknessCounts;
use crate::logic::WeaknessReport;
use crate::seeds::VimCommand;
use crate::store::{LanguageStats, StoredResult};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    NewChallenge {
        #[serde(default)]
        language: Option<String>,
        #[serde(default)]
        count: Option<usize>,
        #[serde(default, rename = "userId")]
        user_id: Option<String>,
    },
    SubmitResult(ResultIn),
    WeaknessReport {
        #[serde(rename = "userId")]
        user_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Challenge {
        challenge: ChallengeOut,
    },
    ResultSaved {
        result: StoredResult,
        applied: WeaknessCounts,
    },
    WeaknessReport {
        report: WeaknessReport,
    },
    Error {
        message: String,
    },
}

/// DTO used by both WS and HTTP for challenge delivery.
#[derive(Debug, Serialize)]
pub struct ChallengeOut {
    pub id: String,
    pub language: String,
    pub lines: Vec<String>,
    pub targets: Vec<TargetOut>,
    pub ai_generated: bool,
}

#[derive(Debug, Serialize)]
pub struct TargetOut {
    pub line: usize,
    pub column: usize,
    pub optimal_keys: String,
    pub description: String,
    pub completed: bool,
}

impl From<&Target> for TargetOut {
    fn from(t: &Target) -> Self {
        Self {
            line: t.position.line,
            column: t.position.column,
            optimal_keys: t.optimal_keys.clone(),
            description: t.description.clone(),
            completed: t.completed,
        }
    }
}

/// Convert the internal `Challenge` to the public DTO.
pub fn to_out(c: &Challenge) -> ChallengeOut {
    ChallengeOut {
        id: c.id.clone(),
        language: c.language.clone(),
        lines: c.snippet.lines().to_vec(),
        targets: c.targets.iter().map(TargetOut::from).collect(),
        ai_generated: c.ai_generated,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct ChallengeQuery {
    pub language: Option<String>,
    pub count: Option<usize>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

fn default_language() -> String {
    "python".into()
}

/// A finished test as submitted by the client.
#[derive(Debug, Deserialize)]
pub struct ResultIn {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub mode: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub wpm: f64,
    pub raw_wpm: f64,
    pub accuracy: f64,
    pub correct_chars: u64,
    pub incorrect_chars: u64,
    #[serde(default)]
    pub extra_chars: u64,
    #[serde(default)]
    pub missed_chars: u64,
    pub test_duration: f64,
    #[serde(default)]
    pub lines_completed: u64,
    #[serde(default)]
    pub efficiency: Option<f64>,
    /// Per-test weakness tally, keyed by category name. Values stay raw so one
    /// bad entry cannot reject the whole result.
    #[serde(default)]
    pub weaknesses: Option<HashMap<String, Value>>,
}

#[derive(Serialize)]
pub struct ResultOut {
    pub message: String,
    pub result: StoredResult,
    pub applied: WeaknessCounts,
}

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub mode: Option<String>,
    pub language: Option<String>,
}

#[derive(Serialize)]
pub struct ResultsOut {
    pub results: Vec<StoredResult>,
    pub total: usize,
    pub pages: usize,
    pub current_page: usize,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Serialize)]
pub struct LanguagesOut {
    pub languages: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SnippetQuery {
    pub language: Option<String>,
}

/// One snippet as shown to the client.
#[derive(Serialize)]
pub struct SnippetBody {
    pub code: String,
    pub lines: Vec<String>,
    pub line_count: usize,
    pub char_count: usize,
}

impl From<&Snippet> for SnippetBody {
    fn from(s: &Snippet) -> Self {
        Self {
            code: s.code(),
            lines: s.lines().to_vec(),
            line_count: s.line_count(),
            char_count: s.char_count(),
        }
    }
}

#[derive(Serialize)]
pub struct SnippetOut {
    pub language: String,
    #[serde(flatten)]
    pub snippet: SnippetBody,
}

#[derive(Debug, Deserialize)]
pub struct SnippetsQuery {
    pub language: Option<String>,
    pub count: Option<usize>,
}

#[derive(Serialize)]
pub struct SnippetsOut {
    pub language: String,
    pub snippets: Vec<SnippetBody>,
}

#[derive(Serialize)]
pub struct StatsOut {
    pub user_id: String,
    pub tests_completed: usize,
    pub stats_by_language: BTreeMap<String, LanguageStats>,
}

#[derive(Debug, Deserialize)]
pub struct CommandsQuery {
    pub count: Option<usize>,
}

#[derive(Serialize)]
pub struct CommandsOut {
    pub commands: Vec<VimCommand>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_in_defaults() {
        let r: ResultIn = serde_json::from_str(
            r#"{"userId":"u1","mode":"vim","wpm":40,"raw_wpm":44,"accuracy":97.5,
                "correct_chars":120,"incorrect_chars":3,"test_duration":31.2}"#,
        )
        .unwrap();
        assert_eq!(r.language, "python");
        assert_eq!(r.extra_chars, 0);
        assert!(r.efficiency.is_none() && r.weaknesses.is_none());
    }

    #[test]
    fn odd_tally_values_do_not_reject_the_result() {
        let r: ResultIn = serde_json::from_str(
            r#"{"userId":"u1","mode":"vim","wpm":40,"raw_wpm":44,"accuracy":97.5,
                "correct_chars":120,"incorrect_chars":3,"test_duration":31.2,
                "weaknesses":{"future_thing":1.5,"missing_search":2,"missing_find_motions":null}}"#,
        )
        .unwrap();
        assert_eq!(r.weaknesses.map(|w| w.len()), Some(3));
    }

    #[test]
    fn result_in_requires_core_fields() {
        let r = serde_json::from_str::<ResultIn>(r#"{"userId":"u1","mode":"vim","wpm":40}"#);
        assert!(r.is_err());
    }

    #[test]
    fn ws_messages_are_tagged() {
        let m: ClientWsMessage =
            serde_json::from_str(r#"{"type":"new_challenge","language":"rust","count":4}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::NewChallenge { count: Some(4), .. }));

        let m: ClientWsMessage = serde_json::from_str(
            r#"{"type":"submit_result","userId":"u1","mode":"vim","wpm":1,"raw_wpm":1,"accuracy":1,
                "correct_chars":1,"incorrect_chars":0,"test_duration":1,"weaknesses":{"missing_search":2}}"#,
        )
        .unwrap();
        assert!(matches!(m, ClientWsMessage::SubmitResult(ResultIn { ref user_id, .. }) if user_id == "u1"));

        let out = serde_json::to_value(ServerWsMessage::Pong).unwrap();
        assert_eq!(out["type"], "pong");
    }
}
