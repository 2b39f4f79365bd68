//! External snippet/target generator.
//!
//! The wire payload is untyped JSON; `parse_payload` turns it into a tagged
//! `ParsedPayload` before anything downstream sees it. The shipped client talks
//! to an OpenAI-compatible chat.completions endpoint, one request per challenge.
//!
//! NOTE: We never log the API key; payload previews are truncated.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::config::Prompts;
use crate::domain::{CandidateTarget, Snippet};
use crate::engine::weights::WeightVector;
use crate::error::GenerationFailure;
use crate::util::{fill_template, trunc_for_log};

/// Decoded generator output: a snippet plus its (still untrusted) candidates.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedPayload {
  pub snippet: Snippet,
  pub candidates: Vec<CandidateTarget>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParsedPayload {
  Ok(GeneratedPayload),
  Error(String),
}

/// Decode `{ lines: [..] | code: "..", targets: [..] }`.
/// Individual candidates that fail to decode are dropped; a bad envelope is an error.
pub fn parse_payload(value: Value) -> ParsedPayload {
  let Value::Object(mut obj) = value else {
    return ParsedPayload::Error("payload is not a JSON object".into());
  };

  let snippet = match (obj.remove("lines"), obj.remove("code")) {
    (Some(Value::Array(items)), _) => {
      let mut lines = Vec::with_capacity(items.len());
      for item in items {
        match item {
          Value::String(s) => lines.push(s),
          other => return ParsedPayload::Error(format!("non-string line: {other}")),
        }
      }
      Snippet::new(lines)
    }
    (Some(_), _) => return ParsedPayload::Error("`lines` must be an array of strings".into()),
    (None, Some(Value::String(code))) => Snippet::from_code(&code),
    (None, Some(_)) => return ParsedPayload::Error("`code` must be a string".into()),
    (None, None) => return ParsedPayload::Error("missing `lines` or `code`".into()),
  };
  if snippet.is_empty() {
    return ParsedPayload::Error("snippet has no lines".into());
  }

  let candidates = match obj.remove("targets") {
    None | Some(Value::Null) => Vec::new(),
    Some(Value::Array(items)) => {
      let total = items.len();
      let decoded: Vec<CandidateTarget> = items
        .into_iter()
        .filter_map(|v| serde_json::from_value::<CandidateTarget>(v).ok())
        .collect();
      if decoded.len() < total {
        debug!(target: "challenge", dropped = total - decoded.len(), "Dropped undecodable candidates");
      }
      decoded
    }
    Some(_) => return ParsedPayload::Error("`targets` must be an array".into()),
  };

  ParsedPayload::Ok(GeneratedPayload { snippet, candidates })
}

/// Anything that can produce a candidate payload for a challenge.
pub trait TargetSource {
  async fn generate(
    &self,
    prompts: &Prompts,
    language: &str,
    count: usize,
    weights: &WeightVector,
  ) -> Result<GeneratedPayload, GenerationFailure>;
}

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// JSON-object chat completion. Generic over the target type T.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json<T: for<'a> Deserialize<'a>>(
    &self,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<T, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "vimtrainer-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(format!("OpenAI HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default();
    debug!(response = %trunc_for_log(&text, 200), "OpenAI raw response");

    serde_json::from_str::<T>(&text).map_err(|e| format!("JSON parse error: {}", e))
  }
}

impl TargetSource for OpenAI {
  #[instrument(level = "info", skip(self, prompts, language, weights), fields(%language, model = %self.model))]
  async fn generate(
    &self,
    prompts: &Prompts,
    language: &str,
    count: usize,
    weights: &WeightVector,
  ) -> Result<GeneratedPayload, GenerationFailure> {
    let weights_json = serde_json::to_string(weights).unwrap_or_else(|_| "{}".into());
    let count_s = count.to_string();
    let user = fill_template(
      &prompts.generator_user_template,
      &[("language", language), ("count", &count_s), ("weights", &weights_json)],
    );

    let start = std::time::Instant::now();
    let raw = self.chat_json::<Value>(&prompts.generator_system, &user, 0.8).await;
    let elapsed = start.elapsed();

    let value = raw.map_err(|e| {
      error!(?elapsed, error = %e, "Model call failed during challenge generation");
      GenerationFailure::Upstream(e)
    })?;

    match parse_payload(value) {
      ParsedPayload::Ok(p) => {
        info!(?elapsed, lines = p.snippet.line_count(), candidates = p.candidates.len(), "Generator payload received");
        Ok(p)
      }
      ParsedPayload::Error(reason) => {
        error!(?elapsed, %reason, "Generator payload rejected");
        Err(GenerationFailure::MalformedPayload(reason))
      }
    }
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn ok(v: Value) -> GeneratedPayload {
    match parse_payload(v) {
      ParsedPayload::Ok(p) => p,
      ParsedPayload::Error(e) => panic!("unexpected error: {e}"),
    }
  }

  #[test]
  fn lines_and_targets() {
    let p = ok(json!({
      "lines": ["ab", "cd", ""],
      "targets": [
        {"line": 0, "column": 1, "optimal_keys": "l", "description": "b"},
        {"line": 1, "col": 0}
      ]
    }));
    assert_eq!(p.snippet.line_count(), 3);
    assert_eq!(p.candidates.len(), 2);
    assert_eq!(p.candidates[1].column, 0);
    assert_eq!(p.candidates[1].optimal_keys, "");
  }

  #[test]
  fn code_string_is_split() {
    let p = ok(json!({ "code": "fn a() {}\n\nfn b() {}" }));
    assert_eq!(p.snippet.line_count(), 3);
    assert!(p.candidates.is_empty());
  }

  #[test]
  fn bad_candidates_are_dropped() {
    let p = ok(json!({
      "lines": ["abc"],
      "targets": [{"line": "zero", "column": 0}, {"column": 1}, 7, {"line": -1, "column": 2}]
    }));
    assert_eq!(p.candidates.len(), 1);
    assert_eq!(p.candidates[0].line, -1);
  }

  #[test]
  fn malformed_envelopes() {
    for v in [
      json!([1, 2]),
      json!({ "targets": [] }),
      json!({ "lines": "abc" }),
      json!({ "lines": [1] }),
      json!({ "lines": [] }),
      json!({ "lines": ["a"], "targets": {"line": 0} }),
    ] {
      assert!(matches!(parse_payload(v.clone()), ParsedPayload::Error(_)), "{v}");
    }
  }

  #[test]
  fn openai_error_body() {
    let body = r#"{"error": {"message": "quota exceeded", "type": "x"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("quota exceeded"));
    assert_eq!(extract_openai_error("<html>"), None);
  }
}
