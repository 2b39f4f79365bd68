//! Error taxonomy for challenge generation and its HTTP translation.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use thiserror::Error;

use crate::engine::{MAX_TARGETS, MIN_TARGETS};
use crate::protocol::ErrorOut;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
  /// No generation service configured; callers fall back to static content.
  #[error("generation service is not configured")]
  ConfigurationUnavailable,

  #[error("challenge generation failed: {0}")]
  GenerationFailure(#[from] GenerationFailure),

  #[error("requested target count {0} is outside {min}..={max}", min = MIN_TARGETS, max = MAX_TARGETS)]
  InvalidRequestedCount(usize),
}

/// Why a single generation attempt produced no challenge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
  #[error("generator request failed: {0}")]
  Upstream(String),

  #[error("malformed generator payload: {0}")]
  MalformedPayload(String),

  #[error("only {available} distinct target position(s) available; at least 2 are required")]
  TooFewTargets { available: usize },

  #[error("snippet offers {available} distinct target position(s) but {requested} were requested")]
  CatalogExhausted { requested: usize, available: usize },

  #[error("assembled targets are inconsistent: {0}")]
  Inconsistent(String),
}

impl EngineError {
  pub fn status(&self) -> StatusCode {
    match self {
      EngineError::ConfigurationUnavailable => StatusCode::SERVICE_UNAVAILABLE,
      EngineError::GenerationFailure(_) => StatusCode::BAD_GATEWAY,
      EngineError::InvalidRequestedCount(_) => StatusCode::BAD_REQUEST,
    }
  }
}

impl IntoResponse for EngineError {
  fn into_response(self) -> Response {
    (self.status(), Json(ErrorOut { error: self.to_string() })).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statuses_follow_error_kind() {
    assert_eq!(EngineError::ConfigurationUnavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(EngineError::InvalidRequestedCount(42).status(), StatusCode::BAD_REQUEST);
    let e: EngineError = GenerationFailure::TooFewTargets { available: 1 }.into();
    assert_eq!(e.status(), StatusCode::BAD_GATEWAY);
  }

  #[test]
  fn messages_name_the_bounds() {
    let msg = EngineError::InvalidRequestedCount(11).to_string();
    assert!(msg.contains("11") && msg.contains("3..=10"), "{msg}");
  }
}
