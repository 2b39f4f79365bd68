//! Adaptive Vim navigation engine.
//!
//! Challenge path: catalog -> validator -> filler -> assembler.
//! Weakness path: taxonomy -> aggregator, trend, weights.

pub mod aggregator;
pub mod assembler;
pub mod catalog;
pub mod filler;
pub mod taxonomy;
pub mod trend;
pub mod validator;
pub mod weights;

use crate::error::EngineError;

/// Supported range for the number of targets in one challenge.
pub const MIN_TARGETS: usize = 3;
pub const MAX_TARGETS: usize = 10;
pub const DEFAULT_TARGETS: usize = 5;

/// Below this a challenge is not meaningful practice.
pub const MIN_PLAYABLE_TARGETS: usize = 2;

/// Target count already checked against `MIN_TARGETS..=MAX_TARGETS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestedCount(usize);

impl RequestedCount {
  pub fn new(n: usize) -> Result<Self, EngineError> {
    if (MIN_TARGETS..=MAX_TARGETS).contains(&n) {
      Ok(Self(n))
    } else {
      Err(EngineError::InvalidRequestedCount(n))
    }
  }

  /// Clamp an optional client value into range (HTTP/WS query parameters).
  pub fn clamped(n: Option<usize>) -> Self {
    Self(n.unwrap_or(DEFAULT_TARGETS).clamp(MIN_TARGETS, MAX_TARGETS))
  }

  pub fn get(self) -> usize { self.0 }
}
