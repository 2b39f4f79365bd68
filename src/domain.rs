//! Domain models for the Vim navigation trainer: positions, snippets, targets, challenges.

use serde::{Deserialize, Serialize};

/// Description attached to targets the engine places on its own.
pub const SYNTHETIC_DESCRIPTION: &str = "Navigate to this position";

/// A cursor coordinate inside a snippet. Columns count chars, not bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
  pub line: usize,
  pub column: usize,
}

impl Position {
  pub fn new(line: usize, column: usize) -> Self {
    Self { line, column }
  }
}

/// Ordered lines of code shown to the user. Lines may be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snippet {
  lines: Vec<String>,
}

impl Snippet {
  pub fn new(lines: Vec<String>) -> Self {
    Self { lines }
  }

  /// Split a code block on `\n`, keeping empty lines (a trailing `\r` is dropped).
  pub fn from_code(code: &str) -> Self {
    Self::new(code.split('\n').map(|l| l.trim_end_matches('\r').to_string()).collect())
  }

  pub fn lines(&self) -> &[String] { &self.lines }
  pub fn line_count(&self) -> usize { self.lines.len() }
  pub fn is_empty(&self) -> bool { self.lines.is_empty() }

  /// Char at a position, if the position is in range.
  pub fn char_at(&self, pos: Position) -> Option<char> {
    self.lines.get(pos.line)?.chars().nth(pos.column)
  }

  pub fn code(&self) -> String { self.lines.join("\n") }

  pub fn char_count(&self) -> usize {
    self.code().chars().count()
  }
}

/// Untrusted target suggestion coming back from the generator.
/// Coordinates are signed so that negative values can be decoded and then rejected.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CandidateTarget {
  pub line: i64,
  #[serde(alias = "col")]
  pub column: i64,
  #[serde(default)] pub optimal_keys: String,
  #[serde(default)] pub description: String,
}

/// A navigation target whose position is known to be valid for its snippet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Target {
  pub position: Position,
  pub optimal_keys: String,
  pub description: String,
  pub completed: bool,
}

impl Target {
  pub(crate) fn new(position: Position, optimal_keys: String, description: String) -> Self {
    Self { position, optimal_keys, description, completed: false }
  }

  /// Target placed by the engine itself (no precomputed keys).
  pub(crate) fn synthetic(position: Position) -> Self {
    Self::new(position, String::new(), SYNTHETIC_DESCRIPTION.to_string())
  }
}

/// Final, validated navigation challenge.
#[derive(Clone, Debug, Serialize)]
pub struct Challenge {
  pub id: String,
  pub language: String,
  pub snippet: Snippet,
  pub targets: Vec<Target>,
  pub ai_generated: bool,
}
