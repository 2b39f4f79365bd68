//! Every non-whitespace coordinate of a snippet, in row-major order.

use crate::domain::{Position, Snippet};

pub fn position_catalog(snippet: &Snippet) -> Vec<Position> {
  snippet
    .lines()
    .iter()
    .enumerate()
    .flat_map(|(line, text)| {
      text
        .chars()
        .enumerate()
        .filter(|(_, ch)| !ch.is_whitespace())
        .map(move |(column, _)| Position::new(line, column))
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn snippet(lines: &[&str]) -> Snippet {
    Snippet::new(lines.iter().map(|l| l.to_string()).collect())
  }

  #[test]
  fn row_major_and_skips_blanks() {
    let cat = position_catalog(&snippet(&["ab", "cd", ""]));
    assert_eq!(
      cat,
      vec![Position::new(0, 0), Position::new(0, 1), Position::new(1, 0), Position::new(1, 1)]
    );
  }

  #[test]
  fn indentation_and_tabs_are_not_positions() {
    let cat = position_catalog(&snippet(&["  x", "\ty z"]));
    assert_eq!(cat, vec![Position::new(0, 2), Position::new(1, 1), Position::new(1, 3)]);
  }

  #[test]
  fn all_whitespace_is_empty() {
    assert!(position_catalog(&snippet(&[" "])).is_empty());
    assert!(position_catalog(&Snippet::default()).is_empty());
  }

  #[test]
  fn columns_count_chars() {
    let cat = position_catalog(&snippet(&["é x"]));
    assert_eq!(cat, vec![Position::new(0, 0), Position::new(0, 2)]);
  }
}
