//! Fixed weakness taxonomy: what each detected skill gap means, how to fix it,
//! and which motion category its generation weight feeds.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Groups of cursor-movement commands used for weight biasing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionCategory {
  Basic,
  Word,
  Line,
  Find,
  Search,
  Paragraph,
  Document,
  Bracket,
  Count,
}

impl MotionCategory {
  pub const ALL: [MotionCategory; 9] = [
    MotionCategory::Basic,
    MotionCategory::Word,
    MotionCategory::Line,
    MotionCategory::Find,
    MotionCategory::Search,
    MotionCategory::Paragraph,
    MotionCategory::Document,
    MotionCategory::Bracket,
    MotionCategory::Count,
  ];
}

/// A detected skill gap, recorded per test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaknessCategory {
  ExcessiveHjkl,
  MissingWordMotions,
  MissingLineMotions,
  MissingFindMotions,
  MissingSearch,
  MissingParagraphMotions,
  MissingDocumentMotions,
  MissingBracketMotions,
  MissingCountPrefix,
}

impl WeaknessCategory {
  pub const ALL: [WeaknessCategory; 9] = [
    WeaknessCategory::ExcessiveHjkl,
    WeaknessCategory::MissingWordMotions,
    WeaknessCategory::MissingLineMotions,
    WeaknessCategory::MissingFindMotions,
    WeaknessCategory::MissingSearch,
    WeaknessCategory::MissingParagraphMotions,
    WeaknessCategory::MissingDocumentMotions,
    WeaknessCategory::MissingBracketMotions,
    WeaknessCategory::MissingCountPrefix,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      WeaknessCategory::ExcessiveHjkl => "excessive_hjkl",
      WeaknessCategory::MissingWordMotions => "missing_word_motions",
      WeaknessCategory::MissingLineMotions => "missing_line_motions",
      WeaknessCategory::MissingFindMotions => "missing_find_motions",
      WeaknessCategory::MissingSearch => "missing_search",
      WeaknessCategory::MissingParagraphMotions => "missing_paragraph_motions",
      WeaknessCategory::MissingDocumentMotions => "missing_document_motions",
      WeaknessCategory::MissingBracketMotions => "missing_bracket_motions",
      WeaknessCategory::MissingCountPrefix => "missing_count_prefix",
    }
  }

  pub fn info(self) -> &'static WeaknessInfo {
    &TAXONOMY[self as usize]
  }
}

impl fmt::Display for WeaknessCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for WeaknessCategory {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    WeaknessCategory::ALL
      .into_iter()
      .find(|c| c.as_str() == s)
      .ok_or_else(|| format!("unknown weakness category: {s}"))
  }
}

/// Presentation and weighting data for one weakness category.
#[derive(Debug)]
pub struct WeaknessInfo {
  pub category: WeaknessCategory,
  pub label: &'static str,
  pub tip: &'static str,
  pub practice: &'static str,
  pub motion: MotionCategory,
}

// Indexed by `WeaknessCategory as usize`; keep in declaration order.
static TAXONOMY: [WeaknessInfo; 9] = [
  WeaknessInfo {
    category: WeaknessCategory::ExcessiveHjkl,
    label: "Over-reliance on hjkl",
    tip: "Repeated single-step moves are slow; jump with a larger motion instead.",
    practice: "Reach each target without pressing h/j/k/l more than twice in a row.",
    motion: MotionCategory::Basic,
  },
  WeaknessInfo {
    category: WeaknessCategory::MissingWordMotions,
    label: "Word motions",
    tip: "Use w, b and e to move by words instead of characters.",
    practice: "Cross each line using only w/b/e.",
    motion: MotionCategory::Word,
  },
  WeaknessInfo {
    category: WeaknessCategory::MissingLineMotions,
    label: "Line motions",
    tip: "0, ^ and $ jump to the start, first non-blank and end of a line.",
    practice: "Alternate between ^ and $ on every line of a snippet.",
    motion: MotionCategory::Line,
  },
  WeaknessInfo {
    category: WeaknessCategory::MissingFindMotions,
    label: "Find motions",
    tip: "f, t, F and T jump to a character on the current line; ; and , repeat.",
    practice: "Land on every opening parenthesis with f( and ;.",
    motion: MotionCategory::Find,
  },
  WeaknessInfo {
    category: WeaknessCategory::MissingSearch,
    label: "Search",
    tip: "/pattern and ?pattern reach distant text; n and N cycle matches.",
    practice: "Reach targets more than five lines away with / only.",
    motion: MotionCategory::Search,
  },
  WeaknessInfo {
    category: WeaknessCategory::MissingParagraphMotions,
    label: "Paragraph motions",
    tip: "{ and } hop between blank-line separated blocks.",
    practice: "Move between functions using { and } only.",
    motion: MotionCategory::Paragraph,
  },
  WeaknessInfo {
    category: WeaknessCategory::MissingDocumentMotions,
    label: "Document motions",
    tip: "gg, G and {n}G jump to the top, bottom or a given line.",
    practice: "Start every target from the top with gg and a line number.",
    motion: MotionCategory::Document,
  },
  WeaknessInfo {
    category: WeaknessCategory::MissingBracketMotions,
    label: "Bracket matching",
    tip: "% jumps between matching (), [] and {}.",
    practice: "Bounce between the ends of every block with %.",
    motion: MotionCategory::Bracket,
  },
  WeaknessInfo {
    category: WeaknessCategory::MissingCountPrefix,
    label: "Count prefixes",
    tip: "Prefix a motion with a count (5j, 3w) instead of repeating it.",
    practice: "Never press the same motion key three times in a row.",
    motion: MotionCategory::Count,
  },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  Low,
  Medium,
  High,
}

/// Severity band for a cumulative count; `None` means it is not listed at all.
pub fn severity(count: u64) -> Option<Severity> {
  match count {
    0 => None,
    1..=5 => Some(Severity::Low),
    6..=10 => Some(Severity::Medium),
    _ => Some(Severity::High),
  }
}
