//! Loading engine configuration (generator prompts + optional snippet bank) from TOML.
//!
//! See `EngineConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{info, error};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct EngineConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub snippets: Vec<SnippetCfg>,
}

/// Extra snippet accepted in TOML configuration, served alongside the built-in ones.
#[derive(Clone, Debug, Deserialize)]
pub struct SnippetCfg {
  pub language: String,
  pub code: String,
}

/// Prompts used by the generator client. Placeholders: `{language}`, `{count}`, `{weights}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub generator_system: String,
  pub generator_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      generator_system: "You generate Vim navigation drills over short code snippets. Respond ONLY with strict JSON.".into(),
      generator_user_template: "Write a realistic {language} snippet of 6-15 lines and pick {count} navigation targets on it. \
Motion weights (higher = practise more): {weights}. Favour targets reachable with the heavier motion categories. \
Return JSON {\"lines\": [string], \"targets\": [{\"line\": number, \"column\": number, \"optimal_keys\": string, \"description\": string}]}. \
line and column are 0-based; column counts characters; every target must sit on a non-space character; \
optimal_keys is the shortest Vim keystroke sequence from the previous target (from 0,0 for the first).".into(),
    }
  }
}

/// Attempt to load `EngineConfig` from ENGINE_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_engine_config_from_env() -> Option<EngineConfig> {
  let path = std::env::var("ENGINE_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_engine_config(&s) {
      Ok(cfg) => {
        info!(target: "vimtrainer_backend", %path, snippets = cfg.snippets.len(), "Loaded engine config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "vimtrainer_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "vimtrainer_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_engine_config(s: &str) -> Result<EngineConfig, toml::de::Error> {
  toml::from_str::<EngineConfig>(s)
}
