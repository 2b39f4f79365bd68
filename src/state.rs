//! Application state: progress store, generator client, prompts, and the snippet corpus.
//!
//! This module owns:
//!   - the in-memory progress store (weakness counters + results)
//!   - the prompts struct (from TOML or defaults)
//!   - the snippet bank (TOML entries on top of the built-in seeds)
//!   - optional generator client
//!
//! Without OPENAI_API_KEY the generator is absent and challenges are built
//! from the snippet corpus only.

use std::collections::HashMap;

use rand::{seq::SliceRandom, Rng};
use tracing::{info, instrument, warn};

use crate::config::{load_engine_config_from_env, EngineConfig, Prompts};
use crate::generator::OpenAI;
use crate::seeds::{seed_snippets, SUPPORTED_LANGUAGES};
use crate::store::MemoryStore;

pub struct AppState {
    pub store: MemoryStore,
    pub generator: Option<OpenAI>,
    pub prompts: Prompts,
    /// Extra snippets by language, from config.
    pub snippet_bank: HashMap<String, Vec<String>>,
}

impl AppState {
    /// Build state from env: load config, index the snippet bank, init the generator.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_engine_config_from_env().unwrap_or_default();

        let generator = OpenAI::from_env();
        if let Some(g) = &generator {
            info!(target: "vimtrainer_backend", base_url = %g.base_url, model = %g.model, "Generator enabled.");
        } else {
            info!(target: "vimtrainer_backend", "Generator disabled (no OPENAI_API_KEY). Using the static snippet corpus.");
        }

        Self::from_parts(cfg, generator)
    }

    pub fn from_parts(cfg: EngineConfig, generator: Option<OpenAI>) -> Self {
        let mut snippet_bank: HashMap<String, Vec<String>> = HashMap::new();
        for s in cfg.snippets {
            let language = s.language.to_lowercase();
            if !SUPPORTED_LANGUAGES.contains(&language.as_str()) {
                warn!(target: "vimtrainer_backend", %language, "Skipping bank snippet: unsupported language.");
                continue;
            }
            snippet_bank.entry(language).or_default().push(s.code);
        }
        for lang in SUPPORTED_LANGUAGES {
            let bank = snippet_bank.get(*lang).map_or(0, Vec::len);
            let seeds = seed_snippets(lang).map_or(0, <[&str]>::len);
            info!(target: "vimtrainer_backend", language = %lang, bank, seeds, "Startup snippet inventory");
        }

        Self {
            store: MemoryStore::new(),
            generator,
            prompts: cfg.prompts,
            snippet_bank,
        }
    }

    /// All snippets for a language (bank first, then seeds). `None` if unsupported.
    pub fn snippets_for(&self, language: &str) -> Option<Vec<String>> {
        let seeds = seed_snippets(language)?;
        let mut out = self.snippet_bank.get(language).cloned().unwrap_or_default();
        out.extend(seeds.iter().map(|s| s.to_string()));
        Some(out)
    }

    pub fn random_snippet<R: Rng + ?Sized>(&self, language: &str, rng: &mut R) -> Option<String> {
        self.snippets_for(language)?.choose(rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SnippetCfg;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn bank_extends_seeds_and_skips_unsupported() {
        let cfg = EngineConfig {
            prompts: Prompts::default(),
            snippets: vec![
                SnippetCfg { language: "Rust".into(), code: "fn x() {}".into() },
                SnippetCfg { language: "cobol".into(), code: "DISPLAY 'HI'.".into() },
            ],
        };
        let state = AppState::from_parts(cfg, None);
        let rust = state.snippets_for("rust").unwrap();
        assert_eq!(rust[0], "fn x() {}");
        assert_eq!(rust.len(), 1 + seed_snippets("rust").unwrap().len());
        assert!(state.snippets_for("cobol").is_none());
    }

    #[test]
    fn random_snippet_for_supported_language() {
        let state = AppState::from_parts(EngineConfig::default(), None);
        let mut rng = StdRng::seed_from_u64(9);
        assert!(state.random_snippet("go", &mut rng).is_some());
        assert!(state.random_snippet("klingon", &mut rng).is_none());
    }
}
