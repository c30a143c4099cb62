//! ABOUTME: Layered configuration for the retrieval core
//! ABOUTME: Defaults overridden by `MERIDIAN_*` environment variables

use crate::types::AuthorityContext;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Equal-weight blend of normalized lexical/semantic scores (spec.md §4.3
/// stage G). Fixed at 0.5/0.5 in v1; kept as a struct so a future redesign
/// can make the weights configurable without changing call sites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankWeights {
    pub lexical: f64,
    pub semantic: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            lexical: 0.5,
            semantic: 0.5,
        }
    }
}

/// Recognized configuration options (spec.md §6 "Configuration surface").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    pub default_top_k: usize,
    pub rank_weights: RankWeights,
    pub snippet_length: usize,
    pub embedding_model: String,
    #[serde(with = "duration_millis")]
    pub backend_timeout: Duration,
    pub default_actor: String,
    pub default_context: Option<AuthorityContext>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_top_k: 10,
            rank_weights: RankWeights::default(),
            snippet_length: 200,
            embedding_model: "unspecified-embedding-model".to_string(),
            backend_timeout: Duration::from_secs(10),
            default_actor: "system".to_string(),
            default_context: None,
        }
    }
}

impl CoreConfig {
    /// Layer environment overrides on top of defaults, mirroring the
    /// teacher's `llmspell-config` env-override convention. Only the knobs
    /// this core actually recognizes are read; anything else (transport,
    /// ingestion) is out of scope per spec.md's Non-goals.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("MERIDIAN_DEFAULT_TOP_K") {
            if let Ok(value) = raw.parse() {
                config.default_top_k = value;
            }
        }
        if let Ok(raw) = std::env::var("MERIDIAN_SNIPPET_LENGTH") {
            if let Ok(value) = raw.parse() {
                config.snippet_length = value;
            }
        }
        if let Ok(model) = std::env::var("MERIDIAN_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Ok(raw) = std::env::var("MERIDIAN_BACKEND_TIMEOUT_MS") {
            if let Ok(ms) = raw.parse() {
                config.backend_timeout = Duration::from_millis(ms);
            }
        }
        if let Ok(actor) = std::env::var("MERIDIAN_DEFAULT_ACTOR") {
            config.default_actor = actor;
        }

        config
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        #[allow(clippy::cast_possible_truncation)]
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = CoreConfig::default();
        assert_eq!(config.default_top_k, 10);
        assert_eq!(config.snippet_length, 200);
        assert!((config.rank_weights.lexical - 0.5).abs() < f64::EPSILON);
        assert!((config.rank_weights.semantic - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn env_override_of_top_k() {
        // SAFETY: test runs single-threaded for this var; still scoped narrowly.
        std::env::set_var("MERIDIAN_DEFAULT_TOP_K", "25");
        let config = CoreConfig::from_env();
        assert_eq!(config.default_top_k, 25);
        std::env::remove_var("MERIDIAN_DEFAULT_TOP_K");
    }
}
