//! Runtime configuration for a [`Brain`](crate::brain::Brain).
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration:
//!
//! ```
//! use brain::config::BrainConfig;
//!
//! let config = BrainConfig::from_json(r#"{ "max_steps": 500 }"#).unwrap();
//! assert_eq!(config.max_steps, 500);
//! assert!(config.case_fold);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings that shape one turn of understanding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    /// Lower-case dictionary text during normalization.
    pub case_fold: bool,
    /// Parameters of the edit-distance similarity strategy.
    pub fuzzy: FuzzyConfig,
    /// Scheduler steps allowed per turn. Operations still queued when the
    /// budget runs out are cancelled.
    pub max_steps: usize,
    /// Upper bound on queued operations. Spawns beyond it are refused.
    pub max_pending: usize,
    /// Wall-clock budget for one turn, in milliseconds.
    pub turn_timeout_ms: Option<u64>,
    /// Reply used when no intent clears its threshold.
    pub fallback_response: Option<String>,
}

/// Parameters for fuzzy dictionary lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    pub enabled: bool,
    /// Largest edit distance still considered similar.
    pub max_distance: usize,
    /// Shorter queries only ever match exactly.
    pub min_length: usize,
}

impl Default for BrainConfig {
    fn default() -> Self {
        BrainConfig {
            case_fold: true,
            fuzzy: FuzzyConfig::default(),
            max_steps: 10_000,
            max_pending: 256,
            turn_timeout_ms: None,
            fallback_response: None,
        }
    }
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        FuzzyConfig {
            enabled: true,
            max_distance: 1,
            min_length: 4,
        }
    }
}

impl BrainConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_case_fold(mut self, case_fold: bool) -> Self {
        self.case_fold = case_fold;
        self
    }

    pub fn with_fuzzy(mut self, fuzzy: FuzzyConfig) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }

    pub fn with_turn_timeout_ms(mut self, timeout: u64) -> Self {
        self.turn_timeout_ms = Some(timeout);
        self
    }

    pub fn with_fallback_response(mut self, response: impl Into<String>) -> Self {
        self.fallback_response = Some(response.into());
        self
    }
}

impl FuzzyConfig {
    /// Fuzzy matching switched off; only exact lookups succeed.
    pub fn disabled() -> Self {
        FuzzyConfig {
            enabled: false,
            ..FuzzyConfig::default()
        }
    }
}
