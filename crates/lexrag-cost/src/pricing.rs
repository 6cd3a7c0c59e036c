//! Billing Rates and the Pricing Catalog
//!
//! Rates are keyed by (service, model) and loaded once at process start.
//! An unrecognized model bills as free rather than failing the request.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// External vendor/API family a billable call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// Primary completion provider (chat completions)
    Completion,
    /// Audio transcription provider
    Transcription,
    /// Embedding provider
    Embedding,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Completion => "completion",
            Service::Transcription => "transcription",
            Service::Embedding => "embedding",
        };
        f.write_str(name)
    }
}

/// Per-unit billing rate for one (service, model) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rate {
    /// Token-billed models (USD per 1K tokens)
    Text {
        /// USD per 1K input tokens
        input_per_1k: f64,
        /// USD per 1K output tokens
        output_per_1k: f64,
    },
    /// Duration-billed models (USD per minute of audio)
    Audio {
        /// USD per minute
        per_minute: f64,
    },
    /// Unrecognized model, billed as free
    Free,
}

impl Rate {
    /// Calculate the cost of one call at this rate
    #[must_use]
    pub fn cost(&self, input_tokens: u32, output_tokens: u32, audio_minutes: f64) -> f64 {
        match *self {
            Rate::Text {
                input_per_1k,
                output_per_1k,
            } => {
                (f64::from(input_tokens) / 1000.0) * input_per_1k
                    + (f64::from(output_tokens) / 1000.0) * output_per_1k
            }
            Rate::Audio { per_minute } => audio_minutes * per_minute,
            Rate::Free => 0.0,
        }
    }

    fn validate(&self) -> std::result::Result<(), &'static str> {
        let finite_non_negative = |v: f64| v.is_finite() && v >= 0.0;
        match *self {
            Rate::Text {
                input_per_1k,
                output_per_1k,
            } => {
                if !finite_non_negative(input_per_1k) || !finite_non_negative(output_per_1k) {
                    return Err("token rates must be finite and non-negative");
                }
            }
            Rate::Audio { per_minute } => {
                if !finite_non_negative(per_minute) {
                    return Err("per-minute rate must be finite and non-negative");
                }
            }
            Rate::Free => {}
        }
        Ok(())
    }
}

/// Rates the stock deployment ships with (USD per 1K tokens / per minute)
const BUILTIN_RATES: &[(Service, &str, Rate)] = &[
    // Primary completion provider
    (
        Service::Completion,
        "anthropic/claude-3.5-sonnet",
        Rate::Text {
            input_per_1k: 0.003,
            output_per_1k: 0.015,
        },
    ),
    (
        Service::Completion,
        "anthropic/claude-3-haiku",
        Rate::Text {
            input_per_1k: 0.00025,
            output_per_1k: 0.00125,
        },
    ),
    (
        Service::Completion,
        "openai/gpt-4o",
        Rate::Text {
            input_per_1k: 0.005,
            output_per_1k: 0.015,
        },
    ),
    (
        Service::Completion,
        "openai/gpt-4o-mini",
        Rate::Text {
            input_per_1k: 0.00015,
            output_per_1k: 0.0006,
        },
    ),
    (
        Service::Completion,
        "meta-llama/llama-3.1-8b-instruct",
        Rate::Text {
            input_per_1k: 0.00018,
            output_per_1k: 0.00018,
        },
    ),
    (
        Service::Completion,
        "meta-llama/llama-3.1-70b-instruct",
        Rate::Text {
            input_per_1k: 0.0009,
            output_per_1k: 0.0009,
        },
    ),
    (
        Service::Completion,
        "gpt-4o",
        Rate::Text {
            input_per_1k: 0.0025,
            output_per_1k: 0.01,
        },
    ),
    (
        Service::Completion,
        "gpt-4o-mini",
        Rate::Text {
            input_per_1k: 0.00015,
            output_per_1k: 0.0006,
        },
    ),
    (
        Service::Completion,
        "gpt-4",
        Rate::Text {
            input_per_1k: 0.03,
            output_per_1k: 0.06,
        },
    ),
    (
        Service::Completion,
        "gpt-3.5-turbo",
        Rate::Text {
            input_per_1k: 0.0015,
            output_per_1k: 0.002,
        },
    ),
    // Transcription provider
    (
        Service::Transcription,
        "whisper-1",
        Rate::Audio { per_minute: 0.006 },
    ),
    // Embedding provider (output side is never billed)
    (
        Service::Embedding,
        "text-embedding-3-small",
        Rate::Text {
            input_per_1k: 0.00002,
            output_per_1k: 0.0,
        },
    ),
    (
        Service::Embedding,
        "text-embedding-3-large",
        Rate::Text {
            input_per_1k: 0.00013,
            output_per_1k: 0.0,
        },
    ),
    (
        Service::Embedding,
        "text-embedding-ada-002",
        Rate::Text {
            input_per_1k: 0.0001,
            output_per_1k: 0.0,
        },
    ),
];

/// Read-only pricing table keyed by (service, model)
///
/// Built once at startup and never mutated. A lookup miss is not an error:
/// unrecognized models resolve to [`Rate::Free`] so a newly introduced model
/// degrades cost visibility instead of failing requests.
#[derive(Debug, Clone)]
pub struct PricingCatalog {
    rates: HashMap<(Service, String), Rate>,
}

impl PricingCatalog {
    /// Catalog with the stock deployment rates
    #[must_use]
    pub fn builtin() -> Self {
        let rates = BUILTIN_RATES
            .iter()
            .map(|&(service, model, rate)| ((service, model.to_string()), rate))
            .collect();
        Self { rates }
    }

    /// Build a catalog from externally supplied entries
    ///
    /// Rejects negative or non-finite rates. Later entries for the same
    /// (service, model) pair override earlier ones.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Service, String, Rate)>,
    {
        let mut rates = HashMap::new();
        for (service, model, rate) in entries {
            rate.validate()
                .map_err(|reason| Error::InvalidRate(format!("{service}/{model}: {reason}")))?;
            rates.insert((service, model), rate);
        }
        Ok(Self { rates })
    }

    /// Look up the rate for a model, falling back to [`Rate::Free`]
    #[must_use]
    pub fn rate(&self, service: Service, model: &str) -> Rate {
        self.rates
            .get(&(service, model.to_string()))
            .copied()
            .unwrap_or(Rate::Free)
    }

    /// Number of priced (service, model) pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Whether the catalog has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for PricingCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
