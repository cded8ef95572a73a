//! Configuration types for the scheduling pipeline.
//!
//! All values have code defaults; a TOML file can override any subset.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scheduling policy knobs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SchedulingPolicy {
    /// Event duration applied when the user never specifies one.
    pub default_duration_minutes: u32,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            default_duration_minutes: 60,
        }
    }
}

/// Parsing-capability settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ParserConfig {
    /// Model name used by the OpenAI-backed parser.
    pub model: String,
    /// Maximum tokens per parse call.
    pub max_tokens: u32,
    /// Bounded wait for one parse call, in seconds.
    pub timeout_secs: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 256,
            timeout_secs: 20,
        }
    }
}

impl ParserConfig {
    /// Parse-call timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Calendar-capability settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CalendarConfig {
    /// Bounded wait for one calendar read/write, in seconds.
    pub timeout_secs: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl CalendarConfig {
    /// Calendar-call timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Root configuration.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct VocalConfig {
    pub policy: SchedulingPolicy,
    pub parser: ParserConfig,
    pub calendar: CalendarConfig,
}

impl VocalConfig {
    /// Parses a TOML document, filling unspecified fields with defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}
