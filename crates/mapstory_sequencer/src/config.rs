// SPDX-License-Identifier: MIT OR Apache-2.0
//! Story configuration and playback tunables.

use crate::step::Step;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default progress reporting period
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(50);

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be parsed
    #[error("Invalid story JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A step carries a negative, non-finite or unrepresentably large time
    #[error("Step {index} has invalid {field}: {value}")]
    InvalidTiming {
        /// Index of the offending step
        index: usize,
        /// Field name as written in the document
        field: &'static str,
        /// Offending value in seconds
        value: f64,
    },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Ordered list of steps a sequencer is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "L: Serialize, C: Serialize, I: Serialize",
    deserialize = "L: Deserialize<'de>, C: Deserialize<'de>, I: Deserialize<'de>"
))]
pub struct StoryConfig<L, C, I> {
    /// Steps, played in order
    #[serde(default = "Vec::new")]
    pub animations: Vec<Step<L, C, I>>,
}

impl<L, C, I> StoryConfig<L, C, I> {
    /// Create a config from a list of steps
    pub fn new(animations: Vec<Step<L, C, I>>) -> Self {
        Self { animations }
    }

    /// Check every step for usable timing
    pub fn validate(&self) -> Result<()> {
        for (index, step) in self.animations.iter().enumerate() {
            for (field, value) in [("duration", step.duration_secs()), ("waitTime", step.wait_secs())] {
                if Duration::try_from_secs_f64(value).is_err() {
                    return Err(ConfigError::InvalidTiming { index, field, value });
                }
            }
        }
        Ok(())
    }
}

impl<L, C, I> StoryConfig<L, C, I>
where
    L: DeserializeOwned,
    C: DeserializeOwned,
    I: DeserializeOwned,
{
    /// Parse and validate a JSON story document
    pub fn from_json(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        tracing::debug!("Loaded story with {} steps", config.animations.len());
        Ok(config)
    }
}

impl<L, C, I> Default for StoryConfig<L, C, I> {
    fn default() -> Self {
        Self { animations: Vec::new() }
    }
}

/// Playback tunables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackOptions {
    /// Period of the progress reporting timer
    pub progress_interval: Duration,
}

impl PlaybackOptions {
    /// Set the progress period (clamped to at least 1ms)
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval.max(Duration::from_millis(1));
        self
    }
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}
