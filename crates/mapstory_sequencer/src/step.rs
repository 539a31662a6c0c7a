// SPDX-License-Identifier: MIT OR Apache-2.0
//! Step definitions for the sequencer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Layer set change
    Layers,
    /// Camera flight
    Camera,
    /// Image overlay
    Image,
}

impl StepKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Layers => "Layers",
            Self::Camera => "Camera",
            Self::Image => "Image",
        }
    }
}

/// A single step of a story.
///
/// The payloads `L`, `C` and `I` are opaque to the sequencer; they are only
/// handed to the matching observer. `duration` and `wait_time` are seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Step<L, C, I> {
    /// Show a set of layers
    Layers {
        /// Layers payload
        layers: L,
        /// Step duration in seconds
        duration: f64,
        /// Extra wait after the duration, in seconds
        #[serde(default, rename = "waitTime", skip_serializing_if = "Option::is_none")]
        wait_time: Option<f64>,
    },
    /// Fly the camera to a target view
    Camera {
        /// Target camera payload
        camera: C,
        /// Transition duration in seconds
        duration: f64,
        /// Extra wait after the duration, in seconds
        #[serde(default, rename = "waitTime", skip_serializing_if = "Option::is_none")]
        wait_time: Option<f64>,
    },
    /// Show an image overlay
    Image {
        /// Image payload
        image: I,
        /// Display duration in seconds
        duration: f64,
        /// Extra wait after the duration, in seconds
        #[serde(default, rename = "waitTime", skip_serializing_if = "Option::is_none")]
        wait_time: Option<f64>,
    },
}

impl<L, C, I> Step<L, C, I> {
    /// Create a layers step
    pub fn layers(layers: L, duration: f64) -> Self {
        Self::Layers { layers, duration, wait_time: None }
    }

    /// Create a camera step
    pub fn camera(camera: C, duration: f64) -> Self {
        Self::Camera { camera, duration, wait_time: None }
    }

    /// Create an image step
    pub fn image(image: I, duration: f64) -> Self {
        Self::Image { image, duration, wait_time: None }
    }

    /// Set the wait applied after the step's own duration
    pub fn with_wait(mut self, seconds: f64) -> Self {
        match &mut self {
            Self::Layers { wait_time, .. }
            | Self::Camera { wait_time, .. }
            | Self::Image { wait_time, .. } => *wait_time = Some(seconds),
        }
        self
    }

    /// Get the step kind
    pub fn kind(&self) -> StepKind {
        match self {
            Self::Layers { .. } => StepKind::Layers,
            Self::Camera { .. } => StepKind::Camera,
            Self::Image { .. } => StepKind::Image,
        }
    }

    /// Raw duration in seconds, as configured
    pub fn duration_secs(&self) -> f64 {
        match self {
            Self::Layers { duration, .. }
            | Self::Camera { duration, .. }
            | Self::Image { duration, .. } => *duration,
        }
    }

    /// Raw wait in seconds, as configured (absent means zero)
    pub fn wait_secs(&self) -> f64 {
        match self {
            Self::Layers { wait_time, .. }
            | Self::Camera { wait_time, .. }
            | Self::Image { wait_time, .. } => wait_time.unwrap_or(0.0),
        }
    }

    /// Step duration
    pub fn duration(&self) -> Duration {
        secs_to_duration(self.duration_secs())
    }

    /// Wait applied after the duration
    pub fn wait(&self) -> Duration {
        secs_to_duration(self.wait_secs())
    }

    /// Time from the start of this step until the next one begins
    pub fn total(&self) -> Duration {
        self.duration().saturating_add(self.wait())
    }
}

/// Negative, NaN and overflowing inputs become zero.
fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}
