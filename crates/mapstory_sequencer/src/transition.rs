// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time windows tracked while a step is in flight.
//!
//! - [`CameraTransition`]: the per-frame interpolation of a camera step
//! - [`WaitWindow`]: the span between a step starting and the next one

use crate::ease::ease_in_out;
use std::time::Duration;

/// Outcome of sampling a camera transition on a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameStep {
    /// Transition still running; request another frame
    Continue {
        /// Eased blend factor
        eased: f64,
    },
    /// Transition reached its target; no more frames
    Complete {
        /// Eased blend factor (always 1)
        eased: f64,
    },
}

impl FrameStep {
    /// Eased blend factor for this frame
    pub fn eased(&self) -> f64 {
        match self {
            Self::Continue { eased } | Self::Complete { eased } => *eased,
        }
    }
}

/// In-flight camera interpolation toward the target of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraTransition {
    /// Index of the camera step holding the target
    pub step_index: usize,
    /// Time the transition started
    pub started_at: Duration,
    /// Length of the transition
    pub duration: Duration,
}

impl CameraTransition {
    /// Start a transition now
    pub fn new(step_index: usize, started_at: Duration, duration: Duration) -> Self {
        Self { step_index, started_at, duration }
    }

    /// Linear progress at `now`, clamped to 0..1
    pub fn progress(&self, now: Duration) -> f64 {
        linear_progress(now.saturating_sub(self.started_at), self.duration)
    }

    /// Sample the transition for a frame rendered at `now`
    pub fn sample(&self, now: Duration) -> FrameStep {
        let progress = self.progress(now);
        let eased = ease_in_out(progress);
        if progress < 1.0 {
            FrameStep::Continue { eased }
        } else {
            FrameStep::Complete { eased }
        }
    }
}

/// Progress report for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    /// Fraction of the window elapsed, 0..1
    pub progress: f64,
    /// Seconds left until the window closes, never negative
    pub remaining_secs: f64,
}

impl ProgressSample {
    /// Whether the window has fully elapsed
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Span from a step's start until the next step is due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitWindow {
    /// Time the window opened
    pub started_at: Duration,
    /// Step duration plus wait
    pub total: Duration,
}

impl WaitWindow {
    /// Open a window now
    pub fn new(started_at: Duration, total: Duration) -> Self {
        Self { started_at, total }
    }

    /// Sample progress at `now`
    pub fn sample(&self, now: Duration) -> ProgressSample {
        let elapsed = now.saturating_sub(self.started_at);
        ProgressSample {
            progress: linear_progress(elapsed, self.total),
            remaining_secs: self.total.saturating_sub(elapsed).as_secs_f64(),
        }
    }
}

/// Zero-length spans count as complete.
fn linear_progress(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}
