// SPDX-License-Identifier: MIT OR Apache-2.0
//! Step sequencer for map stories.
//!
//! This crate plays an ordered list of presentation steps:
//! - Layer set changes
//! - Camera flights with eased per-frame blending
//! - Image overlays
//!
//! ## Architecture
//!
//! The sequencer is built on:
//! - Steps with opaque payloads handed to observer callbacks
//! - A host [`Scheduler`] for one-shot, recurring and per-frame timers
//! - Cancellable handles, at most one live timer per kind
//! - A virtual-time scheduler for tests and a tokio run loop for realtime use

pub mod config;
pub mod ease;
pub mod observer;
pub mod runtime;
pub mod scheduler;
pub mod sequencer;
pub mod step;
pub mod timer;
pub mod transition;

pub use config::{ConfigError, PlaybackOptions, StoryConfig};
pub use ease::{ease_in_out, Interpolation};
pub use observer::Observers;
pub use runtime::{SequencerClosed, SequencerCommand, SequencerControl, SequencerHandle};
pub use scheduler::{ManualScheduler, RealtimeScheduler, TimerQueue};
pub use sequencer::{PlaybackState, PlaybackStatus, Sequencer};
pub use step::{Step, StepKind};
pub use timer::{CancellableHandle, Scheduler, TimerId, TimerKind, TimerRequest, TimerSlots};
pub use transition::{CameraTransition, FrameStep, ProgressSample, WaitWindow};
