// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequencer state machine and playback control.
//!
//! A [`Sequencer`] owns the steps of a story and a cursor into them. Playing
//! a step invokes its side effect synchronously through the observers, then
//! arms two paired timers on the host [`Scheduler`]:
//!
//! - an `Advance` one-shot that moves to the next step after duration + wait
//! - a `Progress` recurring tick reporting how far along that wait is
//!
//! Camera steps additionally run a `Frame` loop that reports the eased blend
//! factor once per display refresh. The advance and progress timers are
//! always armed together and cancelled together.
//!
//! Malformed control input is absorbed: an out-of-range index or an empty
//! story turns the call into a no-op, and an unset observer slot just skips
//! its notification.

use crate::config::{PlaybackOptions, StoryConfig};
use crate::observer::Observers;
use crate::scheduler::ManualScheduler;
use crate::step::Step;
use crate::timer::{Scheduler, TimerId, TimerKind, TimerRequest, TimerSlots};
use crate::transition::{CameraTransition, FrameStep, WaitWindow};

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Not auto-advancing: never started, or finished
    #[default]
    Stopped,
    /// Auto-advancing through the steps
    Playing,
    /// Explicitly halted by the user
    Paused,
}

/// Snapshot of where playback stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    /// Current step, `None` before the first play
    pub index: Option<usize>,
    /// Playback state
    pub state: PlaybackState,
}

impl PlaybackStatus {
    /// Check if currently auto-advancing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Check if explicitly paused
    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }
}

/// Plays a list of steps one after another
pub struct Sequencer<L, C, I, S = ManualScheduler> {
    steps: Vec<Step<L, C, I>>,
    cursor: Option<usize>,
    playing: bool,
    paused: bool,
    options: PlaybackOptions,
    observers: Observers<L, C, I>,
    scheduler: S,
    timers: TimerSlots,
    camera: Option<CameraTransition>,
    wait: Option<WaitWindow>,
}

impl<L, C, I, S: Scheduler> Sequencer<L, C, I, S> {
    /// Create a sequencer with default options
    pub fn new(config: StoryConfig<L, C, I>, scheduler: S) -> Self {
        Self::with_options(config, scheduler, PlaybackOptions::default())
    }

    /// Create a sequencer with explicit options
    pub fn with_options(config: StoryConfig<L, C, I>, scheduler: S, options: PlaybackOptions) -> Self {
        Self {
            steps: config.animations,
            cursor: None,
            playing: false,
            paused: false,
            options,
            observers: Observers::new(),
            scheduler,
            timers: TimerSlots::new(),
            camera: None,
            wait: None,
        }
    }

    /// Observer slots, for registering callbacks
    pub fn observers_mut(&mut self) -> &mut Observers<L, C, I> {
        &mut self.observers
    }

    /// The host scheduler
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// The host scheduler, mutably
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Playback options
    pub fn options(&self) -> &PlaybackOptions {
        &self.options
    }

    /// Start or continue auto-advancing.
    ///
    /// Starts at the first step if nothing has played yet or the last step
    /// is current; otherwise moves on to the step after the current one.
    pub fn play(&mut self) {
        if self.steps.is_empty() {
            tracing::debug!("Ignoring play on an empty story");
            return;
        }

        self.cancel_timers();
        self.wait = None;
        self.playing = true;
        self.paused = false;

        let index = match self.cursor {
            Some(current) if current + 1 < self.steps.len() => current + 1,
            _ => 0,
        };

        tracing::info!("Playing from step {index}");
        self.execute_step(index);
    }

    /// Halt auto-advance, keeping the current step and cursor.
    ///
    /// A camera flight in progress stops where its last frame left it.
    pub fn pause(&mut self) {
        self.paused = true;
        self.playing = false;
        self.cancel_timers();
        tracing::info!("Paused at step {:?}", self.cursor);
    }

    /// Jump to a step. Out-of-range indices are ignored.
    ///
    /// If playback is running, the auto-advance chain continues from the new
    /// position.
    pub fn go_to(&mut self, index: usize) {
        if index >= self.steps.len() {
            tracing::debug!("Ignoring seek to {index}, story has {} steps", self.steps.len());
            return;
        }

        self.cancel_timers();
        self.wait = None;
        tracing::debug!("Seeking to step {index}");
        self.execute_step(index);
    }

    /// Deliver a fired timer. Tokens not held by a live slot are ignored.
    pub fn fire(&mut self, id: TimerId) {
        match self.timers.kind_of(id) {
            Some(TimerKind::Advance) => {
                self.timers.release(TimerKind::Advance, id);
                self.advance();
            }
            Some(TimerKind::Progress) => self.report_progress(),
            Some(TimerKind::Frame) => {
                self.timers.release(TimerKind::Frame, id);
                self.continue_camera();
            }
            None => tracing::trace!("Ignoring stale {id}"),
        }
    }

    /// The current step, if playback has started
    pub fn current_step(&self) -> Option<&Step<L, C, I>> {
        self.cursor.and_then(|index| self.steps.get(index))
    }

    /// All steps
    pub fn steps(&self) -> &[Step<L, C, I>] {
        &self.steps
    }

    /// Index of the current step, `None` before the first play
    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    /// Whether auto-advance is active
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether playback was explicitly paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Snapshot of cursor and state
    pub fn status(&self) -> PlaybackStatus {
        let state = if self.paused {
            PlaybackState::Paused
        } else if self.playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        };
        PlaybackStatus { index: self.cursor, state }
    }

    /// Camera transition in flight, if any
    pub fn camera_transition(&self) -> Option<&CameraTransition> {
        self.camera.as_ref()
    }

    /// Wait window before the next step, if one is pending
    pub fn wait_window(&self) -> Option<&WaitWindow> {
        self.wait.as_ref()
    }

    /// Number of live timers across all kinds
    pub fn live_timers(&self) -> usize {
        self.timers.live_count()
    }

    pub(crate) fn cancel_timers(&mut self) {
        self.timers.cancel_all(&mut self.scheduler);
    }

    fn auto_advancing(&self) -> bool {
        self.playing && !self.paused
    }

    fn execute_step(&mut self, index: usize) {
        // A new step supersedes any camera flight still running
        self.timers.cancel(TimerKind::Frame, &mut self.scheduler);
        self.camera = None;

        let Some(step) = self.steps.get(index) else {
            return;
        };
        self.cursor = Some(index);
        tracing::debug!("Executing {} step {index}", step.kind().name());

        self.observers.step_changed(step, index);
        let is_camera = match step {
            Step::Layers { layers, .. } => {
                self.observers.layers_changed(layers, step.duration());
                false
            }
            Step::Image { image, .. } => {
                self.observers.image_shown(image, step.duration());
                false
            }
            Step::Camera { .. } => true,
        };
        if is_camera {
            self.begin_camera(index);
        }

        if self.auto_advancing() {
            self.schedule_next();
        }
    }

    fn begin_camera(&mut self, index: usize) {
        if !self.observers.has_camera() {
            return;
        }
        let duration = self.steps[index].duration();
        self.camera = Some(CameraTransition::new(index, self.scheduler.now(), duration));
        self.timers.arm(TimerKind::Frame, &mut self.scheduler, TimerRequest::NextFrame);
    }

    fn continue_camera(&mut self) {
        let Some(transition) = self.camera else {
            return;
        };

        let frame = transition.sample(self.scheduler.now());
        if let Some(Step::Camera { camera, .. }) = self.steps.get(transition.step_index) {
            self.observers.camera_changed(camera, frame.eased());
        }

        match frame {
            FrameStep::Continue { .. } => {
                self.timers.arm(TimerKind::Frame, &mut self.scheduler, TimerRequest::NextFrame);
            }
            FrameStep::Complete { .. } => {
                self.camera = None;
            }
        }
    }

    fn schedule_next(&mut self) {
        let Some(current) = self.cursor else {
            return;
        };

        if current + 1 >= self.steps.len() {
            self.playing = false;
            self.timers.cancel(TimerKind::Progress, &mut self.scheduler);
            self.timers.cancel(TimerKind::Advance, &mut self.scheduler);
            self.wait = None;
            tracing::info!("Reached end of story at step {current}");
            return;
        }

        let total = self.steps[current].total();
        self.wait = Some(WaitWindow::new(self.scheduler.now(), total));

        // Progress first so a tick due with the advance still reports 1.0
        self.timers.arm(
            TimerKind::Progress,
            &mut self.scheduler,
            TimerRequest::Every(self.options.progress_interval),
        );
        self.timers.arm(TimerKind::Advance, &mut self.scheduler, TimerRequest::Once(total));
    }

    fn advance(&mut self) {
        if !self.auto_advancing() {
            return;
        }
        let Some(current) = self.cursor else {
            return;
        };

        self.timers.cancel(TimerKind::Progress, &mut self.scheduler);
        self.wait = None;
        self.execute_step(current + 1);
    }

    fn report_progress(&mut self) {
        let Some(window) = self.wait else {
            self.timers.cancel(TimerKind::Progress, &mut self.scheduler);
            return;
        };
        if !self.playing {
            return;
        }

        let sample = window.sample(self.scheduler.now());
        self.observers.progress_updated(sample.progress, sample.remaining_secs);

        if sample.is_complete() {
            self.timers.cancel(TimerKind::Progress, &mut self.scheduler);
        }
    }
}

impl<L, C, I, S> std::fmt::Debug for Sequencer<L, C, I, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("steps", &self.steps.len())
            .field("cursor", &self.cursor)
            .field("playing", &self.playing)
            .field("paused", &self.paused)
            .field("timers", &self.timers)
            .field("camera", &self.camera)
            .field("wait", &self.wait)
            .finish()
    }
}
