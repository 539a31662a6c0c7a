// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wall-clock scheduler backed by the tokio timer.

use super::TimerQueue;
use crate::timer::{Scheduler, TimerId, TimerRequest};
use std::time::Duration;
use tokio::time::Instant;

/// Default display refresh period (~60Hz)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Scheduler measuring time from its creation on the tokio clock.
///
/// It only records timers; `Sequencer::run` sleeps until they fall due and
/// delivers next-frame requests at `frame_interval`.
#[derive(Debug)]
pub struct RealtimeScheduler {
    origin: Instant,
    queue: TimerQueue,
    frame_interval: Duration,
}

impl RealtimeScheduler {
    /// Create a scheduler starting now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            queue: TimerQueue::new(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }

    /// Set the display refresh period (clamped to at least 1ms)
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Display refresh period
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Instant the earliest timed entry falls due, `None` past the clock's range
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.next_due().and_then(|due| self.origin.checked_add(due))
    }

    /// Whether a next-frame request is pending
    pub fn has_frame_requests(&self) -> bool {
        self.queue.has_frames()
    }

    /// Number of pending timers, frame requests included
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn pop_due(&mut self) -> Option<TimerId> {
        let now = self.now();
        self.queue.pop_due(now).map(|(id, _)| id)
    }

    pub(crate) fn take_frames(&mut self) -> Vec<TimerId> {
        self.queue.take_frames()
    }
}

impl Default for RealtimeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for RealtimeScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn schedule(&mut self, request: TimerRequest) -> TimerId {
        let now = self.now();
        self.queue.schedule(now, request)
    }

    fn cancel(&mut self, id: TimerId) {
        self.queue.cancel(id);
    }
}
