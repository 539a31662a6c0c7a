// SPDX-License-Identifier: MIT OR Apache-2.0
//! Virtual-time scheduler.

use super::TimerQueue;
use crate::sequencer::Sequencer;
use crate::timer::{Scheduler, TimerId, TimerRequest};
use std::time::Duration;

/// Scheduler whose clock only moves when told to.
///
/// Display refreshes never happen on their own: pending next-frame requests
/// are delivered by [`Sequencer::render_frame`].
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    queue: TimerQueue,
}

impl ManualScheduler {
    /// Create a scheduler at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending timers, frame requests included
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Whether a next-frame request is pending
    pub fn has_frame_requests(&self) -> bool {
        self.queue.has_frames()
    }

    fn pop_due(&mut self, until: Duration) -> Option<TimerId> {
        let (id, due) = self.queue.pop_due(until)?;
        self.now = self.now.max(due);
        Some(id)
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, request: TimerRequest) -> TimerId {
        self.queue.schedule(self.now, request)
    }

    fn cancel(&mut self, id: TimerId) {
        self.queue.cancel(id);
    }
}

impl<L, C, I> Sequencer<L, C, I, ManualScheduler> {
    /// Move virtual time forward, firing every timer that falls due.
    ///
    /// Timers fire at their own due instant, so observers see the clock as
    /// it was when each one was scheduled to run.
    pub fn advance_by(&mut self, delta: Duration) {
        let target = self.scheduler().now.saturating_add(delta);
        while let Some(id) = self.scheduler_mut().pop_due(target) {
            self.fire(id);
        }
        self.scheduler_mut().now = target;
    }

    /// Deliver a display refresh at the current virtual time
    pub fn render_frame(&mut self) {
        let frames = self.scheduler_mut().queue.take_frames();
        for id in frames {
            self.fire(id);
        }
    }

    /// Move virtual time forward, rendering a frame every `frame_interval`
    pub fn advance_with_frames(&mut self, total: Duration, frame_interval: Duration) {
        let frame_interval = frame_interval.max(Duration::from_millis(1));
        let mut remaining = total;
        while !remaining.is_zero() {
            let step = remaining.min(frame_interval);
            self.advance_by(step);
            self.render_frame();
            remaining -= step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoryConfig;
    use crate::step::Step;

    type TestSequencer = Sequencer<u8, u8, u8>;

    #[test]
    fn test_clock_moves_to_target() {
        let mut sequencer: TestSequencer = Sequencer::new(StoryConfig::default(), ManualScheduler::new());
        sequencer.advance_by(Duration::from_millis(250));
        sequencer.advance_by(Duration::from_millis(250));
        assert_eq!(sequencer.scheduler().now(), Duration::from_millis(500));
    }

    #[test]
    fn test_timers_see_their_due_time() {
        let mut sequencer: TestSequencer = Sequencer::new(
            StoryConfig::new(vec![Step::layers(1, 1.0), Step::layers(2, 1.0), Step::layers(3, 1.0)]),
            ManualScheduler::new(),
        );

        sequencer.play();
        sequencer.advance_by(Duration::from_millis(1700));

        // Step 1 started at its due instant, not at the end of the advance
        let window = sequencer.wait_window().copied().unwrap();
        assert_eq!(window.started_at, Duration::from_millis(1000));
        assert_eq!(sequencer.current_index(), Some(1));
    }

    #[test]
    fn test_frame_requests_wait_for_render() {
        let mut sequencer: TestSequencer =
            Sequencer::new(StoryConfig::new(vec![Step::camera(7, 1.0)]), ManualScheduler::new());
        sequencer.observers_mut().on_camera_change(|_, _| {});

        sequencer.play();
        sequencer.advance_by(Duration::from_secs(5));
        assert!(sequencer.scheduler().has_frame_requests());

        sequencer.render_frame();
        assert!(!sequencer.scheduler().has_frame_requests());
        assert!(sequencer.camera_transition().is_none());
    }
}
