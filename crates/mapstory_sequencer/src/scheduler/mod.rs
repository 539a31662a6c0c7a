// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host schedulers.
//!
//! - [`ManualScheduler`]: virtual time, stepped explicitly (tests, offline)
//! - [`RealtimeScheduler`]: tokio clock, driven by `Sequencer::run`
//!
//! Both keep their pending timers in a [`TimerQueue`].

mod manual;
mod realtime;

pub use manual::ManualScheduler;
pub use realtime::RealtimeScheduler;

use crate::timer::{TimerId, TimerRequest};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

/// Shortest period a recurring timer may use
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy)]
struct Entry {
    due: Duration,
    period: Option<Duration>,
}

/// Pending timers ordered by due time, then by arm order.
///
/// Recurring timers keep their original position in arm order, so two
/// timers due at the same instant always fire in the order they were armed.
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    entries: HashMap<TimerId, Entry>,
    order: BTreeSet<(Duration, TimerId)>,
    frames: Vec<TimerId>,
}

impl TimerQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a timer requested at `now`
    pub fn schedule(&mut self, now: Duration, request: TimerRequest) -> TimerId {
        self.next_id += 1;
        let id = TimerId::new(self.next_id);

        match request {
            TimerRequest::Once(delay) => self.insert(id, Entry { due: now.saturating_add(delay), period: None }),
            TimerRequest::Every(period) => {
                let period = period.max(MIN_PERIOD);
                self.insert(id, Entry { due: now.saturating_add(period), period: Some(period) });
            }
            TimerRequest::NextFrame => self.frames.push(id),
        }
        id
    }

    fn insert(&mut self, id: TimerId, entry: Entry) {
        self.order.insert((entry.due, id));
        self.entries.insert(id, entry);
    }

    /// Remove a timer. Unknown ids are ignored.
    pub fn cancel(&mut self, id: TimerId) {
        if let Some(entry) = self.entries.remove(&id) {
            self.order.remove(&(entry.due, id));
        }
        self.frames.retain(|frame| *frame != id);
    }

    /// Due time of the earliest timed entry
    pub fn next_due(&self) -> Option<Duration> {
        self.order.first().map(|(due, _)| *due)
    }

    /// Pop the earliest timer due at or before `until`.
    ///
    /// Recurring timers are re-queued one period later before being returned.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, Duration)> {
        let &(due, id) = self.order.first()?;
        if due > until {
            return None;
        }
        self.order.remove(&(due, id));

        match self.entries.get(&id).and_then(|entry| entry.period) {
            Some(period) => self.insert(id, Entry { due: due.saturating_add(period), period: Some(period) }),
            None => {
                self.entries.remove(&id);
            }
        }
        Some((id, due))
    }

    /// Take every pending next-frame request
    pub fn take_frames(&mut self) -> Vec<TimerId> {
        std::mem::take(&mut self.frames)
    }

    /// Whether any next-frame request is pending
    pub fn has_frames(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Number of pending timers, frame requests included
    pub fn len(&self) -> usize {
        self.entries.len() + self.frames.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_pop_in_due_order() {
        let mut queue = TimerQueue::new();
        let late = queue.schedule(ms(0), TimerRequest::Once(ms(300)));
        let early = queue.schedule(ms(0), TimerRequest::Once(ms(100)));

        assert_eq!(queue.next_due(), Some(ms(100)));
        assert_eq!(queue.pop_due(ms(50)), None);
        assert_eq!(queue.pop_due(ms(1000)), Some((early, ms(100))));
        assert_eq!(queue.pop_due(ms(1000)), Some((late, ms(300))));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ties_fire_in_arm_order() {
        let mut queue = TimerQueue::new();
        let ticker = queue.schedule(ms(0), TimerRequest::Every(ms(50)));
        let once = queue.schedule(ms(0), TimerRequest::Once(ms(100)));

        assert_eq!(queue.pop_due(ms(100)), Some((ticker, ms(50))));
        assert_eq!(queue.pop_due(ms(100)), Some((ticker, ms(100))));
        assert_eq!(queue.pop_due(ms(100)), Some((once, ms(100))));
        assert_eq!(queue.pop_due(ms(100)), None);
        assert_eq!(queue.next_due(), Some(ms(150)));
    }

    #[test]
    fn test_cancel() {
        let mut queue = TimerQueue::new();
        let ticker = queue.schedule(ms(0), TimerRequest::Every(ms(50)));
        let frame = queue.schedule(ms(0), TimerRequest::NextFrame);
        assert_eq!(queue.len(), 2);

        queue.cancel(ticker);
        queue.cancel(frame);
        queue.cancel(frame);

        assert!(queue.is_empty());
        assert_eq!(queue.pop_due(ms(10_000)), None);
        assert!(queue.take_frames().is_empty());
    }

    #[test]
    fn test_far_due_times_saturate() {
        let mut queue = TimerQueue::new();
        let once = queue.schedule(Duration::MAX, TimerRequest::Once(ms(10)));
        let ticker = queue.schedule(Duration::MAX, TimerRequest::Every(ms(10)));

        assert_eq!(queue.pop_due(Duration::MAX), Some((once, Duration::MAX)));
        assert_eq!(queue.pop_due(Duration::MAX), Some((ticker, Duration::MAX)));
        assert_eq!(queue.next_due(), Some(Duration::MAX));
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let mut queue = TimerQueue::new();
        let ticker = queue.schedule(ms(0), TimerRequest::Every(Duration::ZERO));
        assert_eq!(queue.pop_due(ms(0)), None);
        assert_eq!(queue.pop_due(ms(1)), Some((ticker, ms(1))));
    }
}
