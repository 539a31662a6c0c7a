// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timer handles and the scheduling seam between the sequencer and its host.
//!
//! The sequencer never sleeps. It asks a [`Scheduler`] for timers and gets a
//! [`TimerId`] back; when a timer fires the host hands that id to
//! `Sequencer::fire`. Each [`TimerKind`] owns exactly one
//! [`CancellableHandle`], so at most one timer of each kind is live and any
//! id no longer held by a handle is stale.

use std::fmt;
use std::time::Duration;

/// Opaque token for a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Create a timer ID from a raw value
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Role a timer plays for the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// One-shot: advance to the next step
    Advance,
    /// Recurring: report progress toward the next step
    Progress,
    /// Next display refresh: continue a camera transition
    Frame,
}

impl TimerKind {
    /// All kinds, in slot order
    pub const ALL: [TimerKind; 3] = [TimerKind::Advance, TimerKind::Progress, TimerKind::Frame];
}

/// Scheduling primitive requested from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRequest {
    /// Fire once after the delay
    Once(Duration),
    /// Fire repeatedly with the given period until cancelled
    Every(Duration),
    /// Fire once on the next display refresh
    NextFrame,
}

/// Host-provided timers and clock
pub trait Scheduler {
    /// Monotonic time since the scheduler's origin
    fn now(&self) -> Duration;

    /// Arm a timer and return its token
    fn schedule(&mut self, request: TimerRequest) -> TimerId;

    /// Cancel a timer. Unknown or already cancelled ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

/// At most one live timer, cancelled before it is replaced
#[derive(Debug, Default)]
pub struct CancellableHandle {
    live: Option<TimerId>,
}

impl CancellableHandle {
    /// Create an empty handle
    pub fn new() -> Self {
        Self { live: None }
    }

    /// Cancel any live timer, then arm a new one
    pub fn arm<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S, request: TimerRequest) -> TimerId {
        self.cancel(scheduler);
        let id = scheduler.schedule(request);
        self.live = Some(id);
        id
    }

    /// Cancel the live timer, if any
    pub fn cancel<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(id) = self.live.take() {
            scheduler.cancel(id);
        }
    }

    /// Forget a timer that already fired and will not fire again
    pub fn release(&mut self, id: TimerId) {
        if self.live == Some(id) {
            self.live = None;
        }
    }

    /// Whether this handle owns the given timer
    pub fn holds(&self, id: TimerId) -> bool {
        self.live == Some(id)
    }

    /// Whether a timer is live
    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }
}

/// One handle per timer kind
#[derive(Debug, Default)]
pub struct TimerSlots {
    advance: CancellableHandle,
    progress: CancellableHandle,
    frame: CancellableHandle,
}

impl TimerSlots {
    /// Create empty slots
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut CancellableHandle {
        match kind {
            TimerKind::Advance => &mut self.advance,
            TimerKind::Progress => &mut self.progress,
            TimerKind::Frame => &mut self.frame,
        }
    }

    fn slot(&self, kind: TimerKind) -> &CancellableHandle {
        match kind {
            TimerKind::Advance => &self.advance,
            TimerKind::Progress => &self.progress,
            TimerKind::Frame => &self.frame,
        }
    }

    /// Arm a timer of the given kind, cancelling the previous one
    pub fn arm<S: Scheduler + ?Sized>(&mut self, kind: TimerKind, scheduler: &mut S, request: TimerRequest) -> TimerId {
        let id = self.slot_mut(kind).arm(scheduler, request);
        tracing::trace!("Armed {kind:?} {id} ({request:?})");
        id
    }

    /// Cancel the timer of the given kind
    pub fn cancel<S: Scheduler + ?Sized>(&mut self, kind: TimerKind, scheduler: &mut S) {
        let slot = self.slot_mut(kind);
        if slot.is_live() {
            tracing::trace!("Cancelled {kind:?} timer");
        }
        slot.cancel(scheduler);
    }

    /// Cancel every live timer
    pub fn cancel_all<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        for kind in TimerKind::ALL {
            self.cancel(kind, scheduler);
        }
    }

    /// Forget a one-shot timer that just fired
    pub fn release(&mut self, kind: TimerKind, id: TimerId) {
        self.slot_mut(kind).release(id);
    }

    /// Which slot owns this timer, if any
    pub fn kind_of(&self, id: TimerId) -> Option<TimerKind> {
        TimerKind::ALL.into_iter().find(|kind| self.slot(*kind).holds(id))
    }

    /// Number of live timers across all kinds
    pub fn live_count(&self) -> usize {
        TimerKind::ALL.into_iter().filter(|kind| self.slot(*kind).is_live()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        next: u64,
        scheduled: Vec<(TimerId, TimerRequest)>,
        cancelled: Vec<TimerId>,
    }

    impl Scheduler for Recorder {
        fn now(&self) -> Duration {
            Duration::ZERO
        }

        fn schedule(&mut self, request: TimerRequest) -> TimerId {
            self.next += 1;
            let id = TimerId::new(self.next);
            self.scheduled.push((id, request));
            id
        }

        fn cancel(&mut self, id: TimerId) {
            self.cancelled.push(id);
        }
    }

    #[test]
    fn test_arm_cancels_previous() {
        let mut scheduler = Recorder::default();
        let mut handle = CancellableHandle::new();

        let first = handle.arm(&mut scheduler, TimerRequest::Once(Duration::from_secs(1)));
        let second = handle.arm(&mut scheduler, TimerRequest::Once(Duration::from_secs(1)));

        assert_eq!(scheduler.cancelled, vec![first]);
        assert!(handle.holds(second));
        assert!(!handle.holds(first));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut scheduler = Recorder::default();
        let mut handle = CancellableHandle::new();

        handle.cancel(&mut scheduler);
        handle.arm(&mut scheduler, TimerRequest::NextFrame);
        handle.cancel(&mut scheduler);
        handle.cancel(&mut scheduler);

        assert_eq!(scheduler.cancelled.len(), 1);
        assert!(!handle.is_live());
    }

    #[test]
    fn test_slots_are_independent() {
        let mut scheduler = Recorder::default();
        let mut slots = TimerSlots::new();

        let advance = slots.arm(TimerKind::Advance, &mut scheduler, TimerRequest::Once(Duration::from_secs(2)));
        let progress = slots.arm(TimerKind::Progress, &mut scheduler, TimerRequest::Every(Duration::from_millis(50)));
        assert_eq!(slots.live_count(), 2);
        assert_eq!(slots.kind_of(advance), Some(TimerKind::Advance));
        assert_eq!(slots.kind_of(progress), Some(TimerKind::Progress));

        slots.cancel(TimerKind::Progress, &mut scheduler);
        assert_eq!(slots.kind_of(progress), None);
        assert_eq!(slots.kind_of(advance), Some(TimerKind::Advance));

        slots.release(TimerKind::Advance, advance);
        assert_eq!(slots.live_count(), 0);
        assert_eq!(scheduler.cancelled, vec![progress]);
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = Recorder::default();
        let mut slots = TimerSlots::new();
        for kind in TimerKind::ALL {
            slots.arm(kind, &mut scheduler, TimerRequest::NextFrame);
        }
        slots.cancel_all(&mut scheduler);
        assert_eq!(slots.live_count(), 0);
        assert_eq!(scheduler.cancelled.len(), 3);
    }
}
