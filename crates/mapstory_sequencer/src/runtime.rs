// SPDX-License-Identifier: MIT OR Apache-2.0
//! Async run loop for a realtime sequencer.
//!
//! [`Sequencer::run`] owns the sequencer for the lifetime of the loop and
//! takes control commands over a channel, so other tasks can drive playback
//! through a cloneable [`SequencerHandle`]. Observers run on the loop's own
//! task and need not be `Send`.

use crate::scheduler::RealtimeScheduler;
use crate::sequencer::{PlaybackStatus, Sequencer};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};

/// Commands sent to the run loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerCommand {
    /// Start or continue playback
    Play,
    /// Pause playback
    Pause,
    /// Jump to a step
    GoTo(usize),
    /// Cancel all timers and leave the loop
    Shutdown,
}

/// The run loop is no longer receiving commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Sequencer run loop has stopped")]
pub struct SequencerClosed;

/// Sender side: controls a running sequencer and observes its status
#[derive(Debug, Clone)]
pub struct SequencerHandle {
    commands: mpsc::UnboundedSender<SequencerCommand>,
    status: watch::Receiver<PlaybackStatus>,
}

/// Receiver side, consumed by [`Sequencer::run`]
#[derive(Debug)]
pub struct SequencerControl {
    commands: mpsc::UnboundedReceiver<SequencerCommand>,
    status: watch::Sender<PlaybackStatus>,
}

/// Create a connected handle/control pair
pub fn channel() -> (SequencerHandle, SequencerControl) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(PlaybackStatus::default());
    (
        SequencerHandle { commands: command_tx, status: status_rx },
        SequencerControl { commands: command_rx, status: status_tx },
    )
}

impl SequencerHandle {
    /// Send a command to the run loop
    pub fn send(&self, command: SequencerCommand) -> Result<(), SequencerClosed> {
        self.commands.send(command).map_err(|_| SequencerClosed)
    }

    /// Start or continue playback
    pub fn play(&self) -> Result<(), SequencerClosed> {
        self.send(SequencerCommand::Play)
    }

    /// Pause playback
    pub fn pause(&self) -> Result<(), SequencerClosed> {
        self.send(SequencerCommand::Pause)
    }

    /// Jump to a step
    pub fn go_to(&self, index: usize) -> Result<(), SequencerClosed> {
        self.send(SequencerCommand::GoTo(index))
    }

    /// Ask the run loop to stop
    pub fn shutdown(&self) -> Result<(), SequencerClosed> {
        self.send(SequencerCommand::Shutdown)
    }

    /// Latest published status
    pub fn status(&self) -> PlaybackStatus {
        *self.status.borrow()
    }

    /// Wait until the published status satisfies `predicate`
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&PlaybackStatus) -> bool,
    ) -> Result<PlaybackStatus, SequencerClosed> {
        self.status
            .wait_for(predicate)
            .await
            .map(|status| *status)
            .map_err(|_| SequencerClosed)
    }
}

impl<L, C, I> Sequencer<L, C, I, RealtimeScheduler> {
    /// Drive the sequencer until shutdown or until every handle is dropped.
    ///
    /// Timers are cancelled on exit; the last status stays published.
    pub async fn run(&mut self, control: SequencerControl) {
        let SequencerControl { mut commands, status } = control;

        let mut frames = time::interval(self.scheduler().frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!("Sequencer run loop started");
        loop {
            status.send_replace(self.status());

            let deadline = self.scheduler().next_deadline();
            let wants_frame = self.scheduler().has_frame_requests();

            tokio::select! {
                command = commands.recv() => match command {
                    Some(SequencerCommand::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },
                _ = time::sleep_until(deadline.unwrap_or_else(time::Instant::now)), if deadline.is_some() => {
                    self.fire_due();
                }
                _ = frames.tick(), if wants_frame => {
                    self.deliver_frames();
                }
            }
        }

        self.cancel_timers();
        status.send_replace(self.status());
        tracing::debug!("Sequencer run loop stopped");
    }

    fn apply(&mut self, command: SequencerCommand) {
        tracing::trace!("Applying {command:?}");
        match command {
            SequencerCommand::Play => self.play(),
            SequencerCommand::Pause => self.pause(),
            SequencerCommand::GoTo(index) => self.go_to(index),
            SequencerCommand::Shutdown => {}
        }
    }

    fn fire_due(&mut self) {
        while let Some(id) = self.scheduler_mut().pop_due() {
            self.fire(id);
        }
    }

    fn deliver_frames(&mut self) {
        let frames = self.scheduler_mut().take_frames();
        for id in frames {
            self.fire(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoryConfig;
    use crate::sequencer::PlaybackState;
    use crate::step::Step;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    type TestSequencer = Sequencer<&'static str, &'static str, &'static str, RealtimeScheduler>;

    fn story() -> StoryConfig<&'static str, &'static str, &'static str> {
        StoryConfig::new(vec![
            Step::layers("roads", 1.0),
            Step::camera("harbor", 0.5),
            Step::image("poster", 1.0).with_wait(0.5),
        ])
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_plays_to_end() {
        let mut sequencer: TestSequencer = Sequencer::new(story(), RealtimeScheduler::new());
        let shown = Rc::new(RefCell::new(Vec::new()));
        let frames = Rc::new(RefCell::new(0usize));

        let (steps_sink, frames_sink) = (Rc::clone(&shown), Rc::clone(&frames));
        sequencer
            .observers_mut()
            .on_step_change(move |_, index| steps_sink.borrow_mut().push(index))
            .on_camera_change(move |_, _| *frames_sink.borrow_mut() += 1);

        let (mut handle, control) = channel();
        let driver = async move {
            handle.play().unwrap();
            let finished = handle
                .wait_for(|status| status.index == Some(2) && status.state == PlaybackState::Stopped)
                .await
                .unwrap();
            handle.shutdown().unwrap();
            finished
        };

        let ((), finished) = tokio::join!(sequencer.run(control), driver);

        assert_eq!(finished.index, Some(2));
        assert_eq!(*shown.borrow(), vec![0, 1, 2]);
        assert!(*frames.borrow() > 0);
        assert_eq!(sequencer.live_timers(), 0);
        assert_eq!(sequencer.scheduler().pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_and_seek_over_channel() {
        let mut sequencer: TestSequencer = Sequencer::new(story(), RealtimeScheduler::new());
        let (mut handle, control) = channel();

        let driver = async move {
            handle.play().unwrap();
            time::sleep(Duration::from_millis(200)).await;
            handle.pause().unwrap();
            let paused = handle.wait_for(PlaybackStatus::is_paused).await.unwrap();

            time::sleep(Duration::from_secs(10)).await;
            let still = handle.status();

            handle.go_to(2).unwrap();
            let seeked = handle.wait_for(|status| status.index == Some(2)).await.unwrap();
            handle.shutdown().unwrap();
            (paused, still, seeked)
        };

        let ((), (paused, still, seeked)) = tokio::join!(sequencer.run(control), driver);

        assert_eq!(paused.index, Some(0));
        assert_eq!(still, paused);
        assert_eq!(seeked.state, PlaybackState::Paused);
        assert_eq!(sequencer.current_index(), Some(2));
    }

    #[tokio::test]
    async fn test_send_after_loop_exit_fails() {
        let (handle, control) = channel();
        drop(control);
        assert_eq!(handle.play(), Err(SequencerClosed));
    }
}
