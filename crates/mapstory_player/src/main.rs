// SPDX-License-Identifier: MIT OR Apache-2.0
//! `MapStory` Player - plays the bundled city tour in real time.
//!
//! Every notification the sequencer emits is applied to an in-memory map
//! view and logged, so the tour can be followed from the console:
//! - Layer changes and image overlays at `info`
//! - Progress toward the next step at `debug`
//! - Individual camera frames at `trace`
//!
//! Set `RUST_LOG` to adjust verbosity.

mod view;

use mapstory_sequencer::runtime::{self, SequencerClosed};
use mapstory_sequencer::{ConfigError, PlaybackState, RealtimeScheduler, Sequencer, Step, StoryConfig};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use view::{CameraView, ImageOverlay, ViewState};

/// Bundled demo story
const TOUR: &str = include_str!("../demos/tour.json");

type Tour = StoryConfig<Vec<String>, CameraView, ImageOverlay>;

/// Player errors
#[derive(Debug, Error)]
enum PlayerError {
    /// The story document is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The sequencer stopped before the tour finished
    #[error(transparent)]
    Closed(#[from] SequencerClosed),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("mapstory_player=info".parse().unwrap())
        .add_directive("mapstory_sequencer=debug".parse().unwrap());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MapStory Player v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = play_tour().await {
        tracing::error!("Player failed: {e}");
        std::process::exit(1);
    }
}

async fn play_tour() -> Result<(), PlayerError> {
    let tour = Tour::from_json(TOUR)?;
    let last_index = tour.animations.len().checked_sub(1);
    let linger = tour.animations.last().map(Step::total).unwrap_or_default();

    let mut sequencer = Sequencer::new(tour, RealtimeScheduler::new());
    let view = Rc::new(RefCell::new(ViewState::default()));
    attach_view(&mut sequencer, &view);

    let (mut handle, control) = runtime::channel();
    let driver = async move {
        handle.play()?;
        handle
            .wait_for(|status| status.index == last_index && status.state == PlaybackState::Stopped)
            .await?;
        // The last step has no successor to wait for; give it its full time
        tokio::time::sleep(linger).await;
        handle.shutdown()
    };

    let ((), finished) = tokio::join!(sequencer.run(control), driver);
    finished?;

    let view = view.borrow();
    tracing::info!(
        "Tour finished at {:.2},{:.2} zoom {:.1} with {} layers",
        view.camera.longitude,
        view.camera.latitude,
        view.camera.zoom,
        view.layers.len()
    );
    Ok(())
}

fn attach_view(
    sequencer: &mut Sequencer<Vec<String>, CameraView, ImageOverlay, RealtimeScheduler>,
    view: &Rc<RefCell<ViewState>>,
) {
    let (on_step, on_layers, on_camera, on_image) =
        (Rc::clone(view), Rc::clone(view), Rc::clone(view), Rc::clone(view));

    sequencer
        .observers_mut()
        .on_step_change(move |step, index| {
            tracing::info!("Step {index}: {}", step.kind().name());
            let mut view = on_step.borrow_mut();
            view.overlay = None;
            if matches!(step, Step::Camera { .. }) {
                view.begin_flight();
            }
        })
        .on_layers_change(move |layers, duration| {
            tracing::info!("Showing layers {layers:?} for {duration:?}");
            on_layers.borrow_mut().layers = layers.clone();
        })
        .on_camera_change(move |target, eased| {
            let mut view = on_camera.borrow_mut();
            view.fly(target, eased);
            tracing::trace!("Camera frame {eased:.3}: {:?}", view.camera);
        })
        .on_image_show(move |image, duration| {
            match &image.caption {
                Some(caption) => tracing::info!("Overlay {} \"{caption}\" for {duration:?}", image.url),
                None => tracing::info!("Overlay {} for {duration:?}", image.url),
            }
            on_image.borrow_mut().overlay = Some(image.clone());
        })
        .on_progress(|progress, remaining| {
            tracing::debug!("Next step in {remaining:.2}s ({:.0}%)", progress * 100.0);
        });
}
