// SPDX-License-Identifier: MIT OR Apache-2.0
//! Observer slots notified by the sequencer.
//!
//! Each of the five notifications has its own slot. A slot left unset is
//! simply skipped; it is never an error.

use crate::step::Step;
use std::time::Duration;

/// Called with the step about to be shown and its index
pub type StepChangeFn<L, C, I> = Box<dyn FnMut(&Step<L, C, I>, usize)>;
/// Called with the layers payload and the step duration
pub type LayersChangeFn<L> = Box<dyn FnMut(&L, Duration)>;
/// Called once per frame with the camera target and the eased blend factor
pub type CameraChangeFn<C> = Box<dyn FnMut(&C, f64)>;
/// Called with the image payload and the step duration
pub type ImageShowFn<I> = Box<dyn FnMut(&I, Duration)>;
/// Called with progress (0..1) and remaining seconds until the next step
pub type ProgressFn = Box<dyn FnMut(f64, f64)>;

/// The five notification slots of a sequencer
pub struct Observers<L, C, I> {
    step_change: Option<StepChangeFn<L, C, I>>,
    layers_change: Option<LayersChangeFn<L>>,
    camera_change: Option<CameraChangeFn<C>>,
    image_show: Option<ImageShowFn<I>>,
    progress: Option<ProgressFn>,
}

impl<L, C, I> Observers<L, C, I> {
    /// Create a set of empty slots
    pub fn new() -> Self {
        Self {
            step_change: None,
            layers_change: None,
            camera_change: None,
            image_show: None,
            progress: None,
        }
    }

    /// Set the step-changed slot
    pub fn on_step_change(&mut self, f: impl FnMut(&Step<L, C, I>, usize) + 'static) -> &mut Self {
        self.step_change = Some(Box::new(f));
        self
    }

    /// Set the layers-changed slot
    pub fn on_layers_change(&mut self, f: impl FnMut(&L, Duration) + 'static) -> &mut Self {
        self.layers_change = Some(Box::new(f));
        self
    }

    /// Set the camera-changed slot
    pub fn on_camera_change(&mut self, f: impl FnMut(&C, f64) + 'static) -> &mut Self {
        self.camera_change = Some(Box::new(f));
        self
    }

    /// Set the image-shown slot
    pub fn on_image_show(&mut self, f: impl FnMut(&I, Duration) + 'static) -> &mut Self {
        self.image_show = Some(Box::new(f));
        self
    }

    /// Set the progress-updated slot
    pub fn on_progress(&mut self, f: impl FnMut(f64, f64) + 'static) -> &mut Self {
        self.progress = Some(Box::new(f));
        self
    }

    /// Whether a camera observer is registered
    pub fn has_camera(&self) -> bool {
        self.camera_change.is_some()
    }

    pub(crate) fn step_changed(&mut self, step: &Step<L, C, I>, index: usize) {
        if let Some(f) = self.step_change.as_mut() {
            f(step, index);
        }
    }

    pub(crate) fn layers_changed(&mut self, layers: &L, duration: Duration) {
        if let Some(f) = self.layers_change.as_mut() {
            f(layers, duration);
        }
    }

    pub(crate) fn camera_changed(&mut self, camera: &C, eased: f64) {
        if let Some(f) = self.camera_change.as_mut() {
            f(camera, eased);
        }
    }

    pub(crate) fn image_shown(&mut self, image: &I, duration: Duration) {
        if let Some(f) = self.image_show.as_mut() {
            f(image, duration);
        }
    }

    pub(crate) fn progress_updated(&mut self, progress: f64, remaining_secs: f64) {
        if let Some(f) = self.progress.as_mut() {
            f(progress, remaining_secs);
        }
    }
}

impl<L, C, I> Default for Observers<L, C, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L, C, I> std::fmt::Debug for Observers<L, C, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("step_change", &self.step_change.is_some())
            .field("layers_change", &self.layers_change.is_some())
            .field("camera_change", &self.camera_change.is_some())
            .field("image_show", &self.image_show.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
