// SPDX-License-Identifier: MIT OR Apache-2.0
//! Map view state driven by story notifications.

use mapstory_sequencer::Interpolation;
use serde::{Deserialize, Serialize};

/// Map camera parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    /// Longitude in degrees
    pub longitude: f64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Zoom level
    pub zoom: f64,
    /// Bearing in degrees, clockwise from north
    #[serde(default)]
    pub bearing: f64,
    /// Pitch in degrees
    #[serde(default)]
    pub pitch: f64,
}

impl CameraView {
    /// Blend from `self` toward `target` by `t` (0..1)
    pub fn blend(&self, target: &CameraView, t: f64) -> CameraView {
        CameraView {
            longitude: Interpolation::lerp(self.longitude, target.longitude, t),
            latitude: Interpolation::lerp(self.latitude, target.latitude, t),
            zoom: Interpolation::lerp(self.zoom, target.zoom, t),
            bearing: Interpolation::lerp_angle(self.bearing, target.bearing, t).rem_euclid(360.0),
            pitch: Interpolation::lerp(self.pitch, target.pitch, t),
        }
    }
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            longitude: 0.0,
            latitude: 0.0,
            zoom: 1.0,
            bearing: 0.0,
            pitch: 0.0,
        }
    }
}

/// Image overlay payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageOverlay {
    /// Image location
    pub url: String,
    /// Optional caption
    #[serde(default)]
    pub caption: Option<String>,
}

/// What the map currently shows
#[derive(Debug, Default)]
pub struct ViewState {
    /// Camera at the start of the running flight
    flight_origin: CameraView,
    /// Camera as last rendered
    pub camera: CameraView,
    /// Visible layers
    pub layers: Vec<String>,
    /// Overlay on screen, if any
    pub overlay: Option<ImageOverlay>,
}

impl ViewState {
    /// Remember where a new flight starts from
    pub fn begin_flight(&mut self) {
        self.flight_origin = self.camera;
    }

    /// Apply one frame of a flight
    pub fn fly(&mut self, target: &CameraView, eased: f64) {
        self.camera = self.flight_origin.blend(target, eased);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_endpoints() {
        let from = CameraView::default();
        let to = CameraView { longitude: 10.0, latitude: -4.0, zoom: 9.0, bearing: 90.0, pitch: 45.0 };

        assert_eq!(from.blend(&to, 0.0), from);
        assert_eq!(from.blend(&to, 1.0), to);
    }

    #[test]
    fn test_bearing_wraps() {
        let from = CameraView { bearing: 10.0, ..CameraView::default() };
        let to = CameraView { bearing: 330.0, ..CameraView::default() };
        let mid = from.blend(&to, 0.5);
        assert!((mid.bearing - 350.0).abs() < 1e-9);
    }

    #[test]
    fn test_flight_starts_from_last_view() {
        let mut state = ViewState::default();
        let first = CameraView { longitude: 4.0, ..CameraView::default() };
        state.begin_flight();
        state.fly(&first, 1.0);

        let second = CameraView { longitude: 8.0, ..CameraView::default() };
        state.begin_flight();
        state.fly(&second, 0.5);
        assert!((state.camera.longitude - 6.0).abs() < 1e-9);
    }
}
