//! Camera/viewport controller.
//!
//! The controller owns the tracked zoom and is the only issuer of camera
//! commands. Commands go to a [`CameraRenderer`] that may not be attached
//! yet; renderer failures are logged and swallowed.

use poimap_core::geometry::bounding_box;
use poimap_core::{Coordinate, MapConfig, DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};
use thiserror::Error;

/// Duration of the recenter animation.
pub const RECENTER_ANIMATION_MS: u64 = 1000;
/// Duration of the zoom-into-cluster animation.
pub const CLUSTER_ANIMATION_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera renderer is not attached")]
    Detached,

    #[error("camera renderer rejected command: {0}")]
    Renderer(String),
}

/// A camera movement for the renderer. Centers are `[lng, lat]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    ZoomTo {
        zoom: f64,
    },
    SetCamera {
        center: [f64; 2],
        zoom: f64,
        animation_ms: u64,
    },
    FlyTo {
        center: [f64; 2],
    },
}

/// The map SDK's camera handle.
pub trait CameraRenderer {
    /// # Errors
    ///
    /// Returns [`CameraError`] when the renderer cannot honor the command.
    fn apply(&mut self, command: &CameraCommand) -> Result<(), CameraError>;
}

/// `{ne, sw}` box the camera center must stay inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBounds {
    pub ne: [f64; 2],
    pub sw: [f64; 2],
}

impl CameraBounds {
    /// Derives the box from the config's `bounds` rectangle, if any.
    #[must_use]
    pub fn from_config(config: &MapConfig) -> Option<Self> {
        let (sw, ne) = bounding_box(config.bounds.as_deref()?)?;
        Some(Self {
            ne: ne.lng_lat(),
            sw: sw.lng_lat(),
        })
    }

    #[must_use]
    pub fn contains(&self, center: [f64; 2]) -> bool {
        (self.sw[0]..=self.ne[0]).contains(&center[0])
            && (self.sw[1]..=self.ne[1]).contains(&center[1])
    }

    /// Clamps `center` into the box.
    #[must_use]
    pub fn constrain(&self, center: [f64; 2]) -> [f64; 2] {
        [
            center[0].clamp(self.sw[0], self.ne[0]),
            center[1].clamp(self.sw[1], self.ne[1]),
        ]
    }
}

pub struct CameraController {
    renderer: Option<Box<dyn CameraRenderer>>,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    bounds: Option<CameraBounds>,
    user_location: Option<[f64; 2]>,
}

impl std::fmt::Debug for CameraController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraController")
            .field("attached", &self.renderer.is_some())
            .field("zoom", &self.zoom)
            .field("min_zoom", &self.min_zoom)
            .field("max_zoom", &self.max_zoom)
            .field("bounds", &self.bounds)
            .field("user_location", &self.user_location)
            .finish()
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            renderer: None,
            zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            bounds: None,
            user_location: None,
        }
    }

    /// Hands the controller the renderer's camera once it is mounted.
    pub fn attach(&mut self, renderer: Box<dyn CameraRenderer>) {
        self.renderer = Some(renderer);
    }

    pub fn detach(&mut self) {
        self.renderer = None;
    }

    /// Adopts zoom limits, initial zoom and the bounding box of `config`.
    pub fn load_config(&mut self, config: &MapConfig) {
        self.min_zoom = config.min_zoom;
        self.max_zoom = config.max_zoom.max(config.min_zoom);
        self.zoom = self.clamp(config.zoom);
        self.bounds = CameraBounds::from_config(config);
        tracing::debug!(
            map_id = %config.map_id,
            zoom = self.zoom,
            bounded = self.bounds.is_some(),
            "camera config loaded"
        );
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    #[must_use]
    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    /// Constraint to pass to the renderer's max-bounds setting.
    #[must_use]
    pub fn bounds(&self) -> Option<CameraBounds> {
        self.bounds
    }

    pub fn set_user_location(&mut self, location: Option<[f64; 2]>) {
        self.user_location = location;
    }

    #[must_use]
    pub fn user_location(&self) -> Option<[f64; 2]> {
        self.user_location
    }

    pub fn zoom_in(&mut self) {
        self.zoom = self.clamp(self.zoom + 1.0);
        self.issue(CameraCommand::ZoomTo { zoom: self.zoom });
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.clamp(self.zoom - 1.0);
        self.issue(CameraCommand::ZoomTo { zoom: self.zoom });
    }

    /// Absorbs a zoom reported by the renderer. Issues no command, since the
    /// camera is already there.
    pub fn set_zoom_level(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = self.clamp(zoom);
        }
    }

    /// Moves to the user's location at max zoom. No-op without a fix.
    pub fn recenter(&mut self) {
        let Some(location) = self.user_location else {
            tracing::debug!("recenter requested without a location fix");
            return;
        };
        self.zoom = self.max_zoom;
        self.issue(CameraCommand::SetCamera {
            center: self.constrain(location),
            zoom: self.zoom,
            animation_ms: RECENTER_ANIMATION_MS,
        });
    }

    pub fn fly_to(&mut self, center: [f64; 2]) {
        let center = self.constrain(center);
        self.issue(CameraCommand::FlyTo { center });
    }

    /// Zooms onto a tapped cluster one level past where it splits. Returns
    /// the new tracked zoom.
    pub fn zoom_to_cluster(&mut self, coordinate: Coordinate, expansion_zoom: u32) -> f64 {
        let target = (f64::from(expansion_zoom) + 1.0).min(self.max_zoom);
        self.zoom = self.clamp(target);
        self.issue(CameraCommand::SetCamera {
            center: self.constrain(coordinate.lng_lat()),
            zoom: self.zoom,
            animation_ms: CLUSTER_ANIMATION_MS,
        });
        self.zoom
    }

    fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    fn constrain(&self, center: [f64; 2]) -> [f64; 2] {
        match &self.bounds {
            Some(bounds) => bounds.constrain(center),
            None => center,
        }
    }

    fn issue(&mut self, command: CameraCommand) {
        let result = match self.renderer.as_mut() {
            Some(renderer) => renderer.apply(&command),
            None => Err(CameraError::Detached),
        };
        if let Err(error) = result {
            tracing::warn!(?command, %error, "camera command dropped");
        }
    }
}

#[cfg(test)]
#[path = "camera_test.rs"]
mod tests;
