use serde::{Deserialize, Serialize};

use crate::poi::Coordinate;

/// `[longitude, latitude]` of the default map center.
pub const DEFAULT_CENTER: [f64; 2] = [5.039_800, 51.645_067];
pub const DEFAULT_ZOOM: f64 = 15.0;
pub const MAX_ZOOM: f64 = 19.0;
pub const MIN_ZOOM: f64 = 0.0;

/// Entry from the map listing or the closest-map lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSummary {
    pub id: String,
    pub name: String,
}

/// The active map context: what the renderer draws and where the camera may go.
///
/// Invariant: `min_zoom <= zoom <= max_zoom`. Construct through
/// [`MapConfig::new`] or clamp with [`MapConfig::clamp_zoom`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub map_id: String,
    pub map_style: String,
    /// `[longitude, latitude]`
    pub center: [f64; 2],
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Polygon bounding where suggestions may be placed.
    pub area: Option<Vec<Coordinate>>,
    /// Rectangle used for camera clamping and image georeferencing.
    pub bounds: Option<Vec<Coordinate>>,
    pub image_url: Option<String>,
}

impl MapConfig {
    #[must_use]
    pub fn new(map_id: impl Into<String>, map_style: impl Into<String>) -> Self {
        Self {
            map_id: map_id.into(),
            map_style: map_style.into(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            area: None,
            bounds: None,
            image_url: None,
        }
    }

    /// Clamps `zoom` into `[min_zoom, max_zoom]`.
    #[must_use]
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_config_uses_default_camera() {
        let cfg = MapConfig::new("map-1", "style.json");
        assert_eq!(cfg.center, DEFAULT_CENTER);
        assert!((cfg.zoom - DEFAULT_ZOOM).abs() < f64::EPSILON);
        assert!(cfg.min_zoom <= cfg.zoom && cfg.zoom <= cfg.max_zoom);
    }

    #[test]
    fn clamp_zoom_stays_in_range() {
        let cfg = MapConfig::new("map-1", "style.json");
        assert!((cfg.clamp_zoom(42.0) - MAX_ZOOM).abs() < f64::EPSILON);
        assert!((cfg.clamp_zoom(-3.0) - MIN_ZOOM).abs() < f64::EPSILON);
        assert!((cfg.clamp_zoom(12.5) - 12.5).abs() < f64::EPSILON);
    }
}
