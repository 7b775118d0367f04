//! Viewport-driven POI clustering.
//!
//! [`ClusterEngine`] owns the index for the current POI list and a throttled
//! viewport query. Region-change events feed [`ClusterEngine::update_viewport`]
//! at gesture frequency; the event loop calls [`ClusterEngine::poll`] at the
//! throttle deadline and the latest viewport is re-queried once.

mod index;
pub mod projection;

use std::time::{Duration, Instant};

use poimap_core::{Coordinate, Poi};
use serde::Serialize;

use crate::throttle::Throttle;

pub use index::{
    ClusterIndex, ClusterOptions, DEFAULT_EXTENT, DEFAULT_MAX_ZOOM, DEFAULT_MIN_POINTS,
    DEFAULT_RADIUS,
};

/// Trailing throttle window for viewport re-queries.
pub const QUERY_THROTTLE: Duration = Duration::from_millis(16);

/// Visible region as `[lng, lat]` corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportBounds {
    pub sw: [f64; 2],
    pub ne: [f64; 2],
}

impl ViewportBounds {
    #[must_use]
    pub fn new(sw: [f64; 2], ne: [f64; 2]) -> Self {
        Self { sw, ne }
    }
}

/// One renderable marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClusterEntry {
    #[serde(rename_all = "camelCase")]
    Cluster {
        cluster_id: u64,
        coordinate: Coordinate,
        point_count: usize,
    },
    Leaf(Poi),
}

impl ClusterEntry {
    #[must_use]
    pub fn is_cluster(&self) -> bool {
        matches!(self, ClusterEntry::Cluster { .. })
    }

    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        match self {
            ClusterEntry::Cluster { coordinate, .. } => *coordinate,
            ClusterEntry::Leaf(poi) => poi.coordinate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ViewportQuery {
    bounds: ViewportBounds,
    zoom: f64,
}

#[derive(Debug)]
pub struct ClusterEngine {
    index: Option<ClusterIndex>,
    throttle: Throttle<ViewportQuery>,
    last_query: Option<ViewportQuery>,
    snapshot: Vec<ClusterEntry>,
}

impl Default for ClusterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: None,
            throttle: Throttle::new(QUERY_THROTTLE),
            last_query: None,
            snapshot: Vec::new(),
        }
    }

    /// Rebuilds the index for a new POI list and re-runs the last viewport
    /// query immediately so markers never show stale POIs.
    pub fn set_points(&mut self, points: &[Poi]) {
        self.index = ClusterIndex::build(points, ClusterOptions::default());
        self.requery();
    }

    /// Queues a viewport query; only the latest one per window runs.
    pub fn update_viewport(&mut self, bounds: ViewportBounds, zoom: f64, now: Instant) {
        self.throttle.push(ViewportQuery { bounds, zoom }, now);
    }

    /// Runs the pending query if its window has closed. Returns `true` when
    /// the snapshot was recomputed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.throttle.poll(now) {
            Some(query) => {
                self.last_query = Some(query);
                self.requery();
                true
            }
            None => false,
        }
    }

    /// When the next [`ClusterEngine::poll`] has work to do.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.throttle.deadline()
    }

    /// Drops any queued query, e.g. when the map screen goes away.
    pub fn cancel_pending(&mut self) {
        self.throttle.cancel();
    }

    #[must_use]
    pub fn snapshot(&self) -> &[ClusterEntry] {
        &self.snapshot
    }

    #[must_use]
    pub fn index(&self) -> Option<&ClusterIndex> {
        self.index.as_ref()
    }

    #[must_use]
    pub fn expansion_zoom(&self, cluster_id: u64) -> Option<u32> {
        self.index.as_ref()?.expansion_zoom(cluster_id)
    }

    fn requery(&mut self) {
        self.snapshot = match (&self.index, &self.last_query) {
            (Some(index), Some(query)) => index.clusters(&query.bounds, query.zoom),
            _ => Vec::new(),
        };
        tracing::trace!(markers = self.snapshot.len(), "cluster snapshot updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poimap_core::{Category, MapRef};

    fn poi(guid: &str, lng: f64, lat: f64) -> Poi {
        Poi {
            guid: guid.to_string(),
            title: guid.to_string(),
            description: String::new(),
            image: None,
            coordinate: Coordinate::from_lng_lat(lng, lat),
            category: Category {
                category: "Park".to_string(),
                category_name: "Park".to_string(),
                icon_name: "tree".to_string(),
            },
            status: "Active".to_string(),
            wheel_chair_accessible: false,
            opening_hours: Vec::new(),
            map: MapRef {
                id: "map-1".to_string(),
                name: "Map 1".to_string(),
            },
        }
    }

    fn view() -> ViewportBounds {
        ViewportBounds::new([5.0, 51.6], [5.1, 51.7])
    }

    #[test]
    fn empty_points_render_nothing() {
        let start = Instant::now();
        let mut engine = ClusterEngine::new();
        engine.set_points(&[]);
        engine.update_viewport(view(), 15.0, start);
        assert!(engine.poll(start + QUERY_THROTTLE));
        assert!(engine.index().is_none());
        assert!(engine.snapshot().is_empty());
    }

    #[test]
    fn viewport_burst_runs_one_query_after_window() {
        let start = Instant::now();
        let mut engine = ClusterEngine::new();
        engine.set_points(&[poi("a", 5.04, 51.64), poi("b", 5.06, 51.66)]);

        engine.update_viewport(view(), 3.0, start);
        engine.update_viewport(view(), 18.0, start + Duration::from_millis(8));
        assert!(!engine.poll(start + Duration::from_millis(10)));
        assert!(engine.snapshot().is_empty());

        assert!(engine.poll(start + QUERY_THROTTLE));
        // Latest zoom (18) wins: both POIs are separate leaves.
        assert_eq!(engine.snapshot().len(), 2);
        assert!(engine.snapshot().iter().all(|e| !e.is_cluster()));
        assert!(!engine.poll(start + QUERY_THROTTLE * 3));
    }

    #[test]
    fn refetch_requeries_last_viewport_immediately() {
        let start = Instant::now();
        let mut engine = ClusterEngine::new();
        engine.set_points(&[poi("a", 5.04, 51.64)]);
        engine.update_viewport(view(), 18.0, start);
        engine.poll(start + QUERY_THROTTLE);
        assert_eq!(engine.snapshot().len(), 1);

        engine.set_points(&[poi("a", 5.04, 51.64), poi("b", 5.06, 51.66)]);
        assert_eq!(engine.snapshot().len(), 2);
    }

    #[test]
    fn cluster_entry_serializes_with_kind_tag() {
        let entry = ClusterEntry::Cluster {
            cluster_id: 43,
            coordinate: Coordinate::from_lng_lat(5.0, 51.0),
            point_count: 3,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "cluster");
        assert_eq!(json["clusterId"], 43);
        assert_eq!(json["pointCount"], 3);
    }
}
