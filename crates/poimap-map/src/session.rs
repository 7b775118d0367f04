//! The map screen's context object.
//!
//! [`MapSession`] is built once at the application root and handed to
//! whatever drives the event loop. It resolves which map to show, keeps the
//! POI list fresh on a fixed interval, feeds the cluster engine and routes
//! user input into the [`SuggestionFlow`].

use std::time::{Duration, Instant};

use poimap_core::geometry::image_corners;
use poimap_core::{Category, MapConfig, Poi};

use crate::backend::PoiBackend;
use crate::cluster::{ClusterEngine, ClusterEntry, ViewportBounds};
use crate::error::FlowError;
use crate::flow::{SuggestionFlow, TapOutcome};
use crate::location::LocationWatch;
use crate::screen::{ScreenAction, ScreenState};

/// How the initial map was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapResolution {
    Closest(String),
    First(String),
    /// No map exists; the session is in `EMPTY_MAP`.
    Empty,
}

/// Georeferenced background image for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundImage {
    pub url: String,
    /// `[lng, lat]` corners in the order the image source expects.
    pub corners: [[f64; 2]; 4],
}

pub struct MapSession<B> {
    backend: B,
    flow: SuggestionFlow,
    clusters: ClusterEngine,
    location: Option<LocationWatch>,
    config: MapConfig,
    map_id: Option<String>,
    pois: Vec<Poi>,
    categories: Option<Vec<Category>>,
    refetch_interval: Duration,
    next_refetch: Option<Instant>,
}

impl<B> std::fmt::Debug for MapSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSession")
            .field("map_id", &self.map_id)
            .field("screen", &self.flow.screen_state())
            .field("pois", &self.pois.len())
            .field("next_refetch", &self.next_refetch)
            .finish_non_exhaustive()
    }
}

impl<B: PoiBackend> MapSession<B> {
    #[must_use]
    pub fn new(backend: B, flow: SuggestionFlow, refetch_interval: Duration) -> Self {
        Self {
            backend,
            flow,
            clusters: ClusterEngine::new(),
            location: None,
            config: MapConfig::default(),
            map_id: None,
            pois: Vec::new(),
            categories: None,
            refetch_interval,
            next_refetch: None,
        }
    }

    /// Takes ownership of the app's single location subscription.
    pub fn attach_location(&mut self, watch: LocationWatch) {
        self.location = Some(watch);
        self.sync_location();
    }

    #[must_use]
    pub fn user_location(&self) -> Option<[f64; 2]> {
        self.location.as_ref().and_then(LocationWatch::latest)
    }

    #[must_use]
    pub fn has_location_permission(&self) -> bool {
        self.location
            .as_ref()
            .is_some_and(LocationWatch::has_permission)
    }

    /// Picks the closest map if a fix exists, else the first listed map,
    /// else enters `EMPTY_MAP`.
    ///
    /// # Errors
    ///
    /// [`FlowError::Backend`] if the chosen map's config cannot be loaded.
    pub async fn bootstrap(&mut self, now: Instant) -> Result<MapResolution, FlowError> {
        self.sync_location();
        let maps = self.backend.maps().await;

        let closest = match self.user_location() {
            Some([lng, lat]) => match self.backend.closest_map(lat, lng).await {
                Ok(map) => Some(map.id),
                Err(error) => {
                    tracing::warn!(%error, "closest map lookup failed");
                    None
                }
            },
            None => None,
        };

        let resolution = match (closest, maps.first()) {
            (Some(id), _) => MapResolution::Closest(id),
            (None, Some(first)) => MapResolution::First(first.id.clone()),
            (None, None) => MapResolution::Empty,
        };
        tracing::info!(?resolution, maps = maps.len(), "map resolved");

        match &resolution {
            MapResolution::Closest(id) | MapResolution::First(id) => {
                self.set_map_id(id, now).await?;
            }
            MapResolution::Empty => self.flow.dispatch(ScreenAction::empty_map()),
        }
        Ok(resolution)
    }

    /// Switches the active map: drops its POIs, loads the new config and
    /// fetches POIs afresh.
    ///
    /// # Errors
    ///
    /// [`FlowError::Backend`] if the config cannot be loaded. The previous
    /// map stays active in that case.
    pub async fn set_map_id(&mut self, map_id: &str, now: Instant) -> Result<(), FlowError> {
        let config = self.backend.map_config(map_id).await?;
        tracing::info!(map_id, "active map changed");

        self.pois.clear();
        self.clusters.set_points(&[]);
        self.flow.camera_mut().load_config(&config);
        self.config = config;
        self.map_id = Some(map_id.to_string());
        if self.flow.screen_state() == ScreenState::EmptyMap {
            self.flow.dispatch(ScreenAction::viewing());
        }
        self.refresh_pois(now).await;
        Ok(())
    }

    /// Replaces the POI list wholesale. Camera and zoom are left alone.
    pub async fn refresh_pois(&mut self, now: Instant) {
        let Some(map_id) = self.map_id.clone() else {
            return;
        };
        self.pois = self.backend.pois(&map_id).await;
        self.clusters.set_points(&self.pois);
        self.next_refetch = Some(now + self.refetch_interval);
        tracing::debug!(map_id, pois = self.pois.len(), "POIs refreshed");
    }

    /// Refetches POIs if the interval has elapsed. Returns `true` if it did.
    pub async fn poll_refresh(&mut self, now: Instant) -> bool {
        match self.next_refetch {
            Some(due) if now >= due => {
                self.refresh_pois(now).await;
                true
            }
            _ => false,
        }
    }

    /// Recenter button: moves the camera to the latest fix at max zoom.
    /// No-op without a fix.
    pub fn recenter(&mut self) {
        self.sync_location();
        self.flow.camera_mut().recenter();
    }

    /// Region-change event from the renderer, at gesture frequency.
    pub fn on_region_change(&mut self, bounds: ViewportBounds, zoom: f64, now: Instant) {
        self.flow.camera_mut().set_zoom_level(zoom);
        let zoom = self.flow.camera().zoom();
        self.clusters.update_viewport(bounds, zoom, now);
    }

    /// Runs due throttled work. Returns `true` if the cluster snapshot
    /// changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.sync_location();
        self.clusters.poll(now)
    }

    /// Earliest instant at which [`MapSession::tick`] or
    /// [`MapSession::poll_refresh`] has work.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.clusters.deadline(), self.next_refetch) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Zooms onto a rendered cluster. Returns the new tracked zoom, or
    /// `None` if the cluster is not on screen or the map is not interactive.
    pub fn tap_cluster(&mut self, cluster_id: u64) -> Option<f64> {
        if !self.flow.can_interact_with_map() {
            return None;
        }
        let coordinate = self.clusters.snapshot().iter().find_map(|entry| match entry {
            ClusterEntry::Cluster {
                cluster_id: id,
                coordinate,
                ..
            } if *id == cluster_id => Some(*coordinate),
            _ => None,
        })?;
        let expansion = self.clusters.expansion_zoom(cluster_id)?;
        let zoom = self.flow.camera_mut().zoom_to_cluster(coordinate, expansion);
        tracing::debug!(cluster_id, expansion, zoom, "cluster tapped");
        Some(zoom)
    }

    /// Opens the detail sheet for a rendered POI marker.
    pub fn tap_poi(&mut self, guid: &str) -> bool {
        match self.pois.iter().find(|p| p.guid == guid) {
            Some(poi) => {
                let poi = poi.clone();
                self.flow.select_poi(poi)
            }
            None => false,
        }
    }

    /// A tap on the map surface itself.
    pub fn tap_map(&mut self, point: [f64; 2]) -> TapOutcome {
        if !self.flow.can_interact_with_map() {
            return TapOutcome::Ignored;
        }
        self.flow.handle_map_tap(point, self.config.area.as_deref())
    }

    /// "Suggest POI" from the viewing screen.
    ///
    /// # Errors
    ///
    /// See [`SuggestionFlow::start_suggestion`].
    pub fn start_suggestion(&mut self) -> Result<(), FlowError> {
        self.sync_location();
        let location = self.user_location();
        self.flow.start_suggestion(location)
    }

    /// # Errors
    ///
    /// See [`SuggestionFlow::submit_new`].
    pub async fn submit_new(&mut self) -> Result<(), FlowError> {
        self.flow
            .submit_new(&self.backend, self.map_id.as_deref())
            .await
    }

    /// # Errors
    ///
    /// See [`SuggestionFlow::submit_change`].
    pub async fn submit_change(&mut self) -> Result<(), FlowError> {
        self.flow.submit_change(&self.backend).await
    }

    /// Category picker contents, fetched on first use.
    pub async fn categories(&mut self) -> &[Category] {
        if self.categories.is_none() {
            self.categories = Some(self.backend.categories().await);
        }
        self.categories.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn background_image(&self) -> Option<BackgroundImage> {
        let url = self.config.image_url.as_ref().filter(|u| !u.is_empty())?;
        let bounds = self.config.bounds.as_deref()?;
        Some(BackgroundImage {
            url: url.clone(),
            corners: image_corners(bounds),
        })
    }

    #[must_use]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    #[must_use]
    pub fn map_id(&self) -> Option<&str> {
        self.map_id.as_deref()
    }

    #[must_use]
    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    #[must_use]
    pub fn markers(&self) -> &[ClusterEntry] {
        self.clusters.snapshot()
    }

    #[must_use]
    pub fn clusters(&self) -> &ClusterEngine {
        &self.clusters
    }

    #[must_use]
    pub fn flow(&self) -> &SuggestionFlow {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut SuggestionFlow {
        &mut self.flow
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn sync_location(&mut self) {
        let location = self.user_location();
        self.flow.camera_mut().set_user_location(location);
    }
}
