//! The async data boundary the interaction core depends on.
//!
//! Collection fetches never fail from the core's point of view: transient
//! errors become empty lists here. Map config and RFC submissions keep their
//! errors.

use poimap_client::{ApiClient, ClientError};
use poimap_core::{Category, ChangeRfc, MapConfig, MapSummary, Poi, SuggestionRfc};

#[allow(async_fn_in_trait)]
pub trait PoiBackend {
    async fn maps(&self) -> Vec<MapSummary>;

    /// # Errors
    ///
    /// Any [`ClientError`]; callers fall back to the first listed map.
    async fn closest_map(&self, latitude: f64, longitude: f64) -> Result<MapSummary, ClientError>;

    /// # Errors
    ///
    /// [`ClientError::MapNotFound`] / [`ClientError::InvalidArea`] for bad
    /// map data, or any transport error.
    async fn map_config(&self, map_id: &str) -> Result<MapConfig, ClientError>;

    async fn pois(&self, map_id: &str) -> Vec<Poi>;

    async fn categories(&self) -> Vec<Category>;

    /// # Errors
    ///
    /// Any [`ClientError`]; the submission is not retried.
    async fn submit_suggestion(&self, rfc: &SuggestionRfc) -> Result<(), ClientError>;

    /// # Errors
    ///
    /// Any [`ClientError`]; the submission is not retried.
    async fn submit_change(&self, rfc: &ChangeRfc) -> Result<(), ClientError>;
}

impl PoiBackend for ApiClient {
    async fn maps(&self) -> Vec<MapSummary> {
        self.fetch_maps().await.unwrap_or_else(|error| {
            tracing::warn!(%error, "map list unavailable");
            Vec::new()
        })
    }

    async fn closest_map(&self, latitude: f64, longitude: f64) -> Result<MapSummary, ClientError> {
        self.fetch_closest_map(latitude, longitude).await
    }

    async fn map_config(&self, map_id: &str) -> Result<MapConfig, ClientError> {
        self.fetch_map(map_id).await
    }

    async fn pois(&self, map_id: &str) -> Vec<Poi> {
        self.fetch_pois(map_id).await.unwrap_or_else(|error| {
            tracing::warn!(map_id, %error, "POI fetch failed");
            Vec::new()
        })
    }

    async fn categories(&self) -> Vec<Category> {
        self.fetch_categories().await.unwrap_or_else(|error| {
            tracing::warn!(%error, "category fetch failed");
            Vec::new()
        })
    }

    async fn submit_suggestion(&self, rfc: &SuggestionRfc) -> Result<(), ClientError> {
        self.create_suggestion(rfc).await.map(|_| ())
    }

    async fn submit_change(&self, rfc: &ChangeRfc) -> Result<(), ClientError> {
        self.create_change(rfc).await.map(|_| ())
    }
}
