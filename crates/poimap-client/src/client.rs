//! HTTP client for the map/POI REST backend.
//!
//! This is the only place the application talks to the network. GETs are
//! retried on transient failures; RFC POSTs are sent exactly once.

use std::time::Duration;

use poimap_core::{AppConfig, Category, ChangeRfc, MapConfig, MapSummary, Poi, SuggestionRfc};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ClientError;
use crate::normalize::{normalize_category, normalize_map_config, normalize_poi};
use crate::retry::retry_with_backoff;
use crate::types::{MapDetail, MapItem, MapListResponse, WirePoi, WirePoiCategory};

/// Tunables for [`ApiClient`]. Build from [`AppConfig`] in production.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    /// Style descriptor attached to every loaded [`MapConfig`].
    pub map_style: String,
    pub emulator_host: String,
}

impl ClientOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
            map_style: config.map_style_url.clone(),
            emulator_host: config.emulator_host.clone(),
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 500,
            map_style: poimap_core::config::DEFAULT_MAP_STYLE_URL.to_string(),
            emulator_host: "10.0.2.2".to_string(),
        }
    }
}

/// Client for the backend REST API.
///
/// Use [`ApiClient::new`] with the configured base URL, or point it at a
/// wiremock server in tests.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    options: ClientOptions,
}

impl ApiClient {
    /// Creates a client rooted at `base_url` (e.g. `http://10.0.2.2:5006/api`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, options: ClientOptions) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("poimap/0.1")
            .build()?;

        // Exactly one trailing slash so relative joins append below the API root.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "expected an absolute http(s) URL".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            options,
        })
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(&config.api_base_url, ClientOptions::from_app_config(config))
    }

    /// `GET /map`: every map the backend knows about.
    ///
    /// # Errors
    ///
    /// [`ClientError::Http`] on network failure or non-2xx status after
    /// retries; [`ClientError::Deserialize`] on an unexpected body.
    pub async fn fetch_maps(&self) -> Result<Vec<MapSummary>, ClientError> {
        let url = self.build_url(&["map"], &[])?;
        let response: MapListResponse = self.get_json(&url, "GET /map").await?;
        Ok(response.items.into_iter().map(map_summary).collect())
    }

    /// `GET /map/closest`: the map nearest to the given position.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::fetch_maps`].
    pub async fn fetch_closest_map(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<MapSummary, ClientError> {
        let url = self.build_url(
            &["map", "closest"],
            &[
                ("latitude", &latitude.to_string()),
                ("longitude", &longitude.to_string()),
            ],
        )?;
        let item: MapItem = self.get_json(&url, "GET /map/closest").await?;
        Ok(map_summary(item))
    }

    /// `GET /map/{id}`: full map detail assembled into a [`MapConfig`].
    ///
    /// # Errors
    ///
    /// - [`ClientError::MapNotFound`] if the backend answers with no map.
    /// - [`ClientError::InvalidArea`] if the map has no usable area polygon.
    /// - [`ClientError::Http`] / [`ClientError::Deserialize`] as for other GETs.
    pub async fn fetch_map(&self, map_id: &str) -> Result<MapConfig, ClientError> {
        let url = self.build_url(&["map", map_id], &[])?;
        let detail: Option<MapDetail> = self.get_json(&url, "GET /map/{id}").await?;
        normalize_map_config(
            map_id,
            detail,
            &self.options.map_style,
            &self.options.emulator_host,
        )
    }

    /// `GET /poi?mapId=`: all POIs of a map, normalized. Each record is
    /// read on its own; only records without a string `id` are skipped.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::fetch_maps`].
    pub async fn fetch_pois(&self, map_id: &str) -> Result<Vec<Poi>, ClientError> {
        let url = self.build_url(&["poi"], &[("mapId", map_id)])?;
        let items: Option<Vec<serde_json::Value>> = self.get_json(&url, "GET /poi").await?;
        Ok(items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| match WirePoi::deserialize(item) {
                Ok(poi) => Some(normalize_poi(poi)),
                Err(error) => {
                    tracing::warn!(map_id, %error, "skipping POI without a usable id");
                    None
                }
            })
            .collect())
    }

    /// `GET /category`: categories for the suggestion form picker.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::fetch_maps`].
    pub async fn fetch_categories(&self) -> Result<Vec<Category>, ClientError> {
        let url = self.build_url(&["category"], &[])?;
        let items: Option<Vec<WirePoiCategory>> = self.get_json(&url, "GET /category").await?;
        Ok(items
            .unwrap_or_default()
            .into_iter()
            .map(normalize_category)
            .collect())
    }

    /// `POST /rfc/poisuggestion`: suggest a new POI. Not retried.
    ///
    /// # Errors
    ///
    /// [`ClientError::Rejected`] on a non-2xx status, [`ClientError::Http`]
    /// on network failure.
    pub async fn create_suggestion(
        &self,
        rfc: &SuggestionRfc,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.build_url(&["rfc", "poisuggestion"], &[])?;
        self.post_json(&url, rfc, "POST /rfc/poisuggestion").await
    }

    /// `POST /rfc`: suggest a change to an existing POI. Not retried.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::create_suggestion`].
    pub async fn create_change(&self, rfc: &ChangeRfc) -> Result<serde_json::Value, ClientError> {
        let url = self.build_url(&["rfc"], &[])?;
        self.post_json(&url, rfc, "POST /rfc").await
    }

    /// Appends path segments and query parameters to the API root,
    /// percent-encoding both.
    fn build_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry path segments".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET with retry, asserts a 2xx status and parses the body.
    /// An empty body parses as JSON `null`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, ClientError> {
        let body = retry_with_backoff(self.options.max_retries, self.options.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let response = response.error_for_status()?;
                Ok(response.text().await?)
            }
        })
        .await?;

        let body = if body.trim().is_empty() {
            "null"
        } else {
            body.as_str()
        };
        serde_json::from_str(body).map_err(|e| ClientError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        url: &Url,
        payload: &B,
        endpoint: &str,
    ) -> Result<serde_json::Value, ClientError> {
        let response = self
            .client
            .post(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
            context: endpoint.to_string(),
            source: e,
        })
    }
}

fn map_summary(item: MapItem) -> MapSummary {
    MapSummary {
        id: item.id,
        name: item.name,
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
