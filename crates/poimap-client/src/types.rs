//! Backend API response types.
//!
//! These model the JSON the REST backend returns. They are deliberately
//! lenient (`Option` everywhere the backend has been seen to omit data);
//! [`crate::normalize`] turns them into the strict core records.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Falls back to `T::default()` when the field has the wrong shape, so one
/// odd field never sinks the record around it.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// GET /map, GET /map/closest
// ---------------------------------------------------------------------------

/// Envelope of `GET /map`: `{ "items": [ ... ] }`.
#[derive(Debug, Deserialize)]
pub struct MapListResponse {
    #[serde(default)]
    pub items: Vec<MapItem>,
}

#[derive(Debug, Deserialize)]
pub struct MapItem {
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// GET /map/{id}
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDetail {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub area: Option<Vec<WireCoordinate>>,
    #[serde(default)]
    pub bounds: Option<Vec<WireCoordinate>>,
    #[serde(default)]
    pub image_url: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /poi
// ---------------------------------------------------------------------------

/// Latitude and longitude as they arrive: numbers, numeric strings, or junk.
#[derive(Debug, Default, Deserialize)]
pub struct WireCoordinate {
    #[serde(default)]
    pub latitude: serde_json::Value,
    #[serde(default)]
    pub longitude: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCategory {
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub icon_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOpeningHours {
    #[serde(default, deserialize_with = "lenient")]
    pub guid: String,
    /// Zero-based, Monday first. Missing maps to `-1`.
    #[serde(default = "unknown_day", deserialize_with = "lenient_day")]
    pub day_of_week: i64,
    /// `HH:MM:SS`
    #[serde(default, deserialize_with = "lenient")]
    pub start: String,
    #[serde(default, deserialize_with = "lenient")]
    pub end: String,
}

fn unknown_day() -> i64 {
    -1
}

fn lenient_day<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_i64().unwrap_or_else(unknown_day))
}

#[derive(Debug, Deserialize)]
pub struct WireMapName {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePoi {
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub coordinate: Option<WireCoordinate>,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<WireCategory>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub map_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub map: Option<WireMapName>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_wheelchair_accessible: Option<bool>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub opening_hours: Option<Vec<WireOpeningHours>>,
}

/// Keeps the well-formed entries of a list and drops the rest.
fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(None);
    };
    Ok(Some(
        items
            .into_iter()
            .filter_map(|item| T::deserialize(item).ok())
            .collect(),
    ))
}

// ---------------------------------------------------------------------------
// GET /category
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePoiCategory {
    pub category_name: String,
    #[serde(default)]
    pub icon_name: Option<String>,
}
