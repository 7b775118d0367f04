//! Normalization of backend API types into core records.
//!
//! The backend is not strict about shapes: coordinates arrive as strings,
//! categories go missing, times carry seconds. Everything here is total;
//! the only failures are the map-detail shape errors the caller must see.

use poimap_core::{geometry, Category, Coordinate, MapConfig, MapRef, OpeningHours, Poi};

use crate::error::ClientError;
use crate::types::{MapDetail, WireCoordinate, WireOpeningHours, WirePoi, WirePoiCategory};

const DAY_NAMES: [&str; 7] = [
    "Maandag",
    "Dinsdag",
    "Woensdag",
    "Donderdag",
    "Vrijdag",
    "Zaterdag",
    "Zondag",
];

/// Maps a zero-based, Monday-first day index to its display name.
#[must_use]
pub fn day_of_week_name(day: i64) -> &'static str {
    usize::try_from(day)
        .ok()
        .and_then(|d| DAY_NAMES.get(d))
        .copied()
        .unwrap_or("Onbekend")
}

/// Trims `HH:MM:SS` to `HH:MM`.
#[must_use]
pub fn format_time(time: &str) -> String {
    time.chars().take(5).collect()
}

fn numeric(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

/// Parses a wire coordinate, replacing each out-of-range or unparseable
/// component with `0`.
#[must_use]
pub fn normalize_coordinate(wire: Option<&WireCoordinate>) -> Coordinate {
    let lat = wire.and_then(|c| numeric(&c.latitude));
    let lon = wire.and_then(|c| numeric(&c.longitude));

    let latitude = lat.filter(|v| (-90.0..=90.0).contains(v)).unwrap_or(0.0);
    let longitude = lon.filter(|v| (-180.0..=180.0).contains(v)).unwrap_or(0.0);

    Coordinate {
        latitude,
        longitude,
    }
}

fn normalize_opening_hours(entry: &WireOpeningHours) -> OpeningHours {
    OpeningHours {
        guid: entry.guid.clone(),
        day_of_week: day_of_week_name(entry.day_of_week).to_string(),
        day_index: u8::try_from(entry.day_of_week).unwrap_or(u8::MAX),
        start: format_time(&entry.start),
        end: format_time(&entry.end),
    }
}

/// Converts a [`WirePoi`] into a [`Poi`].
#[must_use]
pub fn normalize_poi(item: WirePoi) -> Poi {
    let category_name = item
        .category
        .as_ref()
        .and_then(|c| c.category_name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    let icon_name = item
        .category
        .as_ref()
        .and_then(|c| c.icon_name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "default-icon".to_string());

    let opening_hours = item
        .opening_hours
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(normalize_opening_hours)
        .collect();

    Poi {
        guid: item.id,
        title: item.title,
        description: item.description.unwrap_or_default(),
        image: item.image,
        coordinate: normalize_coordinate(item.coordinate.as_ref()),
        category: Category {
            category: category_name.clone(),
            category_name,
            icon_name,
        },
        status: item
            .status
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        wheel_chair_accessible: item.is_wheelchair_accessible.unwrap_or(false),
        opening_hours,
        map: MapRef {
            id: item
                .map_id
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            name: item.map.and_then(|m| m.name).unwrap_or_default(),
        },
    }
}

/// Converts a category list entry for the suggestion form picker.
#[must_use]
pub fn normalize_category(item: WirePoiCategory) -> Category {
    Category {
        category: item.category_name.clone(),
        category_name: item.category_name,
        icon_name: item
            .icon_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "default-icon".to_string()),
    }
}

/// Rewrites `localhost` in an image URL to a host reachable from an emulator.
#[must_use]
pub fn rewrite_localhost(url: &str, emulator_host: &str) -> String {
    url.replace("localhost", emulator_host)
}

/// Assembles a [`MapConfig`] from a map detail response.
///
/// The camera starts at the centroid of the map's `area` polygon.
///
/// # Errors
///
/// - [`ClientError::MapNotFound`] when the backend returned no map.
/// - [`ClientError::InvalidArea`] when the map has no area or its centroid
///   cannot be computed.
pub fn normalize_map_config(
    requested_id: &str,
    detail: Option<MapDetail>,
    map_style: &str,
    emulator_host: &str,
) -> Result<MapConfig, ClientError> {
    let detail = detail.ok_or_else(|| ClientError::MapNotFound(requested_id.to_string()))?;

    let area: Vec<Coordinate> = detail
        .area
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|c| normalize_coordinate(Some(c)))
        .collect();
    let center =
        geometry::centroid(&area).ok_or_else(|| ClientError::InvalidArea(detail.id.clone()))?;

    let bounds = detail.bounds.as_ref().map(|b| {
        b.iter()
            .map(|c| normalize_coordinate(Some(c)))
            .collect::<Vec<_>>()
    });

    let mut config = MapConfig::new(detail.id, map_style);
    config.center = center.lng_lat();
    config.area = Some(area);
    config.bounds = bounds.filter(|b| !b.is_empty());
    config.image_url = detail
        .image_url
        .filter(|u| !u.is_empty())
        .map(|u| rewrite_localhost(&u, emulator_host));
    Ok(config)
}
