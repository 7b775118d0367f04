//! Point-of-interest records as the interaction core sees them.
//!
//! These are produced by the HTTP boundary after normalization and are
//! replaced wholesale on every refetch; nothing in the core mutates them.

use serde::{Deserialize, Serialize};

/// A WGS84 position. Field order on the wire is `{latitude, longitude}`,
/// while map renderers take `[longitude, latitude]` pairs; use
/// [`Coordinate::lng_lat`] at that boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn from_lng_lat(longitude: f64, latitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    #[must_use]
    pub fn lng_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// `true` when both components fall inside `[-90, 90] x [-180, 180]`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category: String,
    pub category_name: String,
    pub icon_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    pub guid: String,
    /// Display name of the day, e.g. `"Maandag"`.
    pub day_of_week: String,
    /// Zero-based day index, Monday first. Used for ordering.
    pub day_index: u8,
    /// `HH:MM`
    pub start: String,
    /// `HH:MM`
    pub end: String,
}

/// Weak back-reference from a POI to the map it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    pub guid: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub coordinate: Coordinate,
    pub category: Category,
    pub status: String,
    pub wheel_chair_accessible: bool,
    pub opening_hours: Vec<OpeningHours>,
    pub map: MapRef,
}

impl Poi {
    /// Opening hours ordered by day index, as shown in the detail sheet.
    #[must_use]
    pub fn opening_hours_by_day(&self) -> Vec<&OpeningHours> {
        let mut hours: Vec<&OpeningHours> = self.opening_hours.iter().collect();
        hours.sort_by_key(|h| h.day_index);
        hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(day_index: u8, name: &str) -> OpeningHours {
        OpeningHours {
            guid: format!("h-{day_index}"),
            day_of_week: name.to_string(),
            day_index,
            start: "09:00".to_string(),
            end: "17:00".to_string(),
        }
    }

    fn sample_poi() -> Poi {
        Poi {
            guid: "poi-1".to_string(),
            title: "Bench".to_string(),
            description: "Near the lake".to_string(),
            image: None,
            coordinate: Coordinate::from_lng_lat(5.04, 51.64),
            category: Category {
                category: "Park".to_string(),
                category_name: "Park".to_string(),
                icon_name: "tree".to_string(),
            },
            status: "Active".to_string(),
            wheel_chair_accessible: true,
            opening_hours: vec![hours(4, "Vrijdag"), hours(0, "Maandag"), hours(2, "Woensdag")],
            map: MapRef {
                id: "map-1".to_string(),
                name: "Park".to_string(),
            },
        }
    }

    #[test]
    fn coordinate_validity_bounds_are_inclusive() {
        assert!(Coordinate::from_lng_lat(180.0, -90.0).is_valid());
        assert!(!Coordinate::from_lng_lat(180.1, 0.0).is_valid());
        assert!(!Coordinate::from_lng_lat(0.0, 90.5).is_valid());
    }

    #[test]
    fn lng_lat_orders_longitude_first() {
        let c = Coordinate::from_lng_lat(5.04, 51.64);
        assert_eq!(c.lng_lat(), [5.04, 51.64]);
    }

    #[test]
    fn opening_hours_by_day_sorts_on_day_index() {
        let poi = sample_poi();
        let names: Vec<&str> = poi
            .opening_hours_by_day()
            .iter()
            .map(|h| h.day_of_week.as_str())
            .collect();
        assert_eq!(names, vec!["Maandag", "Woensdag", "Vrijdag"]);
    }

    #[test]
    fn poi_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(sample_poi()).unwrap();
        assert_eq!(json["wheelChairAccessible"], true);
        assert_eq!(json["category"]["iconName"], "tree");
        assert_eq!(json["openingHours"][0]["dayIndex"], 4);
    }
}
