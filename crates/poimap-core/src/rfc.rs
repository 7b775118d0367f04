//! Request-for-change payloads posted to the backend.

use serde::{Deserialize, Serialize};

use crate::poi::Coordinate;

/// Body of `POST /rfc/poisuggestion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRfc {
    pub title: String,
    pub description: String,
    pub category: String,
    pub map_id: String,
    pub coordinate: Coordinate,
    pub is_wheelchair_accessible: bool,
}

/// Body of `POST /rfc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRfc {
    pub poi_id: String,
    pub suggested_poi_id: String,
    pub message: String,
}

impl ChangeRfc {
    /// Builds a change request for `poi_id` with a freshly generated suggestion id.
    #[must_use]
    pub fn new(poi_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            poi_id: poi_id.into(),
            suggested_poi_id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_serializes_wire_field_names() {
        let rfc = SuggestionRfc {
            title: "Bench".to_string(),
            description: "Near the lake".to_string(),
            category: "Park".to_string(),
            map_id: "map-1".to_string(),
            coordinate: Coordinate::from_lng_lat(5.04, 51.64),
            is_wheelchair_accessible: false,
        };
        let json = serde_json::to_value(&rfc).unwrap();
        assert_eq!(json["mapId"], "map-1");
        assert_eq!(json["isWheelchairAccessible"], false);
        assert_eq!(json["coordinate"]["longitude"], 5.04);
        assert_eq!(json["coordinate"]["latitude"], 51.64);
    }

    #[test]
    fn change_rfc_generates_distinct_suggestion_ids() {
        let a = ChangeRfc::new("poi-1", "Closed on sundays");
        let b = ChangeRfc::new("poi-1", "Closed on sundays");
        assert_eq!(a.poi_id, "poi-1");
        assert_ne!(a.suggested_poi_id, b.suggested_poi_id);
        assert!(uuid::Uuid::parse_str(&a.suggested_poi_id).is_ok());
    }
}
