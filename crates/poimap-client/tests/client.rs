//! Integration tests for `ApiClient` using wiremock HTTP mocks.

use poimap_client::{ApiClient, ClientError, ClientOptions};
use poimap_core::{ChangeRfc, Coordinate, SuggestionRfc};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ApiClient {
    let options = ClientOptions {
        timeout_secs: 5,
        max_retries: 0,
        backoff_base_ms: 0,
        map_style: "style.json".to_string(),
        emulator_host: "10.0.2.2".to_string(),
    };
    ApiClient::new(&format!("{base_url}/api"), options)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn fetch_maps_returns_mapped_maps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/map"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": "map-1", "name": "Map 1", "area": [], "bounds": [], "imageUrl": "url" }
            ]
        })))
        .mount(&server)
        .await;

    let maps = test_client(&server.uri()).fetch_maps().await.unwrap();
    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0].id, "map-1");
    assert_eq!(maps[0].name, "Map 1");
}

#[tokio::test]
async fn fetch_closest_map_sends_position() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/map/closest"))
        .and(query_param("latitude", "51.1"))
        .and(query_param("longitude", "4.2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "map-closest", "name": "Closest Map" })),
        )
        .mount(&server)
        .await;

    let map = test_client(&server.uri())
        .fetch_closest_map(51.1, 4.2)
        .await
        .unwrap();
    assert_eq!(map.id, "map-closest");
    assert_eq!(map.name, "Closest Map");
}

#[tokio::test]
async fn fetch_map_builds_config_from_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/map/map-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "map-1",
            "name": "Map 1",
            "area": [
                { "latitude": 51.0, "longitude": 4.0 },
                { "latitude": 51.0, "longitude": 5.0 },
                { "latitude": 52.0, "longitude": 5.0 },
                { "latitude": 52.0, "longitude": 4.0 }
            ],
            "bounds": [
                { "latitude": 51.0, "longitude": 4.0 },
                { "latitude": 52.0, "longitude": 5.0 },
                { "latitude": 51.0, "longitude": 5.0 },
                { "latitude": 52.0, "longitude": 4.0 }
            ],
            "imageUrl": "http://localhost/image.jpg"
        })))
        .mount(&server)
        .await;

    let cfg = test_client(&server.uri()).fetch_map("map-1").await.unwrap();
    assert_eq!(cfg.map_id, "map-1");
    assert!((cfg.center[0] - 4.5).abs() < 1e-9);
    assert!((cfg.center[1] - 51.5).abs() < 1e-9);
    assert_eq!(cfg.image_url.as_deref(), Some("http://10.0.2.2/image.jpg"));
    assert_eq!(cfg.bounds.as_ref().map(Vec::len), Some(4));
    assert_eq!(cfg.map_style, "style.json");
}

#[tokio::test]
async fn fetch_map_null_body_is_map_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/map/bad-id"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_map("bad-id")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MapNotFound(ref id) if id == "bad-id"));
}

#[tokio::test]
async fn fetch_map_empty_area_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/map/map-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "map-1", "area": [], "bounds": [], "imageUrl": "", "name": "Map 1"
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_map("map-1")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidArea(_)));
}

#[tokio::test]
async fn fetch_pois_normalizes_invalid_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/poi"))
        .and(query_param("mapId", "map-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "poi-1",
                "title": "Supermarkt",
                "description": "Groceries",
                "coordinate": { "latitude": 51.645, "longitude": 5.04 },
                "category": { "categoryName": "Shop", "iconName": "cart" },
                "status": "Active",
                "mapId": "map-1",
                "isWheelchairAccessible": true,
                "openingHours": [
                    { "guid": "h1", "dayOfWeek": 0, "start": "08:00:00", "end": "20:00:00" }
                ]
            },
            {
                "id": "poi-2",
                "title": "Nowhere",
                "coordinate": { "latitude": "999", "longitude": "999" }
            }
        ])))
        .mount(&server)
        .await;

    let pois = test_client(&server.uri()).fetch_pois("map-1").await.unwrap();
    assert_eq!(pois.len(), 2);
    assert_eq!(pois[0].category.icon_name, "cart");
    assert_eq!(pois[0].opening_hours[0].day_of_week, "Maandag");
    assert_eq!(pois[1].coordinate, Coordinate::from_lng_lat(0.0, 0.0));
}

#[tokio::test]
async fn fetch_pois_keeps_good_records_next_to_malformed_ones() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/poi"))
        .and(query_param("mapId", "map-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "ok",
                "title": "Bench",
                "coordinate": { "latitude": 51.64, "longitude": 5.04 }
            },
            {
                "id": "odd",
                "title": null,
                "status": 3,
                "coordinate": ["999", "999"],
                "category": "Shop",
                "openingHours": [
                    { "guid": "h1", "dayOfWeek": 1 },
                    { "guid": "h2", "dayOfWeek": 2, "start": "09:00:00", "end": "17:00:00" },
                    "garbage"
                ]
            },
            { "title": "No id" }
        ])))
        .mount(&server)
        .await;

    let pois = test_client(&server.uri()).fetch_pois("map-1").await.unwrap();
    assert_eq!(pois.len(), 2);
    assert_eq!(pois[0].title, "Bench");

    let odd = &pois[1];
    assert_eq!(odd.guid, "odd");
    assert_eq!(odd.title, "");
    assert_eq!(odd.status, "Unknown");
    assert_eq!(odd.category.icon_name, "default-icon");
    assert_eq!(odd.coordinate, Coordinate::from_lng_lat(0.0, 0.0));
    assert_eq!(odd.opening_hours.len(), 2);
    assert_eq!(odd.opening_hours[0].start, "");
    assert_eq!(odd.opening_hours[1].day_of_week, "Woensdag");
    assert_eq!(odd.opening_hours[1].start, "09:00");
}

#[tokio::test]
async fn fetch_pois_server_error_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/poi"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_pois("map-1")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
}

#[tokio::test]
async fn fetch_categories_returns_categories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/category"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "categoryName": "Food", "iconName": "food" },
            { "categoryName": "Transport", "iconName": "bus" }
        ])))
        .mount(&server)
        .await;

    let categories = test_client(&server.uri())
        .fetch_categories()
        .await
        .unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[1].category_name, "Transport");
    assert_eq!(categories[1].icon_name, "bus");
}

#[tokio::test]
async fn create_suggestion_posts_body() {
    let server = MockServer::start().await;
    let rfc = SuggestionRfc {
        title: "Bench".to_string(),
        description: "Near the lake".to_string(),
        category: "Park".to_string(),
        map_id: "map-1".to_string(),
        coordinate: Coordinate::from_lng_lat(5.04, 51.64),
        is_wheelchair_accessible: false,
    };
    Mock::given(method("POST"))
        .and(path("/api/rfc/poisuggestion"))
        .and(body_json(json!({
            "title": "Bench",
            "description": "Near the lake",
            "category": "Park",
            "mapId": "map-1",
            "coordinate": { "latitude": 51.64, "longitude": 5.04 },
            "isWheelchairAccessible": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "result": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let res = test_client(&server.uri())
        .create_suggestion(&rfc)
        .await
        .unwrap();
    assert_eq!(res, json!({ "result": "ok" }));
}

#[tokio::test]
async fn create_change_rejected_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rfc"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let options = ClientOptions {
        max_retries: 3,
        backoff_base_ms: 0,
        ..ClientOptions::default()
    };
    let client = ApiClient::new(&format!("{}/api", server.uri()), options).unwrap();
    let err = client
        .create_change(&ChangeRfc::new("poi-1", "Closed"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Rejected { status: 500, .. }));
}

#[tokio::test]
async fn create_change_accepts_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rfc"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let res = test_client(&server.uri())
        .create_change(&ChangeRfc::new("poi-1", "Closed"))
        .await
        .unwrap();
    assert!(res.is_null());
}
