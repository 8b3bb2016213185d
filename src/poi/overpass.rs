//! Overpass-style HTTP provider for nearby points of interest.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::map::LatLngBounds;
use crate::poi::Poi;

pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Cap on returned elements per query; dense city blocks can hold thousands.
const MAX_ELEMENTS: usize = 100;

/// Errors a fetch can produce. All of them are terminal at the overlay
/// boundary: logged, never surfaced to the render path.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of POIs for a bounding box. Implemented over HTTP in production
/// and by stubs in tests.
pub trait PoiProvider: Send + 'static {
    fn fetch(&self, bounds: &LatLngBounds) -> Result<Vec<Poi>, FetchError>;
}

/// Queries an Overpass API endpoint with a blocking client. Lives on the
/// fetch worker thread, never on the UI loop.
pub struct OverpassProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl OverpassProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    fn query(bounds: &LatLngBounds) -> String {
        let bbox = format!(
            "({},{},{},{})",
            bounds.south, bounds.west, bounds.north, bounds.east
        );
        format!(
            "[out:json][timeout:10];\
             (node[\"amenity\"]{bbox};node[\"shop\"]{bbox};node[\"tourism\"]{bbox};);\
             out body {MAX_ELEMENTS};"
        )
    }
}

impl PoiProvider for OverpassProvider {
    fn fetch(&self, bounds: &LatLngBounds) -> Result<Vec<Poi>, FetchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .body(Self::query(bounds))
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.text()?;
        let decoded: OverpassResponse = serde_json::from_str(&body)?;
        let pois = decode_elements(decoded);
        debug!(count = pois.len(), "overpass fetch decoded");
        Ok(pois)
    }
}

#[derive(Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Deserialize)]
struct Element {
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

/// Tag keys checked, in order, for the POI category.
const CATEGORY_KEYS: [&str; 3] = ["amenity", "shop", "tourism"];

fn decode_elements(response: OverpassResponse) -> Vec<Poi> {
    response
        .elements
        .into_iter()
        .filter_map(|element| {
            // Unnamed or coordinate-less nodes are useless as markers.
            let lat = element.lat?;
            let lon = element.lon?;
            let name = element.tags.get("name")?.clone();
            let category = CATEGORY_KEYS
                .iter()
                .find_map(|key| element.tags.get(*key))
                .cloned()
                .unwrap_or_else(|| "other".to_string());
            Some(Poi {
                id: element.id,
                name,
                category,
                lat,
                lon,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> LatLngBounds {
        LatLngBounds {
            north: 52.6,
            south: 52.4,
            east: 13.6,
            west: 13.2,
        }
    }

    #[test]
    fn query_orders_bbox_south_west_north_east() {
        let q = OverpassProvider::query(&bounds());
        assert!(q.contains("(52.4,13.2,52.6,13.6)"));
        assert!(q.starts_with("[out:json]"));
    }

    #[test]
    fn decodes_named_nodes() {
        let body = r#"{
            "elements": [
                {"id": 1, "lat": 52.5, "lon": 13.4,
                 "tags": {"name": "Cafe Eins", "amenity": "cafe"}},
                {"id": 2, "lat": 52.51, "lon": 13.41,
                 "tags": {"name": "Mart", "shop": "supermarket"}}
            ]
        }"#;
        let decoded: OverpassResponse = serde_json::from_str(body).unwrap();
        let pois = decode_elements(decoded);
        assert_eq!(pois.len(), 2);
        assert_eq!(pois[0].name, "Cafe Eins");
        assert_eq!(pois[0].category, "cafe");
        assert_eq!(pois[1].category, "supermarket");
    }

    #[test]
    fn skips_unnamed_and_coordinate_less_nodes() {
        let body = r#"{
            "elements": [
                {"id": 1, "lat": 52.5, "lon": 13.4, "tags": {"amenity": "bench"}},
                {"id": 2, "tags": {"name": "Ghost"}},
                {"id": 3, "lat": 52.5, "lon": 13.4, "tags": {"name": "Kept"}}
            ]
        }"#;
        let decoded: OverpassResponse = serde_json::from_str(body).unwrap();
        let pois = decode_elements(decoded);
        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0].name, "Kept");
        assert_eq!(pois[0].category, "other");
    }

    #[test]
    fn missing_elements_key_is_empty_not_error() {
        let decoded: OverpassResponse = serde_json::from_str("{}").unwrap();
        assert!(decode_elements(decoded).is_empty());
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let err = serde_json::from_str::<OverpassResponse>("<html>busy</html>")
            .map(|_| ())
            .unwrap_err();
        let err: FetchError = err.into();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
