//! Google Maps web services client
//!
//! Directions, geocoding and nearby search. Maps authenticates with an API key
//! sent as the `key` query parameter, and reports most failures through a
//! `status` field on an HTTP 200 response.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::maps::API_BASE_URL;
use crate::error::BackendError;
use crate::gateway::dispatch::CallContext;
use crate::google::http::read_json;
use crate::google::types::{Directions, GeocodeResult, Place, RouteStep, TravelMode};
use crate::google::MapsBackend;

#[derive(Debug, Clone, Deserialize, Default)]
struct TextValue {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Step {
    #[serde(default)]
    html_instructions: String,
    #[serde(default)]
    distance: TextValue,
    #[serde(default)]
    duration: TextValue,
}

#[derive(Debug, Clone, Deserialize)]
struct Leg {
    #[serde(default)]
    distance: TextValue,
    #[serde(default)]
    duration: TextValue,
    #[serde(default)]
    start_address: String,
    #[serde(default)]
    end_address: String,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
struct Route {
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Clone, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Clone, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Clone, Deserialize)]
struct GeocodeEntry {
    #[serde(default)]
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct PlaceEntry {
    name: String,
    #[serde(default)]
    vicinity: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    place_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PlacesResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<PlaceEntry>,
}

/// Map a Maps `status` field to success or a backend error
fn check_status(status: &str, error_message: Option<&str>) -> Result<(), BackendError> {
    let detail = || format!("{}: {}", status, error_message.unwrap_or_default());
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => Err(BackendError::quota(detail())),
        "REQUEST_DENIED" => Err(BackendError::auth(detail())),
        _ => Err(BackendError::invalid_response(detail())),
    }
}

impl DirectionsResponse {
    fn into_directions(self) -> Result<Option<Directions>, BackendError> {
        check_status(&self.status, self.error_message.as_deref())?;

        let Some(leg) = self
            .routes
            .into_iter()
            .next()
            .and_then(|route| route.legs.into_iter().next())
        else {
            return Ok(None);
        };

        Ok(Some(Directions {
            start_address: leg.start_address,
            end_address: leg.end_address,
            distance: leg.distance.text,
            duration: leg.duration.text,
            steps: leg
                .steps
                .into_iter()
                .map(|step| RouteStep {
                    instruction: step.html_instructions,
                    distance: step.distance.text,
                    duration: step.duration.text,
                })
                .collect(),
        }))
    }
}

impl GeocodeResponse {
    fn into_first(self) -> Result<Option<GeocodeResult>, BackendError> {
        check_status(&self.status, self.error_message.as_deref())?;

        Ok(self.results.into_iter().next().map(|entry| GeocodeResult {
            formatted_address: entry.formatted_address,
            lat: entry.geometry.location.lat,
            lng: entry.geometry.location.lng,
        }))
    }
}

impl PlacesResponse {
    fn into_places(self) -> Result<Vec<Place>, BackendError> {
        check_status(&self.status, self.error_message.as_deref())?;

        Ok(self
            .results
            .into_iter()
            .map(|entry| Place {
                name: entry.name,
                address: entry.vicinity.unwrap_or_default(),
                rating: entry.rating,
                types: entry.types,
                place_id: entry.place_id,
            })
            .collect())
    }
}

/// Google Maps client
pub struct MapsClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl MapsClient {
    pub fn new(http_client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http_client,
            api_key,
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_key(&self) -> Result<&str, BackendError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| BackendError::auth("GOOGLE_MAPS_API_KEY is not configured"))
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        ctx: &CallContext,
    ) -> Result<T, BackendError> {
        let key = self.api_key()?;
        let response = self
            .http_client
            .get(format!("{}/{}/json", self.base_url, endpoint))
            .query(params)
            .query(&[("key", key)])
            .timeout(ctx.timeout)
            .send()
            .await?;

        read_json(response).await
    }
}

#[async_trait]
impl MapsBackend for MapsClient {
    async fn directions(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
        ctx: &CallContext,
    ) -> Result<Option<Directions>, BackendError> {
        let params = [
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("mode", mode.as_str().to_string()),
        ];
        let response: DirectionsResponse = self.get("directions", &params, ctx).await?;
        response.into_directions()
    }

    async fn geocode(
        &self,
        address: &str,
        ctx: &CallContext,
    ) -> Result<Option<GeocodeResult>, BackendError> {
        let params = [("address", address.to_string())];
        let response: GeocodeResponse = self.get("geocode", &params, ctx).await?;
        response.into_first()
    }

    async fn nearby_places(
        &self,
        location: &str,
        radius: u32,
        place_type: Option<&str>,
        ctx: &CallContext,
    ) -> Result<Vec<Place>, BackendError> {
        let Some(center) = self.geocode(location, ctx).await? else {
            tracing::debug!(location, "nearby search location did not geocode");
            return Ok(Vec::new());
        };

        let mut params = vec![
            ("location", format!("{},{}", center.lat, center.lng)),
            ("radius", radius.to_string()),
        ];
        if let Some(place_type) = place_type.filter(|t| !t.is_empty()) {
            params.push(("type", place_type.to_string()));
        }

        let response: PlacesResponse = self.get("place/nearbysearch", &params, ctx).await?;
        response.into_places()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use tokio_util::sync::CancellationToken;

    use crate::error::BackendErrorKind;
    use crate::google::test_support::{scripted_upstream, silent_upstream};

    fn client(base_url: &str) -> MapsClient {
        MapsClient::new(
            reqwest::Client::builder().no_proxy().build().unwrap(),
            Some("test-key".to_string()),
        )
        .with_base_url(base_url)
    }

    const GEOCODE_OK: &str = r#"{
        "status": "OK",
        "results": [{"formatted_address": "Paris, France", "geometry": {"location": {"lat": 48.85, "lng": 2.35}}}]
    }"#;

    #[test]
    fn test_directions_parse() {
        let json = r#"{
            "status": "OK",
            "routes": [{
                "legs": [{
                    "distance": {"text": "5.2 km", "value": 5200},
                    "duration": {"text": "12 mins", "value": 720},
                    "start_address": "Market St, San Francisco",
                    "end_address": "Mission St, San Francisco",
                    "steps": [
                        {"html_instructions": "Head <b>east</b>", "distance": {"text": "0.2 km"}, "duration": {"text": "1 min"}},
                        {"html_instructions": "Turn <b>right</b>", "distance": {"text": "5 km"}, "duration": {"text": "11 mins"}}
                    ]
                }]
            }]
        }"#;
        let response: DirectionsResponse = serde_json::from_str(json).unwrap();
        let directions = response.into_directions().unwrap().unwrap();

        assert_eq!(directions.distance, "5.2 km");
        assert_eq!(directions.steps.len(), 2);
        assert_eq!(directions.steps[1].instruction, "Turn <b>right</b>");
    }

    #[test]
    fn test_zero_results_is_empty() {
        let response: DirectionsResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "routes": []}"#).unwrap();
        assert!(response.into_directions().unwrap().is_none());

        let response: GeocodeResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "results": []}"#).unwrap();
        assert!(response.into_first().unwrap().is_none());
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            ("OVER_QUERY_LIMIT", BackendErrorKind::Quota),
            ("OVER_DAILY_LIMIT", BackendErrorKind::Quota),
            ("REQUEST_DENIED", BackendErrorKind::Auth),
            ("INVALID_REQUEST", BackendErrorKind::InvalidUpstreamResponse),
            ("UNKNOWN_ERROR", BackendErrorKind::InvalidUpstreamResponse),
        ];
        for (status, kind) in cases {
            assert_eq!(check_status(status, None).unwrap_err().kind, kind);
        }
        assert!(check_status("OK", None).is_ok());
    }

    #[test]
    fn test_geocode_parse() {
        let json = r#"{
            "status": "OK",
            "results": [{
                "formatted_address": "1600 Amphitheatre Pkwy, Mountain View, CA",
                "geometry": {"location": {"lat": 37.422, "lng": -122.084}}
            }]
        }"#;
        let response: GeocodeResponse = serde_json::from_str(json).unwrap();
        let result = response.into_first().unwrap().unwrap();
        assert_eq!(result.lat, 37.422);
        assert_eq!(result.lng, -122.084);
    }

    #[test]
    fn test_places_parse() {
        let json = r#"{
            "status": "OK",
            "results": [
                {"name": "Blue Bottle", "vicinity": "66 Mint St", "rating": 4.5, "types": ["cafe"], "place_id": "p1"},
                {"name": "Corner Shop", "types": [], "place_id": "p2"}
            ]
        }"#;
        let response: PlacesResponse = serde_json::from_str(json).unwrap();
        let places = response.into_places().unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].rating, Some(4.5));
        assert_eq!(places[1].rating, None);
        assert_eq!(places[1].address, "");
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = MapsClient::new(reqwest::Client::new(), None);
        let err = client
            .geocode("Paris", &CallContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::Auth);
    }

    #[tokio::test]
    async fn test_api_key_sent_as_query_param() {
        let (base_url, recorded) = scripted_upstream(vec![(200, GEOCODE_OK)]).await;

        let result = client(&base_url)
            .geocode("Paris", &CallContext::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.formatted_address, "Paris, France");

        let request = recorded.lock().unwrap()[0].clone();
        assert!(request.starts_with("get /geocode/json?address=paris&key=test-key "));
        assert!(!request.contains("authorization:"));
    }

    #[tokio::test]
    async fn test_nearby_geocodes_then_searches() {
        let (base_url, recorded) = scripted_upstream(vec![
            (200, GEOCODE_OK),
            (
                200,
                r#"{"status": "OK", "results": [{"name": "Cafe de Flore", "vicinity": "172 Bd Saint-Germain", "place_id": "p1"}]}"#,
            ),
        ])
        .await;

        let places = client(&base_url)
            .nearby_places("Paris", 500, Some("cafe"), &CallContext::default())
            .await
            .unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Cafe de Flore");

        let requests = recorded.lock().unwrap().clone();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with("get /geocode/json?address=paris"));
        assert!(requests[1].starts_with(
            "get /place/nearbysearch/json?location=48.85%2c2.35&radius=500&type=cafe&key=test-key "
        ));
    }

    #[tokio::test]
    async fn test_silent_upstream_times_out_as_network_failure() {
        let base_url = silent_upstream().await;
        let ctx = CallContext::new(Duration::from_millis(200), CancellationToken::new());

        let started = Instant::now();
        let err = client(&base_url)
            .directions("A", "B", TravelMode::Walking, &ctx)
            .await
            .unwrap_err();

        assert_eq!(err.kind, BackendErrorKind::Network);
        assert_eq!(err.to_string(), "network failure");
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
