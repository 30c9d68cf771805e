//! Map provider HTTP facade
//!
//! This module translates the provider's wire format (a JSON envelope with a
//! numeric `status` field, 0 = success) into domain objects. Every operation
//! performs exactly one request attempt, bounded by the configured timeout,
//! then applies its own fallback policy: transport errors, non-zero provider
//! status and malformed payloads are logged and never surface to callers.

use crate::config::{FallbackFormula, MapToolConfig};
use crate::error::MapToolError;
use crate::geo;
use crate::models::{DistanceEstimate, Location, Provenance, Route, SearchResult, TravelMode};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Search bias radius in metres applied when an anchor location is given.
const ANCHOR_RADIUS_M: u32 = 50_000;

/// Placeholder for a missing provider address field.
const UNKNOWN_ADDRESS: &str = "unknown address";
/// Placeholder for a missing provider POI name.
const UNKNOWN_LOCATION: &str = "unknown location";
/// Single instruction carried by a degraded route.
const ROUTE_UNAVAILABLE: &str = "route planning temporarily unavailable";

/// The map operations shared by every front end.
///
/// Failure shapes differ by operation on purpose: geocoding returns `None`,
/// searches return an empty result set, and distances/routes always return a
/// value. Callers must not assume uniform null-handling.
pub trait MapOperations {
    /// Convert an address into coordinates. `None` on any failure.
    fn geocode(&self, address: &str) -> Option<Location>;

    /// Convert coordinates into an address. Invalid coordinates short-circuit
    /// without a network call; `None` on any failure.
    fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Option<Location>;

    /// Keyword search, optionally biased towards an anchor location. A failed
    /// search yields an empty result, never `None`.
    fn search_places(&self, query: &str, anchor: Option<&Location>) -> SearchResult;

    /// Distance in kilometres tagged with its provenance: routed via the
    /// provider's matrix endpoint, or approximated locally on failure.
    fn distance_with_provenance(
        &self,
        origin: &Location,
        destination: &Location,
    ) -> DistanceEstimate;

    /// Untagged distance in kilometres. Never fails, never negative; callers
    /// cannot tell a routed value from an approximated one.
    fn calculate_distance(&self, origin: &Location, destination: &Location) -> f64 {
        self.distance_with_provenance(origin, destination).kilometers
    }

    /// Plan a route. On failure, degrades to a route with fallback distance,
    /// duration "unknown" and a single placeholder step.
    fn get_route(&self, origin: &Location, destination: &Location, mode: TravelMode) -> Route;

    /// Whether the provider has a usable API key.
    fn is_configured(&self) -> bool;
}

/// Facade over a single map provider's HTTP endpoint set.
pub struct MapService {
    /// HTTP client
    client: Client,
    /// Provider configuration
    config: MapToolConfig,
}

impl MapService {
    /// Create a new map service from its configuration
    pub fn new(config: MapToolConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.provider.timeout_seconds);

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("maptool/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &MapToolConfig {
        &self.config
    }

    /// Replace the provider API key; takes effect on the next request
    pub fn update_api_key(&mut self, api_key: &str) {
        self.config.update_api_key(api_key);
    }

    /// Full request URL for one operation. The configured key and the JSON
    /// output flag are appended to every request; `query` carries the
    /// operation-specific parameters, already URL-encoded. The key is encoded
    /// here so it cannot corrupt the query string.
    fn request_url(&self, path: &str, query: &str) -> String {
        format!(
            "{}{}?{}&ak={}&output=json",
            self.config.provider.base_url,
            path,
            query,
            urlencoding::encode(&self.config.provider.api_key)
        )
    }

    /// One GET attempt against the provider. Transport and parse failures
    /// come back as typed [`MapToolError::Api`] values.
    fn fetch<T: DeserializeOwned>(&self, path: &str, query: &str) -> Result<T> {
        let url = self.request_url(path, query);

        debug!("Provider request: {}{}", self.config.provider.base_url, path);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| MapToolError::api(format!("network request failed: {e}")))?
            .error_for_status()
            .map_err(|e| MapToolError::api(format!("provider returned an HTTP error: {e}")))?;

        let parsed = response
            .json::<T>()
            .map_err(|e| MapToolError::api(format!("failed to parse provider response: {e}")))?;
        Ok(parsed)
    }

    /// Check the envelope status; non-zero is logged and treated like a
    /// transport failure.
    fn envelope_ok(status: i64, message: Option<&str>, operation: &str) -> bool {
        if status == 0 {
            true
        } else {
            warn!(
                "{operation} rejected by provider (status {status}): {}",
                message.unwrap_or("unknown error")
            );
            false
        }
    }

    /// Local distance fallback, selected by configuration.
    fn local_distance(&self, origin: &Location, destination: &Location) -> DistanceEstimate {
        let kilometers = match self.config.fallback.formula {
            FallbackFormula::Planar => geo::distance_planar_approx(
                origin.latitude,
                origin.longitude,
                destination.latitude,
                destination.longitude,
            ),
            FallbackFormula::Haversine => geo::distance_haversine(
                origin.latitude,
                origin.longitude,
                destination.latitude,
                destination.longitude,
            ),
        };

        debug!(
            "Local {:?} fallback distance: {:.3} km",
            self.config.fallback.formula, kilometers
        );

        DistanceEstimate {
            kilometers,
            provenance: Provenance::Approximated,
        }
    }
}

impl MapOperations for MapService {
    #[instrument(skip(self))]
    fn geocode(&self, address: &str) -> Option<Location> {
        info!("Geocoding address: '{}'", address);

        let query = format!("address={}&city=", urlencoding::encode(address));
        let response: wire::GeocodeResponse =
            match self.fetch(&self.config.provider.endpoints.geocoding, &query) {
                Ok(response) => response,
                Err(e) => {
                    warn!("Geocoding request failed: {e:#}");
                    return None;
                }
            };

        if !Self::envelope_ok(response.status, response.message.as_deref(), "geocoding") {
            return None;
        }

        let point = response.result?.location;
        debug!("Geocoded '{}' to {:.6}, {:.6}", address, point.lat, point.lng);

        // The provider's normalized address is not captured; the input
        // address is echoed back.
        Some(Location::with_name(point.lat, point.lng, address, address))
    }

    #[instrument(skip(self))]
    fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Option<Location> {
        if !geo::validate_coordinates(latitude, longitude) {
            warn!(
                "Rejecting reverse geocode for out-of-range coordinates: {}, {}",
                latitude, longitude
            );
            return None;
        }

        info!("Reverse geocoding: {}, {}", latitude, longitude);

        let query = format!("location={latitude},{longitude}&coordtype=wgs84ll");
        let response: wire::ReverseGeocodeResponse =
            match self.fetch(&self.config.provider.endpoints.reverse_geocoding, &query) {
                Ok(response) => response,
                Err(e) => {
                    warn!("Reverse geocoding request failed: {e:#}");
                    return None;
                }
            };

        if !Self::envelope_ok(
            response.status,
            response.message.as_deref(),
            "reverse geocoding",
        ) {
            return None;
        }

        let result = response.result?;
        Some(Location::with_name(
            latitude,
            longitude,
            result
                .formatted_address
                .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
            result
                .business
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        ))
    }

    #[instrument(skip(self, anchor))]
    fn search_places(&self, query: &str, anchor: Option<&Location>) -> SearchResult {
        info!("Searching places: '{}'", query);

        let mut params = format!(
            "query={}&page_size={}",
            urlencoding::encode(query),
            self.config.provider.max_results
        );
        if let Some(anchor) = anchor {
            params.push_str(&format!(
                "&location={},{}&radius={}",
                anchor.latitude, anchor.longitude, ANCHOR_RADIUS_M
            ));
        }

        let response: wire::PlaceSearchResponse =
            match self.fetch(&self.config.provider.endpoints.place_search, &params) {
                Ok(response) => response,
                Err(e) => {
                    warn!("Place search request failed: {e:#}");
                    return SearchResult::empty(query);
                }
            };

        if !Self::envelope_ok(response.status, response.message.as_deref(), "place search") {
            return SearchResult::empty(query);
        }

        let hits: Vec<Location> = response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|place| Location {
                latitude: place.location.lat,
                longitude: place.location.lng,
                address: place.address.unwrap_or_default(),
                name: place.name,
            })
            .collect();

        debug!("Search '{}' returned {} hits", query, hits.len());
        SearchResult::new(query, hits)
    }

    #[instrument(skip(self, origin, destination))]
    fn distance_with_provenance(
        &self,
        origin: &Location,
        destination: &Location,
    ) -> DistanceEstimate {
        info!(
            "Calculating distance: {} -> {}",
            origin.address, destination.address
        );

        let query = format!(
            "origins={},{}&destinations={},{}",
            origin.latitude, origin.longitude, destination.latitude, destination.longitude
        );

        match self.fetch::<wire::RouteMatrixResponse>(
            &self.config.provider.endpoints.route_matrix,
            &query,
        ) {
            Ok(response)
                if Self::envelope_ok(
                    response.status,
                    response.message.as_deref(),
                    "route matrix",
                ) =>
            {
                let meters = response
                    .result
                    .and_then(|result| result.distance.first().and_then(|row| row.first().copied()));
                if let Some(meters) = meters {
                    return DistanceEstimate {
                        kilometers: (meters / 1000.0).max(0.0),
                        provenance: Provenance::Routed,
                    };
                }
                warn!("Route matrix response carried no distance entry");
            }
            Ok(_) => {}
            Err(e) => warn!("Route matrix request failed: {e:#}"),
        }

        self.local_distance(origin, destination)
    }

    #[instrument(skip(self, origin, destination))]
    fn get_route(&self, origin: &Location, destination: &Location, mode: TravelMode) -> Route {
        info!(
            "Planning route: {} -> {} ({})",
            origin.address, destination.address, mode
        );

        let query = format!(
            "origin={},{}&destination={},{}",
            origin.latitude, origin.longitude, destination.latitude, destination.longitude
        );

        match self
            .fetch::<wire::DirectionResponse>(&self.config.provider.endpoints.direction, &query)
        {
            Ok(response)
                if Self::envelope_ok(response.status, response.message.as_deref(), "direction") =>
            {
                if let Some(route) = response
                    .result
                    .and_then(|result| result.routes.into_iter().next())
                {
                    return Route {
                        origin: origin.address.clone(),
                        destination: destination.address.clone(),
                        mode,
                        distance_km: route.distance / 1000.0,
                        duration: format!("{} minutes", route.duration / 60),
                        steps: route.steps.into_iter().map(|step| step.instruction).collect(),
                    };
                }
                warn!("Direction response carried no routes");
            }
            Ok(_) => {}
            Err(e) => warn!("Direction request failed: {e:#}"),
        }

        // Degraded route: the distance still goes through the usual
        // matrix-then-local fallback chain.
        Route {
            origin: origin.address.clone(),
            destination: destination.address.clone(),
            mode,
            distance_km: self.calculate_distance(origin, destination),
            duration: "unknown".to_string(),
            steps: vec![ROUTE_UNAVAILABLE.to_string()],
        }
    }

    fn is_configured(&self) -> bool {
        self.config.is_provider_configured()
    }
}

/// Provider wire format: every endpoint answers a JSON envelope with a
/// numeric `status` (0 = success), an optional `message`, and an
/// operation-specific payload key.
mod wire {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct LatLng {
        pub lat: f64,
        pub lng: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodeResponse {
        pub status: i64,
        pub message: Option<String>,
        pub result: Option<GeocodeResult>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodeResult {
        pub location: LatLng,
    }

    #[derive(Debug, Deserialize)]
    pub struct ReverseGeocodeResponse {
        pub status: i64,
        pub message: Option<String>,
        pub result: Option<ReverseGeocodeResult>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ReverseGeocodeResult {
        pub formatted_address: Option<String>,
        pub business: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct PlaceSearchResponse {
        pub status: i64,
        pub message: Option<String>,
        pub results: Option<Vec<Place>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Place {
        pub name: Option<String>,
        pub address: Option<String>,
        pub location: LatLng,
    }

    #[derive(Debug, Deserialize)]
    pub struct RouteMatrixResponse {
        pub status: i64,
        pub message: Option<String>,
        pub result: Option<RouteMatrixResult>,
    }

    #[derive(Debug, Deserialize)]
    pub struct RouteMatrixResult {
        /// Distance matrix in metres, origins × destinations
        pub distance: Vec<Vec<f64>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct DirectionResponse {
        pub status: i64,
        pub message: Option<String>,
        pub result: Option<DirectionResult>,
    }

    #[derive(Debug, Deserialize)]
    pub struct DirectionResult {
        pub routes: Vec<WireRoute>,
    }

    #[derive(Debug, Deserialize)]
    pub struct WireRoute {
        /// Total distance in metres
        pub distance: f64,
        /// Total duration in seconds
        pub duration: u64,
        pub steps: Vec<WireStep>,
    }

    #[derive(Debug, Deserialize)]
    pub struct WireStep {
        pub instruction: String,
    }
}
