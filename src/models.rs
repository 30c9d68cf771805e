//! Domain model shared by the map facade and the command interpreter
//!
//! All types here are plain values: created once, never mutated, owned by the
//! caller.

use crate::MapToolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A geographic position with its human-readable description
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Human-readable address
    pub address: String,
    /// Business or POI name, when the provider supplies one
    pub name: Option<String>,
}

impl Location {
    /// Create a new location without a POI name
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, address: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            address: address.into(),
            name: None,
        }
    }

    /// Create a location with a POI name
    #[must_use]
    pub fn with_name(
        latitude: f64,
        longitude: f64,
        address: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            address: address.into(),
            name: Some(name.into()),
        }
    }

    /// The POI name when present and non-empty, the address otherwise
    #[must_use]
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) if !name.is_empty() => name,
            _ => &self.address,
        }
    }
}

/// Result of a place search; `total_count` always matches `results.len()`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SearchResult {
    /// The query that produced this result
    pub query: String,
    /// Matching locations, in provider order
    pub results: Vec<Location>,
    /// Number of locations in `results`
    pub total_count: usize,
}

impl SearchResult {
    /// Create a search result; the count is derived from the list
    #[must_use]
    pub fn new(query: impl Into<String>, results: Vec<Location>) -> Self {
        let total_count = results.len();
        Self {
            query: query.into(),
            results,
            total_count,
        }
    }

    /// The failure shape for searches: a result with zero hits
    #[must_use]
    pub fn empty(query: impl Into<String>) -> Self {
        Self::new(query, Vec::new())
    }
}

/// Supported travel modes for route planning
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Riding,
    Transit,
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Riding => "riding",
            TravelMode::Transit => "transit",
        };
        write!(f, "{mode}")
    }
}

impl FromStr for TravelMode {
    type Err = MapToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "driving" => Ok(TravelMode::Driving),
            "walking" => Ok(TravelMode::Walking),
            "riding" => Ok(TravelMode::Riding),
            "transit" => Ok(TravelMode::Transit),
            other => Err(MapToolError::validation(format!(
                "unknown travel mode '{other}'"
            ))),
        }
    }
}

/// A planned route between two addresses
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Route {
    /// Origin address
    pub origin: String,
    /// Destination address
    pub destination: String,
    /// Travel mode the route was requested for
    pub mode: TravelMode,
    /// Total distance in kilometres
    pub distance_km: f64,
    /// Pre-formatted duration, or "unknown" for a degraded route
    pub duration: String,
    /// Ordered turn-by-turn instructions
    pub steps: Vec<String>,
}

/// How a distance value was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Exact distance from the provider's routing matrix
    Routed,
    /// Local geometric approximation (the fallback path)
    Approximated,
}

/// A distance tagged with its provenance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEstimate {
    /// Distance in kilometres, never negative
    pub kilometers: f64,
    /// Whether the value was routed remotely or approximated locally
    pub provenance: Provenance,
}
