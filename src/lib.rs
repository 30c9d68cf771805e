//! `maptool` - Interactive geocoding, place search, distance and route
//! planning over a single map provider's HTTP API.
//!
//! This library provides the map service facade (provider wire format to
//! domain model translation with typed fallback policies), the coordinate and
//! distance utilities, and the command interpreter shared by all front ends.

pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod interpreter;
pub mod models;

// Re-export core types for public API
pub use api::{MapOperations, MapService};
pub use config::{FallbackFormula, MapToolConfig};
pub use error::MapToolError;
pub use interpreter::CommandInterpreter;
pub use models::{DistanceEstimate, Location, Provenance, Route, SearchResult, TravelMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, MapToolError>;
