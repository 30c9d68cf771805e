//! Coordinate validation, distance computation and display formatting
//!
//! Pure helpers used by the facade (fallback distances, input guards) and the
//! command interpreter (response formatting). The formatting thresholds are
//! part of the user-facing contract and must not drift.

use haversine::{Location as GreatCirclePoint, Units, distance};

/// Kilometres covered by one degree of arc, used by the planar approximation.
const KM_PER_DEGREE: f64 = 111.0;

/// Check that a latitude/longitude pair lies within the valid ranges
/// (`-90..=90` and `-180..=180`, both inclusive).
#[must_use]
pub fn validate_coordinates(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

/// Great-circle distance between two points in kilometres (mean Earth radius
/// 6371 km).
#[must_use]
pub fn distance_haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let from = GreatCirclePoint {
        latitude: lat1,
        longitude: lon1,
    };
    let to = GreatCirclePoint {
        latitude: lat2,
        longitude: lon2,
    };
    distance(from, to, Units::Kilometers)
}

/// Planar distance approximation: `sqrt(dlat^2 + dlon^2) * 111` km.
///
/// Deliberately crude (no longitude compression towards the poles); it is the
/// legacy local fallback when the routing matrix is unavailable.
#[must_use]
pub fn distance_planar_approx(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = lat1 - lat2;
    let dlon = lon1 - lon2;
    (dlat * dlat + dlon * dlon).sqrt() * KM_PER_DEGREE
}

/// Format a distance for display: metres below 1 km, one decimal below
/// 10 km, whole kilometres above.
#[must_use]
pub fn format_distance(kilometers: f64) -> String {
    if kilometers < 1.0 {
        format!("{:.0} m", kilometers * 1000.0)
    } else if kilometers < 10.0 {
        format!("{kilometers:.1} km")
    } else {
        format!("{kilometers:.0} km")
    }
}

/// Format a duration for display: seconds below a minute, floor minutes below
/// an hour, otherwise hours with the minute remainder (omitted when zero).
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{seconds} s")
    } else if seconds < 3600 {
        format!("{} min", seconds / 60)
    } else {
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        if minutes > 0 {
            format!("{hours} h {minutes} min")
        } else {
            format!("{hours} h")
        }
    }
}

/// Fixed six-decimal "lat, lon" rendering used in interpreter responses.
#[must_use]
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.6}, {longitude:.6}")
}
