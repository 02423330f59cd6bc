//! Geodesy: coordinates, distance, and timestamped location samples.

use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters (IUGG).
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to another point in meters (haversine).
    ///
    /// Accurate to well under a meter at the scales this engine cares
    /// about (geofence radii of tens of meters).
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();
        EARTH_RADIUS_M * c
    }

    /// Midpoint between two points. Good enough at hangout distances;
    /// not meant for antipodal inputs.
    pub fn midpoint(&self, other: &GeoPoint) -> GeoPoint {
        GeoPoint {
            lat: (self.lat + other.lat) / 2.0,
            lon: (self.lon + other.lon) / 2.0,
        }
    }
}

/// A single timestamped position fix from the location provider.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub point: GeoPoint,
    /// Horizontal accuracy radius in meters. Larger = coarser fix.
    pub horizontal_accuracy_m: f64,
    pub timestamp: Timestamp,
}

impl LocationSample {
    pub fn new(point: GeoPoint, horizontal_accuracy_m: f64, timestamp: Timestamp) -> Self {
        Self {
            point,
            horizontal_accuracy_m,
            timestamp,
        }
    }

    /// Distance in meters between this sample and another.
    pub fn distance_to(&self, other: &LocationSample) -> f64 {
        self.point.distance_m(&other.point)
    }
}

/// Implied speed in m/s between two samples, oldest first.
///
/// Returns `None` when the samples are not strictly ordered in time — a
/// zero or negative elapsed interval cannot support a speed estimate, and
/// treating it as infinite would turn clock glitches into movement alarms.
pub fn speed_between(a: &LocationSample, b: &LocationSample) -> Option<f64> {
    let elapsed = a.timestamp.elapsed_since(b.timestamp);
    if elapsed == 0 {
        return None;
    }
    Some(a.distance_to(b) / elapsed as f64)
}
