//! Great-circle distance from the warehouse.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// The single shipping origin (Gatineau, QC).
pub const WAREHOUSE_COORDINATES: Coordinates = Coordinates {
    latitude: 45.4765,
    longitude: -75.7013,
};

/// A point on the globe, in decimal degrees.
///
/// Storefront payloads send `{lat, lng}`; both spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Coordinates {
            latitude,
            longitude,
        }
    }

    /// Finite and within ±90° / ±180°.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }

    /// Distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        haversine_km(self, other)
    }
}

/// Haversine great-circle distance in kilometres.
///
/// ```rust
/// use zuba_core::geo::{haversine_km, Coordinates, WAREHOUSE_COORDINATES};
///
/// let toronto = Coordinates::new(43.6532, -79.3832);
/// let d = haversine_km(&WAREHOUSE_COORDINATES, &toronto);
/// assert!((d - 353.0).abs() < 5.0);
/// ```
pub fn haversine_km(a: &Coordinates, b: &Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}
