use serde::Serialize;
use std::fmt;

/// A latitude/longitude pair in degrees.
///
/// Construction does not check bounds; callers decide what to do with
/// out-of-range pairs via [`GeoPoint::in_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn in_bounds(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}
