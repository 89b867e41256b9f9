//! Geographic coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
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
}

/// Haversine distance between two points on a spherical earth.
pub fn distance_km_between_points(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lon1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lon2) = (b.latitude.to_radians(), b.longitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    6371.0 * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_zero_for_identical_points() {
        let point = GeoPoint::new(55.7558, 37.6173);
        assert_eq!(distance_km_between_points(point, point), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(55.7558, 37.6173);
        let b = GeoPoint::new(55.7658, 37.6273);
        let forward = distance_km_between_points(a, b);
        let backward = distance_km_between_points(b, a);
        assert!((forward - backward).abs() < 1e-12);
    }

    #[test]
    fn moscow_short_hop_is_about_1_3_km() {
        // 0.01 deg north and east of Moscow centre.
        let a = GeoPoint::new(55.7558, 37.6173);
        let b = GeoPoint::new(55.7658, 37.6273);
        let distance = distance_km_between_points(a, b);
        assert!(
            (distance - 1.276).abs() < 0.005,
            "expected ~1.276 km, got {distance}"
        );
    }
}
