//! Great-circle distance between coordinates

use crate::constants::geo::EARTH_RADIUS_KM;
use crate::geo::Coordinates;

/// Distance in kilometers between two optional points
///
/// Returns `None` when either point is absent or has a non-finite component.
/// Missing data is the common case before a reference coordinate exists, so
/// this never panics.
pub fn distance(a: Option<Coordinates>, b: Option<Coordinates>) -> Option<f64> {
    let (a, b) = (a?, b?);
    if !a.is_finite() || !b.is_finite() {
        return None;
    }
    Some(haversine_km(a, b))
}

/// Haversine distance in kilometers
///
/// a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlng/2)
/// d = 2·R·atan2(√a, √(1−a))
pub fn haversine_km(p1: Coordinates, p2: Coordinates) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lng = (p2.lng - p1.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BERLIN: Coordinates = Coordinates { lat: 52.52, lng: 13.40 };
    const PARIS: Coordinates = Coordinates { lat: 48.8566, lng: 2.3522 };

    #[test]
    fn test_berlin_to_paris() {
        let d = haversine_km(BERLIN, PARIS);
        // Roughly 878 km
        assert!((d - 878.0).abs() < 5.0, "Distance {} should be about 878 km", d);
    }

    #[test]
    fn test_one_degree_latitude() {
        let d = haversine_km(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 0.0));
        assert_relative_eq!(d, 111.195, epsilon = 0.01);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (BERLIN, PARIS),
            (Coordinates::new(-33.8688, 151.2093), Coordinates::new(40.7128, -74.0060)),
            (Coordinates::new(0.0, 179.9), Coordinates::new(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert_relative_eq!(
                distance(Some(a), Some(b)).unwrap(),
                distance(Some(b), Some(a)).unwrap(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_same_point_is_zero() {
        assert_relative_eq!(distance(Some(BERLIN), Some(BERLIN)).unwrap(), 0.0);
        let origin = Coordinates::new(0.0, 0.0);
        assert_relative_eq!(distance(Some(origin), Some(origin)).unwrap(), 0.0);
    }

    #[test]
    fn test_zero_components_are_not_missing() {
        let d = distance(Some(Coordinates::new(0.0, 0.0)), Some(Coordinates::new(0.0, 1.0)));
        assert!(d.is_some());
    }

    #[test]
    fn test_missing_point_is_none() {
        assert_eq!(distance(None, Some(BERLIN)), None);
        assert_eq!(distance(Some(BERLIN), None), None);
        assert_eq!(distance(None, None), None);
    }

    #[test]
    fn test_non_finite_component_is_none() {
        let no_lat = Coordinates::new(f64::NAN, 13.40);
        assert_eq!(distance(Some(BERLIN), Some(no_lat)), None);
        let inf_lng = Coordinates::new(52.0, f64::NEG_INFINITY);
        assert_eq!(distance(Some(inf_lng), Some(BERLIN)), None);
    }

    #[test]
    fn test_antipodal_points() {
        let d = haversine_km(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 180.0));
        assert_relative_eq!(d, std::f64::consts::PI * EARTH_RADIUS_KM, epsilon = 1e-6);
    }
}
