//! Geographic primitives and location capabilities
//!
//! Holds the reference coordinate type, the great-circle distance calculator,
//! and the providers that stand in for a device location capability.

pub mod distance;
pub mod ip_location;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub use distance::{distance, haversine_km};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Validate that coordinates are finite and within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !self.is_finite() {
            return Err(Error::Validation(format!(
                "Coordinates ({}, {}) are not finite numbers",
                self.lat, self.lng
            )));
        }
        if self.lat < -90.0 || self.lat > 90.0 {
            return Err(Error::Validation(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if self.lng < -180.0 || self.lng > 180.0 {
            return Err(Error::Validation(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

/// A located position with a human-readable description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Display name (city, region, country or similar)
    pub display_name: String,
}

impl GeoLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// A single-shot location capability
///
/// Each call to `locate` yields either a position or a failure exactly once.
/// Failures are reported as `Error::LocationUnavailable`.
pub trait LocationProvider: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Resolve the current position
    fn locate(&self) -> impl std::future::Future<Output = Result<GeoLocation>> + Send;
}

/// A provider that always reports the same position
///
/// Used when the user passes explicit coordinates, and in tests.
#[derive(Debug, Clone)]
pub struct FixedLocation {
    location: GeoLocation,
}

impl FixedLocation {
    pub fn new(coords: Coordinates) -> Self {
        Self {
            location: GeoLocation {
                lat: coords.lat,
                lng: coords.lng,
                display_name: coords.to_string(),
            },
        }
    }
}

impl LocationProvider for FixedLocation {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn locate(&self) -> Result<GeoLocation> {
        Ok(self.location.clone())
    }
}

/// Get the IP location service
pub fn get_ip_locator() -> ip_location::IpLocator {
    ip_location::IpLocator::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(Coordinates::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinates::new(-90.0, -180.0).validate().is_ok());
        assert!(Coordinates::new(0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(matches!(
            Coordinates::new(91.0, 0.0).validate(),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            Coordinates::new(0.0, -180.5).validate(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        assert!(Coordinates::new(f64::NAN, 13.4).validate().is_err());
        assert!(Coordinates::new(52.52, f64::INFINITY).validate().is_err());
    }

    #[tokio::test]
    async fn test_fixed_location() {
        let provider = FixedLocation::new(Coordinates::new(52.52, 13.40));
        let location = provider.locate().await.unwrap();
        assert_eq!(location.coordinates(), Coordinates::new(52.52, 13.40));
        assert_eq!(provider.name(), "fixed");
    }
}
