//! Centralized constants for the gf-finder crate
//!
//! Values shared by more than one module live here.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometers
    pub const EARTH_RADIUS_KM: f64 = 6371.0;
}

/// Backend endpoints and user-facing fallback messages
pub mod api {
    /// Default backend base URL for local development
    pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5007";

    /// City name to coordinate lookup
    pub const CITY_COORDINATES_PATH: &str = "/find-city-coordinates";

    /// Filtered place search
    pub const PLACES_PATH: &str = "/get-restaurants";

    /// Free-text feedback submission
    pub const FEEDBACK_PATH: &str = "/submit-feedback";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";

    /// Shown when city resolution fails without a backend message
    pub const RESOLUTION_FALLBACK: &str = "Could not find that city.";

    /// Shown when place search fails without a backend message
    pub const FETCH_FALLBACK: &str = "Could not fetch places.";

    /// Shown when the location capability is unavailable
    pub const LOCATION_FALLBACK: &str =
        "Could not get your location. Please enable location services.";

    /// Shown when the city input is empty
    pub const EMPTY_CITY: &str = "Please enter a city name.";
}

/// Cache settings
pub mod cache {
    /// IP location cache duration in seconds (1 hour)
    pub const IP_LOCATION_TTL_SECS: u64 = 3600;

    /// IP location cache file name
    pub const IP_LOCATION_CACHE_FILE: &str = "ip_location_cache.json";
}
