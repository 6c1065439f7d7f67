//! Places backend
//!
//! The backend resolves city names, searches places and classifies their
//! gluten-free status. It is an external service; this module defines the
//! seam (`PlacesBackend`) and the HTTP client that talks to it.

pub mod http;
pub mod wire;

use crate::config::Config;
use crate::error::Result;
use crate::geo::Coordinates;
use crate::place::Place;
use crate::search::SearchRequest;

pub use http::HttpBackend;

/// Trait for place search backends
///
/// Implementations must be thread-safe (Send + Sync) so the coordinator can
/// run requests on spawned tasks.
pub trait PlacesBackend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Resolve a city name to its coordinate
    ///
    /// Failures are reported as `Error::Resolution`.
    fn resolve_city(&self, city: &str) -> impl std::future::Future<Output = Result<Coordinates>> + Send;

    /// Search places around the request's coordinate for its filter
    ///
    /// Failures are reported as `Error::Fetch`. An empty list is a valid answer.
    fn fetch_places(
        &self,
        request: &SearchRequest,
    ) -> impl std::future::Future<Output = Result<Vec<Place>>> + Send;

    /// Send free-text feedback
    fn submit_feedback(&self, content: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Build the HTTP backend described by the configuration
pub fn get_backend(config: &Config) -> Result<HttpBackend> {
    HttpBackend::new(&config.backend.base_url)
}
