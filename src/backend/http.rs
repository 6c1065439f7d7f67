//! HTTP client for the places backend

use crate::backend::wire::{self, FeedbackBody};
use crate::backend::PlacesBackend;
use crate::constants::api::{
    CITY_COORDINATES_PATH, FEEDBACK_PATH, FETCH_FALLBACK, PLACES_PATH, RESOLUTION_FALLBACK,
};
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::place::Place;
use crate::search::SearchRequest;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("gf-finder/", env!("CARGO_PKG_VERSION"));

/// Backend reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Config("Backend base URL is empty".to_string()));
        }

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl PlacesBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn resolve_city(&self, city: &str) -> Result<Coordinates> {
        let city = city.trim();
        debug!(city, "Resolving city");

        let response = self
            .client
            .get(self.url(CITY_COORDINATES_PATH))
            .query(&[("city", city)])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "City lookup request failed");
                Error::Resolution(RESOLUTION_FALLBACK.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(error = %e, "Failed to read city lookup response");
            Error::Resolution(RESOLUTION_FALLBACK.to_string())
        })?;

        wire::parse_city_coordinates(status, &body)
    }

    async fn fetch_places(&self, request: &SearchRequest) -> Result<Vec<Place>> {
        let mut query = vec![
            ("lat", request.coordinate.lat.to_string()),
            ("lon", request.coordinate.lng.to_string()),
            ("type", request.filter.as_str().to_string()),
        ];
        if let Some(city) = &request.city {
            query.push(("city", city.clone()));
        }
        debug!(coordinate = %request.coordinate, filter = %request.filter, "Fetching places");

        let response = self
            .client
            .get(self.url(PLACES_PATH))
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Place search request failed");
                Error::Fetch(FETCH_FALLBACK.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(error = %e, "Failed to read place search response");
            Error::Fetch(FETCH_FALLBACK.to_string())
        })?;

        wire::parse_places(status, &body)
    }

    async fn submit_feedback(&self, content: &str) -> Result<()> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::Validation("Feedback cannot be empty.".to_string()));
        }

        let response = self
            .client
            .post(self.url(FEEDBACK_PATH))
            .json(&FeedbackBody { content })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = wire::error_message(&body)
            .unwrap_or_else(|| format!("Feedback was not accepted (status {})", status));
        Err(Error::Fetch(message))
    }
}
