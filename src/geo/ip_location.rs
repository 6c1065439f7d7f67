//! IP-based geolocation
//!
//! Stands in for a device location capability on the terminal. A successful
//! lookup is remembered on disk for an hour so repeated `--here` searches do
//! not hit ip-api.com every time.

use crate::config::defaults::APP_DIR_NAME;
use crate::constants::api::IP_API_URL;
use crate::constants::cache::{IP_LOCATION_CACHE_FILE, IP_LOCATION_TTL_SECS};
use crate::error::{Error, Result};
use crate::geo::{GeoLocation, LocationProvider};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Location provider backed by an IP lookup
#[derive(Debug)]
pub struct IpLocator {
    client: reqwest::Client,
    endpoint: String,
    cache_path: Option<PathBuf>,
}

/// ip-api.com answer; only the fields we use
#[derive(Debug, Deserialize)]
struct LookupBody {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    country: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    location: GeoLocation,
    fetched_at: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl IpLocator {
    /// Locator caching under the user cache directory
    pub fn new() -> Self {
        let cache_path = dirs::cache_dir().map(|p| p.join(APP_DIR_NAME).join(IP_LOCATION_CACHE_FILE));
        Self {
            cache_path,
            ..Self::without_cache()
        }
    }

    pub fn without_cache() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: IP_API_URL.to_string(),
            cache_path: None,
        }
    }

    pub fn with_cache_path(mut self, cache_path: PathBuf) -> Self {
        self.cache_path = Some(cache_path);
        self
    }

    /// Point the locator at a different lookup endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn lookup(&self) -> Result<GeoLocation> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| Error::LocationUnavailable(format!("IP lookup failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::LocationUnavailable(format!(
                "IP lookup returned status {}",
                status
            )));
        }

        let body: LookupBody = response
            .json()
            .await
            .map_err(|e| Error::LocationUnavailable(format!("Unreadable IP lookup answer: {}", e)))?;

        if body.status != "success" {
            let reason = body.message.as_deref().unwrap_or("no reason given");
            return Err(Error::LocationUnavailable(format!("IP lookup refused: {}", reason)));
        }

        let (Some(lat), Some(lng)) = (body.lat, body.lon) else {
            return Err(Error::LocationUnavailable(
                "IP lookup answer has no coordinates".to_string(),
            ));
        };

        let display_name = match (body.city, body.country) {
            (Some(city), Some(country)) => format!("{}, {}", city, country),
            (Some(place), None) | (None, Some(place)) => place,
            (None, None) => "Unknown location".to_string(),
        };

        Ok(GeoLocation {
            lat,
            lng,
            display_name,
        })
    }

    /// A cached location younger than the TTL
    fn cached(&self) -> Option<GeoLocation> {
        let content = fs::read_to_string(self.cache_path.as_ref()?).ok()?;
        let entry: CacheEntry = serde_json::from_str(&content).ok()?;
        (now_secs().saturating_sub(entry.fetched_at) < IP_LOCATION_TTL_SECS).then_some(entry.location)
    }

    fn remember(&self, location: &GeoLocation) {
        let Some(path) = &self.cache_path else {
            return;
        };
        let entry = CacheEntry {
            location: location.clone(),
            fetched_at: now_secs(),
        };

        let written = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|_| {
                let content = serde_json::to_string(&entry).map_err(std::io::Error::from)?;
                fs::write(path, content)
            });
        if let Err(e) = written {
            warn!(path = %path.display(), error = %e, "Could not cache IP location");
        }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationProvider for IpLocator {
    fn name(&self) -> &'static str {
        "ip"
    }

    async fn locate(&self) -> Result<GeoLocation> {
        if let Some(location) = self.cached() {
            debug!(display_name = %location.display_name, "Using cached IP location");
            return Ok(location);
        }

        let location = self.lookup().await?;
        self.remember(&location);
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Json, Router};
    use tempfile::TempDir;

    async fn serve(body: serde_json::Value) -> String {
        let app = Router::new().route("/json", get(move || async move { Json(body) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/json", addr)
    }

    fn berlin_answer() -> serde_json::Value {
        serde_json::json!({
            "status": "success",
            "lat": 52.52,
            "lon": 13.40,
            "city": "Berlin",
            "country": "Germany"
        })
    }

    #[tokio::test]
    async fn test_locate_success() {
        let url = serve(berlin_answer()).await;

        let locator = IpLocator::without_cache().with_endpoint(url);
        let location = locator.locate().await.unwrap();
        assert_eq!(location.lat, 52.52);
        assert_eq!(location.display_name, "Berlin, Germany");
        assert_eq!(locator.name(), "ip");
    }

    #[tokio::test]
    async fn test_second_locate_served_from_cache() {
        let temp_dir = TempDir::new().unwrap();
        let url = serve(berlin_answer()).await;
        let locator = IpLocator::without_cache()
            .with_endpoint(url)
            .with_cache_path(temp_dir.path().join("nested").join("location.json"));

        let first = locator.locate().await.unwrap();

        // Nothing listens here; only the cache can answer
        let offline = IpLocator::without_cache()
            .with_endpoint("http://127.0.0.1:9/json")
            .with_cache_path(temp_dir.path().join("nested").join("location.json"));
        let second = offline.locate().await.unwrap();
        assert_eq!(first.coordinates(), second.coordinates());
    }

    #[tokio::test]
    async fn test_expired_cache_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("location.json");
        let stale = CacheEntry {
            location: GeoLocation {
                lat: 1.0,
                lng: 2.0,
                display_name: "Old".to_string(),
            },
            fetched_at: now_secs() - IP_LOCATION_TTL_SECS - 1,
        };
        fs::write(&path, serde_json::to_string(&stale).unwrap()).unwrap();

        let locator = IpLocator::without_cache().with_cache_path(path);
        assert!(locator.cached().is_none());
    }

    #[tokio::test]
    async fn test_locate_failure_is_location_unavailable() {
        let url = serve(serde_json::json!({
            "status": "fail",
            "message": "private range"
        }))
        .await;

        let locator = IpLocator::without_cache().with_endpoint(url);
        let err = locator.locate().await.unwrap_err();
        assert!(matches!(err, Error::LocationUnavailable(_)));
        assert!(err.to_string().contains("private range"));
    }
}
