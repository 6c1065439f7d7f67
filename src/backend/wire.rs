//! Backend payload schemas
//!
//! Bodies are parsed against explicit schemas and fail closed: anything that
//! does not match becomes a `Resolution` or `Fetch` error instead of leaking
//! half-filled places into the result set.

use crate::constants::api::{FETCH_FALLBACK, RESOLUTION_FALLBACK};
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::place::{GfStatus, Place};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// `GET /find-city-coordinates` body
#[derive(Debug, Deserialize)]
struct CityCoordinatesBody {
    lat: Option<f64>,
    lng: Option<f64>,
    error: Option<String>,
}

/// `GET /get-restaurants` body
#[derive(Debug, Deserialize)]
struct PlacesBody {
    raw_data: Option<Vec<RawPlace>>,
    error: Option<String>,
}

/// Body of any failed response
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    place_id: String,
    name: String,
    #[serde(default)]
    address: Option<String>,
    geometry: RawGeometry,
    gf_status: Option<String>,
    /// Unrated places come through as "N/A"
    #[serde(default, deserialize_with = "lenient_number")]
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
    distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    location: RawLocation,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    lat: f64,
    lng: f64,
}

/// `POST /submit-feedback` body
#[derive(Debug, Serialize)]
pub(crate) struct FeedbackBody<'a> {
    pub content: &'a str,
}

/// Accept any JSON value, keeping it only if it is a number
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

/// A non-empty `error` field, trimmed
fn reported_error(error: Option<String>) -> Option<String> {
    error
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
}

/// Pull a reported error out of an arbitrary body, if there is one
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| reported_error(b.error))
}

/// Interpret a city lookup response
///
/// A reported `error` wins regardless of status.
pub(crate) fn parse_city_coordinates(status: StatusCode, body: &str) -> Result<Coordinates> {
    let parsed: CityCoordinatesBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(%status, error = %e, "Malformed city lookup response");
            return Err(Error::Resolution(RESOLUTION_FALLBACK.to_string()));
        }
    };

    if let Some(message) = reported_error(parsed.error) {
        return Err(Error::Resolution(message));
    }
    if !status.is_success() {
        return Err(Error::Resolution(RESOLUTION_FALLBACK.to_string()));
    }

    let (Some(lat), Some(lng)) = (parsed.lat, parsed.lng) else {
        warn!("City lookup response is missing lat/lng");
        return Err(Error::Resolution(RESOLUTION_FALLBACK.to_string()));
    };

    let coords = Coordinates::new(lat, lng);
    if coords.validate().is_err() {
        warn!(%coords, "City lookup returned an invalid coordinate");
        return Err(Error::Resolution(RESOLUTION_FALLBACK.to_string()));
    }
    Ok(coords)
}

/// Interpret a place search response
///
/// An empty `raw_data` is a valid, empty result. A missing one is malformed.
pub(crate) fn parse_places(status: StatusCode, body: &str) -> Result<Vec<Place>> {
    let parsed: PlacesBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            // A failed response may still carry a usable message
            if let Some(message) = error_message(body) {
                return Err(Error::Fetch(message));
            }
            warn!(%status, error = %e, "Malformed place search response");
            return Err(Error::Fetch(FETCH_FALLBACK.to_string()));
        }
    };

    if let Some(message) = reported_error(parsed.error) {
        return Err(Error::Fetch(message));
    }
    if !status.is_success() {
        return Err(Error::Fetch(FETCH_FALLBACK.to_string()));
    }

    let Some(raw_places) = parsed.raw_data else {
        warn!("Place search response has no raw_data");
        return Err(Error::Fetch(FETCH_FALLBACK.to_string()));
    };

    let mut seen = HashSet::new();
    let mut places = Vec::with_capacity(raw_places.len());
    for raw in raw_places {
        let place = convert_place(raw)?;
        if !seen.insert(place.id.clone()) {
            warn!(id = %place.id, "Dropping duplicate place id");
            continue;
        }
        places.push(place);
    }
    Ok(places)
}

fn convert_place(raw: RawPlace) -> Result<Place> {
    let coordinate = Coordinates::new(raw.geometry.location.lat, raw.geometry.location.lng);
    if coordinate.validate().is_err() || raw.place_id.trim().is_empty() {
        warn!(id = %raw.place_id, %coordinate, "Place has an invalid id or location");
        return Err(Error::Fetch(FETCH_FALLBACK.to_string()));
    }

    Ok(Place {
        id: raw.place_id,
        name: raw.name,
        address: raw.address.unwrap_or_default(),
        coordinate,
        status: GfStatus::from_wire(raw.gf_status.as_deref()),
        rating: raw.rating.unwrap_or(0.0),
        rating_count: raw.user_ratings_total.unwrap_or(0),
        distance_km: None,
        reported_distance_km: raw.distance,
    })
}
