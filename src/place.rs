//! Establishments and the filters used to search for them

use crate::geo::{distance, Coordinates};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Establishment category
///
/// The set is closed; a coordinator may be configured to offer a subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    Restaurants,
    Cafes,
    Bakery,
}

impl Filter {
    /// Value sent as the `type` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restaurants => "restaurants",
            Self::Cafes => "cafes",
            Self::Bakery => "bakery",
        }
    }

    /// Label for buttons and headings
    pub fn label(&self) -> &'static str {
        match self {
            Self::Restaurants => "Restaurants",
            Self::Cafes => "Cafes",
            Self::Bakery => "Bakery",
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::Restaurants
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "restaurants" | "restaurant" => Ok(Self::Restaurants),
            "cafes" | "cafe" => Ok(Self::Cafes),
            "bakery" | "bakeries" => Ok(Self::Bakery),
            _ => Err(format!("Unknown filter: {}", s)),
        }
    }
}

/// List all filters
pub fn available_filters() -> Vec<Filter> {
    vec![Filter::Restaurants, Filter::Cafes, Filter::Bakery]
}

/// Gluten-free classification reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GfStatus {
    /// Entirely gluten-free establishment
    DedicatedGf,
    /// Regular establishment with gluten-free options
    OffersGf,
    /// Not enough information; verify directly
    Unclear,
}

impl GfStatus {
    /// Map the backend's free-form status string
    ///
    /// Anything unrecognised, including an absent value, is `Unclear`.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("Dedicated GF") => Self::DedicatedGf,
            Some("Offers GF") | Some("Offers GF Menu") => Self::OffersGf,
            _ => Self::Unclear,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::DedicatedGf => "Dedicated Gluten-Free",
            Self::OffersGf => "Offers Gluten-Free",
            Self::Unclear => "Unclear - Verify Directly",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::DedicatedGf => 0,
            Self::OffersGf => 1,
            Self::Unclear => 2,
        }
    }
}

impl std::fmt::Display for GfStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// An establishment in a result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Backend place id, unique within a result set
    pub id: String,
    pub name: String,
    pub address: String,
    pub coordinate: Coordinates,
    pub status: GfStatus,
    pub rating: f64,
    pub rating_count: u32,

    /// Kilometers from the reference coordinate, computed client-side
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,

    /// Distance the backend reported, if any (informational only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_distance_km: Option<f64>,
}

impl Place {
    pub fn is_dedicated(&self) -> bool {
        self.status == GfStatus::DedicatedGf
    }

    /// "1.23 km", or "N/A" before a reference coordinate exists
    pub fn distance_label(&self) -> String {
        match self.distance_km {
            Some(km) => format!("{:.2} km", km),
            None => "N/A".to_string(),
        }
    }
}

/// Fill in `distance_km` for every place relative to `reference`
pub fn annotate_distances(places: &mut [Place], reference: Option<Coordinates>) {
    for place in places.iter_mut() {
        place.distance_km = distance(reference, Some(place.coordinate));
    }
}

/// Order places for display
///
/// Dedicated GF first, then offers, then unclear; within a status by
/// ascending distance, unknown distances last. Stable for equal keys.
pub fn sort_places(places: &mut [Place]) {
    places.sort_by(|a, b| {
        a.status
            .rank()
            .cmp(&b.status.rank())
            .then_with(|| compare_distance(a.distance_km, b.distance_km))
    });
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
