//! Search state and its coordinator
//!
//! The coordinator turns changing inputs (reference coordinate, filter, typed
//! city) into exactly one authoritative `SearchState`. Views subscribe to the
//! state and never write it.

pub mod coordinator;


use crate::error::Error;
use crate::geo::Coordinates;
use crate::place::{Filter, Place};
use serde::{Deserialize, Serialize};

pub use coordinator::{CoordinatorConfig, SearchCoordinator};

/// What to fetch: a reference coordinate and a filter
///
/// Two requests are equivalent when coordinate and filter match; the city
/// is carried along only so the backend can narrow its search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub coordinate: Coordinates,
    pub filter: Filter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl SearchRequest {
    pub fn new(coordinate: Coordinates, filter: Filter) -> Self {
        Self {
            coordinate,
            filter,
            city: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }
}

impl PartialEq for SearchRequest {
    fn eq(&self, other: &Self) -> bool {
        self.coordinate == other.coordinate && self.filter == other.filter
    }
}

/// Where the reference coordinate comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMode {
    /// Device location
    LiveLocation,
    /// A typed city name resolved by the backend
    CitySearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// User-facing error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    LocationUnavailable,
    Resolution,
    Fetch,
}

/// An error as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SearchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify `err` as a failure of the given stage
    ///
    /// Messages from our own taxonomy are shown as-is; transport and parsing
    /// details are replaced by `fallback`. Returns `None` for cancellation,
    /// which is never surfaced.
    pub fn for_stage(kind: ErrorKind, err: &Error, fallback: &str) -> Option<Self> {
        if err.is_cancelled() {
            return None;
        }
        let message = match err {
            Error::Validation(m)
            | Error::LocationUnavailable(m)
            | Error::Resolution(m)
            | Error::Fetch(m) => m.clone(),
            _ => fallback.to_string(),
        };
        Some(Self::new(kind, message))
    }
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<SearchError> for Error {
    fn from(err: SearchError) -> Self {
        match err.kind {
            ErrorKind::Validation => Error::Validation(err.message),
            ErrorKind::LocationUnavailable => Error::LocationUnavailable(err.message),
            ErrorKind::Resolution => Error::Resolution(err.message),
            ErrorKind::Fetch => Error::Fetch(err.message),
        }
    }
}

/// The single authoritative view of the current search
///
/// `results` is non-empty only in `Success`; `error` is set only in `Error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchState {
    pub mode: LocationMode,
    pub request: Option<SearchRequest>,
    pub status: SearchStatus,
    pub results: Vec<Place>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SearchError>,
    /// Increases with every issued operation
    pub generation: u64,
}

impl SearchState {
    pub fn idle(mode: LocationMode) -> Self {
        Self {
            mode,
            request: None,
            status: SearchStatus::Idle,
            results: Vec::new(),
            error: None,
            generation: 0,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Loading
    }

    /// A finished state: success or error
    pub fn is_settled(&self) -> bool {
        matches!(self.status, SearchStatus::Success | SearchStatus::Error)
    }

    pub(crate) fn set_loading(&mut self, request: Option<SearchRequest>, generation: u64) {
        self.request = request;
        self.status = SearchStatus::Loading;
        self.results.clear();
        self.error = None;
        self.generation = generation;
    }

    pub(crate) fn set_success(&mut self, results: Vec<Place>) {
        self.status = SearchStatus::Success;
        self.results = results;
        self.error = None;
    }

    pub(crate) fn set_error(&mut self, error: SearchError) {
        self.status = SearchStatus::Error;
        self.results.clear();
        self.error = Some(error);
    }

    pub(crate) fn set_idle(&mut self, generation: u64) {
        self.request = None;
        self.status = SearchStatus::Idle;
        self.results.clear();
        self.error = None;
        self.generation = generation;
    }
}
