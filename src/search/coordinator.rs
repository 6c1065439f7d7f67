//! Search Coordinator
//!
//! Owns the reference coordinate, the active filter and the in-flight
//! operation, and is the only writer of `SearchState`.
//!
//! Every issued operation gets a fresh `CancellationToken` and a generation
//! number. Issuing a new one cancels the previous token first. A completion
//! is committed only if its generation is still current and its token is not
//! cancelled, and that check happens under the same lock as the commit, so
//! the last *issued* request wins no matter in which order responses arrive.
//!
//! Operations spawn onto the ambient tokio runtime and must be called from
//! within one.

use crate::backend::PlacesBackend;
use crate::config::Config;
use crate::constants::api::{EMPTY_CITY, FETCH_FALLBACK, LOCATION_FALLBACK, RESOLUTION_FALLBACK};
use crate::error::{Error, Result};
use crate::geo::{Coordinates, LocationProvider};
use crate::place::{annotate_distances, available_filters, sort_places, Filter, Place};
use crate::search::{
    ErrorKind, LocationMode, SearchError, SearchRequest, SearchState, SearchStatus,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Construction-time settings for a coordinator
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Filters the user may choose from
    pub filters: Vec<Filter>,
    /// Filter active before the user picks one; `None` means no fetch until they do
    pub default_filter: Option<Filter>,
    /// Mode the session starts in
    pub initial_mode: LocationMode,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            filters: available_filters(),
            default_filter: Some(Filter::default()),
            initial_mode: LocationMode::LiveLocation,
        }
    }
}

impl CoordinatorConfig {
    pub fn from_config(config: &Config) -> Result<Self> {
        let filters = config.search.filter_set()?;
        let default_filter = config.search.default_filter()?;
        if let Some(filter) = default_filter {
            if !filters.contains(&filter) {
                return Err(Error::Config(format!(
                    "Default filter '{}' is not in the configured filter set",
                    filter
                )));
            }
        }
        Ok(Self {
            filters,
            default_filter,
            initial_mode: LocationMode::LiveLocation,
        })
    }
}

/// Mutable inputs, guarded together with the current operation
#[derive(Debug)]
struct Inputs {
    mode: LocationMode,
    coordinate: Option<Coordinates>,
    city: Option<String>,
    filter: Option<Filter>,
    generation: u64,
    token: Option<CancellationToken>,
}

impl Inputs {
    /// Cancel the current operation and start a new generation
    fn begin(&mut self) -> (u64, CancellationToken) {
        self.invalidate();
        let token = CancellationToken::new();
        self.token = Some(token.clone());
        (self.generation, token)
    }

    /// Cancel the current operation without starting a new one
    fn invalidate(&mut self) {
        if let Some(previous) = self.token.take() {
            previous.cancel();
        }
        self.generation += 1;
    }

    fn is_current(&self, generation: u64, token: &CancellationToken) -> bool {
        self.generation == generation && !token.is_cancelled()
    }
}

/// State shared with spawned operations
struct Shared {
    inputs: Mutex<Inputs>,
    state: watch::Sender<SearchState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inputs> {
        self.inputs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reconciles search inputs into one authoritative `SearchState`
pub struct SearchCoordinator<B: PlacesBackend + 'static> {
    backend: Arc<B>,
    filters: Vec<Filter>,
    shared: Arc<Shared>,
}

impl<B: PlacesBackend + 'static> SearchCoordinator<B> {
    pub fn new(backend: Arc<B>, config: CoordinatorConfig) -> Self {
        let inputs = Inputs {
            mode: config.initial_mode,
            coordinate: None,
            city: None,
            filter: config.default_filter,
            generation: 0,
            token: None,
        };
        let (state, _) = watch::channel(SearchState::idle(config.initial_mode));

        Self {
            backend,
            filters: config.filters,
            shared: Arc::new(Shared {
                inputs: Mutex::new(inputs),
                state,
            }),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SearchState {
        self.shared.state.borrow().clone()
    }

    /// Read-only stream of state changes
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state.subscribe()
    }

    /// Filters this coordinator offers
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn active_filter(&self) -> Option<Filter> {
        self.shared.lock().filter
    }

    pub fn reference_coordinate(&self) -> Option<Coordinates> {
        self.shared.lock().coordinate
    }

    pub fn mode(&self) -> LocationMode {
        self.shared.lock().mode
    }

    /// Replace the reference coordinate
    ///
    /// Invalid coordinates are rejected and surface an error state; nothing
    /// else changes.
    pub fn set_reference_coordinate(&self, coordinate: Coordinates) -> Result<()> {
        let mut inputs = self.shared.lock();
        if let Err(e) = coordinate.validate() {
            self.reject(&mut inputs, &e);
            return Err(e);
        }

        inputs.coordinate = Some(coordinate);
        inputs.city = None;
        self.reconcile(&mut inputs, false);
        Ok(())
    }

    /// Select the active filter
    pub fn set_filter(&self, filter: Filter) -> Result<()> {
        let mut inputs = self.shared.lock();
        if !self.filters.contains(&filter) {
            let e = Error::Validation(format!("Filter '{}' is not available.", filter));
            self.reject(&mut inputs, &e);
            return Err(e);
        }

        inputs.filter = Some(filter);
        self.reconcile(&mut inputs, false);
        Ok(())
    }

    /// The user emptied the search text: back to an idle prompt
    pub fn clear_query(&self) {
        let mut inputs = self.shared.lock();
        inputs.invalidate();
        inputs.city = None;
        if inputs.mode == LocationMode::CitySearch {
            inputs.coordinate = None;
        }

        let generation = inputs.generation;
        self.shared.state.send_modify(|state| state.set_idle(generation));
        debug!(generation, "Query cleared");
    }

    /// Switch to city search without a city yet
    pub fn enter_city_mode(&self) {
        let mut inputs = self.shared.lock();
        inputs.invalidate();
        inputs.mode = LocationMode::CitySearch;
        inputs.coordinate = None;
        inputs.city = None;

        let generation = inputs.generation;
        self.shared.state.send_modify(|state| {
            state.mode = LocationMode::CitySearch;
            state.set_idle(generation);
        });
    }

    /// Reissue the current request, even if nothing changed
    pub fn refresh(&self) {
        let mut inputs = self.shared.lock();
        if inputs.coordinate.is_none() {
            if let Some(city) = inputs.city.clone() {
                drop(inputs);
                // Resolution failed last time; try the whole search again
                if let Err(e) = self.search_city(&city) {
                    debug!(error = %e, "Refresh rejected");
                }
                return;
            }
        }
        self.reconcile(&mut inputs, true);
    }

    /// Resolve `city` and search around it
    ///
    /// Empty input is rejected synchronously without touching the network.
    /// A resolution failure never reaches the place search.
    pub fn search_city(&self, city: &str) -> Result<()> {
        let mut inputs = self.shared.lock();
        let city = city.trim();
        if city.is_empty() {
            let e = Error::Validation(EMPTY_CITY.to_string());
            self.reject(&mut inputs, &e);
            return Err(e);
        }
        if inputs.filter.is_none() {
            let e = Error::Validation("Please select a filter.".to_string());
            self.reject(&mut inputs, &e);
            return Err(e);
        }

        inputs.mode = LocationMode::CitySearch;
        inputs.city = Some(city.to_string());
        inputs.coordinate = None;
        let (generation, token) = inputs.begin();
        self.shared.state.send_modify(|state| {
            state.mode = LocationMode::CitySearch;
            state.set_loading(None, generation);
        });
        info!(city, generation, "Searching city");

        let shared = self.shared.clone();
        let backend = self.backend.clone();
        let city = city.to_string();
        tokio::spawn(async move {
            let resolved = tokio::select! {
                _ = token.cancelled() => {
                    debug!(generation, "City resolution cancelled");
                    return;
                }
                resolved = backend.resolve_city(&city) => resolved,
            };

            let request = {
                let mut inputs = shared.lock();
                if !inputs.is_current(generation, &token) {
                    debug!(generation, "Discarding stale city resolution");
                    return;
                }
                match resolved {
                    Ok(coordinate) => {
                        inputs.coordinate = Some(coordinate);
                        match inputs.filter {
                            Some(filter) => {
                                let request =
                                    SearchRequest::new(coordinate, filter).with_city(city.clone());
                                let pending = request.clone();
                                shared.state.send_modify(|state| state.request = Some(pending));
                                request
                            }
                            None => {
                                shared.state.send_modify(|state| state.set_idle(generation));
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        let Some(error) =
                            SearchError::for_stage(ErrorKind::Resolution, &e, RESOLUTION_FALLBACK)
                        else {
                            return;
                        };
                        info!(%city, error = %error, "City resolution failed");
                        shared.state.send_modify(|state| {
                            state.request = None;
                            state.set_error(error);
                        });
                        return;
                    }
                }
            };

            fetch_and_commit(shared, backend, generation, token, request).await;
        });

        Ok(())
    }

    /// Use the device location as the reference coordinate
    ///
    /// On failure the session falls back to city search mode with a
    /// location-unavailable error.
    pub fn use_live_location<P: LocationProvider + 'static>(&self, provider: P) {
        let mut inputs = self.shared.lock();
        inputs.mode = LocationMode::LiveLocation;
        inputs.city = None;
        inputs.coordinate = None;
        let (generation, token) = inputs.begin();
        self.shared.state.send_modify(|state| {
            state.mode = LocationMode::LiveLocation;
            state.set_loading(None, generation);
        });
        info!(provider = provider.name(), generation, "Requesting live location");

        let shared = self.shared.clone();
        let backend = self.backend.clone();
        tokio::spawn(async move {
            let located = tokio::select! {
                _ = token.cancelled() => return,
                located = provider.locate() => located,
            };

            let request = {
                let mut inputs = shared.lock();
                if !inputs.is_current(generation, &token) {
                    debug!(generation, "Discarding stale location");
                    return;
                }

                let coordinate = located
                    .and_then(|location| {
                        let coordinate = location.coordinates();
                        coordinate.validate().map(|_| coordinate)
                    });

                match coordinate {
                    Ok(coordinate) => {
                        inputs.coordinate = Some(coordinate);
                        match inputs.filter {
                            Some(filter) => {
                                let request = SearchRequest::new(coordinate, filter);
                                let pending = request.clone();
                                shared.state.send_modify(|state| state.request = Some(pending));
                                request
                            }
                            None => {
                                shared.state.send_modify(|state| state.set_idle(generation));
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Location unavailable, falling back to city search");
                        inputs.mode = LocationMode::CitySearch;
                        shared.state.send_modify(|state| {
                            state.mode = LocationMode::CitySearch;
                            state.request = None;
                            state.set_error(SearchError::new(
                                ErrorKind::LocationUnavailable,
                                LOCATION_FALLBACK,
                            ));
                        });
                        return;
                    }
                }
            };

            fetch_and_commit(shared, backend, generation, token, request).await;
        });
    }

    /// Issue a fetch if the effective request changed (or `force`)
    fn reconcile(&self, inputs: &mut Inputs, force: bool) {
        let (Some(coordinate), Some(filter)) = (inputs.coordinate, inputs.filter) else {
            debug!("Request incomplete, not fetching");
            return;
        };
        let mut request = SearchRequest::new(coordinate, filter);
        request.city = inputs.city.clone();

        if !force {
            let state = self.shared.state.borrow();
            let unchanged = state.request.as_ref() == Some(&request)
                && matches!(state.status, SearchStatus::Loading | SearchStatus::Success);
            if unchanged {
                debug!(%coordinate, %filter, "Request unchanged, not refetching");
                return;
            }
        }

        let (generation, token) = inputs.begin();
        let pending = request.clone();
        self.shared
            .state
            .send_modify(|state| state.set_loading(Some(pending), generation));
        info!(%coordinate, %filter, generation, "Searching places");

        tokio::spawn(fetch_and_commit(
            self.shared.clone(),
            self.backend.clone(),
            generation,
            token,
            request,
        ));
    }

    /// Surface a local validation error and drop whatever was in flight
    fn reject(&self, inputs: &mut Inputs, err: &Error) {
        inputs.invalidate();
        let generation = inputs.generation;
        let error = SearchError::for_stage(ErrorKind::Validation, err, &err.to_string());
        self.shared.state.send_modify(|state| {
            state.generation = generation;
            state.request = None;
            if let Some(error) = error {
                state.set_error(error);
            }
        });
    }
}

impl<B: PlacesBackend + 'static> Drop for SearchCoordinator<B> {
    fn drop(&mut self) {
        if let Some(token) = self.shared.lock().token.take() {
            token.cancel();
        }
    }
}

/// Run a place search and commit its outcome if it is still current
async fn fetch_and_commit<B: PlacesBackend + 'static>(
    shared: Arc<Shared>,
    backend: Arc<B>,
    generation: u64,
    token: CancellationToken,
    request: SearchRequest,
) {
    let outcome = tokio::select! {
        _ = token.cancelled() => {
            debug!(generation, "Place search cancelled");
            return;
        }
        outcome = backend.fetch_places(&request) => outcome,
    };

    let inputs = shared.lock();
    if !inputs.is_current(generation, &token) {
        debug!(generation, "Discarding stale place search");
        return;
    }

    match outcome {
        Ok(places) => {
            let places = rank(places, request.coordinate);
            info!(count = places.len(), filter = %request.filter, generation, "Places loaded");
            shared.state.send_modify(|state| state.set_success(places));
        }
        Err(e) => {
            let Some(error) = SearchError::for_stage(ErrorKind::Fetch, &e, FETCH_FALLBACK) else {
                return;
            };
            info!(error = %error, generation, "Place search failed");
            shared.state.send_modify(|state| state.set_error(error));
        }
    }
    drop(inputs);
}

fn rank(mut places: Vec<Place>, reference: Coordinates) -> Vec<Place> {
    annotate_distances(&mut places, Some(reference));
    sort_places(&mut places);
    places
}
