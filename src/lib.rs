//! gf-finder: gluten-free place discovery
//!
//! A library and CLI for finding gluten-free restaurants, cafes and bakeries
//! around a location, backed by a places service that classifies each venue.
//!
//! ## Features
//!
//! - Search around a coordinate, a typed city or the current location
//! - Last-request-wins coordination of overlapping searches
//! - Client-side haversine distances and dedicated-first ranking
//! - Text, JSON and directions-link output
//!
//! ## Quick Start
//!
//! ```no_run
//! use gf_finder::backend::HttpBackend;
//! use gf_finder::geo::Coordinates;
//! use gf_finder::search::{CoordinatorConfig, SearchCoordinator, SearchState};
//! use std::sync::Arc;
//!
//! # async fn demo() -> gf_finder::Result<()> {
//! let backend = Arc::new(HttpBackend::new("http://localhost:5007")?);
//! let coordinator = SearchCoordinator::new(backend, CoordinatorConfig::default());
//!
//! let mut rx = coordinator.subscribe();
//! coordinator.set_reference_coordinate(Coordinates::new(52.52, 13.40))?;
//!
//! let state = rx
//!     .wait_for(SearchState::is_settled)
//!     .await
//!     .map_err(|_| gf_finder::Error::Cancelled)?
//!     .clone();
//! for place in &state.results {
//!     println!("{} [{}] {}", place.name, place.status, place.distance_label());
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod geo;
pub mod place;
pub mod search;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use geo::{distance, Coordinates};
pub use place::{Filter, GfStatus, Place};
pub use search::{SearchCoordinator, SearchState, SearchStatus};
