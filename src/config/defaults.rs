//! Default configuration values

use crate::constants::api::DEFAULT_BACKEND_URL;

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = DEFAULT_BACKEND_URL;

/// Filter active when the app starts
pub const DEFAULT_FILTER: &str = "restaurants";

/// Filters offered to the user
pub const DEFAULT_FILTERS: [&str; 3] = ["restaurants", "cafes", "bakery"];

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default directions provider
pub const DEFAULT_URL_PROVIDER: &str = "google";

/// Overrides `backend.base_url`
pub const ENV_BACKEND_URL: &str = "GF_FINDER_BACKEND_URL";

/// Overrides `analytics.measurement_id`
pub const ENV_MEASUREMENT_ID: &str = "GF_FINDER_MEASUREMENT_ID";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "gf-finder";
