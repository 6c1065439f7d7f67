//! JSON output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::search::SearchState;

/// JSON formatter - outputs the whole state as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full search state as JSON"
    }

    fn format(&self, state: &SearchState, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(state)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures::success_state;
    use crate::search::{ErrorKind, LocationMode, SearchError};

    #[test]
    fn test_json_format() {
        let output = JsonFormatter
            .format(&success_state(), &Config::default())
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["status"], "success");
        assert_eq!(parsed["mode"], "city_search");
        assert_eq!(parsed["request"]["filter"], "cafes");
        assert_eq!(parsed["request"]["city"], "Berlin");
        assert_eq!(parsed["results"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["results"][0]["status"], "dedicated_gf");
        assert!(parsed["results"][0]["distance_km"].is_number());
        assert!(parsed.get("error").is_none());
    }

    #[test]
    fn test_json_error_state() {
        let mut state = SearchState::idle(LocationMode::CitySearch);
        state.set_error(SearchError::new(ErrorKind::Resolution, "Could not find that city."));

        let output = JsonFormatter.format(&state, &Config::default()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["error"]["kind"], "resolution");
        assert_eq!(parsed["error"]["message"], "Could not find that city.");
        assert!(parsed["request"].is_null());
    }

    #[test]
    fn test_json_formatter_info() {
        assert_eq!(JsonFormatter.name(), "json");
        assert!(!JsonFormatter.description().is_empty());
    }
}
