//! Human-readable text output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::search::{SearchState, SearchStatus};

/// Text formatter - outputs a numbered result list
pub struct TextFormatter;

impl TextFormatter {
    fn heading(state: &SearchState) -> String {
        let Some(request) = &state.request else {
            return "Gluten-free places".to_string();
        };

        let filter = request.filter.label().to_lowercase();
        match &request.city {
            Some(city) => format!("Gluten-free {} in {} {}", filter, city, request.coordinate),
            None => format!("Gluten-free {} near {}", filter, request.coordinate),
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable result list"
    }

    fn format(&self, state: &SearchState, _config: &Config) -> Result<String> {
        let mut output = String::new();

        match state.status {
            SearchStatus::Idle => output.push_str("No search yet.\n"),
            SearchStatus::Loading => {
                output.push_str(&format!("{}\n", Self::heading(state)));
                output.push_str("Searching...\n");
            }
            SearchStatus::Error => {
                output.push_str(&format!(
                    "Error: {}\n",
                    state.error_message().unwrap_or("unknown")
                ));
            }
            SearchStatus::Success if state.results.is_empty() => {
                output.push_str(&format!("{}\n", Self::heading(state)));
                output.push_str("No places found.\n");
            }
            SearchStatus::Success => {
                output.push_str(&format!("{}\n\n", Self::heading(state)));
                for (i, place) in state.results.iter().enumerate() {
                    output.push_str(&format!("{:>2}. {} [{}]\n", i + 1, place.name, place.status));
                    if !place.address.is_empty() {
                        output.push_str(&format!("    {}\n", place.address));
                    }
                    output.push_str(&format!(
                        "    Rating: {:.1} ({} reviews) | {}\n",
                        place.rating,
                        place.rating_count,
                        place.distance_label()
                    ));
                }
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures::success_state;
    use crate::search::{ErrorKind, LocationMode, SearchError};

    #[test]
    fn test_text_format() {
        let output = TextFormatter
            .format(&success_state(), &Config::default())
            .unwrap();

        assert!(output.starts_with("Gluten-free cafes in Berlin (52.5200, 13.4000)"));
        assert!(output.contains(" 1. Café Blattgold [Dedicated Gluten-Free]"));
        assert!(output.contains(" 2. Father Carpenter [Offers Gluten-Free]"));
        assert!(output.contains("Rating: 4.5 (120 reviews) | "));
        assert!(output.contains(" km"));
    }

    #[test]
    fn test_text_skips_missing_address() {
        let mut state = success_state();
        state.results.truncate(1);
        state.results[0].address.clear();

        let output = TextFormatter.format(&state, &Config::default()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[2], " 1. Café Blattgold [Dedicated Gluten-Free]");
        assert!(lines[3].starts_with("    Rating: 4.5"));
    }

    #[test]
    fn test_text_empty_success() {
        let mut state = success_state();
        state.results.clear();

        let output = TextFormatter.format(&state, &Config::default()).unwrap();
        assert!(output.contains("No places found."));
    }

    #[test]
    fn test_text_other_states() {
        let config = Config::default();
        let mut state = SearchState::idle(LocationMode::LiveLocation);
        assert_eq!(TextFormatter.format(&state, &config).unwrap(), "No search yet.\n");

        state.set_error(SearchError::new(ErrorKind::Fetch, "Could not fetch places."));
        assert_eq!(
            TextFormatter.format(&state, &config).unwrap(),
            "Error: Could not fetch places.\n"
        );
    }
}
