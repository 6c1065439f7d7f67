//! Directions URL output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::search::SearchState;

/// URL formatter - outputs one directions link per result
#[derive(Debug, Clone, Default)]
pub struct UrlFormatter {
    /// Provider to use instead of `url.default`
    pub provider: Option<String>,
}

impl UrlFormatter {
    pub fn with_provider(provider: impl Into<String>) -> Self {
        Self {
            provider: Some(provider.into()),
        }
    }
}

impl OutputFormatter for UrlFormatter {
    fn name(&self) -> &str {
        "url"
    }

    fn description(&self) -> &str {
        "Directions link per place"
    }

    fn format(&self, state: &SearchState, config: &Config) -> Result<String> {
        let mut output = String::new();
        for place in &state.results {
            output.push_str(&config.directions_url(self.provider.as_deref(), place)?);
            output.push('\n');
        }
        Ok(output)
    }
}
