//! Search command handler
//!
//! Runs one search to completion and prints the settled state.

use crate::cli::build_coordinator;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::url::UrlFormatter;
use crate::format::{available_formats, get_formatter, OutputFormatter};
use crate::geo::{get_ip_locator, Coordinates};
use crate::place::Filter;
use crate::search::SearchState;
use clap::Args;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Latitude
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,

    /// City name, resolved by the backend
    #[arg(long, short = 'c', conflicts_with_all = ["lat", "lng", "here"])]
    pub city: Option<String>,

    /// Use current location (IP geolocation)
    #[arg(long, conflicts_with_all = ["lat", "lng", "city"])]
    pub here: bool,

    /// Filter: restaurants, cafes or bakery
    #[arg(long, short = 't')]
    pub filter: Option<Filter>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Directions provider for the url format
    #[arg(long)]
    pub provider: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    let config = Config::load()?;
    let coordinator = build_coordinator(&config)?;

    if let Some(filter) = args.filter {
        coordinator.set_filter(filter)?;
    }
    if coordinator.active_filter().is_none() {
        return Err(Error::Validation(
            "No filter selected. Pass --filter or set search.default_filter".to_string(),
        ));
    }

    // Subscribe before starting so no transition is missed
    let mut rx = coordinator.subscribe();

    if args.here {
        coordinator.use_live_location(get_ip_locator());
    } else if let Some(city) = &args.city {
        coordinator.search_city(city)?;
    } else if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        coordinator.set_reference_coordinate(Coordinates::new(lat, lng))?;
    } else {
        return Err(Error::Validation(
            "No location specified. Use --lat/--lng, --city, or --here".to_string(),
        ));
    }

    let state: SearchState = rx
        .wait_for(SearchState::is_settled)
        .await
        .map_err(|_| Error::Cancelled)?
        .clone();

    if let Some(err) = state.error {
        return Err(err.into());
    }

    let format = args.format.unwrap_or_else(|| config.search.format.clone());
    let formatter: Box<dyn OutputFormatter> = match (format.as_str(), args.provider) {
        ("url", Some(provider)) => Box::new(UrlFormatter::with_provider(provider)),
        _ => get_formatter(&format)
            .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?,
    };
    let output = formatter.format(&state, &config)?;

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        print!("{}", output);
    }

    Ok(())
}

/// Print the configured filters, marking the default
pub fn list_filters() -> Result<()> {
    let config = Config::load()?;
    let default = config.search.default_filter()?;

    println!("Available filters:");
    for filter in config.search.filter_set()? {
        let marker = if Some(filter) == default { " (default)" } else { "" };
        println!("  {:12} - {}{}", filter.as_str(), filter.label(), marker);
    }
    Ok(())
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:6} - {}", format.name, format.description);
    }
}
