//! Browse command handler
//!
//! A line-oriented session over one coordinator. Every state change is
//! printed as it is published, so overlapping requests show exactly what a
//! view would render.

use crate::cli::build_coordinator;
use crate::config::Config;
use crate::error::Result;
use crate::format::text::TextFormatter;
use crate::format::OutputFormatter;
use crate::geo::{get_ip_locator, Coordinates};
use crate::place::Filter;
use crate::search::{SearchState, SearchStatus};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::debug;

/// Browse command arguments
#[derive(Args)]
pub struct BrowseArgs {
    /// Initial filter
    #[arg(long, short = 't')]
    pub filter: Option<Filter>,

    /// Start from the current location (IP geolocation)
    #[arg(long)]
    pub here: bool,
}

/// One line of user input
#[derive(Debug, Clone, PartialEq)]
enum Command {
    City(String),
    At(Coordinates),
    Here,
    Filter(Filter),
    Clear,
    Refresh,
    Filters,
    Help,
    Quit,
}

fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_lowercase().as_str() {
        "city" => Ok(Command::City(rest.to_string())),
        "at" => {
            let parts: Vec<&str> = rest.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|p| !p.is_empty())
                .collect();
            match parts.as_slice() {
                [lat, lng] => {
                    let lat = lat.parse().map_err(|_| format!("Invalid latitude: {}", lat))?;
                    let lng = lng.parse().map_err(|_| format!("Invalid longitude: {}", lng))?;
                    Ok(Command::At(Coordinates::new(lat, lng)))
                }
                _ => Err("Usage: at <lat> <lng>".to_string()),
            }
        }
        "here" => Ok(Command::Here),
        "filter" => rest.parse().map(Command::Filter),
        "clear" => Ok(Command::Clear),
        "refresh" => Ok(Command::Refresh),
        "filters" => Ok(Command::Filters),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("Unknown command: {} (try 'help')", other)),
    }
}

const HELP: &str = "\
Commands:
  city <name>      search a city
  at <lat> <lng>   search around a coordinate
  here             use your current location
  filter <name>    restaurants, cafes or bakery
  clear            clear the query
  refresh          re-run the current search
  filters          list filters
  quit             leave";

/// Print every published state until the coordinator goes away
async fn render(mut rx: watch::Receiver<SearchState>, config: Config) {
    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        debug!(generation = state.generation, status = ?state.status, "State changed");
        if state.status == SearchStatus::Idle {
            continue;
        }
        match TextFormatter.format(&state, &config) {
            Ok(text) => println!("\n{}", text.trim_end()),
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}

/// Run the browse command
pub async fn run(args: BrowseArgs) -> Result<()> {
    let config = Config::load()?;
    let coordinator = build_coordinator(&config)?;

    if let Some(filter) = args.filter {
        coordinator.set_filter(filter)?;
    }

    let renderer = tokio::spawn(render(coordinator.subscribe(), config.clone()));

    if args.here {
        coordinator.use_live_location(get_ip_locator());
    } else {
        coordinator.enter_city_mode();
    }
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };

        // Rejected input is also published as an error state
        let outcome = match command {
            Command::City(city) => coordinator.search_city(&city),
            Command::At(coordinate) => coordinator.set_reference_coordinate(coordinate),
            Command::Here => {
                coordinator.use_live_location(get_ip_locator());
                Ok(())
            }
            Command::Filter(filter) => coordinator.set_filter(filter),
            Command::Clear => {
                coordinator.clear_query();
                Ok(())
            }
            Command::Refresh => {
                coordinator.refresh();
                Ok(())
            }
            Command::Filters => {
                for filter in coordinator.filters() {
                    let marker = if Some(*filter) == coordinator.active_filter() { "*" } else { " " };
                    println!(" {} {}", marker, filter.label());
                }
                Ok(())
            }
            Command::Help => {
                println!("{}", HELP);
                Ok(())
            }
            Command::Quit => break,
        };
        if let Err(e) = outcome {
            debug!(error = %e, "Input rejected");
        }
    }

    drop(coordinator);
    let _ = renderer.await;
    Ok(())
}
