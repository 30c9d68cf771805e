//! Shared free-text command interpreter
//!
//! Every front end funnels user input through
//! [`CommandInterpreter::process_command`]: one line in, one response string
//! out. The interpreter validates verbs and argument arity, parses numeric
//! coordinates, dispatches to the injected map service and renders plain
//! strings. It never panics and never lets an error escape to the caller.

use crate::api::MapOperations;
use crate::error::MapToolError;
use crate::geo::{self, format_distance};
use crate::models::{Location, TravelMode};
use anyhow::Result;
use tracing::{debug, error};

/// Uniform response for non-numeric coordinate arguments.
const INVALID_COORDINATES: &str =
    "Invalid coordinate format: coordinates must be decimal numbers.";

/// Command interpreter driving an injected map service.
///
/// Stateless per call apart from the `running` flag, which front-end loops
/// observe to decide when to stop reading input.
pub struct CommandInterpreter<S> {
    service: S,
    running: bool,
}

impl<S: MapOperations> CommandInterpreter<S> {
    /// Create an interpreter around a map service
    pub fn new(service: S) -> Self {
        Self {
            service,
            running: true,
        }
    }

    /// Whether the interpreter still accepts commands
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Parse and execute one command line, returning the response to print.
    /// Never panics; residual errors become a response string, user-friendly
    /// when the error is typed and generic otherwise.
    pub fn process_command(&mut self, line: &str) -> String {
        self.dispatch(line).unwrap_or_else(|e| {
            error!("Command processing failed: {e:#}");
            match e.downcast_ref::<MapToolError>() {
                Some(error) => error.user_message(),
                None => "Error processing command. Please try again.".to_string(),
            }
        })
    }

    fn dispatch(&mut self, line: &str) -> Result<String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((verb, args)) = tokens.split_first() else {
            return Ok("Empty command. Type 'help' to list available commands.".to_string());
        };

        let verb = verb.to_lowercase();
        debug!("Dispatching verb '{}' with {} argument(s)", verb, args.len());

        let response = match verb.as_str() {
            "geocode" => self.handle_geocode(args),
            "reverse" => self.handle_reverse(args),
            "search" => self.handle_search(args),
            "distance" => self.handle_distance(args),
            "route" => self.handle_route(args),
            "config" => self.handle_config(),
            "test" => Self::handle_test(),
            "help" => Self::help_text(),
            "quit" => {
                self.running = false;
                "Goodbye.".to_string()
            }
            _ => format!("Unrecognized command: {verb}. Type 'help' to list available commands."),
        };
        Ok(response)
    }

    fn handle_geocode(&self, args: &[&str]) -> String {
        if args.is_empty() {
            return usage("geocode <address>");
        }

        let address = args.join(" ");
        match self.service.geocode(&address) {
            Some(location) => format!(
                "Geocoded: {} -> {}",
                location.address,
                geo::format_coordinates(location.latitude, location.longitude)
            ),
            None => "Geocoding failed. Check that the address is correct.".to_string(),
        }
    }

    fn handle_reverse(&self, args: &[&str]) -> String {
        if args.len() != 2 {
            return usage("reverse <latitude> <longitude>");
        }

        let Some(coords) = parse_floats(args) else {
            return INVALID_COORDINATES.to_string();
        };

        match self.service.reverse_geocode(coords[0], coords[1]) {
            Some(location) => format!(
                "Reverse geocoded: {} -> {}",
                geo::format_coordinates(coords[0], coords[1]),
                location.address
            ),
            None => "Reverse geocoding failed.".to_string(),
        }
    }

    fn handle_search(&self, args: &[&str]) -> String {
        if args.is_empty() {
            return usage("search <keywords>");
        }

        let query = args.join(" ");
        let result = self.service.search_places(&query, None);
        if result.results.is_empty() {
            return "Search returned no results.".to_string();
        }

        let mut response = format!("Found {} result(s):", result.total_count);
        for (index, place) in result.results.iter().take(5).enumerate() {
            response.push_str(&format!(
                "\n  {}. {} ({})",
                index + 1,
                place.display_name(),
                geo::format_coordinates(place.latitude, place.longitude)
            ));
        }
        response
    }

    fn handle_distance(&self, args: &[&str]) -> String {
        if args.len() != 4 {
            return usage("distance <lat1> <lon1> <lat2> <lon2>");
        }

        let Some(coords) = parse_floats(args) else {
            return INVALID_COORDINATES.to_string();
        };

        let origin = Location::new(
            coords[0],
            coords[1],
            format!("origin ({}, {})", coords[0], coords[1]),
        );
        let destination = Location::new(
            coords[2],
            coords[3],
            format!("destination ({}, {})", coords[2], coords[3]),
        );

        let kilometers = self.service.calculate_distance(&origin, &destination);
        format!("Distance: {}", format_distance(kilometers))
    }

    fn handle_route(&self, args: &[&str]) -> String {
        if args.len() != 4 && args.len() != 5 {
            return usage("route <lat1> <lon1> <lat2> <lon2> [mode]");
        }

        let Some(coords) = parse_floats(&args[..4]) else {
            return INVALID_COORDINATES.to_string();
        };

        let mode = match args.get(4) {
            Some(token) => match token.parse::<TravelMode>() {
                Ok(mode) => mode,
                Err(_) => {
                    return format!(
                        "Unknown travel mode '{token}'. Supported: driving, walking, riding, transit."
                    );
                }
            },
            None => TravelMode::default(),
        };

        let origin = Location::new(
            coords[0],
            coords[1],
            format!("origin ({}, {})", coords[0], coords[1]),
        );
        let destination = Location::new(
            coords[2],
            coords[3],
            format!("destination ({}, {})", coords[2], coords[3]),
        );

        let route = self.service.get_route(&origin, &destination, mode);
        format!(
            "Route ({}): {}, {}",
            route.mode,
            format_distance(route.distance_km),
            route.duration
        )
    }

    fn handle_config(&self) -> String {
        if self.service.is_configured() {
            "Configuration: API key is set; provider ready.".to_string()
        } else {
            "Configuration: no API key set. Export MAPTOOL_PROVIDER__API_KEY or edit the config file."
                .to_string()
        }
    }

    fn handle_test() -> String {
        "Self-test ready. Run 'geocode', 'search' or 'distance' to exercise the provider."
            .to_string()
    }

    fn help_text() -> String {
        "Available commands:\n  \
         geocode <address>                     address to coordinates\n  \
         reverse <latitude> <longitude>        coordinates to address\n  \
         search <keywords>                     find places by keyword\n  \
         distance <lat1> <lon1> <lat2> <lon2>  distance between two points\n  \
         route <lat1> <lon1> <lat2> <lon2> [mode]  plan a route\n  \
         config                                show configuration state\n  \
         test                                  provider self-test hint\n  \
         help                                  this message\n  \
         quit                                  exit\n\
         Coordinates use decimal degrees."
            .to_string()
    }
}

/// Parse every token as `f64`; `None` if any token is non-numeric.
fn parse_floats(args: &[&str]) -> Option<Vec<f64>> {
    args.iter().map(|arg| arg.parse::<f64>().ok()).collect()
}

fn usage(form: &str) -> String {
    format!("Wrong usage. Expected: {form}")
}
