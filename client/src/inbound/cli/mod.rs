//! Command-line front end for the travel client.
//!
//! Parsing is clap-derived. [`run`] executes one command against a
//! [`SessionManager`] and writes pretty JSON to `out`; [`execute`] wraps it
//! with the shared error renderer and maps the result to an exit code. Both
//! are generic over the ports so tests drive them with in-process fixtures.
//!
//! Passwords never travel on the command line. `login` and `signup` read
//! them from [`PASSWORD_ENV`], or from the first line of `input` when
//! `--password-stdin` is given.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::ports::{ApiTransport, TokenStore};
use crate::domain::{ApiError, SessionManager};

mod commands;
mod render;

pub use render::{render_error, render_json};

/// Environment variable holding the password for `login` and `signup`.
pub const PASSWORD_ENV: &str = "TRAVEL_CLIENT_PASSWORD";

/// `trip` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "trip",
    about = "Plan trips, manage saved flights and search flight offers",
    version
)]
pub struct Cli {
    /// Backend API base URL. Overrides `TRAVEL_CLIENT_API_BASE_URL`.
    #[arg(long = "api-url", value_name = "url", global = true)]
    pub api_url: Option<String>,
    /// Directory holding the session token. Overrides
    /// `TRAVEL_CLIENT_TOKEN_DIR`.
    #[arg(long = "token-dir", value_name = "path", global = true)]
    pub token_dir: Option<PathBuf>,
    /// Log request activity to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create an account and log in.
    Signup(SignupArgs),
    /// Log in and remember the session.
    Login(LoginArgs),
    /// Forget the current session.
    Logout,
    /// Show who is logged in.
    Whoami,
    /// Manage trips.
    #[command(subcommand)]
    Trips(TripsCommand),
    /// Search flights and manage saved flights.
    #[command(subcommand)]
    Flights(FlightsCommand),
    /// Manage accommodations.
    #[command(subcommand)]
    Accommodations(AccommodationsCommand),
}

/// Credentials shared by `login` and `signup`.
#[derive(Debug, Clone, Args)]
pub struct LoginArgs {
    /// Account name.
    #[arg(long, value_name = "name")]
    pub username: String,
    /// Read the password from the first line of stdin instead of
    /// `TRAVEL_CLIENT_PASSWORD`.
    #[arg(long = "password-stdin")]
    pub password_stdin: bool,
}

/// Registration details.
#[derive(Debug, Clone, Args)]
pub struct SignupArgs {
    #[command(flatten)]
    pub login: LoginArgs,
    /// Given name.
    #[arg(long = "first-name", value_name = "name")]
    pub first_name: String,
    /// Family name.
    #[arg(long = "last-name", value_name = "name")]
    pub last_name: String,
    /// Contact email address.
    #[arg(long, value_name = "address")]
    pub email: String,
}

/// `trips` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum TripsCommand {
    /// List trips, optionally filtered or for one user.
    List {
        /// Only trips owned by this user.
        #[arg(long, value_name = "username", conflicts_with = "data")]
        user: Option<String>,
        /// Filters as a JSON object.
        #[arg(long, value_name = "json", value_parser = parse_json_object)]
        data: Option<Map<String, Value>>,
    },
    /// Show one trip.
    Get { id: i64 },
    /// Create a trip from a JSON object.
    Create {
        #[arg(long, value_name = "json", value_parser = parse_json_object)]
        data: Map<String, Value>,
    },
    /// Update fields of a trip.
    Update {
        id: i64,
        #[arg(long, value_name = "json", value_parser = parse_json_object)]
        data: Map<String, Value>,
    },
    /// Delete a trip.
    Delete { id: i64 },
}

/// `flights` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum FlightsCommand {
    /// Search flight offers.
    Search(SearchArgs),
    /// Suggest airports for a partial name or code.
    Airports { keyword: String },
    /// Show saved flights by id, by JSON filter or by trip.
    Saved {
        /// Saved-flight id or JSON filter object.
        #[arg(value_name = "id|json", conflicts_with = "trip")]
        lookup: Option<String>,
        /// Every saved flight of this trip.
        #[arg(long, value_name = "id")]
        trip: Option<i64>,
    },
    /// Save a flight from a JSON object.
    Save {
        #[arg(long, value_name = "json", value_parser = parse_json_object)]
        data: Map<String, Value>,
    },
    /// Delete a saved flight.
    Delete { id: i64 },
}

/// Flight offer search parameters.
#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Origin IATA code.
    #[arg(long, value_name = "iata")]
    pub from: String,
    /// Destination IATA code.
    #[arg(long, value_name = "iata")]
    pub to: String,
    /// Departure date (YYYY-MM-DD).
    #[arg(long, value_name = "date")]
    pub depart: NaiveDate,
    /// Return date for round trips (YYYY-MM-DD).
    #[arg(long = "return", value_name = "date")]
    pub return_date: Option<NaiveDate>,
    /// Number of adult passengers.
    #[arg(long, default_value_t = 1)]
    pub adults: u8,
    /// Only direct flights.
    #[arg(long = "non-stop")]
    pub non_stop: bool,
    /// Maximum number of offers.
    #[arg(long, value_name = "count")]
    pub max: Option<u32>,
}

/// `accommodations` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum AccommodationsCommand {
    /// List accommodations, optionally filtered.
    List {
        #[arg(long, value_name = "json", value_parser = parse_json_object)]
        data: Option<Map<String, Value>>,
    },
    /// Show one accommodation.
    Get { id: i64 },
    /// Delete an accommodation.
    Delete { id: i64 },
}

fn parse_json_object(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("expected a JSON object".to_owned()),
        Err(error) => Err(format!("invalid JSON: {error}")),
    }
}

/// Failures of a single command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The operation itself failed.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Reading the password from stdin failed.
    #[error("failed to read the password: {0}")]
    Input(std::io::Error),
    /// Writing the result failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Execute `command` and write its result to `out`.
///
/// # Errors
///
/// Returns [`CliError::Api`] when the operation fails,
/// [`CliError::Input`] when a password cannot be read from `input` and
/// [`CliError::Output`] when `out` cannot be written.
pub async fn run<T, S>(
    command: &Command,
    session: &SessionManager<T, S>,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<(), CliError>
where
    T: ApiTransport,
    S: TokenStore,
{
    commands::dispatch(command, session, input, out).await
}

/// Run `command`, render any failure to `err` and return the exit code.
pub async fn execute<T, S>(
    command: &Command,
    session: &SessionManager<T, S>,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> ExitCode
where
    T: ApiTransport,
    S: TokenStore,
{
    let rendered = match run(command, session, input, out).await {
        Ok(()) => return ExitCode::SUCCESS,
        Err(CliError::Api(error)) => render_error(err, &error),
        Err(other) => writeln!(err, "error: {other}"),
    };
    if let Err(error) = rendered {
        tracing::error!(%error, "failed to report command error");
    }
    ExitCode::FAILURE
}
