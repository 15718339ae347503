//! Command dispatch.

use std::io::{BufRead, Write};

use serde_json::{Map, Value, json};
use tracing::debug;
use zeroize::Zeroizing;

use super::render::{render_json, user_json};
use super::{
    AccommodationsCommand, CliError, Command, FlightsCommand, LoginArgs, PASSWORD_ENV, SearchArgs,
    SignupArgs, TripsCommand,
};
use crate::domain::normalize::LOGIN_REQUIRED_MESSAGE;
use crate::domain::ports::{ApiTransport, TokenStore};
use crate::domain::{
    ApiError, ApiResult, FlightOfferQuery, FlightSearch, LoginCredentials, SavedFlightLookup,
    SessionManager, SessionState, SignupProfile,
};

pub(super) async fn dispatch<T, S>(
    command: &Command,
    session: &SessionManager<T, S>,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<(), CliError>
where
    T: ApiTransport,
    S: TokenStore,
{
    let value = match command {
        Command::Signup(args) => {
            let password = read_password(&args.login, input)?;
            signup(session, args, &password).await?
        }
        Command::Login(args) => {
            let password = read_password(args, input)?;
            login(session, args, &password).await?
        }
        Command::Logout => {
            session.logout();
            json!({ "loggedOut": true })
        }
        Command::Whoami => session.handle().user().as_ref().map_or(Value::Null, user_json),
        Command::Trips(command) => {
            require_login(session)?;
            trips(session, command).await?
        }
        Command::Flights(command) => flights(session, command).await?,
        Command::Accommodations(command) => {
            require_login(session)?;
            accommodations(session, command).await?
        }
    };
    render_json(out, &value)?;
    Ok(())
}

/// Refuse to send resource requests without a session.
fn require_login<T, S>(session: &SessionManager<T, S>) -> ApiResult<()> {
    if session.handle().state() == SessionState::Authenticated {
        Ok(())
    } else {
        Err(ApiError::unauthorized(LOGIN_REQUIRED_MESSAGE))
    }
}

/// Password from stdin when `--password-stdin` is set, otherwise from
/// [`PASSWORD_ENV`].
fn read_password(args: &LoginArgs, input: &mut dyn BufRead) -> Result<Zeroizing<String>, CliError> {
    if !args.password_stdin {
        return std::env::var(PASSWORD_ENV).map(Zeroizing::new).map_err(|_| {
            let hint = format!("Set {PASSWORD_ENV} or pass --password-stdin");
            ApiError::invalid_argument("A password is required")
                .with_field("password", hint)
                .into()
        });
    }
    let mut line = Zeroizing::new(String::new());
    input.read_line(&mut line).map_err(CliError::Input)?;
    Ok(Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_owned()))
}

fn credentials(args: &LoginArgs, password: &str) -> ApiResult<LoginCredentials> {
    LoginCredentials::try_from_parts(&args.username, password).map_err(ApiError::from)
}

async fn signup<T, S>(
    session: &SessionManager<T, S>,
    args: &SignupArgs,
    password: &str,
) -> ApiResult<Value>
where
    T: ApiTransport,
    S: TokenStore,
{
    let profile = SignupProfile::try_new(
        credentials(&args.login, password)?,
        &args.first_name,
        &args.last_name,
        &args.email,
    )?;
    let user = session.signup(&profile).await?;
    Ok(user_json(&user))
}

async fn login<T, S>(
    session: &SessionManager<T, S>,
    args: &LoginArgs,
    password: &str,
) -> ApiResult<Value>
where
    T: ApiTransport,
    S: TokenStore,
{
    let user = session.login(&credentials(args, password)?).await?;
    Ok(user_json(&user))
}

fn or_null(value: Option<Value>) -> Value {
    value.unwrap_or(Value::Null)
}

async fn trips<T, S>(session: &SessionManager<T, S>, command: &TripsCommand) -> ApiResult<Value>
where
    T: ApiTransport,
    S: TokenStore,
{
    let client = session.client();
    let value = match command {
        TripsCommand::List {
            user: Some(username),
            ..
        } => client.get_trips_by_username(username).await?,
        TripsCommand::List { user: None, data } => {
            client
                .list_trips(data.clone().unwrap_or_default())
                .await?
        }
        TripsCommand::Get { id } => client.get_trip(*id).await?,
        TripsCommand::Create { data } => client.create_trip(data.clone()).await?,
        TripsCommand::Update { id, data } => client.update_trip(*id, data.clone()).await?,
        TripsCommand::Delete { id } => client.delete_trip(*id).await?,
    };
    Ok(or_null(value))
}

/// Turn the positional lookup argument into a [`SavedFlightLookup`].
///
/// Input that is not JSON is taken as a bare string, which the lookup then
/// rejects with a descriptive message.
pub(super) fn parse_lookup(raw: &str) -> ApiResult<SavedFlightLookup> {
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
    SavedFlightLookup::try_from(value)
}

fn search_query(args: &SearchArgs) -> ApiResult<FlightOfferQuery> {
    let mut query = FlightOfferQuery::new(&args.from, &args.to, args.depart)?
        .with_adults(args.adults)?
        .non_stop(args.non_stop);
    if let Some(return_date) = args.return_date {
        query = query.with_return_date(return_date)?;
    }
    if let Some(max) = args.max {
        query = query.with_max_results(max);
    }
    Ok(query)
}

async fn flights<T, S>(session: &SessionManager<T, S>, command: &FlightsCommand) -> ApiResult<Value>
where
    T: ApiTransport,
    S: TokenStore,
{
    let client = session.client();
    match command {
        FlightsCommand::Search(args) => {
            let query = search_query(args)?;
            match client.search_flight_offers(&query).await? {
                FlightSearch::Found(envelope) => Ok(envelope),
                FlightSearch::NoMatches => {
                    debug!("flight search returned no matches");
                    Ok(json!({ "data": [] }))
                }
            }
        }
        FlightsCommand::Airports { keyword } => {
            Ok(Value::Array(client.airport_suggestions(keyword).await?))
        }
        FlightsCommand::Saved { lookup, trip } => {
            require_login(session)?;
            let value = match (trip, lookup) {
                (Some(trip_id), _) => client.get_saved_flights_by_trip(*trip_id).await?,
                (None, Some(raw)) => client.get_saved_flights(&parse_lookup(raw)?).await?,
                (None, None) => {
                    client
                        .get_saved_flights(&SavedFlightLookup::ByFilter(Map::new()))
                        .await?
                }
            };
            Ok(or_null(value))
        }
        FlightsCommand::Save { data } => {
            require_login(session)?;
            Ok(or_null(client.save_flight(data.clone()).await?))
        }
        FlightsCommand::Delete { id } => {
            require_login(session)?;
            Ok(or_null(client.delete_saved_flight(*id).await?))
        }
    }
}

async fn accommodations<T, S>(
    session: &SessionManager<T, S>,
    command: &AccommodationsCommand,
) -> ApiResult<Value>
where
    T: ApiTransport,
    S: TokenStore,
{
    let client = session.client();
    let value = match command {
        AccommodationsCommand::List { data } => {
            client
                .list_accommodations(data.clone().unwrap_or_default())
                .await?
        }
        AccommodationsCommand::Get { id } => client.get_accommodation(*id).await?,
        AccommodationsCommand::Delete { id } => client.delete_accommodation(*id).await?,
    };
    Ok(or_null(value))
}
