//! `trip` entry-point: loads settings, restores the saved session and runs
//! one command against the backend.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use travel_client::config::ClientSettings;
use travel_client::domain::{ApiClient, SessionHandle, SessionManager};
use travel_client::inbound::cli::{Cli, execute};
use travel_client::outbound::http::ReqwestTransport;
use travel_client::outbound::token_store::FileTokenStore;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = ClientSettings::load_from_iter([OsString::from("trip")])
        .map_err(|error| eyre!("failed to load configuration: {error}"))?;
    let base_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| settings.api_base_url().to_owned());
    let token_dir = cli.token_dir.clone().unwrap_or_else(|| settings.token_dir());

    let base_url =
        Url::parse(&base_url).wrap_err_with(|| format!("invalid API base URL {base_url}"))?;
    let transport = ReqwestTransport::new(base_url, settings.request_timeout())
        .wrap_err("failed to build HTTP transport")?;
    let store = FileTokenStore::open(&token_dir)
        .wrap_err_with(|| format!("failed to open token directory {}", token_dir.display()))?;

    let client = Arc::new(ApiClient::new(transport, SessionHandle::new()));
    let session = SessionManager::new(client, Arc::new(store));
    let restored = session.restore();
    debug!(?restored, "session restore finished");

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to create Tokio runtime")?;
    let mut stdin = io::stdin().lock();
    let (mut stdout, mut stderr) = (io::stdout().lock(), io::stderr().lock());
    Ok(runtime.block_on(execute(
        &cli.command,
        &session,
        &mut stdin,
        &mut stdout,
        &mut stderr,
    )))
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    if let Err(error) = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
    {
        let _ = writeln!(io::stderr().lock(), "tracing init failed: {error}");
    }
}
