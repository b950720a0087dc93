//! # steamgate
//!
//! Binary wiring: load (or interactively create) the configuration record,
//! authenticate the backend session, then build the bridge exactly once and
//! run until a fatal condition.

#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use steamgate_backend::SessionManager;
use steamgate_backend::loopback::LoopbackBackend;
use steamgate_config::{JsonConfigStore, TerminalPrompter, setup};
use steamgate_core::SteamId;
use steamgate_rpc::{EventForwarder, MethodTable, NameFilter, RpcClient};
use steamgate_server::RpcServer;

/// Filtered JSON-RPC bridge for an authenticated Steam backend session.
#[derive(Parser, Debug)]
#[command(name = "steamgate")]
struct Cli {
    /// Name of the configuration record: loads `<name>.json` from the
    /// working directory, creating it interactively when missing.
    config: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("steamgate: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let store = Arc::new(JsonConfigStore::for_name(&cli.config));
    let prompter = Arc::new(TerminalPrompter);
    let config = setup::ensure_config(store.as_ref(), prompter.as_ref())
        .context("configuration setup failed")?;
    init_logging(config.debug_enabled());

    // TODO: swap the loopback transport for a live connection backend.
    let backend = LoopbackBackend::new(SteamId::new(76_561_197_960_265_728));

    let mut session =
        SessionManager::new(backend.actor_set(), store.clone(), prompter.clone(), &config)?;
    session.log_on().await.context("authentication failed")?;

    // The bridge is built exactly once, on the first transition into Active;
    // reconnects re-enter Active without touching it.
    let method_filter = NameFilter::new(
        config.methods_whitelist.clone(),
        config.methods_blacklist.clone(),
    );
    let event_filter = NameFilter::new(
        config.events_whitelist.clone(),
        config.events_blacklist.clone(),
    );
    let actors = session.actor_handles();

    let table = Arc::new(MethodTable::build(&actors, &method_filter));
    tracing::info!(methods = table.len(), "method table built");
    let server = RpcServer::new(config.server(), table);
    let (addr, _server_task) = server
        .listen()
        .await
        .context("failed to start the RPC server")?;

    let client = Arc::new(RpcClient::new(&config.client()));
    let forwarder =
        EventForwarder::build(&actors, session.primary().clone(), client.clone(), &event_filter);
    tracing::info!(
        events = forwarder.subscriptions().len(),
        endpoint = client.endpoint(),
        "event forwarding armed"
    );
    let _relays = forwarder.start();

    tracing::info!(%addr, "steamgate is running");
    session.run().await?;
    Ok(())
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
