//! # hubpaneld
//!
//! Composition root that wires the hub client, the state synchronization core
//! and the console front-end together.
//!
//! ## Responsibilities
//! - Load configuration (`hubpanel.toml`, env vars)
//! - Initialise `tracing`
//! - Construct the session store, the HTTP client (adapter), the entity cache
//!   and the update bus
//! - Spawn the poller and the update renderer
//! - Run the console until `quit`, end of input or Ctrl-C
//! - Shut down gracefully: stop the poller, let its current cycle finish
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;
mod console;
mod render;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use hubpanel_adapter_http_reqwest::HttpStateClient;
use hubpanel_app::dispatcher::CommandDispatcher;
use hubpanel_app::entity_cache::EntityCache;
use hubpanel_app::poller::Poller;
use hubpanel_app::session::SessionStore;
use hubpanel_app::update_bus::InProcessUpdateBus;

use crate::config::Config;
use crate::console::Console;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("unable to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    let catalog = Arc::new(config.catalog.clone());
    let session = SessionStore::new(config.credentials());
    if !session.is_configured() {
        tracing::info!("no hub credentials configured, use `login <url> <token>`");
    }

    // Adapter
    let client = Arc::new(
        HttpStateClient::new(session.clone(), &config.http)
            .context("unable to build hub client")?,
    );

    // Core
    let bus = Arc::new(InProcessUpdateBus::new(16));
    let updates = bus.subscribe();
    let (cache, writer) = EntityCache::new(catalog.tracked_ids());
    let poller = Poller::new(
        Arc::clone(&client),
        Arc::clone(&bus),
        writer,
        &session,
        config.poller_config(),
    )
    .spawn();

    // Presentation
    let renderer = tokio::spawn(render::print_updates(Arc::clone(&catalog), updates));
    let console = Console::new(
        session,
        cache,
        catalog,
        CommandDispatcher::new(client),
        poller.trigger(),
    );
    println!("{}", console::HELP);

    tokio::select! {
        () = console.run(console::stdin_lines()) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("unable to listen for ctrl-c")?;
            tracing::info!("interrupt received");
        }
    }

    tracing::info!("shutting down");
    poller.shutdown().await.context("poller task failed")?;
    drop(bus);
    renderer.await.context("renderer task failed")?;
    Ok(())
}
