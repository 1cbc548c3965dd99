//! OfferMatch node: matches offers over HTTP, settles trades on Bisq and
//! verifies payments on Ethplorer.
//!
//! Logging honours `RUST_LOG`; `LOG_FORMAT=json` switches to JSON lines.

mod routes;
mod settings;

use std::sync::Arc;

use anyhow::Context;
use offermatch_gateway::{BisqHttpClient, EthplorerClient};
use offermatch_settlement::Orchestrator;
use offermatch_types::constants::VERSION;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const CRATES: &[&str] = &[
    "offermatch_node",
    "offermatch_settlement",
    "offermatch_gateway",
    "offermatch_book",
];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives: Vec<String> = CRATES.iter().map(|c| format!("{c}=info")).collect();
        EnvFilter::new(format!("{},warn", directives.join(",")))
    });

    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = settings::load().context("failed to load settings")?;
    let platform =
        Arc::new(BisqHttpClient::new(&config.platform).context("failed to build platform client")?);
    let ledger =
        Arc::new(EthplorerClient::new(&config.ledger).context("failed to build ledger client")?);
    let orch = Arc::new(Orchestrator::new(platform, ledger, &config));

    let (addr, server) = warp::serve(routes::routes(orch))
        .try_bind_with_graceful_shutdown(config.listen_addr, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(%err, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tracing::info!(
        version = VERSION,
        %addr,
        platform = %config.platform.base_url,
        ledger = %config.ledger.base_url,
        address_policy = ?config.address_policy,
        "offermatch node listening"
    );
    server.await;
    tracing::info!("offermatch node stopped");
    Ok(())
}
