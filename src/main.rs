//! BETDESK: bet placement and odds proxy backend
//!
//! Entry point. Loads configuration, initialises structured logging,
//! opens the bet store, and serves the HTTP API until Ctrl+C.

use anyhow::{Context, Result};
use secrecy::SecretString;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use betdesk::api::{self, ApiState};
use betdesk::config::AppConfig;
use betdesk::data::odds_api::OddsGateway;
use betdesk::data::EventSource;
use betdesk::fees::FeeCalculator;
use betdesk::storage::BetStore;

const BANNER: &str = r#"
 ___ ___ _____ ___  ___ ___ _  __
| _ ) __|_   _|   \| __/ __| |/ /
| _ \ _|  | | | |) | _|\__ \ ' <
|___/___| |_| |___/|___|___/_|\_\

  Bets & odds API  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = std::env::var("BETDESK_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let cfg = AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        config = %config_path,
        placement_rate = %cfg.fees.placement_rate,
        win_fee_rate = %cfg.fees.win_fee_rate,
        default_sports = ?cfg.odds_api.default_sports,
        "BETDESK starting up"
    );

    // -- Initialise components -------------------------------------------

    let store = BetStore::connect(&cfg.database.url).await?;

    let api_key = AppConfig::resolve_env(&cfg.odds_api.api_key_env).unwrap_or_else(|_| {
        warn!(
            env = %cfg.odds_api.api_key_env,
            "No odds API key configured, /events will return no data"
        );
        String::new()
    });
    let gateway = OddsGateway::new(&cfg.odds_api, SecretString::new(api_key))?;
    info!(source = gateway.name(), base_url = %cfg.odds_api.base_url, "Event source ready");

    let state = Arc::new(ApiState {
        store,
        events: Arc::new(gateway),
        fees: FeeCalculator::new(cfg.fees.clone()),
        default_sports: cfg.odds_api.default_sports.clone(),
    });

    // -- Serve -------------------------------------------------------------

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid server address: {}:{}",
                cfg.server.host, cfg.server.port
            )
        })?;

    api::serve(state.clone(), addr, shutdown_signal()).await?;

    state.store.close().await;
    info!("BETDESK shut down cleanly.");
    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("betdesk=info,tower_http=info"));

    let json_logging = std::env::var("BETDESK_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
