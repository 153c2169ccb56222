use std::sync::Arc;

use anyhow::Context;
use portfolio_tracker_core::storage::holdings_store::HoldingsStore;
use portfolio_tracker_core::PortfolioTracker;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState {
    pub tracker: PortfolioTracker,
    /// Echo error details in 500 bodies.
    pub debug: bool,
}

impl AppState {
    pub fn new(tracker: PortfolioTracker, debug: bool) -> Arc<Self> {
        Arc::new(Self { tracker, debug })
    }
}

/// `RUST_LOG` wins; otherwise `debug` in debug mode, else `info`.
pub fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

/// Load holdings and wire the live providers. Fails when the holdings file
/// is unreadable or yields no valid rows.
pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    tracing::info!("Loading holdings from {}", config.holdings_path.display());
    let store = HoldingsStore::load(&config.holdings_path).with_context(|| {
        format!(
            "Failed to load holdings from {}",
            config.holdings_path.display()
        )
    })?;

    let tracker = PortfolioTracker::with_default_providers(store, config.quote_timeout)?;
    Ok(AppState::new(tracker, config.debug))
}
