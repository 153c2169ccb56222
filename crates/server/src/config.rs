use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CORS_ORIGINS: &str =
    "https://financedashboardk.netlify.app,http://localhost:5173,http://localhost:3000";
pub const DEFAULT_HOLDINGS_PATH: &str = "data/holdings.csv";
pub const DEFAULT_QUOTE_TIMEOUT_SECS: u64 = 8;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// Allowed origins; a single `*` allows any origin.
    pub cors_allow: Vec<String>,
    pub debug: bool,
    pub holdings_path: PathBuf,
    pub quote_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Unset or blank keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let cors_allow = var("CORS_ORIGIN")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let debug = var("DEBUG")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        let holdings_path = var("HOLDINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HOLDINGS_PATH));

        let timeout_secs: u64 = match var("QUOTE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid QUOTE_TIMEOUT_SECS: {raw}"))?,
            None => DEFAULT_QUOTE_TIMEOUT_SECS,
        };

        Ok(Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            cors_allow,
            debug,
            holdings_path,
            quote_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allow.iter().any(|o| o == "*")
    }
}
