use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use portfolio_tracker_server::config::{Config, DEFAULT_PORT};

fn from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults() {
    let config = from(&[]).unwrap();
    assert_eq!(config.listen_addr.port(), DEFAULT_PORT);
    assert_eq!(config.listen_addr.port(), 5000);
    assert!(config.listen_addr.ip().is_unspecified());
    assert_eq!(
        config.cors_allow,
        [
            "https://financedashboardk.netlify.app",
            "http://localhost:5173",
            "http://localhost:3000"
        ]
    );
    assert!(!config.debug);
    assert!(!config.allows_any_origin());
    assert_eq!(config.holdings_path, PathBuf::from("data/holdings.csv"));
    assert_eq!(config.quote_timeout, Duration::from_secs(8));
}

#[test]
fn reads_every_key() {
    let config = from(&[
        ("PORT", "8080"),
        ("CORS_ORIGIN", " https://a.example , ,https://b.example"),
        ("DEBUG", "true"),
        ("HOLDINGS_PATH", "/srv/portfolio.csv"),
        ("QUOTE_TIMEOUT_SECS", "3"),
    ])
    .unwrap();
    assert_eq!(config.listen_addr.port(), 8080);
    assert_eq!(config.cors_allow, ["https://a.example", "https://b.example"]);
    assert!(config.debug);
    assert_eq!(config.holdings_path, PathBuf::from("/srv/portfolio.csv"));
    assert_eq!(config.quote_timeout, Duration::from_secs(3));
}

#[test]
fn wildcard_origin() {
    assert!(from(&[("CORS_ORIGIN", "*")]).unwrap().allows_any_origin());
}

#[test]
fn debug_flag_spellings() {
    for on in ["true", "TRUE", "1", "yes"] {
        assert!(from(&[("DEBUG", on)]).unwrap().debug, "{on}");
    }
    for off in ["false", "0", "no", "maybe"] {
        assert!(!from(&[("DEBUG", off)]).unwrap().debug, "{off}");
    }
}

#[test]
fn blank_values_take_defaults() {
    let config = from(&[("PORT", "  "), ("HOLDINGS_PATH", "")]).unwrap();
    assert_eq!(config.listen_addr.port(), 5000);
    assert_eq!(config.holdings_path, PathBuf::from("data/holdings.csv"));
}

#[test]
fn invalid_numbers_are_errors() {
    let err = from(&[("PORT", "eighty")]).unwrap_err();
    assert!(err.to_string().contains("PORT"));
    assert!(from(&[("PORT", "70000")]).is_err());
    assert!(from(&[("QUOTE_TIMEOUT_SECS", "-1")]).is_err());
}
