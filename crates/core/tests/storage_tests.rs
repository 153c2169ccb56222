// ═══════════════════════════════════════════════════════════════════
// Storage Tests: PriceCache TTL/stats, HoldingsStore CSV loading
// ═══════════════════════════════════════════════════════════════════

use std::io::Write;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tempfile::NamedTempFile;

use portfolio_tracker_core::clock::{Clock, ManualClock};
use portfolio_tracker_core::errors::CoreError;
use portfolio_tracker_core::models::holding::Holding;
use portfolio_tracker_core::models::price::{PriceRecord, Provenance};
use portfolio_tracker_core::storage::holdings_store::HoldingsStore;
use portfolio_tracker_core::storage::price_cache::{PriceCache, CACHE_TTL_MS};

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap())
}

fn cache_with(clock: &ManualClock) -> PriceCache {
    PriceCache::with_clock(Arc::new(clock.clone()))
}

fn record(symbol: &str, price: f64) -> PriceRecord {
    PriceRecord {
        symbol: symbol.into(),
        current_price: price,
        currency: "USD".into(),
        pe_ratio: 0.0,
        eps: 0.0,
        market_cap: 0.0,
        fifty_two_week_high: 0.0,
        fifty_two_week_low: 0.0,
        dividend_yield: 0.0,
        timestamp: Utc::now(),
        source: Provenance::PrimarySource,
    }
}

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ═══════════════════════════════════════════════════════════════════
// PriceCache
// ═══════════════════════════════════════════════════════════════════

mod price_cache {
    use super::*;

    #[test]
    fn empty_cache_misses() {
        let cache = PriceCache::new();
        assert!(cache.get("AAPL").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn put_then_get() {
        let clock = clock();
        let cache = cache_with(&clock);
        cache.put("AAPL", record("AAPL", 195.45));
        assert_eq!(cache.get("AAPL").unwrap().current_price, 195.45);
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let clock = clock();
        let cache = cache_with(&clock);
        cache.put("aapl", record("AAPL", 1.0));
        assert!(cache.get("AAPL").is_some());
        assert!(cache.get("Aapl").is_some());
    }

    #[test]
    fn default_ttl_is_fifteen_seconds() {
        let cache = PriceCache::new();
        assert_eq!(cache.ttl(), Duration::milliseconds(15_000));
        assert_eq!(CACHE_TTL_MS, 15_000);
    }

    #[test]
    fn usable_just_before_ttl() {
        let clock = clock();
        let cache = cache_with(&clock);
        cache.put("AAPL", record("AAPL", 1.0));
        clock.advance(Duration::milliseconds(14_999));
        assert!(cache.get("AAPL").is_some());
    }

    #[test]
    fn unusable_just_after_ttl() {
        let clock = clock();
        let cache = cache_with(&clock);
        cache.put("AAPL", record("AAPL", 1.0));
        clock.advance(Duration::milliseconds(15_001));
        assert!(cache.get("AAPL").is_none());
    }

    #[test]
    fn unusable_exactly_at_ttl() {
        let clock = clock();
        let cache = cache_with(&clock);
        cache.put("AAPL", record("AAPL", 1.0));
        clock.advance(Duration::milliseconds(15_000));
        assert!(cache.get("AAPL").is_none());
    }

    #[test]
    fn stale_entry_stays_resident() {
        let clock = clock();
        let cache = cache_with(&clock);
        cache.put("AAPL", record("AAPL", 1.0));
        clock.advance(Duration::seconds(60));
        assert!(cache.get("AAPL").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_overwrites_and_restamps() {
        let clock = clock();
        let cache = cache_with(&clock);
        cache.put("AAPL", record("AAPL", 1.0));
        clock.advance(Duration::seconds(10));
        cache.put("AAPL", record("AAPL", 2.0));
        clock.advance(Duration::seconds(10));

        let hit = cache.get("AAPL").unwrap();
        assert_eq!(hit.current_price, 2.0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_removes_entry() {
        let clock = clock();
        let cache = cache_with(&clock);
        cache.put("AAPL", record("AAPL", 1.0));
        cache.put("MSFT", record("MSFT", 2.0));

        assert!(cache.invalidate("aapl"));
        assert!(cache.get("AAPL").is_none());
        assert!(cache.get("MSFT").is_some());
        assert!(!cache.invalidate("AAPL"));
    }

    #[test]
    fn clear_removes_everything() {
        let clock = clock();
        let cache = cache_with(&clock);
        cache.put("AAPL", record("AAPL", 1.0));
        cache.put("MSFT", record("MSFT", 2.0));

        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().cached_symbols, 0);
    }

    #[test]
    fn stats_include_stale_entries() {
        let clock = clock();
        let cache = cache_with(&clock);
        let start = clock.now();
        cache.put("MSFT", record("MSFT", 2.0));
        clock.advance(Duration::seconds(40));
        cache.put("AAPL", record("AAPL", 1.0));
        clock.advance(Duration::milliseconds(2_400));

        let stats = cache.stats();
        assert_eq!(stats.cached_symbols, 2);
        assert_eq!(stats.cache_duration_seconds, 15);
        assert_eq!(stats.symbols.len(), 2);

        // sorted by symbol
        assert_eq!(stats.symbols[0].symbol, "AAPL");
        assert_eq!(stats.symbols[0].age_seconds, 2);
        assert_eq!(stats.symbols[1].symbol, "MSFT");
        assert_eq!(stats.symbols[1].age_seconds, 42);
        assert_eq!(stats.symbols[1].cached_at, start);
    }

    #[test]
    fn stats_round_age_to_nearest_second() {
        let clock = clock();
        let cache = cache_with(&clock);
        cache.put("AAPL", record("AAPL", 1.0));
        clock.advance(Duration::milliseconds(1_600));
        assert_eq!(cache.stats().symbols[0].age_seconds, 2);
    }
}

// ═══════════════════════════════════════════════════════════════════
// HoldingsStore
// ═══════════════════════════════════════════════════════════════════

mod holdings_store {
    use super::*;

    const SAMPLE: &str = "\
Symbol,Quantity,Purchase Price,Sector
aapl,10,150,Tech
MSFT,5,300.5,Tech
JPM,8,140,Finance
";

    #[test]
    fn parses_rows_in_order() {
        let holdings = HoldingsStore::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(holdings.len(), 3);
        assert_eq!(holdings[0].id, "holding-0");
        assert_eq!(holdings[0].symbol, "AAPL");
        assert_eq!(holdings[0].quantity, 10.0);
        assert_eq!(holdings[0].purchase_price, 150.0);
        assert_eq!(holdings[0].sector_name, "Tech");
        assert_eq!(holdings[1].purchase_price, 300.5);
        assert_eq!(holdings[2].sector_name, "Finance");
    }

    #[test]
    fn drops_invalid_rows_but_keeps_row_ids() {
        let csv = "\
Symbol,Quantity,Purchase Price,Sector
AAPL,10,150,Tech
,5,100,Tech
MSFT,0,300,Tech
GOOGL,-2,100,Tech
AMZN,abc,100,Retail
JPM,8,140,Finance
";
        let holdings = HoldingsStore::parse(csv.as_bytes()).unwrap();
        let symbols: Vec<&str> = holdings.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "JPM"]);
        assert_eq!(holdings[1].id, "holding-5");
    }

    #[test]
    fn every_loaded_holding_satisfies_invariants() {
        let csv = "\
Symbol,Quantity,Purchase Price,Sector
 pg ,1.5,10,Staples
wmt,2,,Retail
bac,0.0001,35,Finance
,1,1,
x,-1,1,Misc
";
        let holdings = HoldingsStore::parse(csv.as_bytes()).unwrap();
        assert!(!holdings.is_empty());
        for h in &holdings {
            assert!(h.quantity > 0.0);
            assert!(!h.symbol.is_empty());
            assert_eq!(h.symbol, h.symbol.to_uppercase());
        }
    }

    #[test]
    fn missing_sector_defaults_to_unknown() {
        let csv = "Symbol,Quantity,Purchase Price,Sector\nAAPL,10,150,\nMSFT,1,2\n";
        let holdings = HoldingsStore::parse(csv.as_bytes()).unwrap();
        assert_eq!(holdings.len(), 2);
        assert!(holdings.iter().all(|h| h.sector_name == "Unknown"));
    }

    #[test]
    fn unparseable_purchase_price_reads_as_zero() {
        let csv = "Symbol,Quantity,Purchase Price,Sector\nAAPL,10,n/a,Tech\n";
        let holdings = HoldingsStore::parse(csv.as_bytes()).unwrap();
        assert_eq!(holdings[0].purchase_price, 0.0);
    }

    #[test]
    fn thousands_separators_are_ignored() {
        let csv = "Symbol,Quantity,Purchase Price,Sector\nAAPL,\"1,000\",150,Tech\n";
        let holdings = HoldingsStore::parse(csv.as_bytes()).unwrap();
        assert_eq!(holdings[0].quantity, 1000.0);
    }

    #[test]
    fn columns_found_by_header_name() {
        let csv = "Sector,Purchase Price,Symbol,Quantity\nTech,150,AAPL,10\n";
        let holdings = HoldingsStore::parse(csv.as_bytes()).unwrap();
        assert_eq!(holdings[0].symbol, "AAPL");
        assert_eq!(holdings[0].quantity, 10.0);
        assert_eq!(holdings[0].purchase_price, 150.0);
        assert_eq!(holdings[0].sector_name, "Tech");
    }

    #[test]
    fn unknown_headers_fall_back_to_positions() {
        let csv = "A,B,C,D\nAAPL,10,150,Tech\n";
        let holdings = HoldingsStore::parse(csv.as_bytes()).unwrap();
        assert_eq!(holdings[0].symbol, "AAPL");
        assert_eq!(holdings[0].sector_name, "Tech");
    }

    #[test]
    fn header_only_is_no_holdings() {
        let err = HoldingsStore::parse("Symbol,Quantity,Purchase Price,Sector\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, CoreError::NoHoldings));
    }

    #[test]
    fn empty_input_is_no_holdings() {
        let err = HoldingsStore::parse("".as_bytes()).unwrap_err();
        assert!(matches!(err, CoreError::NoHoldings));
    }

    #[test]
    fn all_rows_invalid_is_no_holdings() {
        let csv = "Symbol,Quantity,Purchase Price,Sector\n,1,1,Tech\nAAPL,0,1,Tech\n";
        let err = HoldingsStore::parse(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CoreError::NoHoldings));
    }

    #[test]
    fn load_from_file() {
        let file = csv_file(SAMPLE);
        let store = HoldingsStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 3);
        assert!(!store.is_empty());
    }

    #[test]
    fn load_missing_file_is_file_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HoldingsStore::load(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, CoreError::FileIO(_)));
    }

    #[test]
    fn symbols_are_distinct_in_file_order() {
        let csv = "\
Symbol,Quantity,Purchase Price,Sector
MSFT,1,1,Tech
AAPL,1,1,Tech
MSFT,2,2,Tech
";
        let store = HoldingsStore::load(csv_file(csv).path()).unwrap();
        assert_eq!(store.symbols(), vec!["MSFT".to_string(), "AAPL".to_string()]);
        assert_eq!(store.holdings().len(), 3);
    }

    #[test]
    fn holdings_by_symbols_is_case_insensitive() {
        let store = HoldingsStore::load(csv_file(SAMPLE).path()).unwrap();
        let picked = store.holdings_by_symbols(&["jpm".to_string(), "AAPL".to_string()]);
        let symbols: Vec<&str> = picked.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "JPM"]);
    }

    #[test]
    fn reload_picks_up_file_changes() {
        let file = csv_file(SAMPLE);
        let store = HoldingsStore::load(file.path()).unwrap();

        std::fs::write(
            file.path(),
            "Symbol,Quantity,Purchase Price,Sector\nWMT,3,80,Retail\n",
        )
        .unwrap();

        assert_eq!(store.reload().unwrap(), 1);
        assert_eq!(store.symbols(), vec!["WMT".to_string()]);
    }

    #[test]
    fn failed_reload_keeps_previous_holdings() {
        let file = csv_file(SAMPLE);
        let store = HoldingsStore::load(file.path()).unwrap();

        std::fs::write(file.path(), "Symbol,Quantity,Purchase Price,Sector\n").unwrap();

        assert!(matches!(store.reload(), Err(CoreError::NoHoldings)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn reload_without_backing_file_errors() {
        let store =
            HoldingsStore::from_holdings(vec![Holding::new("h", "AAPL", 1.0, 1.0, "Tech")])
                .unwrap();
        assert!(matches!(store.reload(), Err(CoreError::HoldingsSource(_))));
    }

    #[test]
    fn from_holdings_drops_invalid() {
        let store = HoldingsStore::from_holdings(vec![
            Holding::new("h0", "AAPL", 1.0, 1.0, "Tech"),
            Holding::new("h1", "", 1.0, 1.0, "Tech"),
            Holding::new("h2", "MSFT", 0.0, 1.0, "Tech"),
        ])
        .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn from_holdings_rejects_empty() {
        assert!(matches!(
            HoldingsStore::from_holdings(vec![]),
            Err(CoreError::NoHoldings)
        ));
    }
}
