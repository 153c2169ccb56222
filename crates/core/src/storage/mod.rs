pub mod holdings_store;
pub mod price_cache;
