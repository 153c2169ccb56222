pub mod traits;

// Source adapters
pub mod fallback;
pub mod google_finance;
pub mod yahoo_finance;
