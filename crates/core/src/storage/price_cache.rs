use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Duration;

use crate::clock::{Clock, SystemClock};
use crate::models::price::{CacheEntry, CacheStatEntry, CacheStats, PriceRecord};

/// How long a cached record stays usable.
pub const CACHE_TTL_MS: i64 = 15_000;

/// Time-bounded, in-memory map from symbol to the last fetched price record.
///
/// - `get` only returns entries younger than the TTL; stale entries behave
///   as absent even while they are still resident.
/// - `put` replaces the whole entry, so overlapping writers never leave a
///   partially updated record behind. The last completed write wins.
/// - `stats` is a diagnostic view and deliberately includes stale entries.
pub struct PriceCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for PriceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceCache")
            .field("entries", &self.len())
            .field("ttl_ms", &self.ttl.num_milliseconds())
            .finish()
    }
}

impl PriceCache {
    /// Cache with the default 15 second TTL on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(Duration::milliseconds(CACHE_TTL_MS), clock)
    }

    pub fn with_ttl(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh record for `symbol`, if any.
    pub fn get(&self, symbol: &str) -> Option<PriceRecord> {
        let now = self.clock.now();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(&symbol.to_uppercase())
            .filter(|entry| now - entry.stored_at < self.ttl)
            .map(|entry| entry.record.clone())
    }

    /// Store or overwrite the record for `symbol`, stamped with the current instant.
    pub fn put(&self, symbol: &str, record: PriceRecord) {
        let entry = CacheEntry {
            record,
            stored_at: self.clock.now(),
        };
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(symbol.to_uppercase(), entry);
    }

    /// Drop the entry for `symbol`. Returns whether one was resident.
    pub fn invalidate(&self, symbol: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(&symbol.to_uppercase()).is_some()
    }

    /// Drop every entry. Returns how many were resident.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let removed = entries.len();
        entries.clear();
        removed
    }

    /// Number of resident entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size and age of every resident entry, sorted by symbol.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());

        let mut symbols: Vec<CacheStatEntry> = entries
            .iter()
            .map(|(symbol, entry)| {
                let age_ms = (now - entry.stored_at).num_milliseconds();
                CacheStatEntry {
                    symbol: symbol.clone(),
                    cached_at: entry.stored_at,
                    age_seconds: (age_ms as f64 / 1000.0).round() as i64,
                }
            })
            .collect();
        symbols.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        CacheStats {
            cached_symbols: entries.len(),
            cache_duration_seconds: self.ttl.num_seconds().max(0) as u64,
            symbols,
        }
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new()
    }
}
