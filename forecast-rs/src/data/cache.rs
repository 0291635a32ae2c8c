//! In-memory fetch cache keyed by (symbol, start, end)

use crate::data::{CandleSeries, HistoryQuery, MarketDataProvider};
use crate::Result;
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

struct CachedHistory {
    fetched_at: Instant,
    series: CandleSeries,
}

/// Wraps a provider with a bounded LRU cache whose entries expire after `ttl`
pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<LruCache<HistoryQuery, CachedHistory>>,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    /// Create a cache holding at most `capacity` histories (minimum 1)
    pub fn new(inner: P, capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            ttl,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<HistoryQuery, CachedHistory>> {
        // A poisoned lock only means a panic mid-insert; the map itself is still usable
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lookup(&self, query: &HistoryQuery) -> Option<CandleSeries> {
        let mut entries = self.lock();
        let expired = match entries.get(query) {
            Some(hit) if hit.fetched_at.elapsed() < self.ttl => return Some(hit.series.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            debug!(symbol = %query.symbol, "Cache entry expired");
            entries.pop(query);
        }
        None
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, query: &HistoryQuery) -> Result<CandleSeries> {
        if let Some(series) = self.lookup(query) {
            debug!(symbol = %query.symbol, rows = series.len(), "Cache hit");
            return Ok(series);
        }

        let series = self.inner.fetch(query).await?;
        self.lock().put(
            query.clone(),
            CachedHistory {
                fetched_at: Instant::now(),
                series: series.clone(),
            },
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Candle;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MarketDataProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch(&self, query: &HistoryQuery) -> Result<CandleSeries> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let candle = Candle::new(query.start, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0);
            Ok(CandleSeries::from_vec(query.symbol.clone(), vec![candle]))
        }
    }

    fn query(symbol: &str) -> HistoryQuery {
        HistoryQuery::new(
            symbol,
            NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
        )
        .unwrap()
    }

    fn provider() -> CountingProvider {
        CountingProvider {
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn test_repeat_fetch_hits_cache() {
        let cache = CachedProvider::new(provider(), 4, Duration::from_secs(60));
        cache.fetch(&query("AAPL")).await.unwrap();
        cache.fetch(&query("AAPL")).await.unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_refetched() {
        let cache = CachedProvider::new(provider(), 4, Duration::ZERO);
        cache.fetch(&query("AAPL")).await.unwrap();
        cache.fetch(&query("AAPL")).await.unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recent() {
        let cache = CachedProvider::new(provider(), 2, Duration::from_secs(60));
        cache.fetch(&query("AAPL")).await.unwrap();
        cache.fetch(&query("MSFT")).await.unwrap();
        cache.fetch(&query("GOOG")).await.unwrap();
        assert_eq!(cache.len(), 2);
        cache.fetch(&query("AAPL")).await.unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 4);
    }
}
