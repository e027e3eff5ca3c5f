//! Historical data source seam.
//!
//! The backtester consumes closed historical series through this trait; a
//! real collector (REST, database, archive node) plugs in behind it. Only
//! an in-memory implementation ships here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use pool_core::types::MarketSample;

/// Provider of time-ordered historical market samples.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoricalDataSource: Send + Sync {
    /// Fetch samples for a pool within `[start, end]`, ascending by
    /// timestamp.
    async fn fetch_historical(
        &self,
        pool_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<MarketSample>>;
}

/// In-memory data source for tests and offline runs.
#[derive(Default)]
pub struct InMemoryHistory {
    series: DashMap<String, Vec<MarketSample>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a pool's full series. Samples are sorted on insert so reads
    /// always come back time-ordered.
    pub fn insert(&self, pool_id: &str, mut samples: Vec<MarketSample>) {
        samples.sort_by_key(|s| s.timestamp);
        self.series.insert(pool_id.to_string(), samples);
    }
}

#[async_trait]
impl HistoricalDataSource for InMemoryHistory {
    async fn fetch_historical(
        &self,
        pool_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<MarketSample>> {
        Ok(self
            .series
            .get(pool_id)
            .map(|samples| {
                samples
                    .iter()
                    .filter(|s| s.timestamp >= start && s.timestamp <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
