//! Data Pipeline
//!
//! Buffers pushed market observations per pool, trims them to a retention
//! window, and flags anomalies between consecutive observations. The
//! pipeline performs no scheduling of its own: an external collector calls
//! [`DataPipeline::ingest`] whenever fresh data lands, and downstream
//! consumers either poll the buffer views or subscribe to the event bus.

use chrono::{DateTime, Duration, Utc};
use dashmap::{DashMap, DashSet};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

use pool_core::config::PipelineConfig;
use pool_core::types::{AnomalyEvent, AnomalyKind, DataPoint, MarketSample, PoolSnapshot, Severity};
use pool_core::{EventBus, MarketEvent};

/// Price move between consecutive points that counts as an anomaly.
const PRICE_CHANGE_THRESHOLD: f64 = 0.10;
/// Price move that escalates the anomaly to high severity.
const PRICE_CHANGE_HIGH: f64 = 0.20;
/// Total-supply move between consecutive points that counts as an anomaly.
const LIQUIDITY_CHANGE_THRESHOLD: f64 = 0.15;
/// Total-supply move that escalates the anomaly to high severity.
const LIQUIDITY_CHANGE_HIGH: f64 = 0.25;

/// Per-pool observation buffer with anomaly detection.
pub struct DataPipeline {
    config: PipelineConfig,
    bus: Arc<EventBus>,
    buffers: DashMap<String, Vec<DataPoint>>,
    monitored: DashSet<String>,
}

impl DataPipeline {
    pub fn new(config: PipelineConfig, bus: Arc<EventBus>) -> Self {
        Self {
            config,
            bus,
            buffers: DashMap::new(),
            monitored: DashSet::new(),
        }
    }

    /// Mark a pool as monitored. Returns false if it already was.
    pub fn start_monitoring(&self, pool_id: &str) -> bool {
        if !self.monitored.insert(pool_id.to_string()) {
            return false;
        }
        info!(pool_id, "Started monitoring pool");
        self.bus.publish(MarketEvent::MonitoringStarted {
            pool_id: pool_id.to_string(),
        });
        true
    }

    /// Remove a pool from the monitored set. Its buffer is kept so that
    /// historical queries keep working.
    pub fn stop_monitoring(&self, pool_id: &str) {
        if self.monitored.remove(pool_id).is_some() {
            info!(pool_id, "Stopped monitoring pool");
            self.bus.publish(MarketEvent::MonitoringStopped {
                pool_id: pool_id.to_string(),
            });
        }
    }

    pub fn is_monitoring(&self, pool_id: &str) -> bool {
        self.monitored.contains(pool_id)
    }

    /// Preload a pool's buffer with already-fetched history. Publishes no
    /// events; used when monitoring starts on a pool with a known past.
    pub fn seed(&self, pool_id: &str, mut points: Vec<DataPoint>) {
        points.sort_by_key(|p| p.timestamp);
        debug!(pool_id, points = points.len(), "Seeded pool buffer");
        self.buffers.insert(pool_id.to_string(), points);
    }

    /// Buffer a fresh observation, trim the retention window, publish
    /// `DataUpdated`, then run anomaly detection against the previous
    /// point.
    pub fn ingest(&self, pool_id: &str, sample: MarketSample, snapshot: PoolSnapshot) {
        self.ingest_at(pool_id, sample, snapshot, Utc::now());
    }

    fn ingest_at(
        &self,
        pool_id: &str,
        sample: MarketSample,
        snapshot: PoolSnapshot,
        now: DateTime<Utc>,
    ) {
        let point = DataPoint::new(sample, snapshot);
        let cutoff = now - Duration::days(self.config.retention_days);
        let previous = {
            let mut buffer = self.buffers.entry(pool_id.to_string()).or_default();
            let previous = buffer.last().cloned();
            buffer.push(point.clone());
            buffer.retain(|p| p.timestamp >= cutoff);
            previous
        };

        self.bus.publish(MarketEvent::DataUpdated {
            pool_id: pool_id.to_string(),
            point: point.clone(),
        });

        // A point that just aged out of the retention window is no longer
        // a neighbour; detection only compares retained points.
        if let Some(previous) = previous.filter(|p| p.timestamp >= cutoff) {
            self.detect_anomalies(pool_id, &previous, &point);
        }
    }

    /// Most recent observation for a pool.
    pub fn latest(&self, pool_id: &str) -> Option<DataPoint> {
        self.buffers.get(pool_id).and_then(|b| b.last().cloned())
    }

    /// Observations within the trailing `window`, oldest first.
    pub fn history(&self, pool_id: &str, window: Duration) -> Vec<DataPoint> {
        self.history_at(pool_id, window, Utc::now())
    }

    fn history_at(&self, pool_id: &str, window: Duration, now: DateTime<Utc>) -> Vec<DataPoint> {
        let cutoff = now - window;
        self.buffers
            .get(pool_id)
            .map(|buffer| {
                buffer
                    .iter()
                    .filter(|p| p.timestamp >= cutoff)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn detect_anomalies(&self, pool_id: &str, previous: &DataPoint, current: &DataPoint) {
        let price_change =
            (current.sample.price - previous.sample.price).abs() / previous.sample.price;
        if price_change > PRICE_CHANGE_THRESHOLD {
            let severity = if price_change > PRICE_CHANGE_HIGH {
                Severity::High
            } else {
                Severity::Medium
            };
            warn!(pool_id, price_change, ?severity, "Price anomaly detected");
            self.bus.publish(MarketEvent::AnomalyDetected(AnomalyEvent {
                kind: AnomalyKind::PriceChange,
                pool_id: pool_id.to_string(),
                severity,
                details: json!({
                    "price_change": price_change,
                    "timestamp": current.timestamp,
                }),
            }));
        }

        // Supply strings come straight off the wire; skip the comparison
        // rather than fail the whole ingest when one is malformed.
        let supplies = previous
            .snapshot
            .total_supply_value()
            .and_then(|prev| current.snapshot.total_supply_value().map(|cur| (prev, cur)));
        let (prev_supply, cur_supply) = match supplies {
            Ok(pair) => pair,
            Err(e) => {
                warn!(pool_id, error = %e, "Skipping liquidity anomaly check");
                return;
            }
        };

        let liquidity_change = (cur_supply - prev_supply).abs() / prev_supply;
        if liquidity_change > LIQUIDITY_CHANGE_THRESHOLD {
            let severity = if liquidity_change > LIQUIDITY_CHANGE_HIGH {
                Severity::High
            } else {
                Severity::Medium
            };
            warn!(pool_id, liquidity_change, ?severity, "Liquidity anomaly detected");
            self.bus.publish(MarketEvent::AnomalyDetected(AnomalyEvent {
                kind: AnomalyKind::LiquidityChange,
                pool_id: pool_id.to_string(),
                severity,
                details: json!({
                    "liquidity_change": liquidity_change,
                    "timestamp": current.timestamp,
                }),
            }));
        }
    }
}
