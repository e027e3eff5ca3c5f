//! Publish/subscribe event bus connecting the pipeline, risk manager and
//! any external alert sinks.
//!
//! Explicitly constructed and passed by handle; components that want
//! events subscribe for a receiver rather than inheriting broadcast
//! behavior. Slow subscribers lag and drop the oldest events.

use tokio::sync::broadcast;

use crate::types::{AnomalyEvent, DataPoint, RiskAlert};

/// Events published on the bus.
#[derive(Debug, Clone)]
pub enum MarketEvent {
    /// A new observation was buffered for a pool.
    DataUpdated { pool_id: String, point: DataPoint },
    /// The pipeline's detector flagged an anomaly.
    AnomalyDetected(AnomalyEvent),
    /// A pool entered the monitored set.
    MonitoringStarted { pool_id: String },
    /// A pool left the monitored set.
    MonitoringStopped { pool_id: String },
    /// The risk manager raised an alert.
    RiskAlert(RiskAlert),
}

/// Broadcast bus for [`MarketEvent`]s.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<MarketEvent>,
}

impl EventBus {
    /// Create a bus that buffers up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Returns the number of subscribers that received
    /// it; zero when nobody is listening, which is not an error.
    pub fn publish(&self, event: MarketEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
