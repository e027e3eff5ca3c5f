//! Risk assessment over registered strategies.

use chrono::{Duration, Utc};
use dashmap::DashMap;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use data_pipeline::DataPipeline;
use pool_core::config::AnalysisConfig;
use pool_core::stats;
use pool_core::types::{
    AlertType, AnomalyEvent, AnomalyKind, MarketSample, PoolSnapshot, RiskAlert, Strategy,
};
use pool_core::{EventBus, MarketEvent};

use crate::alert_log::AlertLog;
use crate::thresholds::{calculate_severity, RiskThresholds};

/// Evaluates registered strategies whenever fresh data arrives and raises
/// alerts on threshold breaches.
///
/// Checks never throw for data-shape reasons: a missing registration,
/// missing data, or a malformed field makes the affected check a no-op so
/// one bad cycle cannot halt future cycles.
pub struct RiskManager {
    pipeline: Arc<DataPipeline>,
    bus: Arc<EventBus>,
    /// Window of buffered samples the strategy drawdown check looks at.
    strategy_window: Duration,
    strategies: DashMap<String, Strategy>,
    thresholds: DashMap<String, RiskThresholds>,
    alerts: AlertLog,
    /// Per-pool guards serializing assessments: at most one in-flight
    /// cycle per pool, while distinct pools assess independently.
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl RiskManager {
    pub fn new(config: &AnalysisConfig, pipeline: Arc<DataPipeline>, bus: Arc<EventBus>) -> Self {
        Self {
            pipeline,
            bus,
            strategy_window: Duration::hours(config.volatility_window_hours),
            strategies: DashMap::new(),
            thresholds: DashMap::new(),
            alerts: AlertLog::new(),
            in_flight: DashMap::new(),
        }
    }

    /// Register a strategy for a pool and derive its thresholds from the
    /// strategy's risk level. Re-registering replaces both.
    pub fn register_strategy(&self, pool_id: &str, strategy: Strategy) {
        let thresholds = RiskThresholds::for_risk_level(strategy.risk_level);
        info!(
            pool_id,
            strategy = %strategy.name,
            risk_level = ?strategy.risk_level,
            "Registered strategy"
        );
        self.strategies.insert(pool_id.to_string(), strategy);
        self.thresholds.insert(pool_id.to_string(), thresholds);
    }

    pub fn registered_strategy(&self, pool_id: &str) -> Option<Strategy> {
        self.strategies.get(pool_id).map(|s| s.clone())
    }

    pub fn thresholds_for(&self, pool_id: &str) -> Option<RiskThresholds> {
        self.thresholds.get(pool_id).map(|t| *t)
    }

    /// Run the market, strategy and liquidity checks for a pool.
    ///
    /// Silent no-op when the pool has no registered strategy or no
    /// buffered data yet.
    pub async fn assess_risk(&self, pool_id: &str) {
        let guard = self
            .in_flight
            .entry(pool_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _held = guard.lock().await;

        let Some(strategy) = self.registered_strategy(pool_id) else {
            debug!(pool_id, "No registered strategy, skipping assessment");
            return;
        };
        let Some(thresholds) = self.thresholds_for(pool_id) else {
            return;
        };
        let Some(latest) = self.pipeline.latest(pool_id) else {
            debug!(pool_id, "No data yet, skipping assessment");
            return;
        };

        self.check_market_risk(pool_id, &latest.sample, &thresholds);
        self.check_strategy_risk(pool_id, &strategy, &thresholds);
        if let Err(e) = self.check_liquidity_risk(pool_id, &latest.snapshot, &thresholds) {
            // Malformed pool data fails only this check; the cycle
            // already completed the others.
            warn!(pool_id, error = %e, "Liquidity check skipped");
        }
    }

    fn check_market_risk(
        &self,
        pool_id: &str,
        sample: &MarketSample,
        thresholds: &RiskThresholds,
    ) {
        if sample.volatility > thresholds.max_volatility {
            self.create_alert(RiskAlert::new(
                AlertType::Market,
                calculate_severity(sample.volatility, thresholds.max_volatility),
                format!("High market volatility detected for pool {pool_id}"),
                Utc::now(),
                json!({
                    "volatility": sample.volatility,
                    "threshold": thresholds.max_volatility,
                }),
            ));
        }
    }

    fn check_strategy_risk(
        &self,
        pool_id: &str,
        strategy: &Strategy,
        thresholds: &RiskThresholds,
    ) {
        let history = self.pipeline.history(pool_id, self.strategy_window);
        let prices: Vec<f64> = history.iter().map(|p| p.sample.price).collect();
        let returns = stats::simple_returns(&prices);
        let drawdown = stats::max_drawdown(&returns);

        if drawdown > thresholds.max_drawdown {
            self.create_alert(RiskAlert::new(
                AlertType::Strategy,
                calculate_severity(drawdown, thresholds.max_drawdown),
                format!("Strategy drawdown exceeded threshold for pool {pool_id}"),
                Utc::now(),
                json!({
                    "drawdown": drawdown,
                    "threshold": thresholds.max_drawdown,
                    "strategy": strategy.name,
                }),
            ));
        }
    }

    fn check_liquidity_risk(
        &self,
        pool_id: &str,
        snapshot: &PoolSnapshot,
        thresholds: &RiskThresholds,
    ) -> pool_core::Result<()> {
        let liquidity = snapshot.total_supply_value()?;
        if liquidity < thresholds.min_liquidity {
            self.create_alert(RiskAlert::new(
                AlertType::Liquidity,
                calculate_severity(thresholds.min_liquidity - liquidity, thresholds.min_liquidity),
                format!("Low liquidity detected for pool {pool_id}"),
                Utc::now(),
                json!({
                    "liquidity": liquidity,
                    "threshold": thresholds.min_liquidity,
                }),
            ));
        }
        Ok(())
    }

    /// Translate an upstream anomaly into an alert, passing its severity
    /// through unchanged.
    pub fn handle_anomaly(&self, anomaly: &AnomalyEvent) {
        let alert_type = match anomaly.kind {
            AnomalyKind::PriceChange => AlertType::Market,
            _ => AlertType::Liquidity,
        };
        self.create_alert(RiskAlert::new(
            alert_type,
            anomaly.severity,
            format!(
                "Anomaly detected: {} in pool {}",
                anomaly.kind.as_str(),
                anomaly.pool_id
            ),
            Utc::now(),
            anomaly.details.clone(),
        ));
    }

    /// Alerts raised within the last 24 hours.
    pub fn active_alerts(&self) -> Vec<RiskAlert> {
        self.alerts.active()
    }

    /// Everything within the 7-day retention window.
    pub fn all_alerts(&self) -> Vec<RiskAlert> {
        self.alerts.all()
    }

    fn create_alert(&self, alert: RiskAlert) {
        warn!(
            alert_type = ?alert.alert_type,
            severity = ?alert.severity,
            message = %alert.message,
            "Risk alert"
        );
        self.alerts.insert(alert.clone());
        self.bus.publish(MarketEvent::RiskAlert(alert));
    }

    /// Subscribe to the event bus and drive assessments from it: each
    /// `DataUpdated` triggers `assess_risk` for its pool, each
    /// `AnomalyDetected` is translated into an alert. Returns the handle
    /// of the spawned forwarding task.
    pub fn attach(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let mut rx = self.bus.subscribe();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(MarketEvent::DataUpdated { pool_id, .. }) => {
                        self.assess_risk(&pool_id).await;
                    }
                    Ok(MarketEvent::AnomalyDetected(anomaly)) => {
                        self.handle_anomaly(&anomaly);
                    }
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Risk manager lagged behind the event bus");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pool_core::config::PipelineConfig;
    use pool_core::types::{RiskLevel, Severity};
    use rust_decimal::Decimal;

    fn setup() -> (Arc<DataPipeline>, Arc<EventBus>, RiskManager) {
        let bus = Arc::new(EventBus::default());
        let pipeline = Arc::new(DataPipeline::new(PipelineConfig::default(), bus.clone()));
        let manager = RiskManager::new(&AnalysisConfig::default(), pipeline.clone(), bus.clone());
        (pipeline, bus, manager)
    }

    fn snapshot(total_supply: &str) -> PoolSnapshot {
        PoolSnapshot {
            address: "0xpool".to_string(),
            token0: "WETH".to_string(),
            token1: "USDC".to_string(),
            reserve0: Decimal::new(1000, 0),
            reserve1: Decimal::new(2_000_000, 0),
            fee: 0.003,
            total_supply: total_supply.to_string(),
        }
    }

    fn sample(price: f64, volatility: f64) -> MarketSample {
        MarketSample::new(Utc::now(), price).with_volatility(volatility)
    }

    fn alerts_of(manager: &RiskManager, alert_type: AlertType) -> Vec<RiskAlert> {
        manager
            .all_alerts()
            .into_iter()
            .filter(|a| a.alert_type == alert_type)
            .collect()
    }

    #[tokio::test]
    async fn test_market_volatility_alert() {
        let (pipeline, _bus, manager) = setup();
        manager.register_strategy(
            "0xpool",
            Strategy::momentum("mom", RiskLevel::Medium, 0.05, -0.05, 0.5),
        );

        // 0.25 volatility against the medium cap of 0.20: ratio 1.25.
        pipeline.ingest("0xpool", sample(100.0, 0.25), snapshot("1000000"));
        manager.assess_risk("0xpool").await;

        let market = alerts_of(&manager, AlertType::Market);
        assert_eq!(market.len(), 1);
        assert_eq!(market[0].severity, Severity::Medium);
        assert_eq!(market[0].details["threshold"], 0.20);
    }

    #[tokio::test]
    async fn test_volatility_within_threshold_is_quiet() {
        let (pipeline, _bus, manager) = setup();
        manager.register_strategy(
            "0xpool",
            Strategy::momentum("mom", RiskLevel::Medium, 0.05, -0.05, 0.5),
        );

        pipeline.ingest("0xpool", sample(100.0, 0.15), snapshot("1000000"));
        manager.assess_risk("0xpool").await;

        assert!(alerts_of(&manager, AlertType::Market).is_empty());
    }

    #[tokio::test]
    async fn test_liquidity_alert_severity() {
        let (pipeline, _bus, manager) = setup();
        manager.register_strategy(
            "0xpool",
            Strategy::momentum("mom", RiskLevel::High, 0.05, -0.05, 0.5),
        );

        // High risk level means min liquidity 100k; supply of 50k leaves
        // a shortfall ratio of 0.5, which grades low.
        pipeline.ingest("0xpool", sample(100.0, 0.0), snapshot("50000"));
        manager.assess_risk("0xpool").await;

        let liquidity = alerts_of(&manager, AlertType::Liquidity);
        assert_eq!(liquidity.len(), 1);
        assert_eq!(liquidity[0].severity, Severity::Low);
        assert_eq!(liquidity[0].details["liquidity"], 50_000.0);
    }

    #[tokio::test]
    async fn test_strategy_drawdown_alert() {
        let (pipeline, _bus, manager) = setup();
        manager.register_strategy(
            "0xpool",
            Strategy::momentum("mom", RiskLevel::Medium, 0.05, -0.05, 0.5),
        );

        // 100 -> 120 -> 90 within the 24h window: the compounded curve
        // peaks at 1.2 and falls to 0.9, a 25% drawdown against the 10%
        // medium cap.
        for price in [100.0, 120.0, 90.0] {
            pipeline.ingest("0xpool", sample(price, 0.0), snapshot("1000000"));
        }
        manager.assess_risk("0xpool").await;

        let strategy = alerts_of(&manager, AlertType::Strategy);
        assert_eq!(strategy.len(), 1);
        assert_eq!(strategy[0].severity, Severity::High);
        assert_eq!(strategy[0].details["strategy"], "mom");
    }

    #[tokio::test]
    async fn test_strategy_window_comes_from_config() {
        let bus = Arc::new(EventBus::default());
        let pipeline = Arc::new(DataPipeline::new(PipelineConfig::default(), bus.clone()));
        let config = AnalysisConfig {
            volatility_window_hours: 1,
            ..AnalysisConfig::default()
        };
        let manager = RiskManager::new(&config, pipeline.clone(), bus.clone());
        manager.register_strategy(
            "0xpool",
            Strategy::momentum("mom", RiskLevel::Medium, 0.05, -0.05, 0.5),
        );

        // A deep drop two hours ago, flat since. With a one-hour window
        // the drop is out of scope and no drawdown alert fires.
        let now = Utc::now();
        for (hours_ago, price) in [(3, 100.0), (2, 60.0), (0, 60.0)] {
            let sample = MarketSample::new(now - Duration::hours(hours_ago), price);
            pipeline.ingest("0xpool", sample, snapshot("1000000"));
        }
        manager.assess_risk("0xpool").await;

        assert!(alerts_of(&manager, AlertType::Strategy).is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_pool_is_a_no_op() {
        let (pipeline, _bus, manager) = setup();
        pipeline.ingest("0xpool", sample(100.0, 0.9), snapshot("1"));
        manager.assess_risk("0xpool").await;
        assert!(manager.all_alerts().is_empty());
    }

    #[tokio::test]
    async fn test_no_data_is_a_no_op() {
        let (_pipeline, _bus, manager) = setup();
        manager.register_strategy(
            "0xpool",
            Strategy::momentum("mom", RiskLevel::Low, 0.05, -0.05, 0.5),
        );
        manager.assess_risk("0xpool").await;
        assert!(manager.all_alerts().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_supply_fails_only_liquidity_check() {
        let (pipeline, _bus, manager) = setup();
        manager.register_strategy(
            "0xpool",
            Strategy::momentum("mom", RiskLevel::Medium, 0.05, -0.05, 0.5),
        );

        pipeline.ingest("0xpool", sample(100.0, 0.35), snapshot("not-a-number"));
        manager.assess_risk("0xpool").await;

        // Market check still fired; the liquidity check was skipped.
        assert_eq!(alerts_of(&manager, AlertType::Market).len(), 1);
        assert!(alerts_of(&manager, AlertType::Liquidity).is_empty());
    }

    #[tokio::test]
    async fn test_reregistration_replaces_thresholds() {
        let (_pipeline, _bus, manager) = setup();
        manager.register_strategy(
            "0xpool",
            Strategy::momentum("mom", RiskLevel::Low, 0.05, -0.05, 0.5),
        );
        assert_eq!(manager.thresholds_for("0xpool").unwrap().min_liquidity, 500_000.0);

        manager.register_strategy(
            "0xpool",
            Strategy::momentum("mom2", RiskLevel::High, 0.05, -0.05, 0.5),
        );
        assert_eq!(manager.thresholds_for("0xpool").unwrap().min_liquidity, 100_000.0);
        assert_eq!(manager.registered_strategy("0xpool").unwrap().name, "mom2");
    }

    #[tokio::test]
    async fn test_anomaly_translation() {
        let (_pipeline, _bus, manager) = setup();

        manager.handle_anomaly(&AnomalyEvent {
            kind: AnomalyKind::PriceChange,
            pool_id: "0xpool".to_string(),
            severity: Severity::High,
            details: json!({"price_change": 0.3}),
        });
        manager.handle_anomaly(&AnomalyEvent {
            kind: AnomalyKind::LiquidityChange,
            pool_id: "0xpool".to_string(),
            severity: Severity::Medium,
            details: json!({"liquidity_change": 0.2}),
        });

        let market = alerts_of(&manager, AlertType::Market);
        assert_eq!(market.len(), 1);
        // Upstream severity passes through unchanged.
        assert_eq!(market[0].severity, Severity::High);

        let liquidity = alerts_of(&manager, AlertType::Liquidity);
        assert_eq!(liquidity.len(), 1);
        assert_eq!(liquidity[0].severity, Severity::Medium);
    }

    #[tokio::test]
    async fn test_alerts_publish_on_bus() {
        let (_pipeline, bus, manager) = setup();
        let mut rx = bus.subscribe();

        manager.handle_anomaly(&AnomalyEvent {
            kind: AnomalyKind::PriceChange,
            pool_id: "0xpool".to_string(),
            severity: Severity::Low,
            details: json!({}),
        });

        match rx.recv().await.unwrap() {
            MarketEvent::RiskAlert(alert) => assert_eq!(alert.alert_type, AlertType::Market),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
