use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{info, warn};

/// Registration flow counters
#[derive(Debug, Default)]
pub struct FlowMetrics {
    pub transactions_started: AtomicU64,
    pub transactions_completed: AtomicU64,
    pub transactions_cancelled: AtomicU64,
    pub validation_failures: AtomicU64,
    pub gateway_failures: AtomicU64,
    pub critical_alerts: AtomicU64,
}

impl FlowMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_started(&self) {
        self.transactions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.transactions_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancelled(&self) {
        self.transactions_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_failure(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_gateway_failure(&self, gateway: &str) {
        self.gateway_failures.fetch_add(1, Ordering::Relaxed);
        warn!(gateway = gateway, "Gateway call failed");
    }

    pub fn record_critical_alert(&self) {
        self.critical_alerts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> FlowStats {
        FlowStats {
            transactions_started: self.transactions_started.load(Ordering::Relaxed),
            transactions_completed: self.transactions_completed.load(Ordering::Relaxed),
            transactions_cancelled: self.transactions_cancelled.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            gateway_failures: self.gateway_failures.load(Ordering::Relaxed),
            critical_alerts: self.critical_alerts.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Flow metrics: started={}, completed={}, cancelled={}, validation_failures={}, gateway_failures={}, alerts={}",
            stats.transactions_started,
            stats.transactions_completed,
            stats.transactions_cancelled,
            stats.validation_failures,
            stats.gateway_failures,
            stats.critical_alerts
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStats {
    pub transactions_started: u64,
    pub transactions_completed: u64,
    pub transactions_cancelled: u64,
    pub validation_failures: u64,
    pub gateway_failures: u64,
    pub critical_alerts: u64,
}

/// Global metrics instance
static FLOW_METRICS: std::sync::LazyLock<FlowMetrics> = std::sync::LazyLock::new(FlowMetrics::new);

pub fn flow_metrics() -> &'static FlowMetrics {
    &FLOW_METRICS
}

/// Span covering every message handled for one actor's transaction
pub fn create_transaction_span(actor: i64, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "transaction",
        actor.id = actor,
        correlation.id = correlation_id,
        step = tracing::field::Empty,
    )
}

/// Time an operation and log its duration
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis(),
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = FlowMetrics::new();
        metrics.record_started();
        metrics.record_started();
        metrics.record_cancelled();
        metrics.record_gateway_failure("record_store");

        let stats = metrics.get_stats();
        assert_eq!(stats.transactions_started, 2);
        assert_eq!(stats.transactions_cancelled, 1);
        assert_eq!(stats.gateway_failures, 1);
        assert_eq!(stats.transactions_completed, 0);
    }
}
