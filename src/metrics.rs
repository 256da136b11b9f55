//! Worker prometheus metrics.

use flowrunner_core_types::RunStatus;
use lazy_static::lazy_static;
use prometheus::{
    core::Collector, opts, Encoder, IntCounter, IntCounterVec, IntGauge, Registry, TextEncoder,
};
use tracing::error;

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
    static ref EXECUTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        opts!(
            "flowrunner_executions_total",
            "Finished executions grouped by terminal status"
        ),
        &["status"]
    )
    .unwrap();
    static ref STEPS_TOTAL: IntCounterVec = IntCounterVec::new(
        opts!(
            "flowrunner_steps_total",
            "Recorded step results grouped by status"
        ),
        &["status"]
    )
    .unwrap();
    static ref CANCEL_REQUESTS_TOTAL: IntCounter = IntCounter::new(
        "flowrunner_cancel_requests_total",
        "Cancellation requests received",
    )
    .unwrap();
    static ref ACTIVE_SESSIONS: IntGauge = IntGauge::new(
        "flowrunner_active_sessions",
        "Browser sessions currently held by executions",
    )
    .unwrap();
}

fn register<C>(collector: C)
where
    C: Collector + Clone + Send + Sync + 'static,
{
    if let Err(err) = REGISTRY.register(Box::new(collector.clone())) {
        if !matches!(err, prometheus::Error::AlreadyReg) {
            error!(?err, "failed to register worker metric");
        }
    }
}

pub fn register_metrics() {
    register(EXECUTIONS_TOTAL.clone());
    register(STEPS_TOTAL.clone());
    register(CANCEL_REQUESTS_TOTAL.clone());
    register(ACTIVE_SESSIONS.clone());
}

pub fn record_execution(status: RunStatus) {
    EXECUTIONS_TOTAL
        .with_label_values(&[&status.to_string()])
        .inc();
}

pub fn record_step(status: RunStatus) {
    STEPS_TOTAL.with_label_values(&[&status.to_string()]).inc();
}

pub fn record_cancel_request() {
    CANCEL_REQUESTS_TOTAL.inc();
}

pub fn set_active_sessions(count: usize) {
    ACTIVE_SESSIONS.set(count as i64);
}

/// Text exposition of every registered metric.
pub fn encode() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_appear_in_the_exposition() {
        register_metrics();
        record_execution(RunStatus::Completed);
        record_step(RunStatus::Failed);
        set_active_sessions(2);

        let body = encode().expect("encode metrics");
        assert!(body.contains("flowrunner_executions_total"));
        assert!(body.contains("flowrunner_steps_total"));
        assert!(body.contains("flowrunner_active_sessions 2"));
    }
}
