//! Prometheus metrics for Minos

use std::sync::{LazyLock, Once};

use olympus_common::{FaultKind, Side, Verdict};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Verdict counter by exercise and verdict
pub static VERDICT_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    let opts = Opts::new("harness_verdict_total", "Total verdicts by exercise and type");
    IntCounterVec::new(opts, &["exercise", "verdict"]).expect("Failed to create counter")
});

/// Candidate faults by kind
pub static CANDIDATE_FAULTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    let opts = Opts::new("harness_candidate_faults_total", "Candidate panics and timeouts");
    IntCounterVec::new(opts, &["kind"]).expect("Failed to create counter")
});

/// Invocation duration histogram
pub static INVOCATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        "harness_invocation_duration_seconds",
        "Time spent inside reference and candidate invocations",
    )
    .buckets(vec![0.0001, 0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 10.0]);

    HistogramVec::new(opts, &["side"]).expect("Failed to create histogram")
});

static INIT: Once = Once::new();

/// Register all metrics with [`REGISTRY`]; later calls are no-ops
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(VERDICT_TOTAL.clone()))
            .expect("Failed to register metric");
        REGISTRY
            .register(Box::new(CANDIDATE_FAULTS.clone()))
            .expect("Failed to register metric");
        REGISTRY
            .register(Box::new(INVOCATION_DURATION.clone()))
            .expect("Failed to register metric");
    });
}

/// Record a verdict
pub fn record_verdict(exercise: &str, verdict: Verdict) {
    VERDICT_TOTAL
        .with_label_values(&[exercise, verdict.as_str()])
        .inc();
}

/// Record a candidate fault
pub fn record_fault(kind: FaultKind) {
    let kind = kind.to_string();
    CANDIDATE_FAULTS.with_label_values(&[kind.as_str()]).inc();
}

/// Record how long one side took
pub fn record_invocation(side: Side, duration_secs: f64) {
    let side = side.to_string();
    INVOCATION_DURATION
        .with_label_values(&[side.as_str()])
        .observe(duration_secs);
}

/// Render all registered metrics in the Prometheus text format
pub fn render() -> String {
    init_metrics();
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
