use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use crate::error::{Error, Result};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Source metrics
    pub static ref SOURCE_CALLS: IntCounterVec = IntCounterVec::new(
        Opts::new("price_source_calls_total", "Price source calls by outcome"),
        &["source", "outcome"]
    ).expect("valid metric definition");

    pub static ref SOURCE_LATENCY: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "price_source_latency_seconds",
            "Wall-clock duration of a price source call"
        ).buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["source"]
    ).expect("valid metric definition");

    // Arbitration metrics
    pub static ref ARBITRATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("price_arbitrations_total", "Arbitration runs by outcome"),
        &["outcome"]
    ).expect("valid metric definition");
}

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(SOURCE_CALLS.clone()))
        .map_err(|e| Error::MetricsError(e.to_string()))?;
    REGISTRY.register(Box::new(SOURCE_LATENCY.clone()))
        .map_err(|e| Error::MetricsError(e.to_string()))?;
    REGISTRY.register(Box::new(ARBITRATIONS.clone()))
        .map_err(|e| Error::MetricsError(e.to_string()))?;
    Ok(())
}

pub fn record_source_call(source: &str, ok: bool, elapsed_secs: f64) {
    let outcome = if ok { "ok" } else { "error" };
    SOURCE_CALLS.with_label_values(&[source, outcome]).inc();
    SOURCE_LATENCY.with_label_values(&[source]).observe(elapsed_secs);
}

pub fn record_arbitration(outcome: &str) {
    ARBITRATIONS.with_label_values(&[outcome]).inc();
}
