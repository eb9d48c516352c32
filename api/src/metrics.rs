use crate::errors::Result;
use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref REQUESTS_TOTAL: Counter = Counter::with_opts(Opts::new(
        "aqi_api_requests_total",
        "Total read requests served"
    ))
    .unwrap();
    pub static ref STORE_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "aqi_api_store_failures_total",
        "Total requests that failed on a store query"
    ))
    .unwrap();
    pub static ref NOT_FOUND_TOTAL: Counter = Counter::with_opts(Opts::new(
        "aqi_api_not_found_total",
        "Total requests for devices without readings"
    ))
    .unwrap();
    pub static ref INSUFFICIENT_DATA_TOTAL: Counter = Counter::with_opts(Opts::new(
        "aqi_api_insufficient_data_total",
        "Total hourly averages refused for too few samples"
    ))
    .unwrap();
    pub static ref REJECTED_ROWS_TOTAL: Counter = Counter::with_opts(Opts::new(
        "aqi_api_rejected_rows_total",
        "Total stored rows skipped because they failed validation"
    ))
    .unwrap();
    pub static ref STORE_QUERY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "aqi_api_store_query_seconds",
            "Time taken by reading store queries"
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0
        ])
    )
    .unwrap();
    pub static ref READINGS_FETCHED: Gauge = Gauge::with_opts(Opts::new(
        "aqi_api_readings_fetched",
        "Number of readings returned by the last store query"
    ))
    .unwrap();
}

pub fn init_metrics() -> Result<()> {
    REGISTRY.register(Box::new(REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STORE_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(NOT_FOUND_TOTAL.clone()))?;
    REGISTRY.register(Box::new(INSUFFICIENT_DATA_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REJECTED_ROWS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STORE_QUERY_SECONDS.clone()))?;
    REGISTRY.register(Box::new(READINGS_FETCHED.clone()))?;
    Ok(())
}

pub fn gather_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
