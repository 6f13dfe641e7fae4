use super::GLOBAL_LABELS;
use crate::config::from_env_or_panic;
use metrics::{describe_counter, describe_histogram, Unit};
use serde::Deserialize;

/// Histogram buckets to measure the distribution of request durations in seconds.
/// Generation requests may take minutes, hence the long tail.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0,
];

#[derive(Deserialize)]
struct MetricsConfig {
    #[serde(default = "default_port")]
    port: u16,
}

fn default_port() -> u16 {
    2000
}

pub fn init_metrics() {
    let config: MetricsConfig = from_env_or_panic("METRICS_");

    let mut builder = metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.port))
        .set_buckets(DURATION_BUCKETS)
        .unwrap_or_else(|err| panic!("BUG: invalid histogram buckets: {err:#?}"));

    for (key, value) in GLOBAL_LABELS {
        builder = builder.add_global_label(*key, *value);
    }

    builder
        .install()
        .unwrap_or_else(|err| panic!("BUG: failed to initialize the metrics listener: {err:#?}"));

    describe_metrics();
}

fn describe_metrics() {
    describe_counter!(
        "tg_updates_total",
        "Number of telegram updates received by the bot"
    );
    describe_counter!(
        "quiz_pdfs_received_total",
        "Number of PDF documents accepted for quiz generation"
    );
    describe_counter!(
        "quiz_blocks_rejected_total",
        "Number of generated question blocks that failed to parse"
    );
    describe_counter!("quiz_polls_sent_total", "Number of quiz polls sent");
    describe_counter!(
        "quiz_polls_failed_total",
        "Number of quiz polls that telegram refused to send"
    );
    describe_histogram!(
        "http_request_duration_seconds",
        Unit::Seconds,
        "Duration of a single real http request. Retries appear as separate observations"
    );
    describe_histogram!(
        "http_request_effective_duration_seconds",
        Unit::Seconds,
        "Same as `http_request_duration_seconds` but includes the time spent on retries"
    );
}
