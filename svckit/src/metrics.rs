use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec, TextEncoder,
};

lazy_static! {
    pub static ref API_FETCH_DURATION: HistogramVec = register_histogram_vec!(
        "api_fetch_duration_seconds",
        "Remote API fetch duration in seconds",
        &["endpoint", "status"]
    ).unwrap();

    pub static ref API_FETCH_COUNTER: IntCounterVec = register_int_counter_vec!(
        "api_fetch_total",
        "Total number of remote API fetches",
        &["endpoint", "status"]
    ).unwrap();
}

pub fn record_fetch(endpoint: &str, success: bool, duration: f64) {
    let status = if success { "success" } else { "failure" };
    API_FETCH_DURATION
        .with_label_values(&[endpoint, status])
        .observe(duration);
    API_FETCH_COUNTER
        .with_label_values(&[endpoint, status])
        .inc();
}

/// Fetch totals read back from the default registry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FetchSummary {
    pub succeeded: u64,
    pub failed: u64,
    pub mean_seconds: f64,
}

impl FetchSummary {
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed
    }
}

pub fn fetch_summary() -> FetchSummary {
    let mut summary = FetchSummary::default();
    let mut duration_sum = 0.0;
    let mut duration_count = 0u64;

    for family in prometheus::gather() {
        match family.get_name() {
            "api_fetch_total" => {
                for metric in family.get_metric() {
                    let count = metric.get_counter().get_value() as u64;
                    let failed = metric
                        .get_label()
                        .iter()
                        .any(|l| l.get_name() == "status" && l.get_value() == "failure");
                    if failed {
                        summary.failed += count;
                    } else {
                        summary.succeeded += count;
                    }
                }
            }
            "api_fetch_duration_seconds" => {
                for metric in family.get_metric() {
                    let histogram = metric.get_histogram();
                    duration_sum += histogram.get_sample_sum();
                    duration_count += histogram.get_sample_count();
                }
            }
            _ => {}
        }
    }

    if duration_count > 0 {
        summary.mean_seconds = duration_sum / duration_count as f64;
    }
    summary
}

/// Prometheus text exposition of every registered metric.
pub fn render_text() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        return format!("# failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_fetch_counts_by_status() {
        record_fetch("/test-endpoint", true, 0.01);
        record_fetch("/test-endpoint", false, 0.02);
        record_fetch("/test-endpoint", false, 0.02);

        let ok = API_FETCH_COUNTER.with_label_values(&["/test-endpoint", "success"]).get();
        let failed = API_FETCH_COUNTER.with_label_values(&["/test-endpoint", "failure"]).get();
        assert_eq!(ok, 1);
        assert_eq!(failed, 2);
    }

    #[test]
    fn test_fetch_summary_reads_registry() {
        let before = fetch_summary();
        record_fetch("/summary-endpoint", true, 0.5);
        record_fetch("/summary-endpoint", false, 1.5);
        let after = fetch_summary();

        assert!(after.succeeded >= before.succeeded + 1);
        assert!(after.failed >= before.failed + 1);
        assert!(after.total() >= 2);
        assert!(after.mean_seconds > 0.0);

        let text = render_text();
        assert!(text.contains("api_fetch_total"));
        assert!(text.contains("endpoint=\"/summary-endpoint\""));
    }
}
