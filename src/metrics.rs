//! Request metrics for the HTTP server: counts and latency percentiles.
//!
//! Counts cover the whole server lifetime; latency statistics cover the most
//! recent [`LATENCY_WINDOW`] served requests.

use std::collections::VecDeque;
use std::time::Duration;

/// Number of recent latencies kept for the average and percentiles.
pub const LATENCY_WINDOW: usize = 1024;

/// Collects runtime metrics for recommendation requests.
#[derive(Debug)]
pub struct MetricsCollector {
    latencies_us: VecDeque<f64>,
    window: usize,
    total_requests: u64,
    failed_requests: u64,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::with_window(LATENCY_WINDOW)
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collector that keeps the last `window` latencies (at least one).
    pub fn with_window(window: usize) -> Self {
        let window = window.max(1);
        Self {
            latencies_us: VecDeque::with_capacity(window),
            window,
            total_requests: 0,
            failed_requests: 0,
        }
    }

    /// Record a served request with its duration.
    pub fn record_request(&mut self, duration: Duration) {
        self.total_requests += 1;
        if self.latencies_us.len() == self.window {
            self.latencies_us.pop_front();
        }
        self.latencies_us.push_back(duration.as_micros() as f64);
    }

    /// Record a request rejected with an error.
    pub fn record_failure(&mut self) {
        self.total_requests += 1;
        self.failed_requests += 1;
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    pub fn failed_requests(&self) -> u64 {
        self.failed_requests
    }

    pub fn avg_latency_us(&self) -> f64 {
        if self.latencies_us.is_empty() {
            return 0.0;
        }
        self.latencies_us.iter().sum::<f64>() / self.latencies_us.len() as f64
    }

    /// Latency at a percentile of served requests (e.g. 50.0, 95.0, 99.0).
    pub fn percentile_latency_us(&self, percentile: f64) -> f64 {
        if self.latencies_us.is_empty() {
            return 0.0;
        }

        let mut sorted: Vec<f64> = self.latencies_us.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);

        let index = ((percentile / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[index.min(sorted.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut m = MetricsCollector::new();
        m.record_request(Duration::from_micros(10));
        m.record_failure();

        assert_eq!(m.total_requests(), 2);
        assert_eq!(m.failed_requests(), 1);
    }

    #[test]
    fn test_latency() {
        let mut m = MetricsCollector::new();
        m.record_request(Duration::from_micros(100));
        m.record_request(Duration::from_micros(300));
        m.record_request(Duration::from_micros(200));

        assert!((m.avg_latency_us() - 200.0).abs() < 1.0);
        assert!((m.percentile_latency_us(50.0) - 200.0).abs() < 1.0);
        assert!((m.percentile_latency_us(99.0) - 300.0).abs() < 1.0);
    }

    #[test]
    fn test_latency_window_is_bounded() {
        let mut m = MetricsCollector::with_window(4);
        for us in [1000, 1000, 10, 20, 30, 40] {
            m.record_request(Duration::from_micros(us));
        }

        assert_eq!(m.total_requests(), 6);
        assert_eq!(m.latencies_us.len(), 4);
        // The two oldest samples have been evicted
        assert!((m.avg_latency_us() - 25.0).abs() < 1e-9);
        assert!((m.percentile_latency_us(100.0) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_window() {
        let mut m = MetricsCollector::new();
        for _ in 0..LATENCY_WINDOW + 10 {
            m.record_request(Duration::from_micros(5));
        }
        assert_eq!(m.latencies_us.len(), LATENCY_WINDOW);
        assert_eq!(m.total_requests(), (LATENCY_WINDOW + 10) as u64);
    }

    #[test]
    fn test_empty() {
        let m = MetricsCollector::new();
        assert_eq!(m.avg_latency_us(), 0.0);
        assert_eq!(m.percentile_latency_us(99.0), 0.0);
    }
}
