use hdrhistogram::Histogram;
use std::fmt;
use std::time::Instant;

/// Measures one region. Reading the elapsed time does not stop it.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

pub fn timer() -> Timer {
    Timer::start()
}

/// Run `f` and return its value with the elapsed milliseconds.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let t = Timer::start();
    let v = f();
    (v, t.elapsed_ms())
}

const MAX_RECORDED_US: u64 = 3_600_000_000;

/// Latency percentiles over a run of timed calls.
pub struct LatencySummary {
    hist: Histogram<u64>,
}

impl LatencySummary {
    pub fn new() -> Self {
        // 1 µs to one hour, 3 significant figures; longer samples clamp to an hour
        let hist = Histogram::<u64>::new_with_bounds(1, MAX_RECORDED_US, 3)
            .expect("constant histogram bounds are valid");
        Self { hist }
    }

    pub fn record(&mut self, elapsed_ms: f64) {
        let us = (elapsed_ms * 1000.0).round().max(0.0) as u64;
        self.hist.saturating_record(us);
    }

    pub fn count(&self) -> u64 {
        self.hist.len()
    }

    pub fn quantile_ms(&self, q: f64) -> f64 {
        self.hist.value_at_quantile(q) as f64 / 1000.0
    }

    pub fn max_ms(&self) -> f64 {
        self.hist.max() as f64 / 1000.0
    }
}

impl Default for LatencySummary {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LatencySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count() == 0 {
            return write!(f, "no calls timed");
        }
        write!(
            f,
            "{} calls, p50 {:.2} ms, p95 {:.2} ms, max {:.2} ms",
            self.count(),
            self.quantile_ms(0.50),
            self.quantile_ms(0.95),
            self.max_ms()
        )
    }
}
