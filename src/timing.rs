/// Human-readable timings for the "Loaded in" / "Searched in" labels
use std::time::{Duration, Instant};

const UNITS: [(&str, f64); 4] = [("mi", 60.0), (" s", 1.0), ("ms", 1e-3), ("us", 1e-6)];

/// Format a duration in seconds using the largest unit it exceeds.
pub fn natural_time(seconds: f64) -> String {
    let absolute = seconds.abs();

    for (label, size) in UNITS {
        if absolute > size {
            return format!("{:6.2} {}", seconds / size, label);
        }
    }

    format!("{:6.2} ns", seconds / 1e-9)
}

/// Measures the time since it was created
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_natural(&self) -> String {
        natural_time(self.elapsed().as_secs_f64())
    }
}
