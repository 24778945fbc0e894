use std::time::Duration;

/// What the scheduler does between cycles.
pub trait Pacer {
    fn wait(&mut self);
}

/// Blocks for a fixed interval after every cycle. 50 ms gives roughly 20
/// classifications per second.
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

impl Pacer for FixedInterval {
    fn wait(&mut self) {
        if !self.interval.is_zero() {
            std::thread::sleep(self.interval);
        }
    }
}

/// Runs cycles back to back.
pub struct NoPacing;

impl Pacer for NoPacing {
    fn wait(&mut self) {}
}
