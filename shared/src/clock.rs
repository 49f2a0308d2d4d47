use std::time::Instant;

/// A monotonic source of seconds.
///
/// Only differences between readings matter; the epoch is arbitrary and
/// differs between client & host, which is exactly the offset being
/// estimated.
pub trait Clock {
    fn now(&self) -> f64;
}

/// `Clock` backed by `std::time::Instant`, counting from its creation
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}
