use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use cinesync_shared::Clock;

/// Shared "wall" time of a simulation, in seconds. Cloning shares the same
/// time source.
#[derive(Clone, Debug, Default)]
pub struct SimulatedTime {
    bits: Arc<AtomicU64>,
}

impl SimulatedTime {
    pub fn new(start: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start.to_bits())),
        }
    }

    pub fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }

    pub fn set(&self, seconds: f64) {
        self.bits.store(seconds.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

/// A peer's clock: simulated time shifted by a fixed offset
#[derive(Clone, Debug)]
pub struct SimClock {
    time: SimulatedTime,
    offset: f64,
}

impl SimClock {
    pub fn new(time: &SimulatedTime, offset: f64) -> Self {
        Self {
            time: time.clone(),
            offset,
        }
    }
}

impl Clock for SimClock {
    fn now(&self) -> f64 {
        self.time.now() + self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clocks_share_time_and_keep_their_offset() {
        let time = SimulatedTime::new(1.0);
        let local = SimClock::new(&time, 0.0);
        let host = SimClock::new(&time, 100.0);

        time.advance(0.5);
        assert_eq!(local.now(), 1.5);
        assert_eq!(host.now(), 101.5);
    }
}
