//! Host time adapter.
//!
//! Backs the [`Clock`] port with `std::time::Instant`. The millisecond
//! count is truncated to `u32`, so it wraps exactly like the free-running
//! hardware tick it stands in for — callers must already be wrap-safe.

use crate::app::ports::Clock;

/// Monotonic host clock.
pub struct HostClock {
    start: std::time::Instant,
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for HostClock {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    fn sleep_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_advances_the_tick() {
        let mut clock = HostClock::new();
        let before = clock.now_ms();
        clock.sleep_ms(5);
        assert!(clock.now_ms() >= before + 5);
    }
}
