use std::thread;
use std::time::Duration;

use embedded_hal::blocking::delay::DelayMs;

/// Sleeps the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayMs<u32> for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn sleeps_at_least_the_delay() {
        let start = Instant::now();
        StdDelay.delay_ms(20);
        StdDelay.delay_ms(0);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
