use std::time::Duration;
use std::time::Instant;

/// Tracks the round deadline and reports what is left of it in whole ticks.
#[derive(Debug)]
pub struct Timer {
    timeout: Duration,
    tick: Duration,
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new(timeout: Duration, tick: Duration) -> Self {
        Self {
            timeout,
            tick,
            deadline: None,
        }
    }
    /// Starts a fresh full-length countdown from now.
    pub fn reset(&mut self) {
        self.deadline = Some(Instant::now() + self.timeout);
    }
    pub fn clear(&mut self) {
        self.deadline = None;
    }
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
    pub fn expired(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
    /// Remaining whole ticks, rounded up, so a fresh timer shows its full length.
    pub fn ticks(&self) -> u64 {
        let tick = self.tick.as_nanos().max(1);
        self.remaining()
            .map(|r| r.as_nanos().div_ceil(tick) as u64)
            .unwrap_or(0)
    }
    /// Remaining time as displayed: whole ticks back in time units.
    pub fn countdown(&self) -> Duration {
        self.tick.saturating_mul(self.ticks() as u32)
    }
    /// How long to sleep before the displayed value can next change.
    pub fn until_tick(&self) -> Duration {
        let tick = self.tick.as_nanos().max(1);
        self.remaining()
            .map(|r| r.as_nanos() % tick)
            .map(|n| Duration::from_nanos(n as u64))
            .filter(|d| !d.is_zero())
            .unwrap_or(self.tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn timer() -> Timer {
        Timer::new(Duration::from_secs(60), Duration::from_secs(1))
    }
    #[test]
    fn timer_starts_cleared() {
        let timer = timer();
        assert!(timer.deadline().is_none());
        assert!(!timer.expired());
        assert_eq!(timer.ticks(), 0);
    }
    #[test]
    fn timer_sets_deadline() {
        let mut timer = timer();
        timer.reset();
        assert!(timer.deadline().is_some());
        assert!(!timer.expired());
    }
    #[test]
    fn fresh_timer_shows_full_length() {
        let mut timer = timer();
        timer.reset();
        assert_eq!(timer.ticks(), 60);
        assert_eq!(timer.countdown(), Duration::from_secs(60));
    }
    #[test]
    fn timer_clears() {
        let mut timer = timer();
        timer.reset();
        timer.clear();
        assert!(timer.deadline().is_none());
    }
    #[test]
    fn short_timer_expires() {
        let mut timer = Timer::new(Duration::from_millis(5), Duration::from_millis(1));
        timer.reset();
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.expired());
        assert_eq!(timer.ticks(), 0);
        assert_eq!(timer.remaining(), Some(Duration::ZERO));
    }
    #[test]
    fn sleeps_at_most_one_tick() {
        let mut timer = timer();
        assert_eq!(timer.until_tick(), Duration::from_secs(1));
        timer.reset();
        assert!(timer.until_tick() <= Duration::from_secs(1));
    }
}
