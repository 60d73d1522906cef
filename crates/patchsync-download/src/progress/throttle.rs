//! Progress throttling.
//!
//! Validation and download progress can tick thousands of times per pass;
//! the throttle keeps log output to a readable rate while never dropping
//! the final update.

use std::time::{Duration, Instant};

/// Rate-limiter for progress log lines.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    last_emit: Option<Instant>,
    min_interval: Duration,
}

impl ProgressThrottle {
    /// Create a throttle with the given minimum spacing.
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            last_emit: None,
            min_interval,
        }
    }

    /// One line per second.
    pub const fn default_interval() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Whether an update observed now should be emitted.
    pub fn should_emit(&mut self, is_final: bool) -> bool {
        self.permit(Instant::now(), is_final)
    }

    /// Whether an update observed at `now` should be emitted.
    ///
    /// The first update and the final update always pass.
    pub fn permit(&mut self, now: Instant, is_final: bool) -> bool {
        let due = match self.last_emit {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.min_interval,
        };
        if due || is_final {
            self.last_emit = Some(now);
        }
        due || is_final
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::default_interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_passes() {
        let mut throttle = ProgressThrottle::new(Duration::from_millis(100));
        assert!(throttle.permit(Instant::now(), false));
    }

    #[test]
    fn updates_inside_interval_are_dropped() {
        let start = Instant::now();
        let mut throttle = ProgressThrottle::new(Duration::from_millis(100));

        assert!(throttle.permit(start, false));
        assert!(!throttle.permit(start + Duration::from_millis(40), false));
        assert!(throttle.permit(start + Duration::from_millis(100), false));
        assert!(!throttle.permit(start + Duration::from_millis(150), false));
    }

    #[test]
    fn final_update_always_passes() {
        let start = Instant::now();
        let mut throttle = ProgressThrottle::new(Duration::from_secs(60));

        assert!(throttle.permit(start, false));
        assert!(throttle.permit(start + Duration::from_millis(1), true));
    }
}
