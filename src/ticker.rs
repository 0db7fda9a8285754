use std::time::{Duration, Instant};

/// Frame period for `fps` frames per second, in floating point so every
/// rate above one still gets a non-zero period.
pub fn frame_period(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / fps.max(1) as f64)
}

/// Paces a loop to a target rate measured from the start of each tick, so the
/// time spent doing work counts against the period.
#[derive(Debug, Default)]
pub struct FrameTicker {
    last_tick: Option<Instant>,
}

impl FrameTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining(&self, now: Instant, fps: u32) -> Duration {
        match self.last_tick {
            Some(last) => (last + frame_period(fps)).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    pub fn wait(&mut self, fps: u32) {
        let remaining = self.remaining(Instant::now(), fps);
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
        self.last_tick = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periods_use_floating_point() {
        assert_eq!(frame_period(1), Duration::from_secs(1));
        assert_eq!(frame_period(30).as_micros(), 33_333);
        assert_eq!(frame_period(60).as_micros(), 16_666);
        assert_eq!(frame_period(0), Duration::from_secs(1));
    }

    #[test]
    fn first_tick_does_not_wait() {
        let ticker = FrameTicker::new();
        assert_eq!(ticker.remaining(Instant::now(), 60), Duration::ZERO);
    }

    #[test]
    fn remaining_counts_down_from_last_tick() {
        let start = Instant::now();
        let ticker = FrameTicker {
            last_tick: Some(start),
        };
        assert_eq!(ticker.remaining(start, 1), Duration::from_secs(1));
        assert_eq!(
            ticker.remaining(start + Duration::from_millis(400), 1),
            Duration::from_millis(600)
        );
        assert_eq!(
            ticker.remaining(start + Duration::from_secs(2), 1),
            Duration::ZERO
        );
    }

    #[test]
    fn wait_paces_consecutive_ticks() {
        let mut ticker = FrameTicker::new();
        ticker.wait(50);
        let start = Instant::now();
        ticker.wait(50);
        assert!(start.elapsed() >= Duration::from_millis(15));
    }
}
