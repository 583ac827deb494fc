use std::time::{Duration, Instant};

/// Source of elapsed animation time in seconds.
pub trait TimeSource {
    fn elapsed_secs(&self) -> f32;
}

/// Monotonic wall clock started at construction. Never reset.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { start }
    }

    /// Elapsed seconds at `now`; zero if `now` precedes the start.
    pub fn elapsed_at(&self, now: Instant) -> f32 {
        now.saturating_duration_since(self.start).as_secs_f32()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for Clock {
    fn elapsed_secs(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Clock that advances by a fixed step per tick, for headless frame loops.
#[derive(Debug, Clone, Copy)]
pub struct FixedStepClock {
    step: Duration,
    ticks: u64,
}

impl FixedStepClock {
    pub fn new(step: Duration) -> Self {
        Self { step, ticks: 0 }
    }

    /// Clock stepping at `fps` frames per second.
    pub fn from_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / fps.max(1) as f64))
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick(&mut self) {
        self.ticks += 1;
    }
}

impl TimeSource for FixedStepClock {
    fn elapsed_secs(&self) -> f32 {
        (self.step.as_secs_f64() * self.ticks as f64) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_clock_is_monotonic() {
        let clock = Clock::new();
        let a = clock.elapsed_secs();
        let b = clock.elapsed_secs();
        assert!(b >= a);
        assert!(a >= 0.0);
    }

    #[test]
    fn elapsed_at_measures_from_start() {
        let start = Instant::now();
        let clock = Clock::starting_at(start);
        let later = start + Duration::from_millis(1500);
        assert!((clock.elapsed_at(later) - 1.5).abs() < 1e-6);
        assert_eq!(clock.elapsed_at(start), 0.0);
    }

    #[test]
    fn fixed_step_advances_per_tick() {
        let mut clock = FixedStepClock::from_fps(60);
        assert_eq!(clock.elapsed_secs(), 0.0);
        for _ in 0..60 {
            clock.tick();
        }
        assert_eq!(clock.ticks(), 60);
        assert!((clock.elapsed_secs() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn zero_fps_is_treated_as_one() {
        let clock = FixedStepClock::from_fps(0);
        assert_eq!(clock.step(), Duration::from_secs(1));
    }
}
