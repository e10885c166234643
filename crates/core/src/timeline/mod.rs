use std::{
    cell::Cell,
    rc::Rc,
    time::{Duration, Instant},
};

use crate::{NeoZoneError, Result};

/// Time source for the animation scheduler.
pub trait Clock {
    /// Time elapsed since an arbitrary, fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::start()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock. Clones share the same time, so a caller can keep a
/// handle after giving one to an [`Animator`].
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    elapsed: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, delta: Duration) {
        self.elapsed.set(self.elapsed.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.elapsed.get()
    }
}

/// Advances animation progress and reports it back synchronously.
pub trait AnimationScheduler {
    /// Starts a looping animation for `slot` with a period of
    /// `duration_units` time units. Restarting a slot resets its progress.
    fn start(&mut self, slot: usize, duration_units: u16) -> Result<()>;

    fn stop_all(&mut self);

    /// Most animations that can run at once.
    fn capacity(&self) -> usize;

    fn active_count(&self) -> usize;

    fn is_animating(&self) -> bool {
        self.active_count() > 0
    }

    /// Calls `on_progress(slot, progress)` once per running animation.
    fn tick(&mut self, on_progress: &mut dyn FnMut(usize, f32));
}

#[derive(Debug, Clone)]
struct ActiveAnimation {
    slot: usize,
    period: Duration,
    started: Duration,
}

/// Bounded, clock-driven [`AnimationScheduler`].
#[derive(Debug)]
pub struct Animator<C: Clock> {
    clock: C,
    capacity: usize,
    timescale: Duration,
    active: Vec<ActiveAnimation>,
}

impl<C: Clock> Animator<C> {
    pub fn new(clock: C, capacity: usize, timescale: Duration) -> Self {
        Self {
            clock,
            capacity,
            timescale,
            active: Vec::with_capacity(capacity),
        }
    }
}

impl<C: Clock> AnimationScheduler for Animator<C> {
    fn start(&mut self, slot: usize, duration_units: u16) -> Result<()> {
        let period = self.timescale * u32::from(duration_units.max(1));
        let started = self.clock.now();

        if let Some(existing) = self.active.iter_mut().find(|a| a.slot == slot) {
            existing.period = period;
            existing.started = started;
            return Ok(());
        }
        if self.active.len() >= self.capacity {
            return Err(NeoZoneError::Capacity(self.capacity));
        }
        self.active.push(ActiveAnimation {
            slot,
            period,
            started,
        });
        Ok(())
    }

    fn stop_all(&mut self) {
        self.active.clear();
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn active_count(&self) -> usize {
        self.active.len()
    }

    fn tick(&mut self, on_progress: &mut dyn FnMut(usize, f32)) {
        let now = self.clock.now();
        for animation in &self.active {
            let period = animation.period.as_nanos().max(1);
            let elapsed = now.saturating_sub(animation.started).as_nanos();
            let progress = (elapsed % period) as f64 / period as f64;
            on_progress(animation.slot, progress as f32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(animator: &mut Animator<ManualClock>) -> Vec<(usize, f32)> {
        let mut seen = Vec::new();
        animator.tick(&mut |slot: usize, progress: f32| seen.push((slot, progress)));
        seen
    }

    #[test]
    fn progress_loops_over_the_period() {
        let clock = ManualClock::new();
        let mut animator = Animator::new(clock.clone(), 4, Duration::from_millis(100));
        animator.start(3, 10).unwrap();

        clock.advance(Duration::from_millis(250));
        assert_eq!(collect(&mut animator), vec![(3, 0.25)]);

        clock.advance(Duration::from_millis(1000));
        assert_eq!(collect(&mut animator), vec![(3, 0.25)]);
    }

    #[test]
    fn zero_duration_counts_as_one_unit() {
        let clock = ManualClock::new();
        let mut animator = Animator::new(clock.clone(), 1, Duration::from_millis(100));
        animator.start(0, 0).unwrap();
        clock.advance(Duration::from_millis(50));
        assert_eq!(collect(&mut animator), vec![(0, 0.5)]);
    }

    #[test]
    fn enforces_capacity_but_allows_restart() {
        let mut animator = Animator::new(ManualClock::new(), 1, Duration::from_millis(100));
        animator.start(0, 5).unwrap();
        animator.start(0, 8).unwrap();
        let err = animator.start(1, 5).unwrap_err();
        assert!(matches!(err, NeoZoneError::Capacity(1)));

        animator.stop_all();
        assert!(!animator.is_animating());
        animator.start(1, 5).unwrap();
        assert_eq!(animator.active_count(), 1);
        assert_eq!(animator.capacity(), 1);
    }
}
