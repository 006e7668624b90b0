//! Sources of wall-clock time.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// A source of the current time, in seconds since an arbitrary epoch.
pub trait TimeSource {
    /// Gets the current time in s.
    fn now(&self) -> f64;
}

/// Reads the system's monotonic clock.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    /// Creates a clock whose epoch is the current instant.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

/// A clock which only moves when told to.
///
/// Clones share the same time, so a test can keep one handle
/// and give another to the simulation.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    time: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Creates a clock starting at the given time.
    pub fn new(start: f64) -> Self {
        Self {
            time: Rc::new(Cell::new(start)),
        }
    }

    /// Moves the clock forward by `dt` seconds.
    pub fn advance(&self, dt: f64) {
        self.time.set(self.time.get() + dt);
    }

    /// Sets the current time.
    pub fn set(&self, time: f64) {
        self.time.set(time);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Tracks when a periodic task is next due.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PeriodicTimer {
    interval: f64,
    last: f64,
}

impl PeriodicTimer {
    pub fn new(interval: f64, now: f64) -> Self {
        Self {
            interval,
            last: now,
        }
    }

    /// Returns true if the interval has elapsed since the task last ran,
    /// and if so, restarts the interval.
    pub fn poll(&mut self, now: f64) -> bool {
        if now - self.last >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn manual_clock_is_shared() {
        let clock = ManualClock::new(5.0);
        let handle = clock.clone();
        handle.advance(2.5);
        assert_eq!(clock.now(), 7.5);
    }

    #[test]
    fn timer_fires_once_per_interval() {
        let mut timer = PeriodicTimer::new(10.0, 0.0);
        assert!(!timer.poll(9.9));
        assert!(timer.poll(10.0));
        assert!(!timer.poll(15.0));
        assert!(timer.poll(25.0));
    }
}
