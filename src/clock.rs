//! Time sources used by the cache (age tracking) and the dispatcher
//! (settle/power-on delays). Abstracted so the test suite can assert on the
//! *shape* of the timing (which delays happened, in what order) without a
//! single test actually blocking for 1.2 seconds.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A monotonic clock. `RealClock` wraps `Instant`; `FakeClock` is advanced
/// explicitly by tests.
pub trait Clock {
  fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealClock;

impl Clock for RealClock {
  fn now(&self) -> Instant {
    Instant::now()
  }
}

/// A clock tests can advance deterministically. Starts at an arbitrary but
/// fixed `Instant` and only moves forward when `advance` is called.
#[derive(Clone)]
pub struct FakeClock {
  base: Instant,
  offset: Rc<RefCell<Duration>>,
}

impl FakeClock {
  pub fn new() -> Self {
    FakeClock {
      base: Instant::now(),
      offset: Rc::new(RefCell::new(Duration::from_secs(0))),
    }
  }

  pub fn advance(&self, by: Duration) {
    *self.offset.borrow_mut() += by;
  }
}

impl Clock for FakeClock {
  fn now(&self) -> Instant {
    self.base + *self.offset.borrow()
  }
}

/// Something that can sleep. `ThreadSleeper` calls `std::thread::sleep`;
/// `RecordingSleeper` just appends the requested duration to a shared log,
/// letting tests assert the engine asked for a 500 ms band-change settle or
/// the 1.2 s power-on gap without ever actually waiting.
pub trait Sleeper {
  fn sleep(&self, d: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
  fn sleep(&self, d: Duration) {
    std::thread::sleep(d);
  }
}

#[derive(Clone, Default)]
pub struct RecordingSleeper {
  pub log: Rc<RefCell<Vec<Duration>>>,
}

impl RecordingSleeper {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn durations(&self) -> Vec<Duration> {
    self.log.borrow().clone()
  }
}

impl Sleeper for RecordingSleeper {
  fn sleep(&self, d: Duration) {
    self.log.borrow_mut().push(d);
  }
}
