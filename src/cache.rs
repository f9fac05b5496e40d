//! C6: short-lived in-memory last-known state per VFO with age-based
//! invalidation (spec §3 Cache, §4.6).

use std::time::{Duration, Instant};

use crate::clock::{Clock, RealClock};
use crate::codec::mode::Mode;
use crate::vfo::Vfo;

/// Default cache freshness window (spec §6).
pub const DEFAULT_TTL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VfoState {
  pub freq: u64,
  pub mode: Mode,
  pub width: u32,
}

#[derive(Debug, Clone, Copy)]
struct Stamped<T> {
  value: T,
  at: Instant,
}

#[derive(Debug, Default, Clone, Copy)]
struct VfoRow {
  freq: Option<Stamped<u64>>,
  mode: Option<Stamped<Mode>>,
  width: Option<Stamped<u32>>,
}

/// The per-Rig cache. One row of `(freq, mode, width)` per addressable VFO,
/// plus PTT/split/raw-IF slots with their own timestamps (spec §3).
pub struct Cache<C: Clock = RealClock> {
  ttl: Duration,
  rows: [VfoRow; 7],
  ptt: Option<Stamped<bool>>,
  split: Option<Stamped<(bool, Vfo)>>,
  raw_if: Option<Stamped<String>>,
  clock: C,
}

fn row_index(vfo: Vfo) -> usize {
  Vfo::ADDRESSABLE
    .iter()
    .position(|v| *v == vfo)
    .unwrap_or_else(|| panic!("cache only addresses concrete VFOs, got {:?}", vfo))
}

impl Cache<RealClock> {
  pub fn new() -> Self {
    Cache::with_clock(DEFAULT_TTL, RealClock)
  }

  pub fn with_ttl(ttl: Duration) -> Self {
    Cache::with_clock(ttl, RealClock)
  }
}

impl<C: Clock> Cache<C> {
  pub fn with_clock(ttl: Duration, clock: C) -> Self {
    Cache {
      ttl,
      rows: Default::default(),
      ptt: None,
      split: None,
      raw_if: None,
      clock,
    }
  }

  fn fresh<T: Copy>(&self, s: &Option<Stamped<T>>) -> Option<(T, Duration)> {
    s.as_ref().and_then(|s| {
      let age = self.clock.now().saturating_duration_since(s.at);
      if age < self.ttl {
        Some((s.value, age))
      } else {
        None
      }
    })
  }

  pub fn read_freq(&self, vfo: Vfo) -> Option<(u64, Duration)> {
    self.fresh(&self.rows[row_index(vfo)].freq)
  }

  pub fn read_mode(&self, vfo: Vfo) -> Option<(Mode, Duration)> {
    self.fresh(&self.rows[row_index(vfo)].mode)
  }

  pub fn read_width(&self, vfo: Vfo) -> Option<(u32, Duration)> {
    self.fresh(&self.rows[row_index(vfo)].width)
  }

  pub fn read_ptt(&self) -> Option<(bool, Duration)> {
    self.fresh(&self.ptt)
  }

  pub fn read_split(&self) -> Option<((bool, Vfo), Duration)> {
    self.fresh(&self.split)
  }

  pub fn read_raw_if(&self) -> Option<(String, Duration)> {
    self.fresh(&self.raw_if)
  }

  /// Writes a new frequency for `vfo`. If `band_of(new) != band_of(old)`
  /// the caller is responsible for calling `invalidate_all` first (the
  /// dispatcher knows the band table; the cache does not).
  pub fn write_freq(&mut self, vfo: Vfo, freq: u64) {
    let at = self.clock.now();
    self.rows[row_index(vfo)].freq = Some(Stamped { value: freq, at });
  }

  /// Writes mode for `vfo`. Per spec §4.6: invalidates only the mode/width
  /// pair of that VFO — it never touches frequency or other VFOs.
  pub fn write_mode(&mut self, vfo: Vfo, mode: Mode) {
    self.invalidate_mode_width(vfo);
    let at = self.clock.now();
    self.rows[row_index(vfo)].mode = Some(Stamped { value: mode, at });
  }

  pub fn write_width(&mut self, vfo: Vfo, width: u32) {
    let at = self.clock.now();
    self.rows[row_index(vfo)].width = Some(Stamped { value: width, at });
  }

  pub fn write_ptt(&mut self, ptt: bool) {
    self.ptt = Some(Stamped {
      value: ptt,
      at: self.clock.now(),
    });
  }

  pub fn write_split(&mut self, active: bool, tx_vfo: Vfo) {
    self.split = Some(Stamped {
      value: (active, tx_vfo),
      at: self.clock.now(),
    });
  }

  pub fn write_raw_if(&mut self, frame: String) {
    self.raw_if = Some(Stamped {
      value: frame,
      at: self.clock.now(),
    });
  }

  pub fn invalidate_raw_if(&mut self) {
    self.raw_if = None;
  }

  /// Invalidates only the `(mode, width)` pair of `vfo`, leaving frequency
  /// intact — used when a command derives mode/width state but cannot have
  /// changed frequency.
  pub fn invalidate_mode_width(&mut self, vfo: Vfo) {
    let row = &mut self.rows[row_index(vfo)];
    row.mode = None;
    row.width = None;
  }

  /// Invalidates every row: used on band changes and on power-off (spec
  /// §4.6, §7 "a failed set leaves the cache entry invalidated").
  pub fn invalidate_all(&mut self) {
    self.rows = Default::default();
    self.ptt = None;
    self.split = None;
    self.raw_if = None;
  }

  /// Invalidates just the row for `vfo` (all of freq/mode/width).
  pub fn invalidate_vfo(&mut self, vfo: Vfo) {
    self.rows[row_index(vfo)] = VfoRow::default();
  }
}

impl Default for Cache<RealClock> {
  fn default() -> Self {
    Cache::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clock::FakeClock;
  use std::time::Duration;

  #[test]
  fn read_after_write_returns_written_value() {
    let mut c = Cache::with_clock(DEFAULT_TTL, FakeClock::new());
    c.write_freq(Vfo::MainA, 14_074_000);
    assert_eq!(c.read_freq(Vfo::MainA).unwrap().0, 14_074_000);
  }

  #[test]
  fn second_write_wins() {
    let mut c = Cache::with_clock(DEFAULT_TTL, FakeClock::new());
    c.write_freq(Vfo::MainA, 1);
    c.write_freq(Vfo::MainA, 2);
    assert_eq!(c.read_freq(Vfo::MainA).unwrap().0, 2);
  }

  #[test]
  fn stale_entry_is_not_returned() {
    let clock = FakeClock::new();
    let mut c = Cache::with_clock(DEFAULT_TTL, clock.clone());
    c.write_freq(Vfo::MainA, 14_074_000);
    clock.advance(Duration::from_millis(501));
    assert!(c.read_freq(Vfo::MainA).is_none());
  }

  #[test]
  fn age_is_monotonic_absent_intervening_write() {
    let clock = FakeClock::new();
    let mut c = Cache::with_clock(DEFAULT_TTL, clock.clone());
    c.write_freq(Vfo::MainA, 1);
    let (_, age1) = c.read_freq(Vfo::MainA).unwrap();
    clock.advance(Duration::from_millis(10));
    let (_, age2) = c.read_freq(Vfo::MainA).unwrap();
    assert!(age2 >= age1);
  }

  #[test]
  fn mode_write_invalidates_width_but_not_freq() {
    let mut c = Cache::with_clock(DEFAULT_TTL, FakeClock::new());
    c.write_freq(Vfo::MainA, 14_074_000);
    c.write_width(Vfo::MainA, 2400);
    c.write_mode(Vfo::MainA, Mode::Usb);
    assert_eq!(c.read_freq(Vfo::MainA).unwrap().0, 14_074_000);
    assert!(c.read_width(Vfo::MainA).is_none());
  }

  #[test]
  fn invalidate_all_clears_every_row() {
    let mut c = Cache::with_clock(DEFAULT_TTL, FakeClock::new());
    c.write_freq(Vfo::MainA, 1);
    c.write_freq(Vfo::MainB, 2);
    c.write_ptt(true);
    c.invalidate_all();
    assert!(c.read_freq(Vfo::MainA).is_none());
    assert!(c.read_freq(Vfo::MainB).is_none());
    assert!(c.read_ptt().is_none());
  }
}
