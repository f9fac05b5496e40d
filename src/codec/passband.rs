//! Passband / filter width staircase (spec §4.4 "Passband / filter width").

use crate::codec::mode::Mode;
use crate::error::{Error, Result};

/// Sentinel meaning "leave width untouched" — used when a `set_mode` call
/// should not disturb the current filter.
pub const PASSBAND_NO_CHANGE: u32 = u32::MAX;

/// One mode's sorted `(width_hz, wire_index)` staircase, plus whether this
/// mode's entries are considered "narrow" on this rig (spec §4.4: "a
/// dialect-specific narrow flag must be set consistently").
#[derive(Debug, Clone)]
pub struct PassbandStaircase {
  steps: Vec<(u32, u8)>,
  narrow_threshold_index: usize,
}

impl PassbandStaircase {
  /// `steps` must be sorted ascending by width; `narrow_threshold_index` is
  /// the first index considered "narrow" (commonly the midpoint).
  pub fn new(steps: Vec<(u32, u8)>, narrow_threshold_index: usize) -> Self {
    debug_assert!(
      steps.windows(2).all(|w| w[0].0 < w[1].0),
      "passband steps must be strictly ascending"
    );
    PassbandStaircase {
      steps,
      narrow_threshold_index,
    }
  }

  /// Picks the first entry >= `requested`, per spec. Returns `Invalid` if
  /// `requested` exceeds every supported width.
  pub fn encode(&self, requested: u32) -> Result<(u32, u8)> {
    self
      .steps
      .iter()
      .find(|(w, _)| *w >= requested)
      .copied()
      .ok_or(Error::Invalid {
        cmd: "SH",
        reason: format!("no supported passband >= {} Hz", requested),
      })
  }

  pub fn decode(&self, wire_index: u8) -> Result<u32> {
    self
      .steps
      .iter()
      .find(|(_, idx)| *idx == wire_index)
      .map(|(w, _)| *w)
      .ok_or(Error::Protocol {
        cmd: "SH".to_string(),
        reason: format!("unrecognized passband index {}", wire_index),
      })
  }

  /// True if `wire_index` falls in the narrow half of the staircase.
  pub fn is_narrow(&self, wire_index: u8) -> bool {
    self
      .steps
      .iter()
      .position(|(_, idx)| *idx == wire_index)
      .map(|pos| pos >= self.narrow_threshold_index)
      .unwrap_or(false)
  }
}

/// Per-mode staircase table. Modes absent from the map have no adjustable
/// width (e.g. FM on some rigs is fixed).
#[derive(Debug, Clone, Default)]
pub struct PassbandTable {
  by_mode: std::collections::HashMap<Mode, PassbandStaircase>,
}

impl PassbandTable {
  pub fn new() -> Self {
    PassbandTable::default()
  }

  pub fn with(mut self, mode: Mode, staircase: PassbandStaircase) -> Self {
    self.by_mode.insert(mode, staircase);
    self
  }

  pub fn encode(&self, mode: Mode, requested: u32) -> Result<(u32, u8)> {
    self
      .by_mode
      .get(&mode)
      .ok_or(Error::Invalid {
        cmd: "SH",
        reason: format!("mode {:?} has no adjustable passband on this rig", mode),
      })?
      .encode(requested)
  }

  pub fn decode(&self, mode: Mode, wire_index: u8) -> Result<u32> {
    self
      .by_mode
      .get(&mode)
      .ok_or(Error::Protocol {
        cmd: "SH".to_string(),
        reason: format!("mode {:?} has no adjustable passband on this rig", mode),
      })?
      .decode(wire_index)
  }

  pub fn is_narrow(&self, mode: Mode, wire_index: u8) -> bool {
    self
      .by_mode
      .get(&mode)
      .map(|s| s.is_narrow(wire_index))
      .unwrap_or(false)
  }
}

/// FT-991-shaped SSB/CW staircase: 200 Hz .. 4000 Hz in the steps the radio
/// actually exposes via `SH`. Representative, not exhaustive.
pub fn ft991_ssb_cw_staircase() -> PassbandStaircase {
  PassbandStaircase::new(
    vec![
      (200, 0),
      (400, 1),
      (600, 2),
      (800, 3),
      (1000, 4),
      (1200, 5),
      (1400, 6),
      (1700, 7),
      (2000, 8),
      (2400, 9),
      (3000, 10),
      (3200, 11),
      (3500, 12),
      (4000, 13),
    ],
    0,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encode_picks_smallest_supported_width_ge_requested() {
    let s = ft991_ssb_cw_staircase();
    let (w, _) = s.encode(900).unwrap();
    assert_eq!(w, 1000);
  }

  #[test]
  fn round_trip_decode_of_encode_returns_same_width() {
    let s = ft991_ssb_cw_staircase();
    for requested in [150, 250, 1234, 3999] {
      let (w, idx) = s.encode(requested).unwrap();
      assert_eq!(s.decode(idx).unwrap(), w);
      assert!(w >= requested);
    }
  }

  #[test]
  fn requested_wider_than_max_is_invalid() {
    let s = ft991_ssb_cw_staircase();
    assert!(s.encode(10_000).is_err());
  }
}
