//! Mode encoding (spec §4.4 "Mode encoding").

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
  Lsb,
  Usb,
  Cw,
  Fm,
  Am,
  Rtty,
  CwR,
  PktLsb,
  PktUsb,
  PktFm,
  AmN,
  FmN,
  C4fm,
  PktFmN,
  RttyR,
}

impl Mode {
  pub const ALL: [Mode; 15] = [
    Mode::Lsb,
    Mode::Usb,
    Mode::Cw,
    Mode::Fm,
    Mode::Am,
    Mode::Rtty,
    Mode::CwR,
    Mode::PktLsb,
    Mode::PktUsb,
    Mode::PktFm,
    Mode::AmN,
    Mode::FmN,
    Mode::C4fm,
    Mode::PktFmN,
    Mode::RttyR,
  ];
}

/// A dialect's mode table: a bijection between `Mode` and a one-character
/// wire code. Yaesu uses `0..9A..F`, Kenwood uses a distinct 0-15 index; both
/// are represented as `(Mode, char)` tables so the core round-trip logic
/// (`encode`/`decode`/property tests) is shared.
#[derive(Debug, Clone)]
pub struct ModeTable {
  entries: Vec<(Mode, char)>,
}

impl ModeTable {
  pub fn new(entries: Vec<(Mode, char)>) -> Self {
    ModeTable { entries }
  }

  pub fn encode(&self, mode: Mode) -> Result<char> {
    self
      .entries
      .iter()
      .find(|(m, _)| *m == mode)
      .map(|(_, c)| *c)
      .ok_or(Error::Invalid {
        cmd: "MD",
        reason: format!("mode {:?} is not supported on this rig", mode),
      })
  }

  pub fn decode(&self, wire: char) -> Result<Mode> {
    self
      .entries
      .iter()
      .find(|(_, c)| *c == wire)
      .map(|(m, _)| *m)
      .ok_or(Error::Protocol {
        cmd: "MD".to_string(),
        reason: format!("unrecognized mode code {:?}", wire),
      })
  }

  pub fn supports(&self, mode: Mode) -> bool {
    self.entries.iter().any(|(m, _)| *m == mode)
  }
}

/// Yaesu "new CAT" mode table: `0..9A..F`, the classic FT-991/FTDX order.
pub fn yaesu_mode_table() -> ModeTable {
  ModeTable::new(vec![
    (Mode::Lsb, '1'),
    (Mode::Usb, '2'),
    (Mode::Cw, '3'),
    (Mode::Fm, '4'),
    (Mode::Am, '5'),
    (Mode::Rtty, '6'),
    (Mode::CwR, '7'),
    (Mode::PktLsb, '8'),
    (Mode::RttyR, '9'),
    (Mode::PktFm, 'A'),
    (Mode::FmN, 'B'),
    (Mode::PktUsb, 'C'),
    (Mode::AmN, 'D'),
    (Mode::C4fm, 'E'),
    (Mode::PktFmN, 'F'),
  ])
}

/// Kenwood's 0-15 mode index, exposed as single ASCII digits `'1'..'9'` plus
/// `'0'` through `'C'` for codes above 9 so this stays a `char` table like
/// the Yaesu one (real Kenwood firmware sends a 2-digit decimal; the
/// dispatcher zero-pads the underlying digit when composing `MDxx;`).
pub fn kenwood_mode_table() -> ModeTable {
  ModeTable::new(vec![
    (Mode::Lsb, '1'),
    (Mode::Usb, '2'),
    (Mode::Cw, '3'),
    (Mode::Fm, '4'),
    (Mode::Am, '5'),
    (Mode::Rtty, '6'),
    (Mode::CwR, '7'),
    (Mode::RttyR, '9'),
    (Mode::PktFm, 'A'),
    (Mode::PktUsb, 'B'),
    (Mode::PktLsb, 'C'),
  ])
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn yaesu_round_trips_every_supported_mode() {
    let table = yaesu_mode_table();
    for (mode, _) in &[
      (Mode::Lsb, '1'),
      (Mode::Usb, '2'),
      (Mode::Cw, '3'),
      (Mode::Fm, '4'),
      (Mode::Am, '5'),
      (Mode::Rtty, '6'),
      (Mode::CwR, '7'),
      (Mode::PktLsb, '8'),
      (Mode::RttyR, '9'),
      (Mode::PktFm, 'A'),
      (Mode::FmN, 'B'),
      (Mode::PktUsb, 'C'),
      (Mode::AmN, 'D'),
      (Mode::C4fm, 'E'),
      (Mode::PktFmN, 'F'),
    ] {
      let wire = table.encode(*mode).unwrap();
      assert_eq!(table.decode(wire).unwrap(), *mode);
    }
  }

  #[test]
  fn kenwood_round_trips_every_supported_mode() {
    let table = kenwood_mode_table();
    for mode in Mode::ALL {
      if table.supports(mode) {
        let wire = table.encode(mode).unwrap();
        assert_eq!(table.decode(wire).unwrap(), mode);
      }
    }
  }

  #[test]
  fn unsupported_mode_is_invalid_not_wire_error() {
    let table = kenwood_mode_table();
    assert!(matches!(
      table.encode(Mode::C4fm),
      Err(Error::Invalid { .. })
    ));
  }
}
