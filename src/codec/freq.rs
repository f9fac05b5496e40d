//! Frequency encoding (spec §4.4 "Frequency encoding").
//!
//! The core detail specified for Yaesu/Kenwood is ASCII decimal of a
//! dialect-specific digit width. Icom/AOR's BCD/float encodings are noted
//! in spec §6 but those dialects are interface-level only in this engine
//! (see `crate::dialects::icom`, `crate::dialects::aor`).

use crate::error::{Error, Result};

/// Rounds `hz` down to the nearest multiple of `step_hz` (spec: "rounds to
/// the rig's smallest step").
pub fn round_to_step(hz: u64, step_hz: u64) -> u64 {
  if step_hz == 0 {
    return hz;
  }
  (hz / step_hz) * step_hz
}

/// Formats `hz` as zero-padded ASCII decimal `digits` wide, after rounding
/// to `step_hz`. Used for Yaesu's `FA`/`FB` (8-9 digits) and Kenwood's
/// equivalents.
pub fn encode_ascii_freq(hz: u64, digits: usize, step_hz: u64) -> Result<String> {
  let rounded = round_to_step(hz, step_hz);
  let s = format!("{:0width$}", rounded, width = digits);
  if s.len() > digits {
    return Err(Error::Invalid {
      cmd: "FA",
      reason: format!("{} Hz does not fit in {} digits", hz, digits),
    });
  }
  Ok(s)
}

/// Parses a fixed-width ASCII decimal frequency field back to Hz.
pub fn decode_ascii_freq(wire: &str) -> Result<u64> {
  wire.trim().parse::<u64>().map_err(|_| Error::Protocol {
    cmd: "FA".to_string(),
    reason: format!("could not parse frequency field {:?}", wire),
  })
}

/// A rig's receive/transmit frequency range for one region, consulted by
/// the validator before any transaction touches the wire (spec §7:
/// `Invalid` "before it reaches the wire").
#[derive(Debug, Clone, Copy)]
pub struct FreqRange {
  pub min_hz: u64,
  pub max_hz: u64,
}

impl FreqRange {
  pub fn contains(&self, hz: u64) -> bool {
    hz >= self.min_hz && hz <= self.max_hz
  }

  pub fn validate(&self, hz: u64) -> Result<()> {
    if self.contains(hz) {
      Ok(())
    } else {
      Err(Error::Invalid {
        cmd: "FA",
        reason: format!(
          "{} Hz is outside the supported range {}-{} Hz",
          hz, self.min_hz, self.max_hz
        ),
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encode_zero_pads_to_width() {
    assert_eq!(encode_ascii_freq(14_074_000, 9, 1).unwrap(), "014074000");
  }

  #[test]
  fn round_trip_through_decode() {
    let hz = 14_074_000;
    let wire = encode_ascii_freq(hz, 9, 1).unwrap();
    assert_eq!(decode_ascii_freq(&wire).unwrap(), hz);
  }

  #[test]
  fn rounds_down_to_step() {
    assert_eq!(round_to_step(14_074_015, 10), 14_074_010);
  }

  #[test]
  fn range_rejects_out_of_band() {
    let r = FreqRange {
      min_hz: 1_800_000,
      max_hz: 30_000_000,
    };
    assert!(r.validate(50_000_000).is_err());
    assert!(r.validate(14_074_000).is_ok());
  }
}
