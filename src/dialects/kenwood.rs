//! Kenwood dialect (spec §6: identical ASCII/`;` framing to Yaesu, but `?`
//! means busy-retry by default). Fully specified per spec §1. Grounded in
//! `rigs/kenwood/kenwood.c`'s `kenwood_transaction`/`kenwood_safe_transaction`
//! and the `has_ps`/`ID019` synthesis logic around `get_info`.

use std::time::Duration;

use crate::caps::{CapsRecord, Family, Terminator};
use crate::codec::freq::FreqRange;
use crate::codec::mode::kenwood_mode_table;
use crate::codec::offset::RepeaterOffsetTable;
use crate::codec::passband::PassbandTable;
use crate::codec::tone::ToneTable;
use crate::codec::CalTable;
use crate::dialects::Dialect;
use crate::port::SerialParams;

pub const TS450: u32 = 450;
pub const TS590S: u32 = 590;
pub const TS2000: u32 = 2000;

/// Model id Kenwood's TS-2000 synthesizes in `ID019` when a rig only ever
/// echoes `FA`-style frames for identity probes (spec §4.7 "Open sequence";
/// grounded on `kenwood.c:944` `strcpy(id, "ID019")`).
pub const TS2000_SYNTHETIC_ID: &str = "ID019";

pub struct KenwoodDialect;

impl KenwoodDialect {
  pub fn new() -> Self {
    KenwoodDialect
  }
}

impl Default for KenwoodDialect {
  fn default() -> Self {
    Self::new()
  }
}

impl Dialect for KenwoodDialect {
  fn terminator_bytes(&self) -> &'static [u8] {
    b";"
  }

  fn max_reply_len(&self) -> usize {
    50
  }

  fn if_command(&self) -> &'static str {
    "IF"
  }

  fn verify_probe(&self) -> &'static str {
    "ID"
  }

  fn question_mark_means_busy(&self, _caps: &CapsRecord, _cmd: &str) -> bool {
    // Kenwood's dialect-level default (spec §4.2 step 6, §6): unlike
    // Yaesu, `?` means busy-retry unconditionally.
    true
  }

  fn verify_command_for(&self, cmd: &str) -> Option<&'static str> {
    match cmd {
      "FA" | "FB" => Some("FA"),
      "MD" => None,
      "PS" => Some("PS"),
      "AI" => Some("AI"),
      _ => Some(cmd),
    }
  }

  fn anti_vox_command(&self, _rig_id: u32, _is_get: bool) -> Option<&'static str> {
    // The anti-VOX override table is Yaesu-specific per spec §4.3.
    None
  }
}

fn base_supported_commands() -> &'static [&'static str] {
  &["AI", "CN", "FA", "FB", "FV", "ID", "IF", "MD", "PS", "RX", "SM", "TX"]
}

pub fn ts450_caps() -> CapsRecord {
  CapsRecord {
    model_id: TS450,
    name: "TS-450",
    manufacturer: "Kenwood",
    family: Family::Kenwood,
    serial: SerialParams {
      baud_rate: 4800,
      ..Default::default()
    },
    write_delay: Duration::from_millis(0),
    post_write_delay: Duration::from_millis(0),
    timeout: Duration::from_millis(2000),
    retry: 3,
    terminator: Terminator::Semicolon,
    if_response_lens: &[37],
    mode_table: kenwood_mode_table(),
    passbands: PassbandTable::new(),
    tones: ToneTable::standard_38(),
    s_meter: CalTable::ft991_s_meter_default(),
    freq_range_rx: FreqRange {
      min_hz: 100_000,
      max_hz: 30_000_000,
    },
    freq_range_tx: FreqRange {
      min_hz: 1_800_000,
      max_hz: 30_000_000,
    },
    freq_digits: 11,
    freq_step_hz: 1,
    offsets: RepeaterOffsetTable::new(),
    // TS-450 predates `PS`; this grounds spec §8 scenario 4 ("Rejected
    // command classification" -> `get_powerstat` comes back `N;`).
    supported_commands: base_supported_commands(),
    busy_retry_commands: &[],
    fast_set_commands: false,
    ptt_off_settle: Duration::from_millis(0),
    has_powerstat: false,
    att_steps_db: &[],
    preamp_steps_db: &[],
    level_granularity: 255,
    memory_channels: 0,
  }
}

pub fn ts590s_caps() -> CapsRecord {
  CapsRecord {
    model_id: TS590S,
    name: "TS-590S",
    manufacturer: "Kenwood",
    family: Family::Kenwood,
    serial: SerialParams {
      baud_rate: 4800,
      ..Default::default()
    },
    write_delay: Duration::from_millis(0),
    post_write_delay: Duration::from_millis(0),
    timeout: Duration::from_millis(2000),
    retry: 3,
    terminator: Terminator::Semicolon,
    if_response_lens: &[38],
    mode_table: kenwood_mode_table(),
    passbands: PassbandTable::new(),
    tones: ToneTable::standard_38(),
    s_meter: CalTable::ft991_s_meter_default(),
    freq_range_rx: FreqRange {
      min_hz: 100_000,
      max_hz: 60_000_000,
    },
    freq_range_tx: FreqRange {
      min_hz: 1_800_000,
      max_hz: 54_000_000,
    },
    freq_digits: 11,
    freq_step_hz: 1,
    offsets: RepeaterOffsetTable::new(),
    supported_commands: base_supported_commands(),
    busy_retry_commands: &[],
    fast_set_commands: false,
    ptt_off_settle: Duration::from_millis(0),
    has_powerstat: true,
    att_steps_db: &[0, 6, 12, 18],
    preamp_steps_db: &[0, 10, 20],
    level_granularity: 255,
    memory_channels: 99,
  }
}

pub fn ts2000_caps() -> CapsRecord {
  CapsRecord {
    model_id: TS2000,
    name: "TS-2000",
    manufacturer: "Kenwood",
    family: Family::Kenwood,
    serial: SerialParams {
      baud_rate: 4800,
      ..Default::default()
    },
    write_delay: Duration::from_millis(0),
    post_write_delay: Duration::from_millis(0),
    timeout: Duration::from_millis(2000),
    retry: 3,
    terminator: Terminator::Semicolon,
    if_response_lens: &[38],
    mode_table: kenwood_mode_table(),
    passbands: PassbandTable::new(),
    tones: ToneTable::standard_38(),
    s_meter: CalTable::ft991_s_meter_default(),
    freq_range_rx: FreqRange {
      min_hz: 100_000,
      max_hz: 60_000_000,
    },
    freq_range_tx: FreqRange {
      min_hz: 1_800_000,
      max_hz: 54_000_000,
    },
    freq_digits: 11,
    freq_step_hz: 1,
    offsets: RepeaterOffsetTable::new(),
    supported_commands: base_supported_commands(),
    busy_retry_commands: &[],
    fast_set_commands: false,
    ptt_off_settle: Duration::from_millis(0),
    has_powerstat: true,
    att_steps_db: &[0, 6, 12, 18],
    preamp_steps_db: &[0, 10, 20],
    level_granularity: 255,
    memory_channels: 289,
  }
}

pub fn register() -> Vec<CapsRecord> {
  vec![ts450_caps(), ts590s_caps(), ts2000_caps()]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ts450_has_powerstat_flag_off_but_still_attempts_ps() {
    // `PS` stays in the command table so the rejection itself can reach
    // the wire (spec §8 scenario 4); `has_powerstat` is the static model
    // fact, distinct from the per-Rig belief the dispatcher flips at
    // runtime after the rig actually refuses it.
    let caps = ts450_caps();
    assert!(!caps.has_powerstat);
    assert!(caps.supports("PS"));
  }

  #[test]
  fn kenwood_question_mark_always_means_busy() {
    let d = KenwoodDialect::new();
    let caps = ts2000_caps();
    assert!(d.question_mark_means_busy(&caps, "FA"));
    assert!(d.question_mark_means_busy(&caps, "ZZ"));
  }
}
