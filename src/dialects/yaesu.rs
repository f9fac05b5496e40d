//! Yaesu "new CAT" dialect (spec §6: ASCII, `;`-terminated, 2-letter
//! mnemonics). Fully specified per spec §1.

use std::time::Duration;

use crate::caps::{CapsRecord, Family, Terminator};
use crate::codec::freq::FreqRange;
use crate::codec::mode::{yaesu_mode_table, Mode};
use crate::codec::offset::{OffsetBand, RepeaterOffsetTable};
use crate::codec::passband::{ft991_ssb_cw_staircase, PassbandTable};
use crate::codec::tone::ToneTable;
use crate::codec::CalTable;
use crate::dialects::Dialect;
use crate::port::SerialParams;

pub const FT991: u32 = 991;
pub const FT450: u32 = 450;
pub const FTDX3000: u32 = 3000;
pub const FT9000: u32 = 9000;

pub struct YaesuDialect;

impl YaesuDialect {
  pub fn new() -> Self {
    YaesuDialect
  }
}

impl Default for YaesuDialect {
  fn default() -> Self {
    Self::new()
  }
}

impl Dialect for YaesuDialect {
  fn terminator_bytes(&self) -> &'static [u8] {
    b";"
  }

  fn max_reply_len(&self) -> usize {
    128
  }

  fn if_command(&self) -> &'static str {
    "IF"
  }

  fn verify_probe(&self) -> &'static str {
    "ID"
  }

  fn question_mark_means_busy(&self, caps: &CapsRecord, cmd: &str) -> bool {
    // FT-9000 probes AI after a set, which makes its own busy semantics
    // moot for that probe, but for ordinary commands Yaesu's default is
    // "rejected": a bare `?` only means busy-retry for the commands this
    // model's table explicitly flags (spec §9 open question (a)).
    caps.busy_retry_commands.contains(&cmd)
  }

  fn verify_command_for(&self, cmd: &str) -> Option<&'static str> {
    match cmd {
      "FA" | "FB" => Some("FA"),
      "TX" => Some("TX"),
      "FT" => Some("FT"),
      "AI" => Some("AI"),
      "VS" => Some("VS"),
      "SY" => Some("SY"),
      "PC" => Some("PC"),
      "BS" | "MD" | "KY" | "KM" | "AC" | "EX" => None,
      _ => Some(cmd),
    }
  }

  fn anti_vox_command(&self, rig_id: u32, is_get: bool) -> Option<&'static str> {
    match (rig_id, is_get) {
      // FT-991 uses the same mnemonic for get and set, data byte differs.
      (FT991, true) | (FT991, false) => Some("EX117"),
      // FT-DX3000 splits get/set across distinct commands.
      (FTDX3000, true) => Some("EX0305"),
      (FTDX3000, false) => Some("EX0305"),
      _ => None,
    }
  }
}

/// FT-9000's verify probe differs from the rest of the family (spec §4.2
/// step 5): `AI;` instead of `ID;`.
pub struct Ft9000Dialect(YaesuDialect);

impl Ft9000Dialect {
  pub fn new() -> Self {
    Ft9000Dialect(YaesuDialect::new())
  }
}

impl Default for Ft9000Dialect {
  fn default() -> Self {
    Self::new()
  }
}

impl Dialect for Ft9000Dialect {
  fn terminator_bytes(&self) -> &'static [u8] {
    self.0.terminator_bytes()
  }
  fn max_reply_len(&self) -> usize {
    self.0.max_reply_len()
  }
  fn if_command(&self) -> &'static str {
    self.0.if_command()
  }
  fn verify_probe(&self) -> &'static str {
    "AI"
  }
  fn question_mark_means_busy(&self, caps: &CapsRecord, cmd: &str) -> bool {
    self.0.question_mark_means_busy(caps, cmd)
  }
  fn verify_command_for(&self, cmd: &str) -> Option<&'static str> {
    self.0.verify_command_for(cmd)
  }
  fn anti_vox_command(&self, rig_id: u32, is_get: bool) -> Option<&'static str> {
    self.0.anti_vox_command(rig_id, is_get)
  }
}

fn base_supported_commands() -> &'static [&'static str] {
  // Sorted, as the validator binary-searches it (spec §4.3).
  &[
    "AC", "AG", "AI", "BS", "CN", "EX", "FA", "FB", "FT", "ID", "IF", "KM", "KY", "MD", "PC", "PS",
    "RX", "SH", "SM", "SY", "TX", "VS",
  ]
}

pub fn ft991_caps() -> CapsRecord {
  CapsRecord {
    model_id: FT991,
    name: "FT-991",
    manufacturer: "Yaesu",
    family: Family::Yaesu,
    serial: SerialParams {
      baud_rate: 4800,
      ..Default::default()
    },
    write_delay: Duration::from_millis(0),
    post_write_delay: Duration::from_millis(0),
    timeout: Duration::from_millis(1000),
    retry: 3,
    terminator: Terminator::Semicolon,
    if_response_lens: &[27, 28],
    mode_table: yaesu_mode_table(),
    passbands: PassbandTable::new()
      .with(Mode::Usb, ft991_ssb_cw_staircase())
      .with(Mode::Lsb, ft991_ssb_cw_staircase())
      .with(Mode::Cw, ft991_ssb_cw_staircase())
      .with(Mode::CwR, ft991_ssb_cw_staircase()),
    tones: ToneTable::standard_38(),
    s_meter: CalTable::ft991_s_meter_default(),
    freq_range_rx: FreqRange {
      min_hz: 30_000,
      max_hz: 75_000_000,
    },
    freq_range_tx: FreqRange {
      min_hz: 1_800_000,
      max_hz: 450_000_000,
    },
    freq_digits: 9,
    freq_step_hz: 1,
    offsets: RepeaterOffsetTable::ft_representative(),
    supported_commands: base_supported_commands(),
    busy_retry_commands: &["KY"],
    fast_set_commands: false,
    ptt_off_settle: Duration::from_millis(0),
    has_powerstat: true,
    att_steps_db: &[0, 6, 12, 18],
    preamp_steps_db: &[0, 3, 6, 9, 12],
    level_granularity: 255,
    memory_channels: 99,
  }
}

pub fn ft450_caps() -> CapsRecord {
  CapsRecord {
    model_id: FT450,
    name: "FT-450",
    manufacturer: "Yaesu",
    family: Family::Yaesu,
    serial: SerialParams {
      baud_rate: 4800,
      ..Default::default()
    },
    write_delay: Duration::from_millis(0),
    post_write_delay: Duration::from_millis(0),
    timeout: Duration::from_millis(1000),
    retry: 3,
    terminator: Terminator::Semicolon,
    if_response_lens: &[27],
    mode_table: yaesu_mode_table(),
    passbands: PassbandTable::new()
      .with(Mode::Usb, ft991_ssb_cw_staircase())
      .with(Mode::Lsb, ft991_ssb_cw_staircase()),
    tones: ToneTable::standard_38(),
    s_meter: CalTable::ft991_s_meter_default(),
    freq_range_rx: FreqRange {
      min_hz: 30_000,
      max_hz: 60_000_000,
    },
    freq_range_tx: FreqRange {
      min_hz: 1_800_000,
      max_hz: 54_000_000,
    },
    freq_digits: 9,
    freq_step_hz: 1,
    offsets: RepeaterOffsetTable::ft_representative(),
    supported_commands: base_supported_commands(),
    busy_retry_commands: &[],
    fast_set_commands: false,
    ptt_off_settle: Duration::from_millis(0),
    has_powerstat: false,
    att_steps_db: &[0, 6, 12],
    preamp_steps_db: &[0, 6],
    level_granularity: 255,
    memory_channels: 0,
  }
}

/// FT-DX3000: spec §9 open question (b), the 300 ms PTT-off settle before
/// the next frequency set is empirical and kept as-is.
pub fn ftdx3000_caps() -> CapsRecord {
  CapsRecord {
    model_id: FTDX3000,
    name: "FTDX-3000",
    manufacturer: "Yaesu",
    family: Family::Yaesu,
    serial: SerialParams {
      baud_rate: 38_400,
      ..Default::default()
    },
    write_delay: Duration::from_millis(0),
    post_write_delay: Duration::from_millis(0),
    timeout: Duration::from_millis(1000),
    retry: 3,
    terminator: Terminator::Semicolon,
    if_response_lens: &[28],
    mode_table: yaesu_mode_table(),
    passbands: PassbandTable::new()
      .with(Mode::Usb, ft991_ssb_cw_staircase())
      .with(Mode::Lsb, ft991_ssb_cw_staircase()),
    tones: ToneTable::extended_42(),
    s_meter: CalTable::ft991_s_meter_default(),
    freq_range_rx: FreqRange {
      min_hz: 30_000,
      max_hz: 56_000_000,
    },
    freq_range_tx: FreqRange {
      min_hz: 1_800_000,
      max_hz: 54_000_000,
    },
    freq_digits: 9,
    freq_step_hz: 1,
    offsets: RepeaterOffsetTable::ft_representative(),
    supported_commands: base_supported_commands(),
    busy_retry_commands: &[],
    fast_set_commands: false,
    ptt_off_settle: Duration::from_millis(300),
    has_powerstat: true,
    att_steps_db: &[0, 6, 12, 18],
    preamp_steps_db: &[0, 3, 6, 9, 12, 15, 18, 21],
    level_granularity: 255,
    memory_channels: 99,
  }
}

pub fn ft9000_caps() -> CapsRecord {
  CapsRecord {
    model_id: FT9000,
    name: "FT-9000",
    manufacturer: "Yaesu",
    family: Family::Yaesu,
    serial: SerialParams {
      baud_rate: 4800,
      ..Default::default()
    },
    write_delay: Duration::from_millis(0),
    post_write_delay: Duration::from_millis(0),
    timeout: Duration::from_millis(1000),
    retry: 3,
    terminator: Terminator::Semicolon,
    if_response_lens: &[27],
    mode_table: yaesu_mode_table(),
    passbands: PassbandTable::new().with(Mode::Usb, ft991_ssb_cw_staircase()),
    tones: ToneTable::standard_38(),
    s_meter: CalTable::ft991_s_meter_default(),
    freq_range_rx: FreqRange {
      min_hz: 30_000,
      max_hz: 60_000_000,
    },
    freq_range_tx: FreqRange {
      min_hz: 1_800_000,
      max_hz: 54_000_000,
    },
    freq_digits: 9,
    freq_step_hz: 1,
    offsets: RepeaterOffsetTable::ft_representative(),
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

pub fn register() -> Vec<CapsRecord> {
  vec![ft991_caps(), ft450_caps(), ftdx3000_caps(), ft9000_caps()]
}

#[allow(dead_code)]
pub(crate) fn offset_band_for_freq(hz: u64) -> OffsetBand {
  match hz {
    hz if hz < 30_000_000 => OffsetBand::AllHf,
    hz if hz < 70_000_000 => OffsetBand::SixM,
    hz if hz < 148_000_000 => OffsetBand::TwoM,
    _ => OffsetBand::SeventyCm,
  }
}

/// Band-stack index used by the `BS` command (spec §8 scenario 2: 80 m is
/// index 1, 20 m is index 5). The dispatcher diffs this index across a
/// frequency set to decide whether to emit `BS` before the `FA`/`FB` set.
pub(crate) fn bandstack_index(hz: u64) -> Option<u8> {
  const BANDS: [(u64, u64, u8); 15] = [
    (1_800_000, 2_000_000, 0),
    (3_500_000, 4_000_000, 1),
    (5_300_000, 5_410_000, 2),
    (7_000_000, 7_300_000, 3),
    (10_100_000, 10_150_000, 4),
    (14_000_000, 14_350_000, 5),
    (18_068_000, 18_168_000, 6),
    (21_000_000, 21_450_000, 7),
    (24_890_000, 24_990_000, 8),
    (28_000_000, 29_700_000, 9),
    (50_000_000, 54_000_000, 10),
    (76_000_000, 108_000_000, 11),
    (108_000_000, 137_000_000, 12),
    (144_000_000, 148_000_000, 13),
    (430_000_000, 450_000_000, 14),
  ];
  BANDS
    .iter()
    .find(|(lo, hi, _)| hz >= *lo && hz <= *hi)
    .map(|(_, _, idx)| *idx)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ft991_supports_fa_but_not_unknown_command() {
    let caps = ft991_caps();
    assert!(caps.supports("FA"));
    assert!(!caps.supports("ZZ"));
  }

  #[test]
  fn ft9000_probe_is_ai_not_id() {
    let d = Ft9000Dialect::new();
    assert_eq!(d.verify_probe(), "AI");
  }

  #[test]
  fn offset_band_maps_144_3_mhz_to_2m() {
    assert_eq!(offset_band_for_freq(144_300_000), OffsetBand::TwoM);
  }

  #[test]
  fn offset_band_maps_29_6_mhz_to_all_hf() {
    assert_eq!(offset_band_for_freq(29_600_000), OffsetBand::AllHf);
  }

  #[test]
  fn bandstack_index_matches_scenario_2_bands() {
    assert_eq!(bandstack_index(3_573_000), Some(1));
    assert_eq!(bandstack_index(14_074_000), Some(5));
  }

  #[test]
  fn bandstack_index_is_none_between_bands() {
    assert_eq!(bandstack_index(140_000_000), None);
  }
}
