//! C8: per-model capability records and the process-wide registry that
//! holds them (spec §3 CapsRecord, §4.8 CapsRegistry).

use std::sync::OnceLock;
use std::time::Duration;

use crate::codec::{CalTable, FreqRange, ModeTable, PassbandTable, RepeaterOffsetTable, ToneTable};
use crate::port::SerialParams;

/// The dialect a `CapsRecord` belongs to. Only `Yaesu` and `Kenwood` are
/// implemented in full here; `Icom`/`Aor` exist at the interface level
/// (spec §1: "specified only at the interface level").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
  Yaesu,
  Kenwood,
  Icom,
  Aor,
}

/// Command terminator byte(s), spec §6 "Wire framing".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
  Semicolon,
  Cr,
  CrLf,
  LfCr,
}

impl Terminator {
  pub fn bytes(&self) -> &'static [u8] {
    match self {
      Terminator::Semicolon => b";",
      Terminator::Cr => b"\r",
      Terminator::CrLf => b"\r\n",
      Terminator::LfCr => b"\n\r",
    }
  }
}

/// Immutable per-model capability record (spec §3). Registered once at
/// startup and never mutated afterward.
pub struct CapsRecord {
  pub model_id: u32,
  pub name: &'static str,
  pub manufacturer: &'static str,
  pub family: Family,

  pub serial: SerialParams,
  pub write_delay: Duration,
  pub post_write_delay: Duration,
  pub timeout: Duration,
  pub retry: u8,
  pub terminator: Terminator,
  /// Every IF-response length this firmware is known to emit (spec §9
  /// open question (c): "derive field offsets from the observed length").
  pub if_response_lens: &'static [usize],

  pub mode_table: ModeTable,
  pub passbands: PassbandTable,
  pub tones: ToneTable,
  pub s_meter: CalTable,

  pub freq_range_rx: FreqRange,
  pub freq_range_tx: FreqRange,
  pub freq_digits: usize,
  pub freq_step_hz: u64,

  pub offsets: RepeaterOffsetTable,

  /// Sorted 2-letter command mnemonics this model supports; the validator
  /// (C3) binary-searches this table (spec §4.3).
  pub supported_commands: &'static [&'static str],

  /// Commands where a `?` reply means busy-retry rather than rejected, on
  /// dialects whose default is "rejected" (Yaesu). Spec §9 open question
  /// (a): reproduces the source's per-command flag toggling.
  pub busy_retry_commands: &'static [&'static str],

  /// High-throughput bypass: when true, SetVerify (C5) skips the
  /// write-then-read-back step entirely (spec §4.5 point 4).
  pub fast_set_commands: bool,

  /// FT-DX3000 quirk (spec §9 open question (b)): sleep this long after
  /// PTT-off before the next frequency set. Zero for rigs without the quirk.
  pub ptt_off_settle: Duration,

  pub has_powerstat: bool,

  /// Attenuator steps in dB, index order matching the wire's 1-based
  /// `RA%02d` step number (spec §3 "attenuator/preamp step lists";
  /// grounded on `kenwood.c`'s `rig->state.attenuator[]` table).
  pub att_steps_db: &'static [i16],
  /// Preamp gain steps in dB, matching the wire's 1-based `PA%01d` step
  /// number (grounded on `kenwood.c`'s `rig->state.preamp[]` table).
  pub preamp_steps_db: &'static [i16],
  /// Resolution of the generic 0..=N level scale used by level-setting
  /// commands (spec §3 "level granularity"; grounded on `kenwood.c`'s
  /// `val.f * 255.0` scaling for `RIG_LEVEL_RF`/`RIG_LEVEL_AF`).
  pub level_granularity: u16,
  /// Memory-channel count (spec §3 "memory-channel layout"). Zero means
  /// this record carries no memory-channel data; see DESIGN.md for why
  /// memory-channel read/write stays unimplemented at the Dispatcher.
  pub memory_channels: u16,
}

impl CapsRecord {
  pub fn supports(&self, cmd: &str) -> bool {
    self.supported_commands.binary_search(&cmd).is_ok()
  }

  /// Looks up the verify-probe reply length bucket this record's IF frame
  /// is expected to land in; used by dialects parsing `IF` responses whose
  /// field offsets shift between firmware revisions.
  pub fn accepts_if_len(&self, len: usize) -> bool {
    self.if_response_lens.contains(&len)
  }
}

/// Process-wide, read-only table of every registered `CapsRecord`,
/// indexed by model id (spec §4.8). Built lazily on first use from each
/// dialect module's `register()` function and never mutated afterward —
/// no runtime registration, no dynamic loading (spec §1 Non-goals).
pub struct CapsRegistry {
  records: Vec<CapsRecord>,
}

impl CapsRegistry {
  fn build() -> Self {
    let mut records = Vec::new();
    records.extend(crate::dialects::yaesu::register());
    records.extend(crate::dialects::kenwood::register());
    CapsRegistry { records }
  }

  pub fn global() -> &'static CapsRegistry {
    static REGISTRY: OnceLock<CapsRegistry> = OnceLock::new();
    REGISTRY.get_or_init(CapsRegistry::build)
  }

  /// O(n) over at most a couple hundred entries, per spec §4.8.
  pub fn lookup(&self, model_id: u32) -> Option<&CapsRecord> {
    self.records.iter().find(|r| r.model_id == model_id)
  }

  pub fn iter(&self) -> impl Iterator<Item = &CapsRecord> {
    self.records.iter()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn registry_finds_every_registered_model() {
    let reg = CapsRegistry::global();
    for rec in reg.iter() {
      assert!(reg.lookup(rec.model_id).is_some());
    }
  }

  #[test]
  fn unknown_model_id_is_none() {
    assert!(CapsRegistry::global().lookup(0xFFFF_FFFF).is_none());
  }
}
