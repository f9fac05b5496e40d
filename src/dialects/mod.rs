//! Per-vendor wire shaping (spec §4.3 "per-command dialect shaping", §6
//! "Wire framing"). Shared engine logic (C1-C9) lives in the top-level
//! modules; only the small differences between vendor families live here,
//! as small override tables rather than a class hierarchy (spec §9
//! "Polymorphism").

pub mod aor;
pub mod icom;
pub mod kenwood;
pub mod yaesu;

use crate::caps::CapsRecord;

/// The interface every dialect implements. Yaesu and Kenwood are fully
/// specified (spec §1); Icom and AOR are present only at this interface
/// level, matching spec scope.
pub trait Dialect {
  /// The terminator byte sequence this dialect frames commands and replies
  /// with (spec §6).
  fn terminator_bytes(&self) -> &'static [u8];

  /// The maximum reply length C2 will read before giving up (spec §4.2
  /// step 6: "bounded by a dialect-specific maximum").
  fn max_reply_len(&self) -> usize;

  /// The 2-letter mnemonic this dialect uses for its IF-equivalent status
  /// frame, consulted by the raw-IF cache short-circuit (spec §4.2 step 1).
  fn if_command(&self) -> &'static str;

  /// The cheap, always-answered probe command written after a no-reply
  /// set to confirm the rig drained it (spec §4.2 step 5): `ID;` for
  /// Yaesu/Kenwood in general, `AI;` on the FT-9000.
  fn verify_probe(&self) -> &'static str;

  /// Whether a bare `?` reply to `cmd` means "busy, retry" (true) or
  /// "rejected, don't retry" (false). Kenwood defaults to busy; Yaesu
  /// defaults to rejected except for the commands in
  /// `CapsRecord::busy_retry_commands` (spec §9 open question (a)).
  fn question_mark_means_busy(&self, caps: &CapsRecord, cmd: &str) -> bool;

  /// The verify command SetVerify (C5) should issue after writing `cmd`,
  /// or `None` to skip verification for that command (spec §4.5 point 1).
  fn verify_command_for(&self, cmd: &str) -> Option<&'static str>;

  /// The anti-VOX command table lookup (spec §4.3 "Anti-VOX command
  /// table"): `(rig_id, is_get) -> mnemonic`, with distinct get/set
  /// mnemonics on some rigs.
  fn anti_vox_command(&self, rig_id: u32, is_get: bool) -> Option<&'static str>;
}
