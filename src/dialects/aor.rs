//! AOR dialect: one-shot command/response. Specified only at the interface
//! level (spec §1), grounded on `aor/aor.c`'s shared command table. The
//! oldest model generation (AR-3000, bare-CR both directions per
//! `ar3000.c`) isn't carried here: AOR has no per-model `CapsRecord`
//! registry the way Yaesu/Kenwood do, so there's no dispatch point that
//! could ever select it over the newer-generation terminator below.

use crate::caps::CapsRecord;
use crate::dialects::Dialect;

/// AOR models (AR-5000, AR-7030, AR-8x00 in `aor.c`'s shared table)
/// terminate input with CR and output with `LF CR`.
pub struct AorDialect;

impl Dialect for AorDialect {
  fn terminator_bytes(&self) -> &'static [u8] {
    b"\n\r"
  }

  fn max_reply_len(&self) -> usize {
    64
  }

  fn if_command(&self) -> &'static str {
    ""
  }

  fn verify_probe(&self) -> &'static str {
    ""
  }

  fn question_mark_means_busy(&self, _caps: &CapsRecord, _cmd: &str) -> bool {
    false
  }

  fn verify_command_for(&self, _cmd: &str) -> Option<&'static str> {
    None
  }

  fn anti_vox_command(&self, _rig_id: u32, _is_get: bool) -> Option<&'static str> {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn newer_models_write_lf_cr() {
    assert_eq!(AorDialect.terminator_bytes(), b"\n\r");
  }
}
