//! C3: per-rig allow-list gate. The single authority on whether a command
//! is supported before any transaction touches the wire (spec §4.3).

use crate::caps::CapsRecord;
use crate::error::{Error, Result};

/// Binary-searches `caps.supported_commands` for `cmd`. Returns
/// `Unavailable` without ever constructing a transaction when the rig's
/// capability table doesn't list it (spec §8: "returns `Unavailable`
/// without writing bytes").
pub fn ensure_supported(caps: &CapsRecord, cmd: &'static str) -> Result<()> {
  if caps.supports(cmd) {
    Ok(())
  } else {
    Err(Error::Unavailable { cmd })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dialects::yaesu::ft991_caps;

  #[test]
  fn supported_command_passes() {
    assert!(ensure_supported(&ft991_caps(), "FA").is_ok());
  }

  #[test]
  fn unsupported_command_is_unavailable_without_touching_wire() {
    let result = ensure_supported(&ft991_caps(), "ZZ");
    assert!(matches!(result, Err(Error::Unavailable { cmd: "ZZ" })));
  }
}
