//! C5: write-then-verify policy for state-changing commands (spec §4.5).

use log::{debug, warn};

use crate::cache::Cache;
use crate::caps::CapsRecord;
use crate::clock::Clock;
use crate::dialects::Dialect;
use crate::error::{Error, Result};
use crate::port::Port;
use crate::transaction;

/// Writes `cmd`, then verifies it took effect per spec §4.5:
///
/// 1. Resolve the dialect's verify command for `cmd` via
///    `Dialect::verify_command_for`; `None` means skip verification.
/// 2. If `caps.fast_set_commands`, skip verification unconditionally
///    (point 4).
/// 3. Otherwise write `cmd`, then write-and-read the verify command,
///    comparing its first 2 reply bytes against `cmd`'s own first 2
///    bytes. Mismatch is retried up to `caps.retry`; persistent mismatch
///    surfaces as `Protocol`.
/// 4. A `?` on a `PC` (power) command is reported as `PowerLimit`
///    specifically rather than a generic protocol error.
pub fn set_and_verify<P: Port, C: Clock>(
  port: &mut P,
  dialect: &dyn Dialect,
  caps: &CapsRecord,
  cache: &mut Cache<C>,
  cmd: &str,
) -> Result<()> {
  let cmd_prefix: String = cmd.chars().take(2).collect();

  if caps.fast_set_commands {
    debug!("set_and_verify: fast_set_commands, skipping verify for {}", cmd);
    transaction::write_only(port, dialect, cmd)?;
    if transaction::looks_like_set(cmd) {
      cache.invalidate_raw_if();
    }
    return Ok(());
  }

  let verify_cmd = match dialect.verify_command_for(&cmd_prefix) {
    Some(v) => v,
    None => {
      debug!(
        "set_and_verify: no verify mapping for {}, falling back to the transaction-level probe",
        cmd
      );
      return transaction::transaction(port, dialect, caps, cache, cmd, false).map(|_| ());
    }
  };

  // Plain write, no generic auto-probe: the explicit verify step below
  // (using this command's own mapped verify command) is what catches a
  // rejection, so layering the transaction-level auto-probe underneath
  // would just be a second, redundant round trip.
  transaction::write_only(port, dialect, cmd)?;
  if transaction::looks_like_set(cmd) {
    cache.invalidate_raw_if();
  }

  let mut attempt = 0u8;
  loop {
    attempt += 1;
    let reply = match transaction::transaction(port, dialect, caps, cache, verify_cmd, true) {
      Ok(reply) => reply,
      // A `?` on a power-level verify reads as Rejected/Busy depending on
      // the dialect's default; either way, on `PC` it means the rig
      // refused the requested power level, not a generic protocol fault.
      Err(Error::Rejected { .. }) | Err(Error::Busy { .. }) if cmd_prefix == "PC" => {
        return Err(Error::PowerLimit { cmd: cmd.to_string() });
      }
      Err(e) => return Err(e),
    };
    let reply_text = String::from_utf8_lossy(&reply);
    let reply_body = reply_text.trim_end_matches(';');

    let reply_prefix: String = reply_body.chars().take(2).collect();
    if reply_prefix == cmd_prefix {
      return Ok(());
    }

    if attempt >= caps.retry {
      return Err(Error::Protocol {
        cmd: cmd.to_string(),
        reason: format!(
          "verify command {} reply {:?} did not confirm the set",
          verify_cmd, reply_body
        ),
      });
    }
    warn!(
      "set_and_verify: verify mismatch for {} (got {:?}), retrying ({}/{})",
      cmd, reply_body, attempt, caps.retry
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clock::FakeClock;
  use crate::dialects::yaesu::{ft991_caps, YaesuDialect};
  use crate::port::MockPort;

  #[test]
  fn successful_set_verifies_and_returns_ok() {
    let caps = ft991_caps();
    let dialect = YaesuDialect::new();
    let mut cache = Cache::with_clock(crate::cache::DEFAULT_TTL, FakeClock::new());
    let mut port = MockPort::new()
      .expect("FA014074000;", "")
      .expect("FA;", "FA014074000;");
    set_and_verify(&mut port, &dialect, &caps, &mut cache, "FA014074000").unwrap();
  }

  #[test]
  fn fast_set_bypasses_verification() {
    let mut caps = ft991_caps();
    caps.fast_set_commands = true;
    let dialect = YaesuDialect::new();
    let mut cache = Cache::with_clock(crate::cache::DEFAULT_TTL, FakeClock::new());
    let mut port = MockPort::new().expect("FA014074000;", "");
    set_and_verify(&mut port, &dialect, &caps, &mut cache, "FA014074000").unwrap();
    assert_eq!(port.remaining(), 0);
  }

  #[test]
  fn commands_with_no_verify_mapping_fall_back_to_the_generic_probe() {
    let caps = ft991_caps();
    let dialect = YaesuDialect::new();
    let mut cache = Cache::with_clock(crate::cache::DEFAULT_TTL, FakeClock::new());
    let mut port = MockPort::new().expect("MD03;", "").expect("ID;", "ID0570;");
    set_and_verify(&mut port, &dialect, &caps, &mut cache, "MD03").unwrap();
    assert_eq!(port.remaining(), 0);
  }

  #[test]
  fn power_limit_rejection_on_pc_is_reported_specifically() {
    let caps = ft991_caps();
    let dialect = YaesuDialect::new();
    let mut cache = Cache::with_clock(crate::cache::DEFAULT_TTL, FakeClock::new());
    let mut port = MockPort::new().expect("PC100;", "").expect("PC;", "?;");
    let result = set_and_verify(&mut port, &dialect, &caps, &mut cache, "PC100");
    assert!(matches!(result, Err(Error::PowerLimit { .. })));
  }
}
