//! C2: frames a command on the wire, reads the reply, classifies it, and
//! retries according to the per-rig retry budget (spec §4.2).

use log::{debug, error, warn};

use crate::cache::Cache;
use crate::caps::CapsRecord;
use crate::clock::Clock;
use crate::dialects::Dialect;
use crate::error::{Error, Result};
use crate::port::Port;

/// How a reply (or its absence) was classified, before it is turned into an
/// `Error` or accepted as `Ok` (spec §3 Frame, §4.2 step 6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
  Ok,
  Rejected,
  Busy,
  Overflow,
  CommError,
  Timeout,
  /// Reply doesn't match the outstanding command's prefix, or is otherwise
  /// the wrong shape.
  Malformed,
}

/// Classifies a raw reply to `cmd` per the rules in spec §4.2 step 6. The
/// dialect decides whether a lone `?` means busy or rejected.
pub fn classify(dialect: &dyn Dialect, cmd: &str, caps: &CapsRecord, reply: &[u8]) -> Classification {
  if reply.is_empty() {
    return Classification::Timeout;
  }

  let text = String::from_utf8_lossy(reply);
  let body = text.trim_end_matches(|c: char| c == ';' || c == '\r' || c == '\n');

  if body.len() <= 1 && body.starts_with('?') {
    return if dialect.question_mark_means_busy(caps, cmd) {
      Classification::Busy
    } else {
      Classification::Rejected
    };
  }
  if body == "N" {
    return Classification::Rejected;
  }
  if body == "O" {
    return Classification::Overflow;
  }
  if body == "E" {
    return Classification::CommError;
  }

  let cmd_prefix: String = cmd.chars().take(2).collect();
  let reply_prefix: String = body.chars().take(2).collect();
  if cmd_prefix.len() == 2 && reply_prefix != cmd_prefix {
    return Classification::Malformed;
  }

  Classification::Ok
}

fn classification_to_error(cmd: &str, class: Classification) -> Option<Error> {
  match class {
    Classification::Ok => None,
    Classification::Rejected => Some(Error::Rejected { cmd: cmd.to_string() }),
    Classification::Busy => Some(Error::Busy { cmd: cmd.to_string() }),
    Classification::Overflow => Some(Error::Overflow { cmd: cmd.to_string() }),
    Classification::CommError => Some(Error::CommError { cmd: cmd.to_string() }),
    Classification::Timeout => Some(Error::Timeout { cmd: cmd.to_string() }),
    Classification::Malformed => Some(Error::Protocol {
      cmd: cmd.to_string(),
      reason: "reply prefix did not match the outstanding command".to_string(),
    }),
  }
}

/// True for dialect-specific heuristics marking `cmd` as a state-changing
/// "set": length > 2, or one of a short list of known 2-letter sets (spec
/// §4.2 step 2). This gates raw-IF cache invalidation, not the validator.
pub fn looks_like_set(cmd: &str) -> bool {
  const KNOWN_SHORT_SETS: [&str; 3] = ["RX", "TX", "AI"];
  cmd.len() > 2 || KNOWN_SHORT_SETS.contains(&cmd)
}

/// Writes `cmd` and its terminator with no reply read and no
/// classification. Used by [`crate::setverify`] for the initial write of a
/// command that has its own dedicated verify-command mapping, so the
/// generic auto-probe (step 5 below) isn't redundantly layered underneath
/// SetVerify's explicit verification.
pub fn write_only<P: Port>(port: &mut P, dialect: &dyn Dialect, cmd: &str) -> Result<()> {
  port.flush()?;
  let mut framed = cmd.as_bytes().to_vec();
  framed.extend_from_slice(dialect.terminator_bytes());
  port.write_all(&framed)
}

/// Runs one logical transaction: optional raw-IF cache short-circuit,
/// flush, write, read-and-classify, retry. `expect_reply` false means the
/// dispatcher doesn't want the command's own reply but still wants the
/// write verified by probing a cheap always-answered command (spec §4.2
/// step 5).
pub fn transaction<P: Port, C: Clock>(
  port: &mut P,
  dialect: &dyn Dialect,
  caps: &CapsRecord,
  cache: &mut Cache<C>,
  cmd: &str,
  expect_reply: bool,
) -> Result<Vec<u8>> {
  if !dialect.if_command().is_empty() && cmd.starts_with(dialect.if_command()) && expect_reply {
    if let Some((frame, _age)) = cache.read_raw_if() {
      debug!("transaction: serving {} from fresh raw-IF cache", cmd);
      return Ok(frame.into_bytes());
    }
  }

  if looks_like_set(cmd) {
    cache.invalidate_raw_if();
  }

  let mut attempt = 0u8;
  let mut rereads_left = 1u8;
  loop {
    attempt += 1;
    port.flush()?;

    let mut framed = cmd.as_bytes().to_vec();
    framed.extend_from_slice(dialect.terminator_bytes());
    port.write_all(&framed)?;

    let reply = if expect_reply {
      port.read_until(dialect.terminator_bytes(), dialect.max_reply_len())?
    } else {
      let probe = dialect.verify_probe();
      let mut probe_framed = probe.as_bytes().to_vec();
      probe_framed.extend_from_slice(dialect.terminator_bytes());
      port.write_all(&probe_framed)?;
      port.read_until(dialect.terminator_bytes(), dialect.max_reply_len())?
    };

    let classify_against = if expect_reply { cmd } else { dialect.verify_probe() };
    let mut class = classify(dialect, classify_against, caps, &reply);
    let mut reply = reply;
    debug!(
      "transaction: cmd={} attempt={} classification={:?}",
      cmd, attempt, class
    );

    // Spec §4.2 step 6: a prefix-mismatched reply gets one extra read on
    // the same exchange (no re-write) before we fall back to a full retry.
    while class == Classification::Malformed && rereads_left > 0 {
      rereads_left -= 1;
      debug!("transaction: {} reply malformed, re-reading once before retrying the write", cmd);
      reply = port.read_until(dialect.terminator_bytes(), dialect.max_reply_len())?;
      class = classify(dialect, classify_against, caps, &reply);
    }

    match classification_to_error(cmd, class) {
      None => return Ok(reply),
      Some(err) if err.is_retryable() && attempt < caps.retry => {
        warn!("transaction: retrying {} after {:?} (attempt {})", cmd, err, attempt);
        continue;
      }
      Some(err) => {
        error!("transaction: {} failed after {} attempt(s): {}", cmd, attempt, err);
        return Err(err);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clock::FakeClock;
  use crate::dialects::yaesu::YaesuDialect;
  use crate::dialects::yaesu::ft991_caps;
  use crate::port::MockPort;

  #[test]
  fn ok_reply_is_classified_ok() {
    let caps = ft991_caps();
    let dialect = YaesuDialect::new();
    let class = classify(&dialect, "FA", &caps, b"FA014074000;");
    assert_eq!(class, Classification::Ok);
  }

  #[test]
  fn n_reply_is_rejected() {
    let caps = ft991_caps();
    let dialect = YaesuDialect::new();
    assert_eq!(classify(&dialect, "MD", &caps, b"N;"), Classification::Rejected);
  }

  #[test]
  fn empty_reply_is_timeout() {
    let caps = ft991_caps();
    let dialect = YaesuDialect::new();
    assert_eq!(classify(&dialect, "FA", &caps, b""), Classification::Timeout);
  }

  #[test]
  fn transaction_retries_on_overflow_then_succeeds() {
    let caps = ft991_caps();
    let dialect = YaesuDialect::new();
    let mut cache = Cache::with_clock(crate::cache::DEFAULT_TTL, FakeClock::new());
    let mut port = MockPort::new()
      .expect("FA;", "O;")
      .expect("FA;", "FA014074000;");
    let result = transaction(&mut port, &dialect, &caps, &mut cache, "FA", true).unwrap();
    assert_eq!(result, b"FA014074000;");
  }

  #[test]
  fn transaction_gives_up_after_retry_budget() {
    let caps = ft991_caps();
    let dialect = YaesuDialect::new();
    let mut cache = Cache::with_clock(crate::cache::DEFAULT_TTL, FakeClock::new());
    let mut port = MockPort::new();
    for _ in 0..caps.retry {
      port = port.expect("FA;", "O;");
    }
    let result = transaction(&mut port, &dialect, &caps, &mut cache, "FA", true);
    assert!(matches!(result, Err(Error::Overflow { .. })));
  }
}
