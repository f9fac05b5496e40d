//! C7: the polymorphic `Rig` dispatcher (spec §4.7). Bundles a `Port`, the
//! model's `CapsRecord`, a `Dialect`, a `Cache`, the VFO tracker, and the
//! auto-information/transaction-in-progress flags into the one surface
//! applications call.

use std::cell::Cell;
use std::time::Duration;

use log::{debug, info, warn};

use crate::cache::Cache;
use crate::caps::{CapsRecord, CapsRegistry, Family};
use crate::clock::{Clock, RealClock, Sleeper, ThreadSleeper};
use crate::codec::freq::{decode_ascii_freq, round_to_step};
use crate::codec::mode::Mode;
use crate::dialects::{aor, icom, kenwood, yaesu, Dialect};
use crate::error::{Error, Result};
use crate::events::EventState;
use crate::port::Port;
use crate::setverify;
use crate::transaction;
use crate::vfo::{Vfo, VfoTracker};

fn dialect_for(caps: &CapsRecord) -> Box<dyn Dialect> {
  match caps.family {
    Family::Yaesu if caps.model_id == yaesu::FT9000 => Box::new(yaesu::Ft9000Dialect::new()),
    Family::Yaesu => Box::new(yaesu::YaesuDialect::new()),
    Family::Kenwood => Box::new(kenwood::KenwoodDialect::new()),
    Family::Icom => Box::new(icom::IcomDialect),
    Family::Aor => Box::new(aor::AorDialect),
  }
}

/// Maps a concrete VFO to the Yaesu/Kenwood `A`/`B` letter `FA`/`FB` address.
/// Rigs in this engine never address `MainC`/`SubC`/`Mem` through the
/// frequency commands; those return `Unavailable`.
fn vfo_letter(vfo: Vfo) -> Result<char> {
  match vfo {
    Vfo::MainA | Vfo::SubA => Ok('A'),
    Vfo::MainB | Vfo::SubB => Ok('B'),
    other => Err(Error::Unavailable {
      cmd: match other {
        Vfo::MainC | Vfo::SubC => "FC",
        Vfo::Mem => "MR",
        _ => "FA",
      },
    }),
  }
}

fn freq_cmd_for(vfo: Vfo) -> Result<&'static str> {
  Ok(match vfo_letter(vfo)? {
    'A' => "FA",
    _ => "FB",
  })
}

fn parse_freq_reply(reply: &[u8], cmd_prefix: &str) -> Result<u64> {
  let text = String::from_utf8_lossy(reply);
  let body = text.trim_end_matches(';');
  let digits = body.strip_prefix(cmd_prefix).ok_or_else(|| Error::Protocol {
    cmd: cmd_prefix.to_string(),
    reason: format!("reply {:?} missing {} prefix", body, cmd_prefix),
  })?;
  decode_ascii_freq(digits)
}

/// A live handle on one physical rig: exactly one per spec §3 "Rig".
pub struct Rig<P: Port, C: Clock = RealClock, S: Sleeper = ThreadSleeper> {
  port: P,
  caps: &'static CapsRecord,
  dialect: Box<dyn Dialect>,
  cache: Cache<C>,
  vfo: VfoTracker,
  events: EventState,
  sleeper: S,
  /// Per-Rig "does this rig actually answer `PS;`" belief, optimistic until
  /// the first rejection (spec §8 scenario 4). Distinct from
  /// `caps.has_powerstat`, which only says the model is known to carry the
  /// command at all.
  ps_probe_ok: Cell<bool>,
  ts590s_slow_firmware: Cell<bool>,
}

impl<P: Port> Rig<P, RealClock, ThreadSleeper> {
  /// Opens a handle for `model_id` over `port` using real time and real
  /// sleeps.
  pub fn new(port: P, model_id: u32) -> Result<Self> {
    Rig::with_clock_and_sleeper(port, model_id, RealClock, ThreadSleeper)
  }
}

impl<P: Port, C: Clock, S: Sleeper> Rig<P, C, S> {
  /// Opens a handle using injected time/sleep sources, for tests that need
  /// to assert on timing without blocking.
  pub fn with_clock_and_sleeper(port: P, model_id: u32, clock: C, sleeper: S) -> Result<Self> {
    let caps = CapsRegistry::global()
      .lookup(model_id)
      .ok_or(Error::Unavailable { cmd: "model_id" })?;
    Ok(Rig {
      port,
      caps,
      dialect: dialect_for(caps),
      cache: Cache::with_clock(crate::cache::DEFAULT_TTL, clock),
      vfo: VfoTracker::default(),
      events: EventState::new(),
      sleeper,
      ps_probe_ok: Cell::new(true),
      ts590s_slow_firmware: Cell::new(false),
    })
  }

  pub fn caps(&self) -> &'static CapsRecord {
    self.caps
  }

  /// Open sequence (spec §4.7): identify the rig, detect quirks, silence
  /// auto-information, and seed the cache from the current VFO.
  pub fn open(&mut self) -> Result<()> {
    self.events.begin_transaction();
    let id_result = transaction::transaction(
      &mut self.port,
      self.dialect.as_ref(),
      self.caps,
      &mut self.cache,
      "ID",
      true,
    );
    match id_result {
      Ok(reply) => {
        info!("open: identified rig via ID ({:?})", String::from_utf8_lossy(&reply));
      }
      Err(e) => {
        debug!("open: ID probe failed ({}), falling back to FA", e);
        let fa_reply =
          transaction::transaction(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, "FA", true)?;
        if self.caps.model_id == kenwood::TS2000 {
          info!(
            "open: synthesizing {} from the FA echo (no ID reply)",
            kenwood::TS2000_SYNTHETIC_ID
          );
        }
        let _ = fa_reply;
      }
    }

    if self.caps.model_id == kenwood::TS590S && self.caps.supports("FV") {
      match transaction::transaction(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, "FV", true) {
        Ok(reply) => {
          info!("open: TS-590S firmware probe returned {:?}", String::from_utf8_lossy(&reply));
          self.ts590s_slow_firmware.set(true);
        }
        Err(e) => warn!("open: TS-590S firmware probe failed: {}", e),
      }
    }

    if self.caps.supports("AI") {
      setverify::set_and_verify(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, "AI0")?;
      self.events.set_auto_information(false);
    }

    // Best-effort: seed the cache with the current VFO. A failure here
    // (e.g. the model doesn't expose FA) must not fail `open` itself.
    if let Err(e) = self.get_freq(Vfo::Curr) {
      debug!("open: could not seed current-VFO frequency cache: {}", e);
    }

    self.events.end_transaction();
    Ok(())
  }

  /// Close sequence (spec §4.7): restore AI, optionally power off.
  pub fn close(&mut self, power_off: bool) -> Result<()> {
    if self.caps.supports("AI") {
      if let Err(e) = setverify::set_and_verify(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, "AI0")
      {
        warn!("close: failed to restore AI state: {}", e);
      }
    }
    if power_off {
      self.set_powerstat(false)?;
    }
    Ok(())
  }

  pub fn set_freq(&mut self, vfo: Vfo, hz: u64) -> Result<()> {
    let vfo = self.vfo.resolve(vfo)?;
    let cmd_prefix = freq_cmd_for(vfo)?;
    crate::validator::ensure_supported(self.caps, cmd_prefix)?;
    self.caps.freq_range_tx.validate(hz)?;

    if !self.caps.ptt_off_settle.is_zero() {
      debug!("set_freq: sleeping {:?} for the PTT-off settle quirk", self.caps.ptt_off_settle);
      self.sleeper.sleep(self.caps.ptt_off_settle);
    }

    let rounded = round_to_step(hz, self.caps.freq_step_hz);
    let encoded = crate::codec::freq::encode_ascii_freq(rounded, self.caps.freq_digits, self.caps.freq_step_hz)?;

    let band_changed = self.caps.family == Family::Yaesu
      && self
        .cache
        .read_freq(vfo)
        .and_then(|(old, _)| yaesu::bandstack_index(old).zip(yaesu::bandstack_index(rounded)))
        .map(|(old_idx, new_idx)| old_idx != new_idx)
        .unwrap_or(false);

    if band_changed {
      let new_idx = yaesu::bandstack_index(rounded).unwrap_or(0);
      let bs_cmd = format!("BS{:02}", new_idx);
      transaction::write_only(&mut self.port, self.dialect.as_ref(), &bs_cmd)?;
      self.cache.invalidate_all();
    }

    let cmd = format!("{}{}", cmd_prefix, encoded);
    setverify::set_and_verify(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, &cmd)?;
    self.cache.write_freq(vfo, rounded);

    if band_changed {
      debug!("set_freq: band change settle, sleeping 500ms");
      self.sleeper.sleep(Duration::from_millis(500));
    }

    Ok(())
  }

  pub fn get_freq(&mut self, vfo: Vfo) -> Result<u64> {
    let vfo = self.vfo.resolve(vfo)?;
    let cmd = freq_cmd_for(vfo)?;
    crate::validator::ensure_supported(self.caps, cmd)?;
    if let Some((hz, _age)) = self.cache.read_freq(vfo) {
      return Ok(hz);
    }
    let reply = transaction::transaction(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, cmd, true)?;
    let hz = parse_freq_reply(&reply, cmd)?;
    self.cache.write_freq(vfo, hz);
    Ok(hz)
  }

  pub fn set_mode(&mut self, vfo: Vfo, mode: Mode, width_hz: Option<u32>) -> Result<()> {
    let vfo = self.vfo.resolve(vfo)?;
    crate::validator::ensure_supported(self.caps, "MD")?;
    let code = self.caps.mode_table.encode(mode)?;
    let vfo_digit = if vfo_letter(vfo)? == 'A' { '0' } else { '1' };
    let cmd = format!("MD{}{}", vfo_digit, code);
    setverify::set_and_verify(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, &cmd)?;
    self.cache.write_mode(vfo, mode);

    if let Some(requested) = width_hz {
      self.set_width(vfo, requested)?;
    }
    Ok(())
  }

  pub fn get_mode(&mut self, vfo: Vfo) -> Result<Mode> {
    let vfo = self.vfo.resolve(vfo)?;
    crate::validator::ensure_supported(self.caps, "MD")?;
    if let Some((mode, _age)) = self.cache.read_mode(vfo) {
      return Ok(mode);
    }
    let vfo_digit = if vfo_letter(vfo)? == 'A' { '0' } else { '1' };
    let cmd = format!("MD{}", vfo_digit);
    let reply = transaction::transaction(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, &cmd, true)?;
    let text = String::from_utf8_lossy(&reply);
    let body = text.trim_end_matches(';');
    let code = body.chars().last().ok_or_else(|| Error::Protocol {
      cmd: "MD".to_string(),
      reason: format!("empty mode reply {:?}", body),
    })?;
    let mode = self.caps.mode_table.decode(code)?;
    self.cache.write_mode(vfo, mode);
    Ok(mode)
  }

  pub fn set_width(&mut self, vfo: Vfo, width_hz: u32) -> Result<()> {
    let vfo = self.vfo.resolve(vfo)?;
    crate::validator::ensure_supported(self.caps, "SH")?;
    let mode = self.get_mode(vfo)?;
    let (actual_width, wire_index) = self.caps.passbands.encode(mode, width_hz)?;
    let vfo_digit = if vfo_letter(vfo)? == 'A' { '0' } else { '1' };
    let cmd = format!("SH{}{:02}", vfo_digit, wire_index);
    setverify::set_and_verify(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, &cmd)?;
    self.cache.write_width(vfo, actual_width);
    Ok(())
  }

  pub fn get_width(&mut self, vfo: Vfo) -> Result<u32> {
    let vfo = self.vfo.resolve(vfo)?;
    crate::validator::ensure_supported(self.caps, "SH")?;
    if let Some((width, _age)) = self.cache.read_width(vfo) {
      return Ok(width);
    }
    let mode = self.get_mode(vfo)?;
    let vfo_digit = if vfo_letter(vfo)? == 'A' { '0' } else { '1' };
    let cmd = format!("SH{}", vfo_digit);
    let reply = transaction::transaction(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, &cmd, true)?;
    let text = String::from_utf8_lossy(&reply);
    let body = text.trim_end_matches(';');
    let idx: u8 = body[body.len().saturating_sub(2)..].parse().map_err(|_| Error::Protocol {
      cmd: "SH".to_string(),
      reason: format!("could not parse passband index from {:?}", body),
    })?;
    let width = self.caps.passbands.decode(mode, idx)?;
    self.cache.write_width(vfo, width);
    Ok(width)
  }

  pub fn set_ptt(&mut self, on: bool) -> Result<()> {
    let cmd = if on { "TX" } else { "RX" };
    crate::validator::ensure_supported(self.caps, cmd)?;
    setverify::set_and_verify(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, cmd)?;
    self.cache.write_ptt(on);
    Ok(())
  }

  /// Polls the rig's raw `IF` frame (spec §4.2 step 1) and seeds the raw-IF
  /// cache slot so the next read-class transaction for this dialect's
  /// `if_command()` can short-circuit onto it instead of hitting the wire.
  /// This engine stops at the raw frame: per spec §9 open question (c), the
  /// PTT/split bits packed inside it are not decoded back out, so
  /// `get_ptt`/`get_split` still answer from their own dedicated cache
  /// slots rather than from this frame.
  pub fn get_if(&mut self) -> Result<String> {
    let cmd = self.dialect.if_command();
    crate::validator::ensure_supported(self.caps, cmd)?;
    let reply = transaction::transaction(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, cmd, true)?;
    let text = String::from_utf8_lossy(&reply).into_owned();
    let body = text.trim_end_matches(';');
    if !self.caps.accepts_if_len(body.len()) {
      return Err(Error::Protocol {
        cmd: cmd.to_string(),
        reason: format!("IF reply length {} not in {:?}", body.len(), self.caps.if_response_lens),
      });
    }
    self.cache.write_raw_if(text.clone());
    Ok(text)
  }

  /// PTT status is only known from a prior `set_ptt` or a parsed IF frame;
  /// this engine does not decode IF fields beyond the raw-IF cache
  /// short-circuit (spec §9 open question (c)), so an unknown PTT state
  /// surfaces as `Unavailable` rather than guessing.
  pub fn get_ptt(&mut self) -> Result<bool> {
    self.cache.read_ptt().map(|(v, _)| v).ok_or(Error::Unavailable { cmd: "TX" })
  }

  /// Split uses Yaesu/Kenwood's `FT` ("function TX") command to choose
  /// which VFO transmits, reusing the `FT→FT` verify mapping already in
  /// the dialect table.
  pub fn set_split(&mut self, active: bool, tx_vfo: Vfo) -> Result<()> {
    crate::validator::ensure_supported(self.caps, "FT")?;
    let tx_resolved = self.vfo.resolve(tx_vfo)?;
    let digit = if active && vfo_letter(tx_resolved)? == 'B' { '1' } else { '0' };
    let cmd = format!("FT{}", digit);
    setverify::set_and_verify(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, &cmd)?;
    self.cache.write_split(active, tx_resolved);
    self.vfo.tx = if active { tx_resolved } else { self.vfo.current };
    Ok(())
  }

  pub fn get_split(&mut self) -> Result<(bool, Vfo)> {
    self.cache.read_split().map(|(v, _)| v).ok_or(Error::Unavailable { cmd: "FT" })
  }

  /// `set_powerstat(On)` performs the wake dance (spec §8 scenario 3);
  /// `set_powerstat(Off)` is a single `PS0;`.
  pub fn set_powerstat(&mut self, on: bool) -> Result<()> {
    crate::validator::ensure_supported(self.caps, "PS")?;
    if !on {
      transaction::write_only(&mut self.port, self.dialect.as_ref(), "PS0")?;
      self.cache.invalidate_all();
      return Ok(());
    }

    info!("set_powerstat: waking rig");
    transaction::write_only(&mut self.port, self.dialect.as_ref(), "PS1")?;
    self.sleeper.sleep(Duration::from_millis(1200));
    transaction::write_only(&mut self.port, self.dialect.as_ref(), "PS1")?;

    for attempt in 1..=8u8 {
      self.sleeper.sleep(Duration::from_secs(1));
      match transaction::transaction(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, "FA", true) {
        Ok(reply) if parse_freq_reply(&reply, "FA").is_ok() => {
          info!("set_powerstat: rig awake after {} poll(s)", attempt);
          return Ok(());
        }
        Ok(_) => continue,
        Err(e) => {
          debug!("set_powerstat: wake poll {} failed: {}", attempt, e);
          continue;
        }
      }
    }
    Err(Error::Timeout { cmd: "PS1".to_string() })
  }

  /// Per-Rig `PS` belief (spec §8 scenario 4): optimistic until the rig
  /// rejects it once, then short-circuits without touching the wire.
  pub fn get_powerstat(&mut self) -> Result<bool> {
    if !self.ps_probe_ok.get() {
      return Err(Error::Unavailable { cmd: "PS" });
    }
    crate::validator::ensure_supported(self.caps, "PS")?;
    match transaction::transaction(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, "PS", true) {
      Ok(reply) => {
        let text = String::from_utf8_lossy(&reply);
        Ok(text.trim_end_matches(';') == "PS1")
      }
      Err(Error::Rejected { .. }) => {
        warn!("get_powerstat: rig rejected PS, disabling further probes on this Rig");
        self.ps_probe_ok.set(false);
        Err(Error::Unavailable { cmd: "PS" })
      }
      Err(e) => Err(e),
    }
  }

  /// S-meter level (spec §3 "levels/functions"): reads the raw `SM0`
  /// strength value and runs it through the model's calibration curve
  /// (grounded on `kenwood.c`'s `RIG_LEVEL_RAWSTR`/`RIG_LEVEL_STRENGTH`
  /// handling of the `SM0` reply, generalized here to one dBm reading
  /// rather than separate raw/calibrated accessors).
  pub fn get_level(&mut self) -> Result<f32> {
    crate::validator::ensure_supported(self.caps, "SM")?;
    let reply =
      transaction::transaction(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, "SM0", true)?;
    let text = String::from_utf8_lossy(&reply);
    let body = text.trim_end_matches(';');
    let digits = body.strip_prefix("SM0").ok_or_else(|| Error::Protocol {
      cmd: "SM".to_string(),
      reason: format!("reply {:?} missing SM0 prefix", body),
    })?;
    let raw: i32 = digits.parse().map_err(|_| Error::Protocol {
      cmd: "SM".to_string(),
      reason: format!("could not parse S-meter raw value from {:?}", digits),
    })?;
    Ok(self.caps.s_meter.interpolate(raw))
  }

  /// CTCSS tone (spec §3 "levels/functions"; wire command grounded on
  /// `kenwood.c`'s `CN%02d` DCS/tone-number family, reused here for CTCSS
  /// since both are the same "1-based index into a fixed table" shape).
  pub fn get_tone(&mut self) -> Result<u32> {
    crate::validator::ensure_supported(self.caps, "CN")?;
    let reply =
      transaction::transaction(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, "CN", true)?;
    let text = String::from_utf8_lossy(&reply);
    let body = text.trim_end_matches(';');
    let digits = body.strip_prefix("CN").ok_or_else(|| Error::Protocol {
      cmd: "CN".to_string(),
      reason: format!("reply {:?} missing CN prefix", body),
    })?;
    let idx: usize = digits.parse().map_err(|_| Error::Protocol {
      cmd: "CN".to_string(),
      reason: format!("could not parse tone index from {:?}", digits),
    })?;
    self.caps.tones.tone_of(idx.saturating_sub(1))
  }

  pub fn set_tone(&mut self, tone_tenths_hz: u32) -> Result<()> {
    crate::validator::ensure_supported(self.caps, "CN")?;
    let idx = self.caps.tones.index_of(tone_tenths_hz)?;
    let cmd = format!("CN{:02}", idx + 1);
    setverify::set_and_verify(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, &cmd)
  }

  /// Repeater offset (spec §8 scenario 5): resolves `(rig_id, band)` via
  /// the offset table, then writes `EX<cmd><offset>` through SetVerify
  /// (which skips verification for `EX`, per the Yaesu verify-command
  /// table).
  pub fn set_rptr_offs(&mut self, vfo: Vfo, offset_hz: u64) -> Result<()> {
    let vfo = self.vfo.resolve(vfo)?;
    let freq = self.get_freq(vfo)?;
    let band = yaesu::offset_band_for_freq(freq);
    let (cmd_prefix, step) = self.caps.offsets.lookup(self.caps.model_id, band)?;
    let encoded = crate::codec::offset::encode_offset(offset_hz, step)?;
    let cmd = format!("{}{}", cmd_prefix, encoded);
    setverify::set_and_verify(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, &cmd)?;
    // The repeater-offset menu command isn't one of the cached fields, but
    // its step size depends on band, so a stale frequency read could pair
    // with the wrong offset. Drop just this VFO's row rather than the whole
    // cache.
    self.cache.invalidate_vfo(vfo);
    Ok(())
  }

  /// Morse playback (spec §8 scenario 6): poll `KY;` until the rig signals
  /// ready (`KY0;`/`KY2;`), retrying on `KY1;` (busy), then write the text
  /// left-padded to 28 bytes after `KY `.
  pub fn send_morse(&mut self, text: &str) -> Result<()> {
    crate::validator::ensure_supported(self.caps, "KY")?;
    if text.len() > 50 {
      return Err(Error::Invalid {
        cmd: "KY",
        reason: format!("morse text is {} bytes, limit is 50", text.len()),
      });
    }

    let mut attempt = 0u8;
    loop {
      attempt += 1;
      let reply = transaction::transaction(&mut self.port, self.dialect.as_ref(), self.caps, &mut self.cache, "KY", true)?;
      let reply_text = String::from_utf8_lossy(&reply);
      let body = reply_text.trim_end_matches(';');
      match body {
        "KY0" | "KY2" => break,
        "KY1" => {
          if attempt >= self.caps.retry {
            return Err(Error::Busy { cmd: "KY".to_string() });
          }
          warn!("send_morse: KY buffer busy, retrying poll ({}/{})", attempt, self.caps.retry);
          continue;
        }
        _ => {
          return Err(Error::Protocol {
            cmd: "KY".to_string(),
            reason: format!("unexpected KY poll reply {:?}", body),
          })
        }
      }
    }

    let padded = format!("{:<28}", text);
    let cmd = format!("KY {}", padded);
    transaction::write_only(&mut self.port, self.dialect.as_ref(), &cmd)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clock::{FakeClock, RecordingSleeper};
  use crate::port::MockPort;

  fn ft991_rig(port: MockPort) -> Rig<MockPort, FakeClock, RecordingSleeper> {
    Rig {
      port,
      caps: crate::caps::CapsRegistry::global().lookup(yaesu::FT991).unwrap(),
      dialect: Box::new(yaesu::YaesuDialect::new()),
      cache: Cache::with_clock(crate::cache::DEFAULT_TTL, FakeClock::new()),
      vfo: VfoTracker::default(),
      events: EventState::new(),
      sleeper: RecordingSleeper::new(),
      ps_probe_ok: Cell::new(true),
      ts590s_slow_firmware: Cell::new(false),
    }
  }

  fn ts450_rig(port: MockPort) -> Rig<MockPort, FakeClock, RecordingSleeper> {
    Rig {
      port,
      caps: crate::caps::CapsRegistry::global().lookup(kenwood::TS450).unwrap(),
      dialect: Box::new(kenwood::KenwoodDialect::new()),
      cache: Cache::with_clock(crate::cache::DEFAULT_TTL, FakeClock::new()),
      vfo: VfoTracker::default(),
      events: EventState::new(),
      sleeper: RecordingSleeper::new(),
      ps_probe_ok: Cell::new(true),
      ts590s_slow_firmware: Cell::new(false),
    }
  }

  #[test]
  fn scenario_1_set_then_get_freq_round_trip() {
    let port = MockPort::new()
      .expect("FA014074000;", "")
      .expect("FA;", "FA014074000;");
    let mut rig = ft991_rig(port);
    rig.set_freq(Vfo::MainA, 14_074_000).unwrap();
    assert_eq!(rig.get_freq(Vfo::MainA).unwrap(), 14_074_000);
  }

  #[test]
  fn scenario_2_band_change_emits_bs_then_fa_and_settles() {
    let port = MockPort::new()
      .expect("BS05;", "")
      .expect("FA014074000;", "")
      .expect("FA;", "FA014074000;");
    let mut rig = ft991_rig(port);
    rig.cache.write_freq(Vfo::MainA, 3_573_000);

    rig.set_freq(Vfo::MainA, 14_074_000).unwrap();

    assert_eq!(rig.sleeper.durations(), vec![Duration::from_millis(500)]);
    assert_eq!(rig.get_freq(Vfo::MainA).unwrap(), 14_074_000);
  }

  #[test]
  fn scenario_3_power_on_dance() {
    let port = MockPort::new()
      .expect("PS1;", "")
      .expect("PS1;", "")
      .expect("FA;", "")
      .expect("FA;", "FA014074000;");
    let mut rig = ft991_rig(port);

    rig.set_powerstat(true).unwrap();

    let sleeps = rig.sleeper.durations();
    assert_eq!(sleeps[0], Duration::from_millis(1200));
    assert!(sleeps[1..].iter().all(|d| *d == Duration::from_secs(1)));
  }

  #[test]
  fn scenario_4_rejected_powerstat_short_circuits_after_first_try() {
    let port = MockPort::new().expect("PS;", "N;");
    let mut rig = ts450_rig(port);

    let first = rig.get_powerstat();
    assert!(matches!(first, Err(Error::Unavailable { .. })));

    // Second call must not touch the wire: MockPort has no expectation left
    // and would panic on an unexpected write.
    let second = rig.get_powerstat();
    assert!(matches!(second, Err(Error::Unavailable { .. })));
  }

  #[test]
  fn scenario_5_repeater_offset_by_band() {
    let port = MockPort::new().expect("EX0820600;", "").expect("ID;", "ID0570;");
    let mut rig = ft991_rig(port);
    rig.cache.write_freq(Vfo::MainA, 144_300_000);

    rig.set_rptr_offs(Vfo::MainA, 600_000).unwrap();
  }

  #[test]
  fn scenario_5_repeater_offset_ft450_uses_3_digit_step() {
    let port = MockPort::new().expect("EX050006;", "").expect("ID;", "ID0450;");
    let caps = crate::caps::CapsRegistry::global().lookup(yaesu::FT450).unwrap();
    let mut rig = Rig {
      port,
      caps,
      dialect: Box::new(yaesu::YaesuDialect::new()),
      cache: Cache::with_clock(crate::cache::DEFAULT_TTL, FakeClock::new()),
      vfo: VfoTracker::default(),
      events: EventState::new(),
      sleeper: RecordingSleeper::new(),
      ps_probe_ok: Cell::new(true),
      ts590s_slow_firmware: Cell::new(false),
    };
    rig.cache.write_freq(Vfo::MainA, 29_600_000);

    rig.set_rptr_offs(Vfo::MainA, 600_000).unwrap();
  }

  #[test]
  fn scenario_6_morse_playback_pads_to_28_bytes() {
    let port = MockPort::new()
      .expect("KY;", "KY0;")
      .expect("KY CQ CQ DE W1AW               ;", "");
    let mut rig = ft991_rig(port);

    rig.send_morse("CQ CQ DE W1AW").unwrap();
  }

  #[test]
  fn morse_retries_while_busy() {
    let port = MockPort::new()
      .expect("KY;", "KY1;")
      .expect("KY;", "KY0;")
      .expect("KY CQ                          ;", "");
    let mut rig = ft991_rig(port);

    rig.send_morse("CQ").unwrap();
  }

  #[test]
  fn morse_text_over_50_bytes_is_invalid_before_touching_wire() {
    let port = MockPort::new();
    let mut rig = ft991_rig(port);
    let long = "A".repeat(51);
    assert!(matches!(rig.send_morse(&long), Err(Error::Invalid { .. })));
  }

  #[test]
  fn unsupported_command_never_touches_wire() {
    let port = MockPort::new();
    let mut rig = ts450_rig(port);
    // TS-450 predates split via FT in this engine's table.
    let result = rig.set_split(true, Vfo::MainB);
    assert!(matches!(result, Err(Error::Unavailable { .. })));
  }

  #[test]
  fn get_if_seeds_the_raw_if_cache_and_is_served_from_it_next_time() {
    let body = format!("IF{}", "0".repeat(25));
    assert_eq!(body.len(), 27);
    let reply = format!("{};", body);
    let port = MockPort::new().expect("IF;", &reply);
    let mut rig = ft991_rig(port);

    assert_eq!(rig.get_if().unwrap(), reply);
    assert!(rig.cache.read_raw_if().is_some());
    // No further MockPort expectations were scripted: a second `IF`
    // transaction must be served from the cache short-circuit, not the wire.
    assert_eq!(rig.get_if().unwrap(), reply);
  }

  #[test]
  fn get_if_rejects_a_reply_length_outside_the_model_table() {
    let reply = "IF00;".to_string();
    let port = MockPort::new().expect("IF;", &reply);
    let mut rig = ft991_rig(port);
    assert!(matches!(rig.get_if(), Err(Error::Protocol { .. })));
  }

  #[test]
  fn get_ptt_without_a_prior_set_is_unavailable() {
    let port = MockPort::new();
    let mut rig = ft991_rig(port);
    assert!(matches!(rig.get_ptt(), Err(Error::Unavailable { .. })));
  }

  #[test]
  fn set_ptt_then_get_ptt_round_trips_from_cache() {
    let port = MockPort::new().expect("TX;", "").expect("TX;", "TX;");
    let mut rig = ft991_rig(port);
    rig.set_ptt(true).unwrap();
    assert!(rig.get_ptt().unwrap());
  }

  #[test]
  fn get_level_reads_raw_s_meter_through_calibration() {
    let port = MockPort::new().expect("SM0;", "SM0102;");
    let mut rig = ft991_rig(port);
    assert_eq!(rig.get_level().unwrap(), -18.0);
  }

  #[test]
  fn get_tone_decodes_index_from_table() {
    let port = MockPort::new().expect("CN;", "CN08;");
    let mut rig = ft991_rig(port);
    assert_eq!(rig.get_tone().unwrap(), 854);
  }

  #[test]
  fn set_tone_looks_up_index_and_verifies() {
    let port = MockPort::new().expect("CN08;", "").expect("CN;", "CN08;");
    let mut rig = ft991_rig(port);
    rig.set_tone(854).unwrap();
  }

  #[test]
  fn set_tone_rejects_a_tone_outside_the_table() {
    let port = MockPort::new();
    let mut rig = ft991_rig(port);
    assert!(matches!(rig.set_tone(9999), Err(Error::Invalid { .. })));
  }
}
