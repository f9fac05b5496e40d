//! C1: the byte-oriented transport. No protocol decisions happen here —
//! only bytes in, bytes out, and the fixed delays every CAT dialect needs
//! around writes.

use std::ffi::OsStr;
use std::io::{Read, Write};
use std::time::Duration;

use log::error;
use serialport::{DataBits, FlowControl, Parity, SerialPortSettings, StopBits};

use crate::error::{Error, Result};

/// Serial parameters a `CapsRecord` supplies; mirrors the fields the teacher
/// crate passed to `serialport::SerialPortSettings`.
#[derive(Debug, Clone, Copy)]
pub struct SerialParams {
  pub baud_rate: u32,
  pub data_bits: DataBits,
  pub stop_bits: StopBits,
  pub parity: Parity,
  pub flow_control: FlowControl,
  /// Per-operation read timeout.
  pub timeout: Duration,
}

impl Default for SerialParams {
  fn default() -> Self {
    SerialParams {
      baud_rate: 4800,
      data_bits: DataBits::Eight,
      stop_bits: StopBits::One,
      parity: Parity::None,
      flow_control: FlowControl::None,
      timeout: Duration::from_millis(1000),
    }
  }
}

/// The byte-oriented transport C2 drives. Implemented once over a real
/// serial port and once over a scripted in-memory transport for tests; C2
/// through C9 never need to know which.
pub trait Port {
  /// Discards any bytes sitting unread in the input buffer.
  fn flush(&mut self) -> Result<()>;

  /// Writes `bytes` atomically (best-effort), then sleeps `post_write_delay`
  /// before returning, as every dialect in this engine requires.
  fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

  /// Reads until any byte in `term` is seen (inclusive) or `max_len` bytes
  /// have been read or the port's timeout elapses, whichever comes first.
  /// Returns the bytes read, terminator included if one was found.
  fn read_until(&mut self, term: &[u8], max_len: usize) -> Result<Vec<u8>>;

  /// Reads exactly `n` bytes (used by the binary Icom/AOR framings).
  fn read_exact(&mut self, n: usize) -> Result<Vec<u8>>;

  fn write_delay(&self) -> Duration;
  fn post_write_delay(&self) -> Duration;
}

/// A real serial port, opened with `serialport` the way the teacher crate
/// opens its sensor link. Held as `Box<dyn SerialPort>` rather than a
/// concrete handle so Unix/Windows backends are interchangeable.
pub struct SerialPortHandle {
  inner: Box<dyn serialport::SerialPort>,
  write_delay: Duration,
  post_write_delay: Duration,
}

impl SerialPortHandle {
  pub fn open<P: AsRef<OsStr>>(
    device: P,
    params: SerialParams,
    write_delay: Duration,
    post_write_delay: Duration,
  ) -> Result<Self> {
    let settings = SerialPortSettings {
      baud_rate: params.baud_rate,
      data_bits: params.data_bits,
      flow_control: params.flow_control,
      parity: params.parity,
      stop_bits: params.stop_bits,
      timeout: params.timeout,
    };

    let inner =
      serialport::open_with_settings(device.as_ref(), &settings).map_err(Error::SerialPortError)?;

    Ok(SerialPortHandle {
      inner,
      write_delay,
      post_write_delay,
    })
  }
}

impl Port for SerialPortHandle {
  fn flush(&mut self) -> Result<()> {
    self
      .inner
      .clear(serialport::ClearBuffer::Input)
      .map_err(Error::SerialPortError)
  }

  fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
    if !self.write_delay.is_zero() {
      std::thread::sleep(self.write_delay);
    }
    self.inner.write_all(bytes).map_err(|e| {
      error!("SerialPortHandle::write_all: {}", e);
      Error::Io(e)
    })?;
    std::thread::sleep(self.post_write_delay);
    Ok(())
  }

  fn read_until(&mut self, term: &[u8], max_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut byte = [0u8; 1];
    while out.len() < max_len {
      match self.inner.read(&mut byte) {
        Ok(0) => break,
        Ok(_) => {
          out.push(byte[0]);
          if term.contains(&byte[0]) {
            break;
          }
        }
        Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
        Err(e) => return Err(Error::Io(e)),
      }
    }
    Ok(out)
  }

  fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; n];
    self.inner.read_exact(&mut out).map_err(Error::Io)?;
    Ok(out)
  }

  fn write_delay(&self) -> Duration {
    self.write_delay
  }

  fn post_write_delay(&self) -> Duration {
    self.post_write_delay
  }
}

/// A scripted transport used by the crate's own test suite. Each entry in
/// `expectations` is `(expected write, canned reply)`; a write that doesn't
/// match the next expectation panics immediately so a broken dialect shows
/// up as a failing assertion rather than a hang.
#[cfg(any(test, feature = "mock-port"))]
pub struct MockPort {
  expectations: std::collections::VecDeque<(Vec<u8>, Vec<u8>)>,
  pending_reply: std::collections::VecDeque<u8>,
  pub writes: Vec<Vec<u8>>,
  write_delay: Duration,
  post_write_delay: Duration,
}

#[cfg(any(test, feature = "mock-port"))]
impl MockPort {
  pub fn new() -> Self {
    MockPort {
      expectations: std::collections::VecDeque::new(),
      pending_reply: std::collections::VecDeque::new(),
      writes: Vec::new(),
      write_delay: Duration::from_millis(0),
      post_write_delay: Duration::from_millis(0),
    }
  }

  /// Queues one write/reply pair. `reply` may be empty to simulate a timeout.
  pub fn expect(mut self, write: &str, reply: &str) -> Self {
    self
      .expectations
      .push_back((write.as_bytes().to_vec(), reply.as_bytes().to_vec()));
    self
  }

  pub fn expect_bytes(mut self, write: Vec<u8>, reply: Vec<u8>) -> Self {
    self.expectations.push_back((write, reply));
    self
  }

  pub fn remaining(&self) -> usize {
    self.expectations.len()
  }
}

#[cfg(any(test, feature = "mock-port"))]
impl Port for MockPort {
  fn flush(&mut self) -> Result<()> {
    self.pending_reply.clear();
    Ok(())
  }

  fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
    self.writes.push(bytes.to_vec());
    let (expected, reply) = self.expectations.pop_front().unwrap_or_else(|| {
      panic!(
        "MockPort received unexpected write {:?} with no queued expectation",
        String::from_utf8_lossy(bytes)
      )
    });
    assert_eq!(
      expected,
      bytes,
      "MockPort write mismatch: expected {:?}, got {:?}",
      String::from_utf8_lossy(&expected),
      String::from_utf8_lossy(bytes)
    );
    self.pending_reply = reply.into_iter().collect();
    Ok(())
  }

  fn read_until(&mut self, term: &[u8], max_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    while out.len() < max_len {
      match self.pending_reply.pop_front() {
        Some(b) => {
          out.push(b);
          if term.contains(&b) {
            break;
          }
        }
        None => break,
      }
    }
    Ok(out)
  }

  fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
      out.push(self.pending_reply.pop_front().ok_or_else(|| {
        Error::Io(std::io::Error::new(
          std::io::ErrorKind::UnexpectedEof,
          "MockPort ran out of scripted bytes",
        ))
      })?);
    }
    Ok(out)
  }

  fn write_delay(&self) -> Duration {
    self.write_delay
  }

  fn post_write_delay(&self) -> Duration {
    self.post_write_delay
  }
}
