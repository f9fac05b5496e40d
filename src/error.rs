use err_derive::Error;

use crate::vfo::Vfo;

/// Every failure mode the engine can surface, from codec-level argument
/// rejection through wire classification to port I/O.
///
/// Retryable classes (`Overflow`, `CommError`, `Timeout`, `Busy`, and
/// `Protocol` while attempts remain) are distinct from terminal ones
/// (`Rejected`, `Unavailable`, `Invalid`, `Io`) so the retry loop in
/// [`crate::transaction`] is exhaustive without guesswork.
#[derive(Debug, Error)]
#[error(no_from)]
pub enum Error {
  /// `cmd` is not in this rig's capability table.
  #[error(display = "command {} is not available on this rig", cmd)]
  Unavailable { cmd: &'static str },

  /// An argument was out of range before it ever reached the wire.
  #[error(display = "invalid argument for {}: {}", cmd, reason)]
  Invalid { cmd: &'static str, reason: String },

  /// The rig returned `N;` (or dialect equivalent): command recognized,
  /// data rejected. Never retried.
  #[error(display = "rig rejected command {}", cmd)]
  Rejected { cmd: String },

  /// The rig returned `?;` and the active dialect treats that as
  /// busy-retry rather than outright rejection.
  #[error(display = "rig busy processing command {}", cmd)]
  Busy { cmd: String },

  /// The rig returned `O;`: internal buffer overflow. Retried.
  #[error(display = "rig reported overflow for command {}", cmd)]
  Overflow { cmd: String },

  /// The rig returned `E;`: internal communication error. Retried.
  #[error(display = "rig reported a communication error for command {}", cmd)]
  CommError { cmd: String },

  /// No terminator arrived within the port timeout. Retried.
  #[error(display = "timed out waiting for a reply to {}", cmd)]
  Timeout { cmd: String },

  /// Reply was malformed, had the wrong prefix, or a set-verify
  /// comparison failed after all commands were sent.
  #[error(display = "protocol error on {}: {}", cmd, reason)]
  Protocol { cmd: String, reason: String },

  /// A `set` to a power-limited command (`PC`) was rejected by the rig.
  #[error(display = "rig refused power level for command {}", cmd)]
  PowerLimit { cmd: String },

  /// Port-level failure (serial I/O). Fatal for the transaction.
  #[error(display = "port I/O error: {}", _0)]
  Io(#[error(source)] std::io::Error),

  /// Failure opening or configuring the underlying serial port.
  #[error(display = "serial port error: {}", _0)]
  SerialPortError(#[error(source)] serialport::Error),

  /// A VFO alias could not be resolved because the dispatcher has no
  /// current/TX VFO recorded yet (e.g. before the open sequence ran).
  #[error(display = "cannot resolve VFO alias {:?} before the rig is opened", _0)]
  UnresolvedVfo(Vfo),
}

/// Returns true if this error class should be retried by [`crate::transaction`]
/// or [`crate::setverify`], given attempts remaining.
impl Error {
  pub fn is_retryable(&self) -> bool {
    matches!(
      self,
      Error::Busy { .. }
        | Error::Overflow { .. }
        | Error::CommError { .. }
        | Error::Timeout { .. }
        | Error::Protocol { .. }
    )
  }
}

pub type Result<T> = std::result::Result<T, Error>;
