//! A shared CAT (Computer Aided Transceiver) protocol engine for
//! amateur-radio rig control: one set of frame/retry/cache/set-verify rules
//! driving per-vendor dialects (Yaesu "new CAT" and Kenwood in full; Icom
//! CI-V and AOR at the interface level).
//!
//! [`rig::Rig`] is the surface applications use. Everything else
//! (`port`, `transaction`, `validator`, `codec`, `setverify`, `cache`,
//! `caps`, `events`, `vfo`) is the machinery it's built from, each module
//! named after the component it implements.

pub mod cache;
pub mod caps;
pub mod clock;
pub mod codec;
pub mod dialects;
pub mod error;
pub mod events;
pub mod port;
pub mod rig;
pub mod setverify;
pub mod transaction;
pub mod validator;
pub mod vfo;

pub use caps::{CapsRecord, CapsRegistry, Family};
pub use codec::Mode;
pub use error::{Error, Result};
pub use port::{Port, SerialParams, SerialPortHandle};
pub use rig::Rig;
pub use vfo::Vfo;
