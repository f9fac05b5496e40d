//! C4: value <-> wire conversion. Pure functions; no I/O (spec §4.4).

pub mod calibration;
pub mod freq;
pub mod mode;
pub mod offset;
pub mod passband;
pub mod tone;

pub use calibration::CalTable;
pub use freq::FreqRange;
pub use mode::{Mode, ModeTable};
pub use offset::{OffsetBand, RepeaterOffsetTable};
pub use passband::{PassbandStaircase, PassbandTable, PASSBAND_NO_CHANGE};
pub use tone::ToneTable;
