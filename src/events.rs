//! C9: auto-information toggling and the "transaction in progress" flag
//! (spec §4.9).

use std::cell::Cell;

/// Tracks whether a transaction is currently in flight, so a future
/// spontaneous-transceive-frame listener (not implemented by this core;
/// AI-mode unsolicited frames are out of scope beyond this flag) knows not
/// to steal bytes mid-read. Also tracks whether auto-information (`AI`) is
/// currently enabled on the rig, which the engine keeps off by default
/// (spec GLOSSARY "AI / transceive").
#[derive(Debug, Default)]
pub struct EventState {
  transaction_active: Cell<bool>,
  auto_information: Cell<bool>,
}

impl EventState {
  pub fn new() -> Self {
    EventState::default()
  }

  pub fn transaction_active(&self) -> bool {
    self.transaction_active.get()
  }

  pub fn begin_transaction(&self) {
    self.transaction_active.set(true);
  }

  pub fn end_transaction(&self) {
    self.transaction_active.set(false);
  }

  pub fn auto_information_enabled(&self) -> bool {
    self.auto_information.get()
  }

  pub fn set_auto_information(&self, enabled: bool) {
    self.auto_information.set(enabled);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn transaction_flag_toggles() {
    let e = EventState::new();
    assert!(!e.transaction_active());
    e.begin_transaction();
    assert!(e.transaction_active());
    e.end_transaction();
    assert!(!e.transaction_active());
  }

  #[test]
  fn auto_information_defaults_off() {
    let e = EventState::new();
    assert!(!e.auto_information_enabled());
  }
}
