//! VFO identity and alias resolution (spec §3 Cache, §4.7 Dispatcher).

use crate::error::{Error, Result};

/// A concrete, addressable VFO slot. `Mem` and `Other` round out the set of
/// rows the cache keeps independent timestamps for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vfo {
  MainA,
  MainB,
  MainC,
  SubA,
  SubB,
  SubC,
  Mem,
  /// Resolves against the dispatcher's notion of "the VFO I'm using right now".
  Curr,
  /// The VFO that is not `Curr` on rigs with exactly two receive VFOs.
  Other,
  /// Resolves against whichever VFO transmit is currently routed to.
  Tx,
  /// Resolves against whichever VFO receive is currently routed to (equal to
  /// `Curr` outside of split operation).
  Rx,
}

impl Vfo {
  /// All slots the cache maintains independent `(freq, mode, width)` rows and
  /// timestamps for. Aliases never appear here; they are resolved away before
  /// the cache is touched.
  pub const ADDRESSABLE: [Vfo; 7] = [
    Vfo::MainA,
    Vfo::MainB,
    Vfo::MainC,
    Vfo::SubA,
    Vfo::SubB,
    Vfo::SubC,
    Vfo::Mem,
  ];

  pub fn is_addressable(self) -> bool {
    matches!(
      self,
      Vfo::MainA | Vfo::MainB | Vfo::MainC | Vfo::SubA | Vfo::SubB | Vfo::SubC | Vfo::Mem
    )
  }

  pub fn is_alias(self) -> bool {
    !self.is_addressable()
  }
}

/// Tracks the dispatcher-level notions of "current" and "TX" VFO that
/// aliases resolve against, plus the `satmode` flag that remaps `Other`.
///
/// Per spec §4.7: "`Sub` maps to `SubA` in satmode" — in this engine `Other`
/// plays the role of the generic second-VFO alias (`Sub`) that needs the
/// satmode remap, since `Curr`/`Other` is the pair every dual-VFO rig shares.
#[derive(Debug, Clone, Copy)]
pub struct VfoTracker {
  pub current: Vfo,
  pub tx: Vfo,
  pub satmode: bool,
}

impl Default for VfoTracker {
  fn default() -> Self {
    VfoTracker {
      current: Vfo::MainA,
      tx: Vfo::MainA,
      satmode: false,
    }
  }
}

impl VfoTracker {
  /// Resolves an alias VFO to a concrete, addressable one. Concrete VFOs
  /// resolve to themselves. `Other` on a rig whose tracked current VFO is
  /// `MainC`/`SubC`/`Mem` has no defined pairing and comes back
  /// `UnresolvedVfo` rather than guessing.
  pub fn resolve(&self, vfo: Vfo) -> Result<Vfo> {
    match vfo {
      Vfo::Curr => Ok(self.current),
      Vfo::Rx => Ok(self.current),
      Vfo::Tx => Ok(self.tx),
      Vfo::Other => {
        if self.satmode {
          Ok(Vfo::SubA)
        } else {
          other_of(self.current).ok_or(Error::UnresolvedVfo(vfo))
        }
      }
      concrete => Ok(concrete),
    }
  }
}

/// The paired VFO for rigs with exactly one Main-A/Main-B (or Sub-A/Sub-B)
/// pair. `None` for rigs with three VFOs on one side: `Other` is undefined
/// at the dispatcher level there and callers must address `MainC`/`SubC`
/// explicitly.
fn other_of(v: Vfo) -> Option<Vfo> {
  match v {
    Vfo::MainA => Some(Vfo::MainB),
    Vfo::MainB => Some(Vfo::MainA),
    Vfo::SubA => Some(Vfo::SubB),
    Vfo::SubB => Some(Vfo::SubA),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn curr_resolves_to_tracked_current() {
    let t = VfoTracker {
      current: Vfo::MainB,
      tx: Vfo::MainA,
      satmode: false,
    };
    assert_eq!(t.resolve(Vfo::Curr).unwrap(), Vfo::MainB);
    assert_eq!(t.resolve(Vfo::Tx).unwrap(), Vfo::MainA);
  }

  #[test]
  fn other_resolves_to_paired_vfo() {
    let t = VfoTracker {
      current: Vfo::MainA,
      tx: Vfo::MainA,
      satmode: false,
    };
    assert_eq!(t.resolve(Vfo::Other).unwrap(), Vfo::MainB);
  }

  #[test]
  fn satmode_remaps_other_to_suba() {
    let t = VfoTracker {
      current: Vfo::MainA,
      tx: Vfo::MainA,
      satmode: true,
    };
    assert_eq!(t.resolve(Vfo::Other).unwrap(), Vfo::SubA);
  }

  #[test]
  fn concrete_vfo_is_identity() {
    let t = VfoTracker::default();
    assert_eq!(t.resolve(Vfo::SubC).unwrap(), Vfo::SubC);
  }

  #[test]
  fn other_is_unresolved_on_a_three_vfo_side() {
    let t = VfoTracker {
      current: Vfo::MainC,
      tx: Vfo::MainC,
      satmode: false,
    };
    assert!(matches!(t.resolve(Vfo::Other), Err(Error::UnresolvedVfo(Vfo::Other))));
  }
}
