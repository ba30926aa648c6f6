//! UI-facing state of the reconciliation, as one explicit object.

use crate::reconcile::{ReconcileOutcome, Reconciled};

/// Lifecycle of the most recent pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
  Idle,
  Running { generation: u64 },
  Done { generation: u64 },
}

/// Session context consumed by the presentation layer.
///
/// Each refresh starts a new pass with a fresh generation. Outcomes are
/// accepted only for the latest generation, so a slow earlier pass can
/// never overwrite a newer one.
#[derive(Debug)]
pub struct Session {
  entries: Vec<Reconciled>,
  pass: PassState,
  generation: u64,
  completed_passes: u64,
  online: bool,
  any_from_cache: bool,
}

impl Session {
  pub fn new(online: bool) -> Self {
    Self {
      entries: Vec::new(),
      pass: PassState::Idle,
      generation: 0,
      completed_passes: 0,
      online,
      any_from_cache: false,
    }
  }

  /// Start a new pass and return its generation
  pub fn begin_pass(&mut self) -> u64 {
    self.generation += 1;
    self.pass = PassState::Running {
      generation: self.generation,
    };
    self.generation
  }

  /// Apply a finished pass. Returns false when the outcome was superseded.
  pub fn finish_pass(&mut self, generation: u64, outcome: ReconcileOutcome) -> bool {
    if generation != self.generation {
      return false;
    }

    self.entries = outcome.entries;
    self.any_from_cache = outcome.any_from_cache;
    self.pass = PassState::Done { generation };
    self.completed_passes += 1;
    true
  }

  pub fn set_online(&mut self, online: bool) {
    self.online = online;
  }

  pub fn entries(&self) -> &[Reconciled] {
    &self.entries
  }

  pub fn pass(&self) -> PassState {
    self.pass
  }

  /// Nothing to show yet: the first pass is still running
  pub fn is_loading(&self) -> bool {
    self.is_refreshing() && self.completed_passes == 0
  }

  /// Any pass is in flight
  pub fn is_refreshing(&self) -> bool {
    matches!(self.pass(), PassState::Running { .. })
  }

  pub fn is_online(&self) -> bool {
    self.online
  }

  pub fn any_from_cache(&self) -> bool {
    self.any_from_cache
  }

  /// Offline banner: shown when offline or when anything came from cache
  pub fn show_banner(&self) -> bool {
    !self.online || self.any_from_cache
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::RecordOrigin;
  use crate::reconcile::testing::record;

  fn outcome(identifier: &str, origin: RecordOrigin) -> ReconcileOutcome {
    ReconcileOutcome {
      entries: vec![Reconciled {
        record: record(identifier, 1, "MIT"),
        origin,
      }],
      any_from_cache: origin == RecordOrigin::Cache,
    }
  }

  #[test]
  fn test_pass_lifecycle() {
    let mut session = Session::new(true);
    assert_eq!(session.pass(), PassState::Idle);
    assert!(!session.is_loading());

    let generation = session.begin_pass();
    assert_eq!(session.pass(), PassState::Running { generation });
    assert!(session.is_loading());
    assert!(session.is_refreshing());

    assert!(session.finish_pass(generation, outcome("a/b", RecordOrigin::Network)));
    assert_eq!(session.pass(), PassState::Done { generation });
    assert!(!session.is_loading());
    assert!(!session.is_refreshing());
    assert_eq!(session.entries().len(), 1);
  }

  #[test]
  fn test_refresh_is_not_loading() {
    let mut session = Session::new(true);
    let first = session.begin_pass();
    session.finish_pass(first, outcome("a/b", RecordOrigin::Network));

    session.begin_pass();
    assert!(session.is_refreshing());
    assert!(!session.is_loading());
    // previous results stay visible during a refresh
    assert_eq!(session.entries().len(), 1);
  }

  #[test]
  fn test_stale_pass_is_discarded() {
    let mut session = Session::new(true);
    let old = session.begin_pass();
    let new = session.begin_pass();

    assert!(session.finish_pass(new, outcome("new/one", RecordOrigin::Network)));
    assert!(!session.finish_pass(old, outcome("old/one", RecordOrigin::Cache)));

    assert_eq!(session.entries()[0].record.identifier, "new/one");
    assert!(!session.any_from_cache());
    assert_eq!(session.pass(), PassState::Done { generation: new });
  }

  #[test]
  fn test_stale_pass_does_not_end_running_pass() {
    let mut session = Session::new(true);
    let old = session.begin_pass();
    session.begin_pass();

    assert!(!session.finish_pass(old, outcome("old/one", RecordOrigin::Network)));
    assert!(session.is_refreshing());
  }

  #[test]
  fn test_banner() {
    let mut session = Session::new(true);
    assert!(!session.show_banner());

    let generation = session.begin_pass();
    session.finish_pass(generation, outcome("a/b", RecordOrigin::Cache));
    assert!(session.show_banner());

    let generation = session.begin_pass();
    session.finish_pass(generation, outcome("a/b", RecordOrigin::Network));
    assert!(!session.show_banner());

    session.set_online(false);
    assert!(session.show_banner());
  }
}
