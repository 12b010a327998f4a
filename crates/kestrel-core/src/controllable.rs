/// A piece of component state that is
/// either owned by the component
/// (`Uncontrolled`) or driven by its
/// caller (`Controlled`). The variant is
/// fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Controllable<T> {
  Controlled { value: T },
  Uncontrolled { value: T }
}

/// Outcome of proposing a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proposal<T> {
  /// The holder applied the value itself.
  Applied(T),
  /// The caller owns the value and must
  /// sync it back to make it stick.
  Requested(T),
  /// The proposed value equals the
  /// current one.
  Unchanged
}

impl<T> Proposal<T> {
  /// The value that should be reported to
  /// a change callback, if any.
  pub fn into_change(self) -> Option<T> {
    match self {
      | Proposal::Applied(value)
      | Proposal::Requested(value) => {
        Some(value)
      }
      | Proposal::Unchanged => None
    }
  }
}

impl<T: Clone + PartialEq> Controllable<T> {
  /// Resolves the holder from an optional
  /// externally supplied value and the
  /// component's default.
  pub fn from_props(
    value: Option<T>,
    default: T
  ) -> Self {
    match value {
      | Some(value) => {
        Controllable::Controlled {
          value
        }
      }
      | None => {
        Controllable::Uncontrolled {
          value: default
        }
      }
    }
  }

  pub fn get(&self) -> &T {
    match self {
      | Controllable::Controlled {
        value
      }
      | Controllable::Uncontrolled {
        value
      } => value
    }
  }

  pub fn is_controlled(&self) -> bool {
    matches!(
      self,
      Controllable::Controlled { .. }
    )
  }

  pub fn propose(
    &mut self,
    next: T
  ) -> Proposal<T> {
    if *self.get() == next {
      return Proposal::Unchanged;
    }

    match self {
      | Controllable::Controlled {
        ..
      } => Proposal::Requested(next),
      | Controllable::Uncontrolled {
        value
      } => {
        *value = next.clone();
        Proposal::Applied(next)
      }
    }
  }

  /// Accepts a new external value. Only
  /// controlled holders follow their
  /// caller; returns whether the value
  /// changed.
  pub fn sync(
    &mut self,
    external: T
  ) -> bool {
    match self {
      | Controllable::Controlled {
        value
      } if *value != external => {
        *value = external;
        true
      }
      | _ => false
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn uncontrolled_applies_proposals() {
    let mut open =
      Controllable::from_props(
        None, false
      );
    assert!(!open.is_controlled());
    assert_eq!(
      open.propose(true),
      Proposal::Applied(true)
    );
    assert!(*open.get());
    assert_eq!(
      open.propose(true),
      Proposal::Unchanged
    );
    assert!(!open.sync(false));
    assert!(*open.get());
  }

  #[test]
  fn controlled_only_requests() {
    let mut open =
      Controllable::from_props(
        Some(false),
        true
      );
    assert!(open.is_controlled());
    assert_eq!(
      open.propose(true),
      Proposal::Requested(true)
    );
    assert!(!*open.get());
    assert!(open.sync(true));
    assert!(*open.get());
  }
}
