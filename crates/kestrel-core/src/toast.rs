use chrono::{
  DateTime,
  Duration,
  Utc
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_TOAST_LIMIT: usize = 3;
pub const DEFAULT_TOAST_DURATION_MS: i64 =
  5_000;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
  #[default]
  Default,
  Success,
  Warning,
  Error
}

impl ToastVariant {
  pub fn class_name(
    self
  ) -> &'static str {
    match self {
      | ToastVariant::Default => {
        "toast"
      }
      | ToastVariant::Success => {
        "toast toast-success"
      }
      | ToastVariant::Warning => {
        "toast toast-warning"
      }
      | ToastVariant::Error => {
        "toast toast-error"
      }
    }
  }
}

#[derive(
  Debug, Clone, PartialEq, Serialize,
)]
pub struct Toast {
  pub id:          Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub variant:     ToastVariant,
  pub created_at:  DateTime<Utc>,
  /// Zero keeps the toast until it is
  /// dismissed.
  pub duration_ms: i64
}

impl Toast {
  pub fn expires_at(
    &self
  ) -> Option<DateTime<Utc>> {
    (self.duration_ms > 0).then(|| {
      self.created_at
        + Duration::milliseconds(
          self.duration_ms
        )
    })
  }
}

#[derive(Debug, Clone, Default)]
pub struct ToastInput {
  pub title:       String,
  pub description: Option<String>,
  pub variant:     ToastVariant,
  pub duration_ms: Option<i64>
}

impl ToastInput {
  pub fn new(title: &str) -> Self {
    Self {
      title: title.to_string(),
      ..Self::default()
    }
  }

  #[must_use]
  pub fn description(
    mut self,
    description: &str
  ) -> Self {
    self.description =
      Some(description.to_string());
    self
  }

  #[must_use]
  pub fn variant(
    mut self,
    variant: ToastVariant
  ) -> Self {
    self.variant = variant;
    self
  }

  #[must_use]
  pub fn sticky(mut self) -> Self {
    self.duration_ms = Some(0);
    self
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToastQueue {
  toasts: Vec<Toast>,
  limit:  usize
}

impl Default for ToastQueue {
  fn default() -> Self {
    Self::new(DEFAULT_TOAST_LIMIT)
  }
}

impl ToastQueue {
  pub fn new(limit: usize) -> Self {
    Self {
      toasts: Vec::new(),
      limit:  limit.max(1)
    }
  }

  pub fn toasts(&self) -> &[Toast] {
    &self.toasts
  }

  /// Adds a toast; the oldest ones are
  /// dropped beyond the visible limit.
  pub fn push(
    &mut self,
    input: ToastInput,
    now: DateTime<Utc>
  ) -> Uuid {
    let toast = Toast {
      id:          Uuid::new_v4(),
      title:       input.title,
      description: input.description,
      variant:     input.variant,
      created_at:  now,
      duration_ms: input
        .duration_ms
        .unwrap_or(
          DEFAULT_TOAST_DURATION_MS
        )
        .max(0)
    };
    let id = toast.id;
    self.toasts.push(toast);

    if self.toasts.len() > self.limit {
      let overflow =
        self.toasts.len() - self.limit;
      debug!(overflow, "dropping oldest toasts");
      self.toasts.drain(..overflow);
    }
    id
  }

  pub fn dismiss(
    &mut self,
    id: Uuid
  ) -> bool {
    let before = self.toasts.len();
    self.toasts.retain(|t| t.id != id);
    before != self.toasts.len()
  }

  pub fn clear(&mut self) {
    self.toasts.clear();
  }

  /// Drops expired toasts; returns how
  /// many were removed.
  pub fn expire(
    &mut self,
    now: DateTime<Utc>
  ) -> usize {
    let before = self.toasts.len();
    self.toasts.retain(|toast| {
      toast
        .expires_at()
        .is_none_or(|at| at > now)
    });
    before - self.toasts.len()
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn now() -> DateTime<Utc> {
    Utc
      .with_ymd_and_hms(2026, 10, 18, 9, 0, 0)
      .single()
      .expect("valid now")
  }

  #[test]
  fn limit_drops_oldest() {
    let mut queue = ToastQueue::new(2);
    let first = queue
      .push(ToastInput::new("one"), now());
    queue.push(ToastInput::new("two"), now());
    queue.push(ToastInput::new("three"), now());
    assert_eq!(queue.toasts().len(), 2);
    assert!(!queue.dismiss(first));
    assert_eq!(queue.toasts()[0].title, "two");
  }

  #[test]
  fn expire_keeps_sticky_toasts() {
    let mut queue = ToastQueue::default();
    queue.push(
      ToastInput::new("saved")
        .variant(ToastVariant::Success),
      now()
    );
    let sticky = queue.push(
      ToastInput::new("offline")
        .description("retrying")
        .variant(ToastVariant::Error)
        .sticky(),
      now()
    );

    assert_eq!(
      queue.expire(
        now() + Duration::milliseconds(4_999)
      ),
      0
    );
    assert_eq!(
      queue.expire(
        now() + Duration::seconds(5)
      ),
      1
    );
    assert_eq!(queue.toasts()[0].id, sticky);
    assert!(queue.dismiss(sticky));
    assert!(queue.toasts().is_empty());
  }
}
