use serde::{
  Deserialize,
  Serialize
};

use crate::controllable::Controllable;

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct TabItem {
  pub value:    String,
  pub label:    String,
  #[serde(default)]
  pub disabled: bool
}

impl TabItem {
  pub fn new(
    value: &str,
    label: &str
  ) -> Self {
    Self {
      value:    value.to_string(),
      label:    label.to_string(),
      disabled: false
    }
  }

  #[must_use]
  pub fn disabled(mut self) -> Self {
    self.disabled = true;
    self
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub enum Orientation {
  #[default]
  Horizontal,
  Vertical
}

#[derive(Debug, Clone)]
pub struct Tabs {
  items:       Vec<TabItem>,
  active:      Controllable<String>,
  orientation: Orientation
}

impl Tabs {
  /// Without a controlled `value` or a
  /// `default`, the first enabled tab is
  /// active.
  pub fn new(
    items: Vec<TabItem>,
    value: Option<String>,
    default: Option<String>,
    orientation: Orientation
  ) -> Self {
    let fallback = default
      .or_else(|| {
        items
          .iter()
          .find(|tab| !tab.disabled)
          .map(|tab| tab.value.clone())
      })
      .unwrap_or_default();
    Self {
      items,
      active: Controllable::from_props(
        value, fallback
      ),
      orientation
    }
  }

  pub fn items(&self) -> &[TabItem] {
    &self.items
  }

  pub fn active(&self) -> &str {
    self.active.get()
  }

  pub fn is_active(
    &self,
    value: &str
  ) -> bool {
    self.active() == value
  }

  /// Returns the value to report when the
  /// tab exists, is enabled and differs
  /// from the active one.
  pub fn select(
    &mut self,
    value: &str
  ) -> Option<String> {
    let tab = self
      .items
      .iter()
      .find(|tab| tab.value == value)?;
    if tab.disabled {
      return None;
    }
    self
      .active
      .propose(tab.value.clone())
      .into_change()
  }

  pub fn sync(
    &mut self,
    value: String
  ) -> bool {
    self.active.sync(value)
  }

  fn enabled_indices(&self) -> Vec<usize> {
    self
      .items
      .iter()
      .enumerate()
      .filter(|(_, tab)| !tab.disabled)
      .map(|(idx, _)| idx)
      .collect()
  }

  /// Roving focus over enabled tabs.
  /// Arrow keys wrap; Home/End jump.
  pub fn handle_key(
    &mut self,
    key: &str
  ) -> Option<String> {
    let enabled = self.enabled_indices();
    if enabled.is_empty() {
      return None;
    }
    let position = enabled.iter().position(
      |idx| {
        self.items[*idx].value
          == *self.active.get()
      }
    );

    let (next_key, prev_key) =
      match self.orientation {
        | Orientation::Horizontal => {
          ("ArrowRight", "ArrowLeft")
        }
        | Orientation::Vertical => {
          ("ArrowDown", "ArrowUp")
        }
      };

    let target = if key == next_key {
      match position {
        | Some(pos) => {
          enabled[(pos + 1) % enabled.len()]
        }
        | None => enabled[0]
      }
    } else if key == prev_key {
      match position {
        | Some(pos) => {
          enabled[(pos + enabled.len() - 1)
            % enabled.len()]
        }
        | None => enabled[enabled.len() - 1]
      }
    } else if key == "Home" {
      enabled[0]
    } else if key == "End" {
      enabled[enabled.len() - 1]
    } else {
      return None;
    };

    let value = self.items[target].value.clone();
    self.select(&value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tabs() -> Tabs {
    Tabs::new(
      vec![
        TabItem::new("overview", "Overview"),
        TabItem::new("pricing", "Pricing")
          .disabled(),
        TabItem::new("faq", "FAQ"),
      ],
      None,
      None,
      Orientation::Horizontal
    )
  }

  #[test]
  fn defaults_to_first_enabled_tab() {
    let t = tabs();
    assert_eq!(t.active(), "overview");
  }

  #[test]
  fn select_ignores_disabled_and_unknown() {
    let mut t = tabs();
    assert!(t.select("pricing").is_none());
    assert!(t.select("missing").is_none());
    assert!(t.select("overview").is_none());
    assert_eq!(
      t.select("faq").as_deref(),
      Some("faq")
    );
    assert!(t.is_active("faq"));
  }

  #[test]
  fn arrow_keys_skip_disabled_and_wrap() {
    let mut t = tabs();
    assert_eq!(
      t.handle_key("ArrowRight").as_deref(),
      Some("faq")
    );
    assert_eq!(
      t.handle_key("ArrowRight").as_deref(),
      Some("overview")
    );
    assert_eq!(
      t.handle_key("ArrowLeft").as_deref(),
      Some("faq")
    );
    assert_eq!(
      t.handle_key("Home").as_deref(),
      Some("overview")
    );
    assert!(t.handle_key("ArrowDown").is_none());
  }

  #[test]
  fn controlled_tabs_wait_for_owner() {
    let mut t = Tabs::new(
      vec![
        TabItem::new("a", "A"),
        TabItem::new("b", "B"),
      ],
      Some("a".to_string()),
      None,
      Orientation::Vertical
    );
    assert_eq!(
      t.handle_key("ArrowDown").as_deref(),
      Some("b")
    );
    assert_eq!(t.active(), "a");
    assert!(t.sync("b".to_string()));
    assert_eq!(t.active(), "b");
  }
}
