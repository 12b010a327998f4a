use serde::Serialize;

/// Default distance below the viewport top
/// used as the probe line.
pub const DEFAULT_SPY_OFFSET: f64 = 80.0;

#[derive(
  Debug, Clone, PartialEq, Serialize,
)]
pub struct SectionBounds {
  pub id:     String,
  pub top:    f64,
  pub height: f64
}

impl SectionBounds {
  pub fn new(
    id: &str,
    top: f64,
    height: f64
  ) -> Self {
    Self {
      id: id.to_string(),
      top,
      height
    }
  }
}

/// Last section whose top sits above the
/// probe line. Sections need not be
/// sorted.
pub fn active_section(
  sections: &[SectionBounds],
  scroll_y: f64,
  offset: f64
) -> Option<&str> {
  let probe = scroll_y + offset;
  sections
    .iter()
    .filter(|s| s.top <= probe)
    .max_by(|a, b| a.top.total_cmp(&b.top))
    .map(|s| s.id.as_str())
}

/// Document y to scroll to so `id` lands
/// just below the offset.
pub fn scroll_target(
  sections: &[SectionBounds],
  id: &str,
  offset: f64
) -> Option<f64> {
  sections
    .iter()
    .find(|s| s.id == id)
    .map(|s| (s.top - offset).max(0.0))
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Default,
  Serialize,
)]
pub struct NavItemRect {
  pub left:  f64,
  pub width: f64
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Default,
  Serialize,
)]
pub struct SliderIndicator {
  pub left:    f64,
  pub width:   f64,
  pub visible: bool
}

impl SliderIndicator {
  pub fn style(&self) -> String {
    format!(
      "transform: translateX({:.1}px); width: {:.1}px; opacity: {};",
      self.left,
      self.width,
      if self.visible { 1 } else { 0 }
    )
  }
}

/// Indicator under the active nav item,
/// relative to the container's left edge.
pub fn slider_indicator(
  container_left: f64,
  items: &[NavItemRect],
  active: Option<usize>
) -> SliderIndicator {
  match active.and_then(|idx| items.get(idx)) {
    | Some(rect) => {
      SliderIndicator {
        left:    rect.left - container_left,
        width:   rect.width,
        visible: true
      }
    }
    | None => SliderIndicator::default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sections() -> Vec<SectionBounds> {
    vec![
      SectionBounds::new("hero", 0.0, 600.0),
      SectionBounds::new(
        "features", 600.0, 800.0
      ),
      SectionBounds::new(
        "pricing", 1400.0, 500.0
      ),
    ]
  }

  #[test]
  fn picks_last_section_above_probe() {
    let s = sections();
    assert_eq!(
      active_section(&s, 0.0, 80.0),
      Some("hero")
    );
    assert_eq!(
      active_section(&s, 530.0, 80.0),
      Some("features")
    );
    assert_eq!(
      active_section(&s, 5_000.0, 80.0),
      Some("pricing")
    );
    assert_eq!(
      active_section(&s[1..], 0.0, 80.0),
      None
    );
  }

  #[test]
  fn missing_section_has_no_target() {
    let s = sections();
    assert_eq!(
      scroll_target(&s, "pricing", 80.0),
      Some(1320.0)
    );
    assert_eq!(
      scroll_target(&s, "hero", 80.0),
      Some(0.0)
    );
    assert!(
      scroll_target(&s, "blog", 80.0).is_none()
    );
  }

  #[test]
  fn indicator_tracks_active_item() {
    let items = [
      NavItemRect {
        left:  110.0,
        width: 60.0
      },
      NavItemRect {
        left:  180.0,
        width: 90.0
      },
    ];
    let ind =
      slider_indicator(100.0, &items, Some(1));
    assert_eq!(ind.left, 80.0);
    assert_eq!(ind.width, 90.0);
    assert!(ind.visible);
    assert!(
      !slider_indicator(100.0, &items, Some(5))
        .visible
    );
  }
}
