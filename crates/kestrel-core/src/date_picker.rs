use chrono::{
  NaiveDate,
  NaiveDateTime
};
use tracing::debug;

use crate::calendar::{
  Calendar,
  CalendarOptions
};
use crate::controllable::Controllable;
use crate::datetime::format_date;
use crate::selection::{
  SelectionMode,
  SelectionValue
};
use crate::time_picker::TimeValue;

pub const DEFAULT_DATE_FORMAT: &str =
  "MMM d, yyyy";

#[derive(Debug, Clone)]
pub struct DatePickerOptions {
  pub calendar:    CalendarOptions,
  pub format:      String,
  pub placeholder: String,
  pub disabled:    bool,
  pub read_only:   bool,
  pub with_time:   bool
}

impl Default for DatePickerOptions {
  fn default() -> Self {
    Self {
      calendar:    CalendarOptions::default(),
      format:      DEFAULT_DATE_FORMAT
        .to_string(),
      placeholder: "Pick a date"
        .to_string(),
      disabled:    false,
      read_only:   false,
      with_time:   false
    }
  }
}

/// What a picker interaction asks the
/// host to report.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct PickerEvent {
  pub selection:   Option<SelectionValue>,
  pub open_change: Option<bool>
}

impl PickerEvent {
  pub fn is_empty(&self) -> bool {
    self.selection.is_none()
      && self.open_change.is_none()
  }
}

/// Input/trigger wrapper around a
/// calendar popup. States are closed and
/// open.
#[derive(Debug, Clone)]
pub struct DatePicker {
  calendar:    Calendar,
  open:        Controllable<bool>,
  format:      String,
  placeholder: String,
  disabled:    bool,
  read_only:   bool,
  time:        Option<TimeValue>
}

impl DatePicker {
  pub fn new(
    options: DatePickerOptions,
    value: Option<SelectionValue>,
    default: Option<SelectionValue>,
    open: Option<bool>,
    today: NaiveDate
  ) -> Self {
    Self {
      calendar:    Calendar::new(
        options.calendar,
        value,
        default,
        today
      ),
      open:        Controllable::from_props(
        open, false
      ),
      format:      options.format,
      placeholder: options.placeholder,
      disabled:    options.disabled,
      read_only:   options.read_only,
      time:        options
        .with_time
        .then(TimeValue::default)
    }
  }

  pub fn calendar(&self) -> &Calendar {
    &self.calendar
  }

  pub fn calendar_mut(
    &mut self
  ) -> &mut Calendar {
    &mut self.calendar
  }

  pub fn is_open(&self) -> bool {
    *self.open.get()
  }

  pub fn is_interactive(&self) -> bool {
    !self.disabled && !self.read_only
  }

  fn request_open(
    &mut self,
    next: bool
  ) -> Option<bool> {
    let change =
      self.open.propose(next).into_change();
    if change == Some(true)
      && !self.open.is_controlled()
      && let Some(first) = self
        .calendar
        .selected()
        .first()
        .copied()
    {
      self.calendar.show_month_of(first);
    }
    change
  }

  /// Trigger or input click.
  pub fn toggle(
    &mut self
  ) -> Option<bool> {
    if !self.is_interactive() {
      debug!(
        disabled = self.disabled,
        read_only = self.read_only,
        "ignored toggle on inert picker"
      );
      return None;
    }
    let next = !self.is_open();
    self.request_open(next)
  }

  /// Click that landed outside the open
  /// popup.
  pub fn on_outside_click(
    &mut self
  ) -> Option<bool> {
    if !self.is_open() {
      return None;
    }
    self.request_open(false)
  }

  /// Selecting a day. Single mode closes
  /// the popup after a successful pick;
  /// multiple and range keep it open.
  pub fn on_date_click(
    &mut self,
    date: NaiveDate
  ) -> PickerEvent {
    if self.calendar.is_disabled(date) {
      return PickerEvent::default();
    }

    let selection =
      self.calendar.on_date_click(date);
    let open_change = if self
      .calendar
      .mode()
      .keeps_popup_open()
    {
      None
    } else {
      self.request_open(false)
    };

    PickerEvent {
      selection,
      open_change
    }
  }

  pub fn clear(&mut self) -> PickerEvent {
    PickerEvent {
      selection:   self.calendar.clear(),
      open_change: None
    }
  }

  pub fn sync_open(
    &mut self,
    open: bool
  ) -> bool {
    self.open.sync(open)
  }

  pub fn sync_value(
    &mut self,
    value: SelectionValue
  ) -> bool {
    self.calendar.sync_value(value)
  }

  pub fn time(&self) -> Option<TimeValue> {
    self.time
  }

  /// Updates the time of day when the
  /// picker was built with a time field.
  pub fn set_time(
    &mut self,
    time: TimeValue
  ) -> Option<NaiveDateTime> {
    let slot = self.time.as_mut()?;
    *slot = time;
    self.selected_datetime()
  }

  /// First selected day combined with the
  /// picked time, midnight when no time
  /// field is shown.
  pub fn selected_datetime(
    &self
  ) -> Option<NaiveDateTime> {
    let date =
      *self.calendar.selected().first()?;
    Some(match self.time {
      | Some(time) => time.compose(date),
      | None => {
        date.and_time(
          chrono::NaiveTime::MIN
        )
      }
    })
  }

  /// Text shown on the trigger.
  pub fn display_text(&self) -> String {
    let selected = self.calendar.selected();
    let fmt =
      |d: &NaiveDate| format_date(*d, &self.format);

    match (self.calendar.mode(), selected) {
      | (_, []) => self.placeholder.clone(),
      | (SelectionMode::Range, [start]) => {
        format!("{} - ...", fmt(start))
      }
      | (
        SelectionMode::Range,
        [start, end, ..]
      ) => {
        format!(
          "{} - {}",
          fmt(start),
          fmt(end)
        )
      }
      | (SelectionMode::Multiple, [one]) => {
        fmt(one)
      }
      | (SelectionMode::Multiple, many) => {
        format!(
          "{} dates selected",
          many.len()
        )
      }
      | (SelectionMode::Single, [first, ..]) => {
        match self.time {
          | Some(time) => {
            format!(
              "{} {}",
              fmt(first),
              time
            )
          }
          | None => fmt(first)
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::selection::DateConstraints;
  use crate::time_picker::Meridiem;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  fn picker(
    mode: SelectionMode
  ) -> DatePicker {
    DatePicker::new(
      DatePickerOptions {
        calendar: CalendarOptions {
          mode,
          ..CalendarOptions::default()
        },
        ..DatePickerOptions::default()
      },
      None,
      None,
      None,
      date(2026, 10, 18)
    )
  }

  #[test]
  fn single_selection_closes_popup() {
    let mut p =
      picker(SelectionMode::Single);
    assert_eq!(p.toggle(), Some(true));
    let event =
      p.on_date_click(date(2026, 10, 20));
    assert_eq!(event.open_change, Some(false));
    assert!(!p.is_open());
    assert_eq!(
      event.selection,
      Some(SelectionValue::Single(Some(
        date(2026, 10, 20)
      )))
    );
    assert_eq!(
      p.display_text(),
      "Oct 20, 2026"
    );
  }

  #[test]
  fn multiple_selection_keeps_popup_open()
  {
    let mut p =
      picker(SelectionMode::Multiple);
    p.toggle();
    let event =
      p.on_date_click(date(2026, 10, 20));
    assert!(event.open_change.is_none());
    assert!(p.is_open());
    p.on_date_click(date(2026, 10, 22));
    assert_eq!(
      p.display_text(),
      "2 dates selected"
    );
  }

  #[test]
  fn outside_click_closes_only_when_open()
  {
    let mut p =
      picker(SelectionMode::Range);
    assert!(p.on_outside_click().is_none());
    p.toggle();
    assert_eq!(
      p.on_outside_click(),
      Some(false)
    );
    assert!(!p.is_open());
  }

  #[test]
  fn inert_pickers_ignore_trigger() {
    let mut p = DatePicker::new(
      DatePickerOptions {
        read_only: true,
        ..DatePickerOptions::default()
      },
      None,
      None,
      None,
      date(2026, 10, 18)
    );
    assert!(p.toggle().is_none());
    assert!(!p.is_open());
    assert_eq!(p.display_text(), "Pick a date");
  }

  #[test]
  fn controlled_open_is_requested() {
    let mut p = DatePicker::new(
      DatePickerOptions::default(),
      None,
      None,
      Some(false),
      date(2026, 10, 18)
    );
    assert_eq!(p.toggle(), Some(true));
    assert!(!p.is_open());
    assert!(p.sync_open(true));
    assert!(p.is_open());
    let event =
      p.on_date_click(date(2026, 10, 2));
    assert_eq!(event.open_change, Some(false));
    assert!(p.is_open());
  }

  #[test]
  fn disabled_day_does_nothing() {
    let mut p = DatePicker::new(
      DatePickerOptions {
        calendar: CalendarOptions {
          constraints:
            DateConstraints::default()
              .with_max(date(2026, 10, 31)),
          ..CalendarOptions::default()
        },
        ..DatePickerOptions::default()
      },
      None,
      None,
      None,
      date(2026, 10, 18)
    );
    p.toggle();
    let event =
      p.on_date_click(date(2026, 11, 1));
    assert!(event.is_empty());
    assert!(p.is_open());
  }

  #[test]
  fn time_field_composes_datetime() {
    let mut p = DatePicker::new(
      DatePickerOptions {
        with_time: true,
        ..DatePickerOptions::default()
      },
      None,
      None,
      None,
      date(2026, 10, 18)
    );
    assert!(p.selected_datetime().is_none());
    p.on_date_click(date(2026, 10, 19));
    let composed = p.set_time(
      TimeValue::new(
        6,
        30,
        Meridiem::Pm
      )
      .expect("valid"),
    );
    assert_eq!(
      composed.map(|dt| {
        dt.format("%Y-%m-%dT%H:%M")
          .to_string()
      }),
      Some("2026-10-19T18:30".to_string())
    );
    assert_eq!(
      p.display_text(),
      "Oct 19, 2026 6:30 PM"
    );
  }
}
