use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{
  Datelike,
  NaiveDate,
  Weekday
};
use serde::{
  Deserialize,
  Serialize
};

use crate::datetime::is_same_day;

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
pub enum SelectionMode {
  #[default]
  Single,
  Multiple,
  Range
}

impl SelectionMode {
  pub fn as_key(self) -> &'static str {
    match self {
      | SelectionMode::Single => "single",
      | SelectionMode::Multiple => {
        "multiple"
      }
      | SelectionMode::Range => "range"
    }
  }

  /// Modes where one click does not
  /// finish the interaction.
  pub fn keeps_popup_open(self) -> bool {
    !matches!(
      self,
      SelectionMode::Single
    )
  }
}

impl fmt::Display for SelectionMode {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_key())
  }
}

impl FromStr for SelectionMode {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "single" => {
        Ok(SelectionMode::Single)
      }
      | "multiple" | "multi" => {
        Ok(SelectionMode::Multiple)
      }
      | "range" => {
        Ok(SelectionMode::Range)
      }
      | other => {
        Err(anyhow!(
          "unknown selection mode: \
           {other}"
        ))
      }
    }
  }
}

/// Read-only inputs that gate click
/// handling.
#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct DateConstraints {
  #[serde(default)]
  pub min:               Option<NaiveDate>,
  #[serde(default)]
  pub max:               Option<NaiveDate>,
  #[serde(default)]
  pub disabled:          BTreeSet<NaiveDate>,
  #[serde(default)]
  pub disabled_weekdays: Vec<Weekday>
}

impl DateConstraints {
  #[must_use]
  pub fn with_min(
    mut self,
    min: NaiveDate
  ) -> Self {
    self.min = Some(min);
    self
  }

  #[must_use]
  pub fn with_max(
    mut self,
    max: NaiveDate
  ) -> Self {
    self.max = Some(max);
    self
  }

  #[must_use]
  pub fn with_disabled<I>(
    mut self,
    dates: I
  ) -> Self
  where
    I: IntoIterator<Item = NaiveDate>
  {
    self.disabled.extend(dates);
    self
  }

  #[must_use]
  pub fn with_disabled_weekdays<I>(
    mut self,
    days: I
  ) -> Self
  where
    I: IntoIterator<Item = Weekday>
  {
    self
      .disabled_weekdays
      .extend(days);
    self
  }

  pub fn is_disabled(
    &self,
    date: NaiveDate
  ) -> bool {
    if let Some(min) = self.min
      && date < min
    {
      return true;
    }
    if let Some(max) = self.max
      && date > max
    {
      return true;
    }
    if self
      .disabled_weekdays
      .contains(&date.weekday())
    {
      return true;
    }
    self
      .disabled
      .iter()
      .any(|d| is_same_day(*d, date))
  }
}

/// Selection as reported to consumers:
/// a date-or-null in single mode, a list
/// otherwise.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(untagged)]
pub enum SelectionValue {
  Single(Option<NaiveDate>),
  Many(Vec<NaiveDate>)
}

impl SelectionValue {
  pub fn from_dates(
    mode: SelectionMode,
    dates: &[NaiveDate]
  ) -> Self {
    match mode {
      | SelectionMode::Single => {
        SelectionValue::Single(
          dates.first().copied()
        )
      }
      | SelectionMode::Multiple
      | SelectionMode::Range => {
        SelectionValue::Many(
          dates.to_vec()
        )
      }
    }
  }

  /// Flattens the value into the internal
  /// list, enforcing the mode's
  /// invariants.
  pub fn into_dates(
    self,
    mode: SelectionMode
  ) -> Vec<NaiveDate> {
    let raw = match self {
      | SelectionValue::Single(date) => {
        date.into_iter().collect()
      }
      | SelectionValue::Many(dates) => {
        dates
      }
    };
    normalize(mode, raw)
  }
}

/// Brings an arbitrary list in line with
/// the mode: at most one date for single,
/// unique days for multiple, an ordered
/// pair at most for range.
pub fn normalize(
  mode: SelectionMode,
  dates: Vec<NaiveDate>
) -> Vec<NaiveDate> {
  match mode {
    | SelectionMode::Single => {
      dates.into_iter().take(1).collect()
    }
    | SelectionMode::Multiple => {
      let mut out: Vec<NaiveDate> =
        Vec::with_capacity(dates.len());
      for date in dates {
        if !out
          .iter()
          .any(|d| is_same_day(*d, date))
        {
          out.push(date);
        }
      }
      out
    }
    | SelectionMode::Range => {
      let mut out: Vec<NaiveDate> =
        dates.into_iter().take(2).collect();
      out.sort();
      out
    }
  }
}

/// Computes the selection after a click
/// on `date`. Constraint checks happen
/// before this is called.
pub fn next_selection(
  mode: SelectionMode,
  current: &[NaiveDate],
  date: NaiveDate
) -> Vec<NaiveDate> {
  match mode {
    | SelectionMode::Single => vec![date],
    | SelectionMode::Multiple => {
      if current
        .iter()
        .any(|d| is_same_day(*d, date))
      {
        current
          .iter()
          .copied()
          .filter(|d| {
            !is_same_day(*d, date)
          })
          .collect()
      } else {
        let mut next = current.to_vec();
        next.push(date);
        next
      }
    }
    | SelectionMode::Range => {
      match current {
        | [start] => {
          vec![
            (*start).min(date),
            (*start).max(date),
          ]
        }
        | _ => vec![date]
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn single_replaces_selection() {
    let next = next_selection(
      SelectionMode::Single,
      &[date(2026, 5, 1)],
      date(2026, 5, 9)
    );
    assert_eq!(next, vec![date(
      2026, 5, 9
    )]);
  }

  #[test]
  fn multiple_toggles_by_day() {
    let current = vec![
      date(2026, 5, 1),
      date(2026, 5, 3),
      date(2026, 5, 7),
    ];
    let next = next_selection(
      SelectionMode::Multiple,
      &current,
      date(2026, 5, 3)
    );
    assert_eq!(next, vec![
      date(2026, 5, 1),
      date(2026, 5, 7)
    ]);

    let next = next_selection(
      SelectionMode::Multiple,
      &next,
      date(2026, 5, 4)
    );
    assert_eq!(next.len(), 3);
  }

  #[test]
  fn range_orders_and_restarts() {
    let first = next_selection(
      SelectionMode::Range,
      &[],
      date(2026, 5, 20)
    );
    let closed = next_selection(
      SelectionMode::Range,
      &first,
      date(2026, 5, 2)
    );
    assert_eq!(closed, vec![
      date(2026, 5, 2),
      date(2026, 5, 20)
    ]);

    let restarted = next_selection(
      SelectionMode::Range,
      &closed,
      date(2026, 6, 1)
    );
    assert_eq!(restarted, vec![date(
      2026, 6, 1
    )]);
  }

  #[test]
  fn constraints_reject_out_of_bounds() {
    let constraints =
      DateConstraints::default()
        .with_min(date(2026, 5, 5))
        .with_max(date(2026, 5, 25))
        .with_disabled([date(
          2026, 5, 10
        )])
        .with_disabled_weekdays([
          Weekday::Sun
        ]);

    assert!(
      constraints
        .is_disabled(date(2026, 5, 4))
    );
    assert!(
      constraints
        .is_disabled(date(2026, 5, 26))
    );
    assert!(
      constraints
        .is_disabled(date(2026, 5, 10))
    );
    // 2026-05-17 is a Sunday.
    assert!(
      constraints
        .is_disabled(date(2026, 5, 17))
    );
    assert!(
      !constraints
        .is_disabled(date(2026, 5, 5))
    );
    assert!(
      !constraints
        .is_disabled(date(2026, 5, 25))
    );
  }

  #[test]
  fn normalize_enforces_mode_invariants()
  {
    let range = normalize(
      SelectionMode::Range,
      vec![
        date(2026, 5, 9),
        date(2026, 5, 1),
        date(2026, 5, 30),
      ]
    );
    assert_eq!(range, vec![
      date(2026, 5, 1),
      date(2026, 5, 9)
    ]);

    let multiple = normalize(
      SelectionMode::Multiple,
      vec![
        date(2026, 5, 9),
        date(2026, 5, 9),
      ]
    );
    assert_eq!(multiple.len(), 1);
  }

  #[test]
  fn value_shape_follows_mode() {
    let dates = [date(2026, 1, 2)];
    assert_eq!(
      SelectionValue::from_dates(
        SelectionMode::Single,
        &dates
      ),
      SelectionValue::Single(Some(
        date(2026, 1, 2)
      ))
    );
    assert_eq!(
      SelectionValue::from_dates(
        SelectionMode::Single,
        &[]
      ),
      SelectionValue::Single(None)
    );
    assert_eq!(
      SelectionValue::from_dates(
        SelectionMode::Range,
        &dates
      ),
      SelectionValue::Many(vec![date(
        2026, 1, 2
      )])
    );
  }
}
