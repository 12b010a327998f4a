use chrono::{
  Datelike,
  NaiveDate,
  Weekday
};
use serde::Serialize;
use tracing::{
  debug,
  trace
};

use crate::controllable::Controllable;
use crate::datetime::{
  add_days,
  add_months,
  end_of_month,
  is_same_day,
  is_same_month,
  start_of_month,
  start_of_week
};
use crate::selection::{
  DateConstraints,
  SelectionMode,
  SelectionValue,
  next_selection
};

const MAX_WEEKS: usize = 6;
const MIN_WEEKS: usize = 4;

/// The month currently displayed,
/// independent of selection.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
pub struct CalendarView {
  pub year:  i32,
  pub month: u32
}

impl CalendarView {
  pub fn containing(
    date: NaiveDate
  ) -> Self {
    Self {
      year:  date.year(),
      month: date.month()
    }
  }

  pub fn first_day(&self) -> NaiveDate {
    NaiveDate::from_ymd_opt(
      self.year, self.month, 1
    )
    .unwrap_or(NaiveDate::MIN)
  }

  #[must_use]
  pub fn shifted(
    &self,
    months: i32
  ) -> Self {
    Self::containing(add_months(
      self.first_day(),
      months
    ))
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
pub struct DayCell {
  pub date:        NaiveDate,
  pub in_month:    bool,
  pub is_today:    bool,
  pub selected:    bool,
  pub disabled:    bool,
  pub range_start: bool,
  pub range_end:   bool,
  pub in_range:    bool
}

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct MonthGrid {
  pub view:  CalendarView,
  pub weeks: Vec<Vec<DayCell>>
}

impl MonthGrid {
  pub fn cells(
    &self
  ) -> impl Iterator<Item = &DayCell> {
    self.weeks.iter().flatten()
  }
}

/// Builds the week rows for `view`.
/// Always yields at least four rows and
/// stops as soon as the following month
/// is reached, up to six rows.
pub fn build_month_grid(
  view: CalendarView,
  week_start: Weekday,
  today: NaiveDate,
  mode: SelectionMode,
  selected: &[NaiveDate],
  constraints: &DateConstraints
) -> MonthGrid {
  let first = view.first_day();
  let last = end_of_month(first);
  let mut cursor =
    start_of_week(first, week_start);
  let mut weeks =
    Vec::with_capacity(MAX_WEEKS);

  let range = match (mode, selected) {
    | (
      SelectionMode::Range,
      [start, end]
    ) => Some((*start, *end)),
    | _ => None
  };

  for _ in 0..MAX_WEEKS {
    let mut row = Vec::with_capacity(7);
    for _ in 0..7 {
      row.push(classify(
        cursor,
        first,
        today,
        selected,
        range,
        constraints
      ));
      cursor = add_days(cursor, 1);
    }
    weeks.push(row);

    if weeks.len() >= MIN_WEEKS
      && cursor > last
    {
      break;
    }
  }

  trace!(
    year = view.year,
    month = view.month,
    rows = weeks.len(),
    "built month grid"
  );

  MonthGrid { view, weeks }
}

fn classify(
  date: NaiveDate,
  month_start: NaiveDate,
  today: NaiveDate,
  selected: &[NaiveDate],
  range: Option<(NaiveDate, NaiveDate)>,
  constraints: &DateConstraints
) -> DayCell {
  let (range_start, range_end, in_range) =
    match range {
      | Some((start, end)) => {
        (
          is_same_day(date, start),
          is_same_day(date, end),
          date > start && date < end
        )
      }
      | None => (false, false, false)
    };

  DayCell {
    date,
    in_month: is_same_month(date, month_start),
    is_today: is_same_day(date, today),
    selected: selected
      .iter()
      .any(|d| is_same_day(*d, date)),
    disabled: constraints
      .is_disabled(date),
    range_start,
    range_end,
    in_range
  }
}

#[derive(Debug, Clone, Default)]
pub struct CalendarOptions {
  pub mode:        SelectionMode,
  pub week_start:  Option<Weekday>,
  pub constraints: DateConstraints
}

/// Calendar component state: displayed
/// month plus the selection machine.
#[derive(Debug, Clone)]
pub struct Calendar {
  mode:        SelectionMode,
  week_start:  Weekday,
  constraints: DateConstraints,
  view:        CalendarView,
  selected:    Controllable<Vec<NaiveDate>>
}

impl Calendar {
  /// `value` makes the calendar controlled;
  /// otherwise `default` seeds its own
  /// state. The initial view is the month
  /// of the first selected date, or today.
  pub fn new(
    options: CalendarOptions,
    value: Option<SelectionValue>,
    default: Option<SelectionValue>,
    today: NaiveDate
  ) -> Self {
    let mode = options.mode;
    let selected =
      Controllable::from_props(
        value.map(|v| v.into_dates(mode)),
        default
          .map(|v| v.into_dates(mode))
          .unwrap_or_default()
      );
    let view = CalendarView::containing(
      selected
        .get()
        .first()
        .copied()
        .unwrap_or(today)
    );

    Self {
      mode,
      week_start: options
        .week_start
        .unwrap_or(Weekday::Sun),
      constraints: options.constraints,
      view,
      selected
    }
  }

  pub fn mode(&self) -> SelectionMode {
    self.mode
  }

  pub fn week_start(&self) -> Weekday {
    self.week_start
  }

  pub fn constraints(
    &self
  ) -> &DateConstraints {
    &self.constraints
  }

  pub fn is_controlled(&self) -> bool {
    self.selected.is_controlled()
  }

  pub fn selected(&self) -> &[NaiveDate] {
    self.selected.get()
  }

  pub fn value(&self) -> SelectionValue {
    SelectionValue::from_dates(
      self.mode,
      self.selected.get()
    )
  }

  pub fn view(&self) -> CalendarView {
    self.view
  }

  pub fn is_disabled(
    &self,
    date: NaiveDate
  ) -> bool {
    self.constraints.is_disabled(date)
  }

  /// Handles a click on a day. Disabled
  /// days are ignored and produce no
  /// change; otherwise the new value is
  /// returned for the change callback.
  #[tracing::instrument(skip(self), fields(mode = %self.mode))]
  pub fn on_date_click(
    &mut self,
    date: NaiveDate
  ) -> Option<SelectionValue> {
    if self.constraints.is_disabled(date)
    {
      debug!(%date, "ignored click on disabled date");
      return None;
    }

    let next = next_selection(
      self.mode,
      self.selected.get(),
      date
    );
    let mode = self.mode;
    self.selected.propose(next).into_change().map(
      |dates| {
        SelectionValue::from_dates(
          mode, &dates
        )
      }
    )
  }

  pub fn clear(
    &mut self
  ) -> Option<SelectionValue> {
    let mode = self.mode;
    self
      .selected
      .propose(vec![])
      .into_change()
      .map(|dates| {
        SelectionValue::from_dates(
          mode, &dates
        )
      })
  }

  /// Follows a new external value in
  /// controlled mode. Returns whether the
  /// selection was reset.
  pub fn sync_value(
    &mut self,
    value: SelectionValue
  ) -> bool {
    let dates = value.into_dates(self.mode);
    let changed = self.selected.sync(dates);
    if changed {
      debug!(
        count = self.selected.get().len(),
        "selection synced from owner"
      );
    }
    changed
  }

  pub fn next_month(&mut self) {
    self.view = self.view.shifted(1);
  }

  pub fn prev_month(&mut self) {
    self.view = self.view.shifted(-1);
  }

  pub fn show_month_of(
    &mut self,
    date: NaiveDate
  ) {
    self.view = CalendarView::containing(
      start_of_month(date)
    );
  }

  pub fn grid(
    &self,
    today: NaiveDate
  ) -> MonthGrid {
    build_month_grid(
      self.view,
      self.week_start,
      today,
      self.mode,
      self.selected.get(),
      &self.constraints
    )
  }
}
