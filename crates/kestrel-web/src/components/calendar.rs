use chrono::{
  Datelike,
  NaiveDate,
  Weekday
};
use kestrel_core::calendar::{
  Calendar,
  CalendarOptions,
  DayCell,
  MonthGrid
};
use kestrel_core::datetime::weekday_labels;
use kestrel_core::selection::{
  DateConstraints,
  SelectionMode,
  SelectionValue
};
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  classes,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_mut_ref
};

use crate::app::today;

#[derive(Properties, PartialEq)]
pub struct MonthGridViewProps {
  pub grid:       MonthGrid,
  pub week_start: Weekday,
  pub on_select:  Callback<NaiveDate>,
  /// Months to move the view by.
  pub on_shift:   Callback<i32>
}

fn day_button(
  cell: &DayCell,
  on_select: &Callback<NaiveDate>
) -> Html {
  let date = cell.date;
  let onclick = {
    let on_select = on_select.clone();
    Callback::from(move |_: MouseEvent| {
      on_select.emit(date)
    })
  };
  let class = classes!(
    "calendar-day",
    (!cell.in_month).then_some("outside"),
    cell.is_today.then_some("today"),
    cell.selected.then_some("selected"),
    cell.range_start.then_some("range-start"),
    cell.range_end.then_some("range-end"),
    cell.in_range.then_some("in-range"),
    cell.disabled.then_some("disabled")
  );

  html! {
      <button
          type="button"
          class={class}
          disabled={cell.disabled}
          aria-selected={cell.selected.to_string()}
          data-date={date.to_string()}
          onclick={onclick}
      >
          { date.day().to_string() }
      </button>
  }
}

#[function_component(MonthGridView)]
pub fn month_grid_view(
  props: &MonthGridViewProps
) -> Html {
  let title = props
    .grid
    .view
    .first_day()
    .format("%B %Y")
    .to_string();
  let shift = |months: i32| {
    let on_shift = props.on_shift.clone();
    Callback::from(move |_: MouseEvent| {
      on_shift.emit(months)
    })
  };

  html! {
      <div class="calendar" role="grid">
          <div class="calendar-header">
              <button type="button" class="calendar-nav" onclick={shift(-1)} aria-label="Previous month">{ "\u{2039}" }</button>
              <span class="calendar-title">{ title }</span>
              <button type="button" class="calendar-nav" onclick={shift(1)} aria-label="Next month">{ "\u{203a}" }</button>
          </div>
          <div class="calendar-weekdays" role="row">
              { for weekday_labels(props.week_start).into_iter().map(|label| html! {
                  <span class="calendar-weekday">{ label }</span>
              }) }
          </div>
          { for props.grid.weeks.iter().map(|week| html! {
              <div class="calendar-week" role="row">
                  { for week.iter().map(|cell| day_button(cell, &props.on_select)) }
              </div>
          }) }
      </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct CalendarPanelProps {
  #[prop_or_default]
  pub mode:          SelectionMode,
  /// Makes the calendar controlled.
  #[prop_or_default]
  pub value:         Option<SelectionValue>,
  #[prop_or_default]
  pub default_value: Option<SelectionValue>,
  #[prop_or_default]
  pub constraints:   DateConstraints,
  #[prop_or_default]
  pub week_start:    Option<Weekday>,
  #[prop_or_default]
  pub on_change:     Callback<SelectionValue>
}

#[function_component(CalendarPanel)]
pub fn calendar_panel(
  props: &CalendarPanelProps
) -> Html {
  let today = today();
  let calendar = use_mut_ref(|| {
    Calendar::new(
      CalendarOptions {
        mode:        props.mode,
        week_start:  props.week_start,
        constraints: props.constraints.clone()
      },
      props.value.clone(),
      props.default_value.clone(),
      today
    )
  });
  let redraw = use_force_update();

  {
    let calendar = calendar.clone();
    let redraw = redraw.clone();
    use_effect_with(
      props.value.clone(),
      move |value| {
        if let Some(value) = value
          && calendar
            .borrow_mut()
            .sync_value(value.clone())
        {
          redraw.force_update();
        }
      }
    );
  }

  let on_select = {
    let calendar = calendar.clone();
    let redraw = redraw.clone();
    let on_change = props.on_change.clone();
    Callback::from(move |date: NaiveDate| {
      let change =
        calendar.borrow_mut().on_date_click(date);
      if let Some(value) = change {
        on_change.emit(value);
        redraw.force_update();
      }
    })
  };

  let on_shift = {
    let calendar = calendar.clone();
    Callback::from(move |months: i32| {
      {
        let mut calendar = calendar.borrow_mut();
        if months < 0 {
          calendar.prev_month();
        } else {
          calendar.next_month();
        }
      }
      redraw.force_update();
    })
  };

  let (grid, week_start) = {
    let calendar = calendar.borrow();
    (calendar.grid(today), calendar.week_start())
  };

  html! {
      <MonthGridView grid={grid} week_start={week_start} on_select={on_select} on_shift={on_shift} />
  }
}
