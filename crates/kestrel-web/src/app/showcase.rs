use chrono::{
  NaiveDateTime,
  Weekday
};
use kestrel_core::datetime::{
  add_days,
  format_date
};
use kestrel_core::selection::{
  DateConstraints,
  SelectionMode,
  SelectionValue
};
use kestrel_core::tabs::{
  Orientation,
  TabItem
};
use kestrel_core::time_picker::TimeValue;
use kestrel_core::toast::ToastInput;
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_state
};

use super::{
  site,
  today
};
use crate::components::{
  CalendarPanel,
  DatePickerField,
  TabsView,
  TimePickerField,
  use_toasts
};

fn describe(
  value: &SelectionValue,
  format: &str
) -> String {
  let dates = match value {
    | SelectionValue::Single(date) => {
      date.iter().copied().collect::<Vec<_>>()
    }
    | SelectionValue::Many(dates) => dates.clone()
  };
  if dates.is_empty() {
    return "nothing selected".to_string();
  }
  dates
    .iter()
    .map(|date| format_date(*date, format))
    .collect::<Vec<_>>()
    .join(", ")
}

#[function_component(ShowcasePage)]
pub fn showcase_page() -> Html {
  let site = site();
  let format = site.config.calendar.date_format.clone();
  let today = today();
  let toasts = use_toasts();

  let range_value =
    use_state(|| None::<SelectionValue>);
  let booking =
    use_state(|| SelectionValue::Single(None));
  let booking_at =
    use_state(|| None::<NaiveDateTime>);
  let alarm = use_state(TimeValue::default);

  let bookable = DateConstraints::default()
    .with_min(today)
    .with_max(add_days(today, 90))
    .with_disabled_weekdays([
      Weekday::Sat,
      Weekday::Sun
    ]);

  let on_range = {
    let range_value = range_value.clone();
    Callback::from(move |value| {
      range_value.set(Some(value))
    })
  };
  let on_booking = {
    let booking = booking.clone();
    Callback::from(move |value| booking.set(value))
  };
  let on_booking_at = {
    let booking_at = booking_at.clone();
    let toasts = toasts.clone();
    Callback::from(move |at: NaiveDateTime| {
      booking_at.set(Some(at));
      if let Some(toasts) = &toasts {
        toasts.push.emit(
          ToastInput::new("Booking updated").description(
            &at.format("%Y-%m-%d %H:%M").to_string()
          )
        );
      }
    })
  };
  let on_alarm = {
    let alarm = alarm.clone();
    Callback::from(move |value| alarm.set(value))
  };

  let tab_items: Vec<TabItem> = site
    .content
    .tabs
    .iter()
    .map(|tab| tab.item.clone())
    .collect();
  let render_panel = {
    let site = site.clone();
    Callback::from(move |value: String| {
      let body = site
        .content
        .tabs
        .iter()
        .find(|tab| tab.item.value == value)
        .map(|tab| tab.body.clone())
        .unwrap_or_default();
      html! { <p class="tab-body">{ body }</p> }
    })
  };

  html! {
      <div class="page showcase">
          <section class="demo">
              <h2>{ "Range calendar" }</h2>
              <CalendarPanel mode={SelectionMode::Range} on_change={on_range} />
              <p class="demo-value">{
                  range_value
                      .as_ref()
                      .map(|value| describe(value, &format))
                      .unwrap_or_else(|| "pick a start and an end".to_string())
              }</p>
          </section>
          <section class="demo">
              <h2>{ "Controlled booking picker" }</h2>
              <DatePickerField
                  value={Some((*booking).clone())}
                  constraints={bookable}
                  placeholder="Pick a weekday"
                  with_time=true
                  on_change={on_booking}
                  on_datetime_change={on_booking_at}
              />
              <p class="demo-value">{
                  booking_at
                      .map(|at| at.format("%A %-d %B, %H:%M").to_string())
                      .unwrap_or_else(|| describe(&booking, &format))
              }</p>
          </section>
          <section class="demo">
              <h2>{ "Multiple dates" }</h2>
              <DatePickerField mode={SelectionMode::Multiple} placeholder="Pick several days" />
          </section>
          <section class="demo">
              <h2>{ "Time picker" }</h2>
              <TimePickerField value={*alarm} minute_step={15} on_change={on_alarm} />
              <p class="demo-value">{ alarm.to_string() }</p>
          </section>
          <section class="demo">
              <h2>{ "Tabs" }</h2>
              <TabsView items={tab_items} orientation={Orientation::Horizontal} render_panel={render_panel} />
          </section>
      </div>
  }
}
