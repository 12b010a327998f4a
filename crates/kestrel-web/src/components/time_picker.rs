use kestrel_core::time_picker::{
  Meridiem,
  TimeValue,
  hour_options,
  minute_options
};
use web_sys::HtmlSelectElement;
use yew::{
  Callback,
  Event,
  Html,
  Properties,
  TargetCast,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TimePickerFieldProps {
  pub value:       TimeValue,
  pub on_change:   Callback<TimeValue>,
  #[prop_or(5)]
  pub minute_step: u32,
  #[prop_or_default]
  pub disabled:    bool
}

fn selected_value(event: &Event) -> String {
  event
    .target_unchecked_into::<HtmlSelectElement>()
    .value()
}

/// Hour, minute and AM/PM selects. The
/// owner keeps the value.
#[function_component(TimePickerField)]
pub fn time_picker_field(
  props: &TimePickerFieldProps
) -> Html {
  let value = props.value;

  let on_hour = {
    let on_change = props.on_change.clone();
    Callback::from(move |event: Event| {
      if let Ok(hour) =
        selected_value(&event).parse::<u32>()
      {
        let mut next = value;
        next.set_hour(hour);
        on_change.emit(next);
      }
    })
  };
  let on_minute = {
    let on_change = props.on_change.clone();
    Callback::from(move |event: Event| {
      if let Ok(minute) =
        selected_value(&event).parse::<u32>()
      {
        let mut next = value;
        next.set_minute(minute);
        on_change.emit(next);
      }
    })
  };
  let on_meridiem = {
    let on_change = props.on_change.clone();
    Callback::from(move |event: Event| {
      let meridiem =
        match selected_value(&event).as_str() {
          | "PM" => Meridiem::Pm,
          | _ => Meridiem::Am
        };
      let mut next = value;
      next.set_meridiem(meridiem);
      on_change.emit(next);
    })
  };

  // Off-step minutes stay selectable.
  let mut minutes =
    minute_options(props.minute_step);
  if !minutes.contains(&value.minute()) {
    minutes.push(value.minute());
    minutes.sort_unstable();
  }

  html! {
      <div class="time-picker">
          <select class="time-hour" aria-label="Hour" disabled={props.disabled} onchange={on_hour}>
              { for hour_options().into_iter().map(|hour| html! {
                  <option value={hour.to_string()} selected={hour == value.hour()}>{ hour.to_string() }</option>
              }) }
          </select>
          <span class="time-sep">{ ":" }</span>
          <select class="time-minute" aria-label="Minute" disabled={props.disabled} onchange={on_minute}>
              { for minutes.into_iter().map(|minute| html! {
                  <option value={minute.to_string()} selected={minute == value.minute()}>{ format!("{minute:02}") }</option>
              }) }
          </select>
          <select class="time-meridiem" aria-label="AM or PM" disabled={props.disabled} onchange={on_meridiem}>
              { for [Meridiem::Am, Meridiem::Pm].into_iter().map(|meridiem| html! {
                  <option value={meridiem.as_str()} selected={meridiem == value.meridiem()}>{ meridiem.as_str() }</option>
              }) }
          </select>
      </div>
  }
}
