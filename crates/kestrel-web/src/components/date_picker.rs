use chrono::{
  NaiveDate,
  NaiveDateTime
};
use gloo::events::EventListener;
use kestrel_core::calendar::CalendarOptions;
use kestrel_core::date_picker::{
  DatePicker,
  DatePickerOptions,
  PickerEvent
};
use kestrel_core::selection::{
  DateConstraints,
  SelectionMode,
  SelectionValue
};
use kestrel_core::time_picker::TimeValue;
use wasm_bindgen::JsCast;
use web_sys::Node;
use yew::{
  AttrValue,
  Callback,
  Html,
  KeyboardEvent,
  MouseEvent,
  Properties,
  classes,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_mut_ref,
  use_node_ref
};

use super::calendar::MonthGridView;
use super::time_picker::TimePickerField;
use crate::app::{
  site,
  today
};

#[derive(Properties, PartialEq)]
pub struct DatePickerFieldProps {
  #[prop_or_default]
  pub mode:             SelectionMode,
  /// Makes the selection controlled.
  #[prop_or_default]
  pub value:            Option<SelectionValue>,
  #[prop_or_default]
  pub default_value:    Option<SelectionValue>,
  /// Makes the open state controlled.
  #[prop_or_default]
  pub open:             Option<bool>,
  #[prop_or_default]
  pub constraints:      DateConstraints,
  #[prop_or_default]
  pub placeholder:      Option<AttrValue>,
  #[prop_or_default]
  pub disabled:         bool,
  #[prop_or_default]
  pub read_only:        bool,
  #[prop_or_default]
  pub with_time:        bool,
  #[prop_or_default]
  pub on_change:        Callback<SelectionValue>,
  #[prop_or_default]
  pub on_open_change:   Callback<bool>,
  #[prop_or_default]
  pub on_datetime_change:
    Callback<NaiveDateTime>
}

fn picker_options(
  props: &DatePickerFieldProps
) -> DatePickerOptions {
  let site = site();
  let config = &site.config;
  let mut options = DatePickerOptions {
    calendar: CalendarOptions {
      mode:        props.mode,
      week_start:  Some(config.week_start()),
      constraints: props.constraints.clone()
    },
    format: config.calendar.date_format.clone(),
    disabled: props.disabled,
    read_only: props.read_only,
    with_time: props.with_time,
    ..DatePickerOptions::default()
  };
  if let Some(placeholder) = &props.placeholder {
    options.placeholder = placeholder.to_string();
  }
  options
}

fn first_date(
  value: &SelectionValue
) -> Option<NaiveDate> {
  match value {
    | SelectionValue::Single(date) => *date,
    | SelectionValue::Many(dates) => {
      dates.first().copied()
    }
  }
}

/// Emits the callbacks a picker event asks
/// for. Runs after the picker borrow ends.
fn report(
  event: PickerEvent,
  on_change: &Callback<SelectionValue>,
  on_open_change: &Callback<bool>
) {
  if let Some(selection) = event.selection {
    on_change.emit(selection);
  }
  if let Some(open) = event.open_change {
    on_open_change.emit(open);
  }
}

#[function_component(DatePickerField)]
pub fn date_picker_field(
  props: &DatePickerFieldProps
) -> Html {
  let today = today();
  let picker = use_mut_ref(|| {
    DatePicker::new(
      picker_options(props),
      props.value.clone(),
      props.default_value.clone(),
      props.open,
      today
    )
  });
  let redraw = use_force_update();
  let root = use_node_ref();

  {
    let picker = picker.clone();
    let redraw = redraw.clone();
    use_effect_with(
      props.value.clone(),
      move |value| {
        if let Some(value) = value
          && picker
            .borrow_mut()
            .sync_value(value.clone())
        {
          redraw.force_update();
        }
      }
    );
  }
  {
    let picker = picker.clone();
    let redraw = redraw.clone();
    use_effect_with(props.open, move |open| {
      if let Some(open) = *open
        && picker.borrow_mut().sync_open(open)
      {
        redraw.force_update();
      }
    });
  }

  let is_open = picker.borrow().is_open();

  {
    let picker = picker.clone();
    let redraw = redraw.clone();
    let root = root.clone();
    let on_open_change =
      props.on_open_change.clone();
    use_effect_with(is_open, move |open| {
      let listener = open
        .then(|| {
          web_sys::window()
            .and_then(|window| window.document())
        })
        .flatten()
        .map(|document| {
          EventListener::new(
            &document,
            "mousedown",
            move |event| {
              let inside = event
                .target()
                .and_then(|target| {
                  target.dyn_into::<Node>().ok()
                })
                .is_some_and(|node| {
                  root.get().is_some_and(|root| {
                    root.contains(Some(&node))
                  })
                });
              if inside {
                return;
              }
              let change =
                picker.borrow_mut().on_outside_click();
              if let Some(open) = change {
                on_open_change.emit(open);
                redraw.force_update();
              }
            }
          )
        });
      move || drop(listener)
    });
  }

  let on_toggle = {
    let picker = picker.clone();
    let redraw = redraw.clone();
    let on_open_change =
      props.on_open_change.clone();
    Callback::from(move |_: MouseEvent| {
      let change = picker.borrow_mut().toggle();
      if let Some(open) = change {
        on_open_change.emit(open);
        redraw.force_update();
      }
    })
  };

  let on_keydown = {
    let picker = picker.clone();
    let redraw = redraw.clone();
    let on_open_change =
      props.on_open_change.clone();
    Callback::from(move |event: KeyboardEvent| {
      if event.key() != "Escape" {
        return;
      }
      let change =
        picker.borrow_mut().on_outside_click();
      if let Some(open) = change {
        on_open_change.emit(open);
        redraw.force_update();
      }
    })
  };

  let on_select = {
    let picker = picker.clone();
    let redraw = redraw.clone();
    let on_change = props.on_change.clone();
    let on_open_change =
      props.on_open_change.clone();
    let on_datetime_change =
      props.on_datetime_change.clone();
    Callback::from(move |date: NaiveDate| {
      let (event, time) = {
        let mut picker = picker.borrow_mut();
        (picker.on_date_click(date), picker.time())
      };
      if event.is_empty() {
        return;
      }
      // Taken from the event so controlled
      // pickers report the requested day.
      let datetime = time
        .zip(event.selection.as_ref().and_then(first_date))
        .map(|(time, date)| time.compose(date));
      report(event, &on_change, &on_open_change);
      if let Some(datetime) = datetime {
        on_datetime_change.emit(datetime);
      }
      redraw.force_update();
    })
  };

  let on_shift = {
    let picker = picker.clone();
    let redraw = redraw.clone();
    Callback::from(move |months: i32| {
      {
        let mut picker = picker.borrow_mut();
        let calendar = picker.calendar_mut();
        if months < 0 {
          calendar.prev_month();
        } else {
          calendar.next_month();
        }
      }
      redraw.force_update();
    })
  };

  let on_time = {
    let picker = picker.clone();
    let redraw = redraw.clone();
    let on_datetime_change =
      props.on_datetime_change.clone();
    Callback::from(move |time: TimeValue| {
      let datetime =
        picker.borrow_mut().set_time(time);
      if let Some(datetime) = datetime {
        on_datetime_change.emit(datetime);
      }
      redraw.force_update();
    })
  };

  let on_clear = {
    let picker = picker.clone();
    let on_change = props.on_change.clone();
    let on_open_change =
      props.on_open_change.clone();
    Callback::from(move |_: MouseEvent| {
      let event = picker.borrow_mut().clear();
      report(event, &on_change, &on_open_change);
      redraw.force_update();
    })
  };

  let picker = picker.borrow();
  let calendar = picker.calendar();
  let has_selection = !calendar.selected().is_empty();
  let text = picker.display_text();

  html! {
      <div class={classes!("date-picker", is_open.then_some("open"))} ref={root} onkeydown={on_keydown}>
          <button
              type="button"
              class={classes!("date-picker-trigger", (!has_selection).then_some("placeholder"))}
              aria-haspopup="dialog"
              aria-expanded={is_open.to_string()}
              disabled={!picker.is_interactive()}
              onclick={on_toggle}
          >
              { text }
          </button>
          if has_selection && picker.is_interactive() {
              <button type="button" class="date-picker-clear" aria-label="Clear" onclick={on_clear}>{ "\u{00d7}" }</button>
          }
          if is_open {
              <div class="date-picker-popup" role="dialog">
                  <MonthGridView
                      grid={calendar.grid(today)}
                      week_start={calendar.week_start()}
                      on_select={on_select}
                      on_shift={on_shift}
                  />
                  if let Some(time) = picker.time() {
                      <TimePickerField value={time} on_change={on_time} />
                  }
              </div>
          }
      </div>
  }
}
