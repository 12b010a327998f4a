use kestrel_core::theme::ThemeMode;
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct ThemeToggleProps {
  pub mode:      ThemeMode,
  pub on_toggle: Callback<()>
}

#[function_component(ThemeToggle)]
pub fn theme_toggle(
  props: &ThemeToggleProps
) -> Html {
  let label = match props.mode {
    | ThemeMode::Light => "Light",
    | ThemeMode::Dark => "Dark",
    | ThemeMode::Auto => "Auto"
  };
  let next = props.mode.cycled();
  let onclick = {
    let on_toggle = props.on_toggle.clone();
    Callback::from(move |_: MouseEvent| {
      on_toggle.emit(())
    })
  };

  html! {
      <button
          type="button"
          class="theme-toggle"
          data-mode={props.mode.storage_value()}
          title={format!("Switch to {next} theme")}
          onclick={onclick}
      >
          { label }
      </button>
  }
}
