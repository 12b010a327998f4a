use kestrel_core::tabs::{
  Orientation,
  TabItem,
  Tabs
};
use yew::{
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
  use_mut_ref
};

#[derive(Properties, PartialEq)]
pub struct TabsViewProps {
  pub items:         Vec<TabItem>,
  /// Makes the active tab controlled.
  #[prop_or_default]
  pub value:         Option<String>,
  #[prop_or_default]
  pub default_value: Option<String>,
  #[prop_or_default]
  pub orientation:   Orientation,
  #[prop_or_default]
  pub on_change:     Callback<String>,
  /// Panel body for a tab value.
  pub render_panel:  Callback<String, Html>
}

#[function_component(TabsView)]
pub fn tabs_view(props: &TabsViewProps) -> Html {
  let tabs = use_mut_ref(|| {
    Tabs::new(
      props.items.clone(),
      props.value.clone(),
      props.default_value.clone(),
      props.orientation
    )
  });
  let redraw = use_force_update();

  {
    let tabs = tabs.clone();
    let redraw = redraw.clone();
    use_effect_with(
      props.value.clone(),
      move |value| {
        if let Some(value) = value
          && tabs.borrow_mut().sync(value.clone())
        {
          redraw.force_update();
        }
      }
    );
  }

  let on_keydown = {
    let tabs = tabs.clone();
    let redraw = redraw.clone();
    let on_change = props.on_change.clone();
    Callback::from(move |event: KeyboardEvent| {
      let change =
        tabs.borrow_mut().handle_key(&event.key());
      if let Some(value) = change {
        event.prevent_default();
        on_change.emit(value);
        redraw.force_update();
      }
    })
  };

  let current = tabs.borrow();
  let orientation = match props.orientation {
    | Orientation::Horizontal => "horizontal",
    | Orientation::Vertical => "vertical"
  };

  let tab_button = |item: &TabItem| {
    let active = current.is_active(&item.value);
    let onclick = {
      let tabs = tabs.clone();
      let redraw = redraw.clone();
      let on_change = props.on_change.clone();
      let value = item.value.clone();
      Callback::from(move |_: MouseEvent| {
        let change = tabs.borrow_mut().select(&value);
        if let Some(value) = change {
          on_change.emit(value);
          redraw.force_update();
        }
      })
    };
    html! {
        <button
            type="button"
            role="tab"
            class={classes!("tab", active.then_some("active"))}
            aria-selected={active.to_string()}
            tabindex={if active { "0" } else { "-1" }}
            disabled={item.disabled}
            onclick={onclick}
        >
            { item.label.clone() }
        </button>
    }
  };

  html! {
      <div class={classes!("tabs", orientation)}>
          <div class="tab-list" role="tablist" aria-orientation={orientation} onkeydown={on_keydown}>
              { for current.items().iter().map(tab_button) }
          </div>
          <div class="tab-panel" role="tabpanel">
              { props.render_panel.emit(current.active().to_string()) }
          </div>
      </div>
  }
}
