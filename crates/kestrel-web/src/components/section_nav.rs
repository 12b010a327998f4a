use gloo::events::EventListener;
use kestrel_core::scroll_spy::{
  DEFAULT_SPY_OFFSET,
  NavItemRect,
  SectionBounds,
  SliderIndicator,
  active_section,
  scroll_target,
  slider_indicator
};
use web_sys::{
  HtmlElement,
  ScrollBehavior,
  ScrollToOptions
};
use yew::{
  Callback,
  Html,
  MouseEvent,
  NodeRef,
  Properties,
  classes,
  function_component,
  html,
  use_effect_with,
  use_memo,
  use_node_ref,
  use_state_eq
};

#[derive(Clone, Debug, PartialEq)]
pub struct NavSection {
  pub id:    String,
  pub label: String
}

#[derive(Properties, PartialEq)]
pub struct SectionNavProps {
  pub sections: Vec<NavSection>,
  #[prop_or(DEFAULT_SPY_OFFSET)]
  pub offset:   f64
}

/// Section positions in document
/// coordinates; missing elements are
/// skipped.
fn measure_sections(
  sections: &[NavSection]
) -> Vec<SectionBounds> {
  let Some(window) = web_sys::window() else {
    return vec![];
  };
  let Some(document) = window.document() else {
    return vec![];
  };
  let scroll_y = window.scroll_y().unwrap_or(0.0);
  sections
    .iter()
    .filter_map(|section| {
      let element =
        document.get_element_by_id(&section.id)?;
      let rect = element.get_bounding_client_rect();
      Some(SectionBounds::new(
        &section.id,
        rect.top() + scroll_y,
        rect.height()
      ))
    })
    .collect()
}

fn item_rect(node: &NodeRef) -> NavItemRect {
  node
    .cast::<HtmlElement>()
    .map(|element| {
      let rect = element.get_bounding_client_rect();
      NavItemRect {
        left:  rect.left(),
        width: rect.width()
      }
    })
    .unwrap_or_default()
}

#[function_component(SectionNav)]
pub fn section_nav(
  props: &SectionNavProps
) -> Html {
  let active = use_state_eq(|| None::<String>);
  let indicator =
    use_state_eq(SliderIndicator::default);
  let container = use_node_ref();
  let item_refs = use_memo(props.sections.len(), |count| {
    (0..*count)
      .map(|_| NodeRef::default())
      .collect::<Vec<_>>()
  });

  {
    let active = active.clone();
    let sections = props.sections.clone();
    let offset = props.offset;
    use_effect_with(sections, move |sections| {
      let sections = sections.clone();
      let update = move || {
        let Some(window) = web_sys::window() else {
          return;
        };
        let bounds = measure_sections(&sections);
        let scroll_y =
          window.scroll_y().unwrap_or(0.0);
        active.set(
          active_section(&bounds, scroll_y, offset)
            .map(str::to_string)
        );
      };
      update();
      let listener = web_sys::window().map(|window| {
        EventListener::new(
          &window,
          "scroll",
          move |_| update()
        )
      });
      move || drop(listener)
    });
  }

  {
    let indicator = indicator.clone();
    let container = container.clone();
    let item_refs = item_refs.clone();
    let sections = props.sections.clone();
    use_effect_with((*active).clone(), move |active| {
      let container_left = container
        .cast::<HtmlElement>()
        .map(|element| {
          element.get_bounding_client_rect().left()
        })
        .unwrap_or(0.0);
      let rects: Vec<NavItemRect> =
        item_refs.iter().map(item_rect).collect();
      let position = active.as_ref().and_then(|id| {
        sections.iter().position(|s| &s.id == id)
      });
      indicator.set(slider_indicator(
        container_left,
        &rects,
        position
      ));
    });
  }

  let on_jump = |id: String| {
    let sections = props.sections.clone();
    let offset = props.offset;
    Callback::from(move |event: MouseEvent| {
      event.prevent_default();
      let bounds = measure_sections(&sections);
      let Some(top) = scroll_target(&bounds, &id, offset)
      else {
        tracing::debug!(section = %id, "scroll target missing");
        return;
      };
      if let Some(window) = web_sys::window() {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        window.scroll_to_with_scroll_to_options(&options);
      }
    })
  };

  html! {
      <nav class="section-nav" ref={container}>
          { for props.sections.iter().zip(item_refs.iter()).map(|(section, node)| {
              let is_active = active.as_deref() == Some(section.id.as_str());
              html! {
                  <a
                      href={format!("#{}", section.id)}
                      class={classes!("section-link", is_active.then_some("active"))}
                      aria-current={is_active.then_some("true")}
                      ref={node.clone()}
                      onclick={on_jump(section.id.clone())}
                  >
                      { section.label.clone() }
                  </a>
              }
          }) }
          <span class="section-indicator" style={indicator.style()} />
      </nav>
  }
}
