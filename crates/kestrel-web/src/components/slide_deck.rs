use gloo::events::EventListener;
use kestrel_core::slides::{
  SlideBlock,
  SlideDeck,
  SlideParser,
  inline_spans,
  parse_blocks
};
use wasm_bindgen::JsCast;
use yew::{
  AttrValue,
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

use crate::app::site;

#[derive(Properties, PartialEq)]
pub struct SlideDeckViewProps {
  /// Markdown source of the whole deck.
  pub source: AttrValue
}

fn inline(text: &str) -> Html {
  html! {
      { for inline_spans(text).into_iter().map(|span| {
          if span.bold {
              html! { <strong>{ span.text }</strong> }
          } else {
              html! { { span.text } }
          }
      }) }
  }
}

fn block_html(
  block: &SlideBlock,
  on_title_slide: bool
) -> Html {
  match block {
    | SlideBlock::Heading { level: 1, text } => {
      let class = if on_title_slide {
        "slide-hero"
      } else {
        "slide-h1"
      };
      html! { <h1 class={class}>{ text.clone() }</h1> }
    }
    | SlideBlock::Heading { text, .. } => {
      html! { <h2 class="slide-h2">{ text.clone() }</h2> }
    }
    | SlideBlock::Code { language, code } => {
      let class = language
        .as_ref()
        .map(|lang| format!("language-{lang}"));
      html! {
          <pre class="slide-code"><code class={class}>{ code.clone() }</code></pre>
      }
    }
    | SlideBlock::Emphasis { text } => {
      html! {
          <p class="slide-strong"><strong>{ text.clone() }</strong></p>
      }
    }
    | SlideBlock::List { items } => {
      html! {
          <ul class="slide-list">
              { for items.iter().map(|item| html! { <li>{ inline(item) }</li> }) }
          </ul>
      }
    }
    | SlideBlock::Paragraph { text } => {
      html! { <p class="slide-text">{ inline(text) }</p> }
    }
  }
}

fn is_editable(target: Option<web_sys::EventTarget>) -> bool {
  target
    .and_then(|target| {
      target.dyn_into::<web_sys::Element>().ok()
    })
    .is_some_and(|element| {
      matches!(
        element.tag_name().as_str(),
        "INPUT" | "TEXTAREA" | "SELECT"
      )
    })
}

#[function_component(SlideDeckView)]
pub fn slide_deck_view(
  props: &SlideDeckViewProps
) -> Html {
  let deck = use_mut_ref(|| {
    let site = site();
    let slides = &site.config.slides;
    let parser = SlideParser::new(
      &slides.delimiter,
      &slides.fallback_title
    );
    SlideDeck::new(parser.split(&props.source))
  });
  let redraw = use_force_update();

  {
    let deck = deck.clone();
    let redraw = redraw.clone();
    use_effect_with((), move |_| {
      let listener = web_sys::window().map(|window| {
        EventListener::new(
          &window,
          "keydown",
          move |event| {
            if is_editable(event.target()) {
              return;
            }
            let Some(event) =
              event.dyn_ref::<web_sys::KeyboardEvent>()
            else {
              return;
            };
            let changed =
              deck.borrow_mut().handle_key(&event.key());
            if changed {
              event.prevent_default();
              redraw.force_update();
            }
          }
        )
      });
      move || drop(listener)
    });
  }

  let step = |forward: bool| {
    let deck = deck.clone();
    let redraw = redraw.clone();
    Callback::from(move |_: MouseEvent| {
      let changed = if forward {
        deck.borrow_mut().next()
      } else {
        deck.borrow_mut().prev()
      };
      if changed {
        redraw.force_update();
      }
    })
  };
  let on_prev = step(false);
  let on_next = step(true);

  let deck = deck.borrow();
  let Some(slide) = deck.current() else {
    return html! { <div class="deck empty">{ "No slides" }</div> };
  };
  let kind = if slide.is_title {
    "slide-title"
  } else {
    "slide-content"
  };
  let position = deck.current_index();

  html! {
      <div class="deck">
          <section class={classes!("slide", kind)} data-index={position.to_string()}>
              { for parse_blocks(&slide.content).iter().map(|block| block_html(block, slide.is_title)) }
          </section>
          <footer class="deck-controls">
              <button type="button" class="deck-prev" disabled={position == 0} onclick={on_prev}>{ "Previous" }</button>
              <span class="deck-position">{ format!("{} / {}", position + 1, deck.len()) }</span>
              <button type="button" class="deck-next" disabled={position + 1 >= deck.len()} onclick={on_next}>{ "Next" }</button>
          </footer>
      </div>
  }
}
