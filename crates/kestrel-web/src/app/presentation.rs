use yew::{
  Html,
  function_component,
  html
};

use super::site::DECK_MARKDOWN;
use crate::components::SlideDeckView;

#[function_component(PresentationPage)]
pub fn presentation_page() -> Html {
  html! {
      <div class="page presentation">
          <SlideDeckView source={DECK_MARKDOWN} />
          <p class="deck-hint">{ "Arrow keys, Space, Home and End move between slides." }</p>
      </div>
  }
}
