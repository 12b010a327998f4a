use kestrel_core::toast::{
  ToastInput,
  ToastVariant
};
use yew::{
  Callback,
  Html,
  MouseEvent,
  function_component,
  html
};
use yew_router::prelude::Link;

use super::{
  Route,
  site
};
use crate::components::{
  NavSection,
  SectionNav,
  use_toasts
};

#[function_component(HomePage)]
pub fn home_page() -> Html {
  let site = site();
  let content = &site.content;
  let toasts = use_toasts();

  let nav_sections: Vec<NavSection> = content
    .sections
    .iter()
    .map(|section| NavSection {
      id:    section.id.clone(),
      label: section.title.clone()
    })
    .collect();

  let on_notify = Callback::from(move |_: MouseEvent| {
    if let Some(toasts) = &toasts {
      toasts.push.emit(
        ToastInput::new("Subscribed")
          .description("We will send launch notes to your inbox.")
          .variant(ToastVariant::Success)
      );
    }
  });

  html! {
      <div class="page home">
          <section class="hero">
              <h1 class="hero-title">{ content.hero.title.clone() }</h1>
              <p class="hero-tagline">{ content.hero.tagline.clone() }</p>
              <div class="hero-actions">
                  if let Some(label) = &content.hero.cta_label {
                      <Link<Route> to={Route::Components} classes="button primary">{ label.clone() }</Link<Route>>
                  }
                  <button type="button" class="button" onclick={on_notify}>{ "Notify me" }</button>
              </div>
          </section>
          <SectionNav sections={nav_sections} />
          { for content.sections.iter().map(|section| html! {
              <section id={section.id.clone()} class="content-section">
                  <h2>{ section.title.clone() }</h2>
                  <p>{ section.body.clone() }</p>
                  if section.id == "faq" {
                      <dl class="faq">
                          { for content.faq.iter().map(|entry| html! {
                              <>
                                  <dt>{ entry.question.clone() }</dt>
                                  <dd>{ entry.answer.clone() }</dd>
                              </>
                          }) }
                      </dl>
                  }
              </section>
          }) }
      </div>
  }
}
