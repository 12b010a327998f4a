mod head;
mod home;
mod presentation;
mod showcase;
mod site;
mod storage;

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use kestrel_core::theme::{
  ThemeController,
  ThemeMode
};
use tracing::warn;
use wasm_bindgen::JsCast;
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_effect_with,
  use_mut_ref,
  use_state_eq
};
use yew_router::prelude::{
  BrowserRouter,
  Link,
  Routable,
  Switch,
  use_route
};

pub use self::site::{
  Site,
  site,
  today
};
use self::storage::{
  LocalThemeStore,
  SYSTEM_DARK_QUERY,
  apply_theme,
  system_prefers_dark
};
use crate::components::{
  ThemeToggle,
  ToastProvider
};

#[derive(Clone, Copy, Debug, PartialEq, Routable)]
pub enum Route {
  #[at("/")]
  Home,
  #[at("/components")]
  Components,
  #[at("/slides")]
  Slides,
  #[not_found]
  #[at("/404")]
  NotFound
}

impl Route {
  pub fn label(self) -> &'static str {
    match self {
      | Route::Home => "Home",
      | Route::Components => "Components",
      | Route::Slides => "Slides",
      | Route::NotFound => "Not found"
    }
  }
}

type SharedTheme =
  Rc<RefCell<ThemeController<LocalThemeStore>>>;

fn switch(route: Route) -> Html {
  match route {
    | Route::Home => html! { <home::HomePage /> },
    | Route::Components => {
      html! { <showcase::ShowcasePage /> }
    }
    | Route::Slides => {
      html! { <presentation::PresentationPage /> }
    }
    | Route::NotFound => {
      html! {
          <section class="page not-found">
              <h1>{ "Page not found" }</h1>
              <Link<Route> to={Route::Home}>{ "Back home" }</Link<Route>>
          </section>
      }
    }
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let controller: SharedTheme = use_mut_ref(|| {
    ThemeController::load(
      LocalThemeStore,
      system_prefers_dark()
    )
  });
  let mode =
    use_state_eq(|| controller.borrow().mode());
  let resolved =
    use_state_eq(|| controller.borrow().resolved());

  {
    let resolved = *resolved;
    use_effect_with(resolved, move |_| {
      apply_theme(resolved);
    });
  }

  {
    let controller = controller.clone();
    let resolved = resolved.clone();
    use_effect_with((), move |_| {
      let listener = web_sys::window()
        .and_then(|window| {
          window
            .match_media(SYSTEM_DARK_QUERY)
            .ok()
            .flatten()
        })
        .map(|query| {
          EventListener::new(
            &query,
            "change",
            move |event| {
              let prefers_dark = event
                .target()
                .and_then(|target| {
                  target
                    .dyn_into::<web_sys::MediaQueryList>()
                    .ok()
                })
                .is_some_and(|query| query.matches());
              let next = controller
                .borrow_mut()
                .set_system_preference(prefers_dark);
              resolved.set(next);
            }
          )
        });
      move || drop(listener)
    });
  }

  let on_toggle = {
    let controller = controller.clone();
    let mode = mode.clone();
    let resolved = resolved.clone();
    Callback::from(move |_| {
      let result = controller.borrow_mut().toggle();
      match result {
        | Ok(next) => {
          mode.set(next);
          resolved.set(controller.borrow().resolved());
        }
        | Err(err) => {
          warn!(error = %err, "theme toggle failed");
        }
      }
    })
  };

  html! {
      <BrowserRouter>
          <ToastProvider>
              <Shell mode={*mode} on_toggle={on_toggle} />
          </ToastProvider>
      </BrowserRouter>
  }
}

#[derive(yew::Properties, PartialEq)]
struct ShellProps {
  mode:      ThemeMode,
  on_toggle: Callback<()>
}

/// Chrome shared by every route; lives
/// inside the router so it can read the
/// current location.
#[function_component(Shell)]
fn shell(props: &ShellProps) -> Html {
  let route =
    use_route::<Route>().unwrap_or(Route::Home);

  use_effect_with(route, move |route| {
    head::apply_route_head(*route, &site());
  });

  let nav_link = |target: Route| {
    let class = if target == route {
      "site-link active"
    } else {
      "site-link"
    };
    html! {
        <Link<Route> to={target} classes={class}>{ target.label() }</Link<Route>>
    }
  };

  html! {
      <div class="site">
          <header class="site-header">
              <span class="site-brand">{ site().config.site.name.clone() }</span>
              <nav class="site-links">
                  { nav_link(Route::Home) }
                  { nav_link(Route::Components) }
                  { nav_link(Route::Slides) }
              </nav>
              <ThemeToggle mode={props.mode} on_toggle={props.on_toggle.clone()} />
          </header>
          <main class="site-main">
              <Switch<Route> render={switch} />
          </main>
      </div>
  }
}
