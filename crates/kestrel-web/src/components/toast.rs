use std::rc::Rc;

use chrono::{
  DateTime,
  Utc
};
use gloo::timers::callback::Interval;
use kestrel_core::toast::{
  Toast,
  ToastInput,
  ToastQueue
};
use uuid::Uuid;
use yew::{
  Callback,
  Children,
  ContextProvider,
  Html,
  MouseEvent,
  Properties,
  Reducible,
  function_component,
  hook,
  html,
  use_context,
  use_effect_with,
  use_memo,
  use_reducer
};

const EXPIRE_TICK_MS: u32 = 500;

#[derive(Default, PartialEq)]
struct ToastState {
  queue: ToastQueue
}

enum ToastAction {
  Push(ToastInput),
  Dismiss(Uuid),
  Expire(DateTime<Utc>)
}

impl Reducible for ToastState {
  type Action = ToastAction;

  fn reduce(
    self: Rc<Self>,
    action: Self::Action
  ) -> Rc<Self> {
    let mut queue = self.queue.clone();
    match action {
      | ToastAction::Push(input) => {
        queue.push(input, Utc::now());
      }
      | ToastAction::Dismiss(id) => {
        if !queue.dismiss(id) {
          return self;
        }
      }
      | ToastAction::Expire(now) => {
        if queue.expire(now) == 0 {
          return self;
        }
      }
    }
    Rc::new(Self { queue })
  }
}

/// Context handed to anything that wants
/// to raise a toast.
#[derive(Clone, PartialEq)]
pub struct ToastHandle {
  pub push: Callback<ToastInput>
}

#[hook]
pub fn use_toasts() -> Option<ToastHandle> {
  use_context::<ToastHandle>()
}

#[derive(Properties, PartialEq)]
pub struct ToastProviderProps {
  #[prop_or_default]
  pub children: Children
}

#[function_component(ToastProvider)]
pub fn toast_provider(
  props: &ToastProviderProps
) -> Html {
  let state = use_reducer(ToastState::default);

  let handle = {
    let dispatcher = state.dispatcher();
    use_memo((), move |_| ToastHandle {
      push: Callback::from(
        move |input: ToastInput| {
          dispatcher
            .dispatch(ToastAction::Push(input))
        }
      )
    })
  };

  {
    let dispatcher = state.dispatcher();
    use_effect_with((), move |_| {
      let interval =
        Interval::new(EXPIRE_TICK_MS, move || {
          dispatcher.dispatch(
            ToastAction::Expire(Utc::now())
          )
        });
      move || drop(interval)
    });
  }

  let toast_item = |toast: &Toast| {
    let on_dismiss = {
      let dispatcher = state.dispatcher();
      let id = toast.id;
      Callback::from(move |_: MouseEvent| {
        dispatcher.dispatch(ToastAction::Dismiss(id))
      })
    };
    html! {
        <li class={toast.variant.class_name()} role="status" key={toast.id.to_string()}>
            <div class="toast-body">
                <strong class="toast-title">{ toast.title.clone() }</strong>
                if let Some(description) = &toast.description {
                    <p class="toast-description">{ description.clone() }</p>
                }
            </div>
            <button type="button" class="toast-close" aria-label="Dismiss" onclick={on_dismiss}>{ "\u{00d7}" }</button>
        </li>
    }
  };

  html! {
      <ContextProvider<ToastHandle> context={(*handle).clone()}>
          { props.children.clone() }
          <ol class="toast-viewport" aria-live="polite">
              { for state.queue.toasts().iter().map(toast_item) }
          </ol>
      </ContextProvider<ToastHandle>>
  }
}
