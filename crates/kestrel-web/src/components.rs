mod calendar;
mod date_picker;
mod section_nav;
mod slide_deck;
mod tabs;
mod theme_toggle;
mod time_picker;
mod toast;

pub use calendar::CalendarPanel;
pub use date_picker::DatePickerField;
pub use section_nav::{
  NavSection,
  SectionNav
};
pub use slide_deck::SlideDeckView;
pub use tabs::TabsView;
pub use theme_toggle::ThemeToggle;
pub use time_picker::TimePickerField;
pub use toast::{
  ToastProvider,
  use_toasts
};
