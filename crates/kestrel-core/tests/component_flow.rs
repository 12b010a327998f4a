use chrono::{
  NaiveDate,
  Weekday
};
use kestrel_core::calendar::{
  Calendar,
  CalendarOptions
};
use kestrel_core::config::Config;
use kestrel_core::date_picker::{
  DatePicker,
  DatePickerOptions
};
use kestrel_core::metadata::PageMetadata;
use kestrel_core::selection::{
  DateConstraints,
  SelectionMode,
  SelectionValue
};
use kestrel_core::slides::{
  SlideDeck,
  SlideParser,
  render_deck_html
};
use kestrel_core::structured_data::{
  StructuredData,
  website
};
use kestrel_core::theme::{
  FileThemeStore,
  ThemeController,
  ThemeMode
};
use tempfile::tempdir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, day)
    .expect("valid date")
}

#[test]
fn controlled_picker_round_trip() {
  let today = d(2026, 10, 18);
  let options = DatePickerOptions {
    calendar: CalendarOptions {
      mode: SelectionMode::Range,
      week_start: Some(Weekday::Mon),
      constraints: DateConstraints::default()
        .with_min(d(2026, 10, 1))
        .with_max(d(2026, 10, 31))
    },
    ..DatePickerOptions::default()
  };
  let mut picker = DatePicker::new(
    options,
    Some(SelectionValue::Many(vec![])),
    None,
    Some(false),
    today
  );

  assert_eq!(picker.toggle(), Some(true));
  assert!(!picker.is_open());
  assert!(picker.sync_open(true));

  // Outside [min, max]: nothing happens.
  assert!(picker.on_date_click(d(2026, 11, 2)).is_empty());

  let event = picker.on_date_click(d(2026, 10, 9));
  assert_eq!(
    event.selection,
    Some(SelectionValue::Many(vec![d(2026, 10, 9)]))
  );
  assert!(event.open_change.is_none());
  // Owner has not synced yet.
  assert!(picker.calendar().selected().is_empty());

  let synced = event.selection.expect("selection");
  assert!(picker.sync_value(synced));
  let event = picker.on_date_click(d(2026, 10, 3));
  let synced = event.selection.expect("selection");
  assert!(picker.sync_value(synced));
  assert_eq!(
    picker.calendar().selected(),
    &[d(2026, 10, 3), d(2026, 10, 9)]
  );
  assert_eq!(
    picker.display_text(),
    "Oct 3, 2026 - Oct 9, 2026"
  );
}

#[test]
fn grid_covers_whole_month() {
  let calendar = Calendar::new(
    CalendarOptions::default(),
    None,
    Some(SelectionValue::Single(Some(d(2027, 2, 14)))),
    d(2026, 10, 18)
  );
  let grid = calendar.grid(d(2026, 10, 18));
  assert_eq!(grid.view.month, 2);
  assert!(grid.weeks.len() >= 4);
  assert!(grid.weeks.iter().all(|w| w.len() == 7));
  let in_month =
    grid.cells().filter(|c| c.in_month).count();
  assert_eq!(in_month, 28);
  assert!(
    grid
      .cells()
      .any(|c| c.selected && c.date == d(2027, 2, 14))
  );
}

#[test]
fn deck_from_config_delimiter() {
  let cfg = Config::from_toml_str(
    "[slides]\ndelimiter = \"+++\"\n",
    Vec::<(String, String)>::new()
  )
  .expect("config");
  let parser = SlideParser::new(
    &cfg.slides.delimiter,
    &cfg.slides.fallback_title
  );
  let slides = parser.split(
    "# Launch\n+++\n## Why\n- fast\n+++\n```rust\nfn main() {}\n```\n"
  );
  assert_eq!(slides.len(), 3);
  assert!(slides[0].is_title);

  let html = render_deck_html("Launch", &slides);
  assert_eq!(html.matches("<section").count(), 3);

  let mut deck = SlideDeck::new(slides);
  assert!(deck.handle_key("End"));
  assert_eq!(deck.current_index(), 2);
}

#[test]
fn site_head_and_jsonld_from_config() {
  let cfg = Config::from_toml_str(
    r#"
[site]
name = "Acme"
base_url = "https://acme.test"
search_path = "/search?q={search_term_string}"
"#,
    vec![(
      "site.description".to_string(),
      "Rockets".to_string()
    )]
  )
  .expect("config");

  let head = PageMetadata::builder(&cfg.site)
    .title("Docs")
    .path("/docs")
    .build()
    .render_head_html();
  assert!(head.contains("content=\"Rockets\""));
  assert!(head.contains("https://acme.test/docs"));

  let json = StructuredData::WebSite(website(&cfg.site))
    .to_json()
    .expect("json");
  assert_eq!(json["@context"], "https://schema.org");
  assert_eq!(
    json["potentialAction"]["@type"],
    "SearchAction"
  );
}

#[test]
fn theme_persists_between_sessions() {
  let temp = tempdir().expect("tempdir");
  let path = temp.path().join("theme");

  let mut first = ThemeController::load(
    FileThemeStore::new(path.clone()),
    false
  );
  first.set_mode(ThemeMode::Dark).expect("save");

  let second =
    ThemeController::load(FileThemeStore::new(path), false);
  assert_eq!(second.mode(), ThemeMode::Dark);
}
