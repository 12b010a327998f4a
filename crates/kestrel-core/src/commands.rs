use std::fs;
use std::io::{
  self,
  Read,
  Write
};
use std::path::Path;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  NaiveDate,
  Utc,
  Weekday
};
use serde_json::json;
use tracing::{
  debug,
  info,
  instrument,
  warn
};

use crate::calendar::{
  CalendarOptions,
  CalendarView
};
use crate::cli::{
  CalendarArgs,
  Command,
  JsonLdArgs,
  JsonLdKind,
  MetaArgs,
  SlidesArgs,
  ThemeArgs
};
use crate::config::Config;
use crate::date_picker::{
  DatePicker,
  DatePickerOptions
};
use crate::datetime::{
  parse_month,
  today_in
};
use crate::metadata::{
  OpenGraphType,
  PageMetadata
};
use crate::render::Renderer;
use crate::selection::DateConstraints;
use crate::slides::{
  SlideParser,
  render_deck_html
};
use crate::structured_data::{
  ArticleInput,
  StructuredData,
  article,
  breadcrumbs,
  faq_page,
  organization,
  web_page,
  website
};
use crate::theme::{
  FileThemeStore,
  ThemeController
};
use crate::time_picker::parse_time;

#[instrument(skip(cfg, renderer, command))]
pub fn dispatch(
  cfg: &Config,
  renderer: &Renderer,
  command: Command
) -> anyhow::Result<()> {
  match command {
    | Command::Calendar(args) => {
      cmd_calendar(cfg, renderer, &args)
    }
    | Command::Slides(args) => {
      cmd_slides(cfg, renderer, &args)
    }
    | Command::Meta(args) => cmd_meta(cfg, &args),
    | Command::Jsonld(args) => {
      cmd_jsonld(cfg, &args)
    }
    | Command::Theme(args) => {
      cmd_theme(cfg, &args)
    }
  }
}

/// Builds a picker from the flags and
/// replays each `--click` through it.
pub fn replay_picker(
  cfg: &Config,
  args: &CalendarArgs,
  today: NaiveDate
) -> anyhow::Result<DatePicker> {
  let week_start = args
    .week_start
    .unwrap_or_else(|| cfg.week_start());

  let mut constraints =
    DateConstraints::default()
      .with_disabled(
        args.disabled.iter().copied()
      );
  if let Some(min) = args.min {
    constraints = constraints.with_min(min);
  }
  if let Some(max) = args.max {
    constraints = constraints.with_max(max);
  }
  if args.disable_weekends {
    constraints = constraints
      .with_disabled_weekdays([
        Weekday::Sat,
        Weekday::Sun
      ]);
  }

  let options = DatePickerOptions {
    calendar: CalendarOptions {
      mode: args.mode,
      week_start: Some(week_start),
      constraints
    },
    format: cfg.calendar.date_format.clone(),
    with_time: args.time.is_some(),
    ..DatePickerOptions::default()
  };
  let mut picker =
    DatePicker::new(options, None, None, None, today);

  for date in &args.clicks {
    if !picker.is_open() {
      picker.toggle();
    }
    let event = picker.on_date_click(*date);
    if event.is_empty() {
      warn!(%date, "click ignored");
    } else {
      debug!(%date, ?event, "click applied");
    }
  }

  if let Some(raw) = &args.time {
    let time = parse_time(raw)?;
    match picker.set_time(time) {
      | Some(at) => debug!(%at, "time applied"),
      | None if picker.time().is_none() => {
        return Err(anyhow!(
          "--time needs a picker with a time field"
        ));
      }
      | None => {
        warn!(time = %raw, "no date selected; --time kept without a date");
      }
    }
  }

  if let Some(month) = &args.month {
    let first = parse_month(month)?;
    picker.calendar_mut().show_month_of(first);
  }

  Ok(picker)
}

fn cmd_calendar(
  cfg: &Config,
  renderer: &Renderer,
  args: &CalendarArgs
) -> anyhow::Result<()> {
  let today = args
    .today
    .unwrap_or_else(|| today_in(cfg.timezone()));
  let picker = replay_picker(cfg, args, today)?;
  let calendar = picker.calendar();

  if args.json {
    let view: CalendarView = calendar.view();
    let payload = json!({
      "mode": calendar.mode(),
      "view": view,
      "value": calendar.value(),
      "display": picker.display_text(),
      "datetime": picker
        .selected_datetime()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
    });
    let mut out = io::stdout().lock();
    writeln!(
      out,
      "{}",
      serde_json::to_string_pretty(&payload)?
    )?;
    return Ok(());
  }

  renderer.print_month(
    &calendar.grid(today),
    calendar.week_start()
  )?;
  let mut out = io::stdout().lock();
  writeln!(out)?;
  writeln!(out, "{}", picker.display_text())?;
  Ok(())
}

fn read_source(
  path: &Path
) -> anyhow::Result<String> {
  if path.as_os_str() == "-" {
    let mut buf = String::new();
    io::stdin()
      .read_to_string(&mut buf)
      .context("failed to read stdin")?;
    return Ok(buf);
  }
  fs::read_to_string(path).with_context(|| {
    format!("failed to read {}", path.display())
  })
}

fn cmd_slides(
  cfg: &Config,
  renderer: &Renderer,
  args: &SlidesArgs
) -> anyhow::Result<()> {
  let text = read_source(&args.file)?;
  let parser = SlideParser::new(
    args
      .delimiter
      .as_deref()
      .unwrap_or(&cfg.slides.delimiter),
    &cfg.slides.fallback_title
  );
  let slides = parser.split(&text);
  info!(count = slides.len(), "parsed deck");

  if args.outline {
    return renderer.print_slide_outline(&slides);
  }

  let title = args
    .title
    .clone()
    .unwrap_or_else(|| cfg.site.name.clone());
  let html = render_deck_html(&title, &slides);

  match &args.output {
    | Some(path) => {
      fs::write(path, html).with_context(|| {
        format!("failed to write {}", path.display())
      })?;
      info!(output = %path.display(), "deck written");
    }
    | None => {
      io::stdout().lock().write_all(html.as_bytes())?;
    }
  }
  Ok(())
}

pub fn page_metadata(
  cfg: &Config,
  args: &MetaArgs
) -> PageMetadata {
  let mut builder = PageMetadata::builder(&cfg.site)
    .path(args.path.clone())
    .keywords(args.keywords.iter().cloned());
  if let Some(title) = &args.title {
    builder = builder.title(title.clone());
  }
  if let Some(description) = &args.description {
    builder = builder.description(description.clone());
  }
  if let Some(image) = &args.image {
    builder = builder.image(image.clone());
  }
  if args.article {
    builder = builder.og_type(OpenGraphType::Article);
  }
  if args.noindex {
    builder = builder.no_index();
  }
  if args.nofollow {
    builder = builder.no_follow();
  }
  builder.build()
}

fn cmd_meta(
  cfg: &Config,
  args: &MetaArgs
) -> anyhow::Result<()> {
  let meta = page_metadata(cfg, args);
  let mut out = io::stdout().lock();
  if args.json {
    writeln!(
      out,
      "{}",
      serde_json::to_string_pretty(&meta)?
    )?;
  } else {
    writeln!(out, "{}", meta.render_head_html())?;
  }
  Ok(())
}

pub fn structured_data(
  cfg: &Config,
  args: &JsonLdArgs
) -> anyhow::Result<StructuredData> {
  let site = &cfg.site;
  let title = args
    .title
    .clone()
    .unwrap_or_else(|| site.name.clone());
  let description = args
    .description
    .clone()
    .unwrap_or_else(|| site.description.clone());

  let data = match args.kind {
    | JsonLdKind::Organization => {
      StructuredData::Organization(organization(site))
    }
    | JsonLdKind::Website => {
      StructuredData::WebSite(website(site))
    }
    | JsonLdKind::Webpage => {
      StructuredData::WebPage(web_page(
        site,
        &args.path,
        &title,
        &description
      ))
    }
    | JsonLdKind::Breadcrumbs => {
      if args.crumbs.is_empty() {
        return Err(anyhow!(
          "breadcrumbs need at least one --crumb NAME=PATH"
        ));
      }
      let trail: Vec<(&str, &str)> = args
        .crumbs
        .iter()
        .map(|kv| (kv.key.as_str(), kv.value.as_str()))
        .collect();
      StructuredData::BreadcrumbList(breadcrumbs(site, &trail))
    }
    | JsonLdKind::Article => {
      let published = match &args.published {
        | Some(raw) => {
          DateTime::parse_from_rfc3339(raw)
            .with_context(|| {
              format!("invalid --published time: {raw}")
            })?
            .with_timezone(&Utc)
        }
        | None => Utc::now()
      };
      let images: Vec<&str> =
        site.default_image.iter().map(String::as_str).collect();
      StructuredData::Article(Box::new(article(
        site,
        &ArticleInput {
          path: &args.path,
          headline: &title,
          description: &description,
          author: args.author.as_deref().unwrap_or(&site.name),
          author_url: None,
          images: &images,
          published,
          modified: None
        }
      )))
    }
    | JsonLdKind::Faq => {
      if args.faq.is_empty() {
        return Err(anyhow!(
          "faq pages need at least one --faq QUESTION=ANSWER"
        ));
      }
      let entries: Vec<(&str, &str)> = args
        .faq
        .iter()
        .map(|kv| (kv.key.as_str(), kv.value.as_str()))
        .collect();
      StructuredData::FaqPage(faq_page(&entries))
    }
  };
  Ok(data)
}

fn cmd_jsonld(
  cfg: &Config,
  args: &JsonLdArgs
) -> anyhow::Result<()> {
  let data = structured_data(cfg, args)?;
  let rendered = if args.script {
    data.to_script_tag()?
  } else {
    data.to_json_pretty()?
  };
  writeln!(io::stdout().lock(), "{rendered}")?;
  Ok(())
}

fn cmd_theme(
  cfg: &Config,
  args: &ThemeArgs
) -> anyhow::Result<()> {
  let path = cfg.theme_state_file()?;
  let mut controller = ThemeController::load(
    FileThemeStore::new(path),
    args.system_dark
  );

  if let Some(mode) = args.mode {
    controller.set_mode(mode)?;
  } else if args.cycle {
    controller.toggle()?;
  }

  writeln!(
    io::stdout().lock(),
    "{} ({})",
    controller.mode(),
    controller.resolved().class_name()
  )?;
  Ok(())
}
