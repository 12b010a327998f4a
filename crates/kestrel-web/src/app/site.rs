use std::rc::Rc;

use chrono::NaiveDate;
use kestrel_core::config::Config;
use kestrel_core::datetime::today_in;
use kestrel_core::tabs::TabItem;
use serde::Deserialize;

const SITE_CONFIG_TOML: &str =
  include_str!("../../../../kestrel.toml");
const CONTENT_TOML: &str =
  include_str!("../../assets/content.toml");
pub const DECK_MARKDOWN: &str =
  include_str!("../../assets/deck.md");

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SiteContent {
  #[serde(default)]
  pub hero:     Hero,
  #[serde(default)]
  pub sections: Vec<ContentSection>,
  #[serde(default)]
  pub faq:      Vec<FaqEntry>,
  #[serde(default)]
  pub tabs:     Vec<TabContent>
}

#[derive(Clone, Debug, Deserialize)]
pub struct Hero {
  pub title:     String,
  pub tagline:   String,
  #[serde(default)]
  pub cta_label: Option<String>
}

impl Default for Hero {
  fn default() -> Self {
    Self {
      title:     "Kestrel".to_string(),
      tagline:   String::new(),
      cta_label: None
    }
  }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ContentSection {
  pub id:    String,
  pub title: String,
  pub body:  String
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FaqEntry {
  pub question: String,
  pub answer:   String
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TabContent {
  #[serde(flatten)]
  pub item: TabItem,
  pub body: String
}

/// Embedded site configuration plus page
/// copy, parsed once per page load.
#[derive(Debug)]
pub struct Site {
  pub config:  Config,
  pub content: SiteContent
}

fn load_config() -> Config {
  match Config::from_toml_str(
    SITE_CONFIG_TOML,
    Vec::<(String, String)>::new()
  ) {
    | Ok(config) => config,
    | Err(error) => {
      tracing::error!(error = %format!("{error:#}"), "failed to parse site config; using defaults");
      Config::default()
    }
  }
}

fn load_content() -> SiteContent {
  match toml::from_str::<SiteContent>(
    CONTENT_TOML
  ) {
    | Ok(content) => {
      tracing::info!(
        sections = content.sections.len(),
        faq = content.faq.len(),
        "loaded site content"
      );
      content
    }
    | Err(error) => {
      tracing::error!(%error, "failed to parse site content; using fallback");
      SiteContent::default()
    }
  }
}

thread_local! {
  static SITE: Rc<Site> = Rc::new(Site {
    config:  load_config(),
    content: load_content()
  });
}

pub fn site() -> Rc<Site> {
  SITE.with(Rc::clone)
}

/// Today in the configured calendar
/// timezone.
pub fn today() -> NaiveDate {
  today_in(site().config.timezone())
}
