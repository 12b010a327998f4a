//! schema.org JSON-LD documents for page
//! templates.

use anyhow::Context;
use chrono::{
  DateTime,
  Utc
};
use serde::Serialize;

use crate::config::SiteConfig;
use crate::metadata::absolute_url;

pub const SCHEMA_CONTEXT: &str =
  "https://schema.org";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
  #[serde(rename = "@type")]
  pub kind:          &'static str,
  pub name:          String,
  pub url:           String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub logo:          Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub same_as:       Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub contact_point: Option<ContactPoint>
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPoint {
  #[serde(rename = "@type")]
  pub kind:         &'static str,
  pub email:        String,
  pub contact_type: String
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSite {
  #[serde(rename = "@type")]
  pub kind:             &'static str,
  pub name:             String,
  pub url:              String,
  pub description:      String,
  pub in_language:      String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub potential_action: Option<SearchAction>
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchAction {
  #[serde(rename = "@type")]
  pub kind:        &'static str,
  pub target:      EntryPoint,
  #[serde(rename = "query-input")]
  pub query_input: &'static str
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
  #[serde(rename = "@type")]
  pub kind:         &'static str,
  pub url_template: String
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebPage {
  #[serde(rename = "@type")]
  pub kind:        &'static str,
  pub name:        String,
  pub url:         String,
  pub description: String,
  pub is_part_of:  PartOf
}

#[derive(Debug, Clone, Serialize)]
pub struct PartOf {
  #[serde(rename = "@type")]
  pub kind: &'static str,
  pub url:  String
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreadcrumbList {
  #[serde(rename = "@type")]
  pub kind:              &'static str,
  pub item_list_element: Vec<ListItem>
}

#[derive(Debug, Clone, Serialize)]
pub struct ListItem {
  #[serde(rename = "@type")]
  pub kind:     &'static str,
  pub position: usize,
  pub name:     String,
  pub item:     String
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
  #[serde(rename = "@type")]
  pub kind:                 &'static str,
  pub headline:             String,
  pub description:          String,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub image:                Vec<String>,
  pub date_published:       DateTime<Utc>,
  pub date_modified:        DateTime<Utc>,
  pub author:               Person,
  pub publisher:            Organization,
  pub main_entity_of_page:  String
}

#[derive(Debug, Clone, Serialize)]
pub struct Person {
  #[serde(rename = "@type")]
  pub kind: &'static str,
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub url:  Option<String>
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqPage {
  #[serde(rename = "@type")]
  pub kind:        &'static str,
  pub main_entity: Vec<Question>
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  #[serde(rename = "@type")]
  pub kind:            &'static str,
  pub name:            String,
  pub accepted_answer: Answer
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
  #[serde(rename = "@type")]
  pub kind: &'static str,
  pub text: String
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StructuredData {
  Organization(Organization),
  WebSite(WebSite),
  WebPage(WebPage),
  BreadcrumbList(BreadcrumbList),
  Article(Box<Article>),
  FaqPage(FaqPage)
}

#[derive(Serialize)]
struct WithContext<'a> {
  #[serde(rename = "@context")]
  context: &'static str,
  #[serde(flatten)]
  data:    &'a StructuredData
}

pub struct ArticleInput<'a> {
  pub path:         &'a str,
  pub headline:     &'a str,
  pub description:  &'a str,
  pub author:       &'a str,
  pub author_url:   Option<&'a str>,
  pub images:       &'a [&'a str],
  pub published:    DateTime<Utc>,
  pub modified:     Option<DateTime<Utc>>
}

pub fn organization(
  site: &SiteConfig
) -> Organization {
  Organization {
    kind:          "Organization",
    name:          site.name.clone(),
    url:           absolute_url(
      &site.base_url,
      "/"
    ),
    logo:          site.logo.as_ref().map(
      |logo| {
        absolute_url(&site.base_url, logo)
      }
    ),
    same_as:       site.social_links.clone(),
    contact_point: site
      .contact_email
      .as_ref()
      .map(|email| ContactPoint {
        kind:         "ContactPoint",
        email:        email.clone(),
        contact_type: "customer support"
          .to_string()
      })
  }
}

pub fn website(
  site: &SiteConfig
) -> WebSite {
  WebSite {
    kind:             "WebSite",
    name:             site.name.clone(),
    url:              absolute_url(
      &site.base_url,
      "/"
    ),
    description:      site
      .description
      .clone(),
    in_language:      site
      .locale
      .replace('_', "-"),
    potential_action: site
      .search_path
      .as_ref()
      .map(|path| SearchAction {
        kind:        "SearchAction",
        target:      EntryPoint {
          kind:         "EntryPoint",
          url_template: absolute_url(
            &site.base_url,
            path
          )
        },
        query_input: "required \
                      name=search_term_string"
      })
  }
}

pub fn web_page(
  site: &SiteConfig,
  path: &str,
  name: &str,
  description: &str
) -> WebPage {
  WebPage {
    kind:        "WebPage",
    name:        name.to_string(),
    url:         absolute_url(
      &site.base_url,
      path
    ),
    description: description.to_string(),
    is_part_of:  PartOf {
      kind: "WebSite",
      url:  absolute_url(
        &site.base_url,
        "/"
      )
    }
  }
}

/// Breadcrumbs from `(name, path)` pairs
/// in order, positions starting at 1.
pub fn breadcrumbs(
  site: &SiteConfig,
  trail: &[(&str, &str)]
) -> BreadcrumbList {
  BreadcrumbList {
    kind:              "BreadcrumbList",
    item_list_element: trail
      .iter()
      .enumerate()
      .map(|(idx, (name, path))| ListItem {
        kind:     "ListItem",
        position: idx + 1,
        name:     (*name).to_string(),
        item:     absolute_url(
          &site.base_url,
          path
        )
      })
      .collect()
  }
}

pub fn article(
  site: &SiteConfig,
  input: &ArticleInput<'_>
) -> Article {
  Article {
    kind:                "Article",
    headline:            input
      .headline
      .to_string(),
    description:         input
      .description
      .to_string(),
    image:               input
      .images
      .iter()
      .map(|img| {
        absolute_url(&site.base_url, img)
      })
      .collect(),
    date_published:      input.published,
    date_modified:       input
      .modified
      .unwrap_or(input.published),
    author:              Person {
      kind: "Person",
      name: input.author.to_string(),
      url:  input
        .author_url
        .map(str::to_string)
    },
    publisher:           organization(site),
    main_entity_of_page: absolute_url(
      &site.base_url,
      input.path
    )
  }
}

pub fn faq_page(
  entries: &[(&str, &str)]
) -> FaqPage {
  FaqPage {
    kind:        "FAQPage",
    main_entity: entries
      .iter()
      .map(|(question, answer)| Question {
        kind:            "Question",
        name:            (*question)
          .to_string(),
        accepted_answer: Answer {
          kind: "Answer",
          text: (*answer).to_string()
        }
      })
      .collect()
  }
}

impl StructuredData {
  pub fn to_json(
    &self
  ) -> anyhow::Result<serde_json::Value> {
    serde_json::to_value(WithContext {
      context: SCHEMA_CONTEXT,
      data:    self
    })
    .context(
      "failed to serialize structured \
       data"
    )
  }

  pub fn to_json_pretty(
    &self
  ) -> anyhow::Result<String> {
    serde_json::to_string_pretty(
      &self.to_json()?
    )
    .context(
      "failed to serialize structured \
       data"
    )
  }

  /// Compact JSON safe to place inside a
  /// `<script>` element: `</` is escaped
  /// so the payload cannot close the tag
  /// early.
  pub fn to_inline_json(
    &self
  ) -> anyhow::Result<String> {
    let json = serde_json::to_string(
      &self.to_json()?
    )
    .context(
      "failed to serialize structured \
       data"
    )?;
    Ok(json.replace("</", "<\\/"))
  }

  pub fn to_script_tag(
    &self
  ) -> anyhow::Result<String> {
    Ok(format!(
      "<script type=\"application/ld+json\">{}</script>",
      self.to_inline_json()?
    ))
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use serde_json::json;

  use super::*;

  fn site() -> SiteConfig {
    SiteConfig {
      name: "Acme".to_string(),
      base_url: "https://acme.test"
        .to_string(),
      logo: Some("/logo.png".to_string()),
      social_links: vec![
        "https://github.com/acme"
          .to_string(),
      ],
      search_path: Some(
        "/search?q={search_term_string}"
          .to_string()
      ),
      ..SiteConfig::default()
    }
  }

  #[test]
  fn organization_carries_context_and_links()
  {
    let value = StructuredData::Organization(
      organization(&site())
    )
    .to_json()
    .expect("serialize");

    assert_eq!(
      value,
      json!({
        "@context": "https://schema.org",
        "@type": "Organization",
        "name": "Acme",
        "url": "https://acme.test/",
        "logo": "https://acme.test/logo.png",
        "sameAs": ["https://github.com/acme"]
      })
    );
  }

  #[test]
  fn website_has_search_action() {
    let value = StructuredData::WebSite(
      website(&site())
    )
    .to_json()
    .expect("serialize");

    assert_eq!(
      value["potentialAction"]["target"]
        ["urlTemplate"],
      json!(
        "https://acme.test/search?q={search_term_string}"
      )
    );
    assert_eq!(
      value["inLanguage"],
      json!("en-US")
    );
  }

  #[test]
  fn breadcrumbs_are_one_based() {
    let value =
      StructuredData::BreadcrumbList(
        breadcrumbs(&site(), &[
          ("Home", "/"),
          ("Blog", "/blog"),
        ])
      )
      .to_json()
      .expect("serialize");
    let items = value["itemListElement"]
      .as_array()
      .expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["position"], json!(2));
    assert_eq!(
      items[1]["item"],
      json!("https://acme.test/blog")
    );
  }

  #[test]
  fn article_defaults_modified_to_published(
  ) {
    let published = Utc
      .with_ymd_and_hms(2026, 9, 1, 8, 0, 0)
      .single()
      .expect("valid timestamp");
    let data = StructuredData::Article(
      Box::new(article(
        &site(),
        &ArticleInput {
          path: "/blog/launch",
          headline: "Launch",
          description: "We shipped",
          author: "Sam",
          author_url: None,
          images: &["/img/launch.png"],
          published,
          modified: None
        }
      ))
    );
    let value = data.to_json().expect("serialize");
    assert_eq!(
      value["datePublished"],
      value["dateModified"]
    );
    assert_eq!(
      value["publisher"]["@type"],
      json!("Organization")
    );
  }

  #[test]
  fn script_tag_escapes_closing_sequences() {
    let tag = StructuredData::FaqPage(
      faq_page(&[(
        "Is it safe?",
        "Yes </script><b>really</b>"
      )])
    )
    .to_script_tag()
    .expect("render");
    assert!(tag.starts_with(
      "<script type=\"application/ld+json\">"
    ));
    assert_eq!(tag.matches("</script>").count(), 1);
    assert!(tag.contains("<\\/script>"));
  }
}
