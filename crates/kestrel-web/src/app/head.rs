use kestrel_core::metadata::{
  HeadTag,
  MetaKey,
  PageMetadata
};
use kestrel_core::structured_data::{
  StructuredData,
  breadcrumbs,
  faq_page,
  organization,
  web_page,
  website
};
use wasm_bindgen::JsValue;
use web_sys::{
  Document,
  HtmlHeadElement
};

use super::{
  Route,
  Site
};

const JSON_LD_MARKER: &str =
  "data-kestrel-jsonld";

fn route_path(route: Route) -> &'static str {
  match route {
    | Route::Home => "/",
    | Route::Components => "/components",
    | Route::Slides => "/slides",
    | Route::NotFound => "/404"
  }
}

/// Metadata and JSON-LD for one route.
pub fn route_head(
  route: Route,
  site: &Site
) -> (PageMetadata, Vec<StructuredData>) {
  let cfg = &site.config.site;
  let path = route_path(route);
  let builder =
    PageMetadata::builder(cfg).path(path);

  match route {
    | Route::Home => {
      let tagline = &site.content.hero.tagline;
      let builder =
        builder.absolute_title(cfg.name.clone());
      let meta = if tagline.is_empty() {
        builder.build()
      } else {
        builder.description(tagline.clone()).build()
      };
      let mut data = vec![
        StructuredData::Organization(
          organization(cfg)
        ),
        StructuredData::WebSite(website(cfg)),
      ];
      if !site.content.faq.is_empty() {
        let entries: Vec<(&str, &str)> = site
          .content
          .faq
          .iter()
          .map(|entry| {
            (
              entry.question.as_str(),
              entry.answer.as_str()
            )
          })
          .collect();
        data.push(StructuredData::FaqPage(
          faq_page(&entries)
        ));
      }
      (meta, data)
    }
    | Route::Components | Route::Slides => {
      let label = route.label();
      let description = format!(
        "{} {}",
        cfg.name,
        label.to_lowercase()
      );
      let meta = builder
        .title(label)
        .description(description.clone())
        .build();
      let data = vec![
        StructuredData::WebPage(web_page(
          cfg,
          path,
          &meta.title,
          &description
        )),
        StructuredData::BreadcrumbList(
          breadcrumbs(cfg, &[
            ("Home", "/"),
            (label, path),
          ])
        ),
      ];
      (meta, data)
    }
    | Route::NotFound => {
      let meta = builder
        .title(route.label())
        .no_index()
        .build();
      (meta, vec![])
    }
  }
}

pub fn apply_route_head(
  route: Route,
  site: &Site
) {
  let (meta, data) = route_head(route, site);
  if let Err(err) = apply_head(&meta, &data) {
    tracing::warn!(error = ?err, ?route, "failed to update document head");
  }
}

fn apply_head(
  meta: &PageMetadata,
  data: &[StructuredData]
) -> Result<(), JsValue> {
  let Some(document) = web_sys::window()
    .and_then(|window| window.document())
  else {
    return Ok(());
  };
  let Some(head) = document.head() else {
    return Ok(());
  };

  for tag in meta.head_tags() {
    match tag {
      | HeadTag::Title { text } => {
        document.set_title(&text);
      }
      | HeadTag::Meta {
        key: MetaKey::Name(name),
        content
      } => {
        upsert(
          &document,
          &head,
          "meta",
          ("name", name.as_str()),
          ("content", content.as_str())
        )?;
      }
      | HeadTag::Meta {
        key: MetaKey::Property(property),
        content
      } => {
        upsert(
          &document,
          &head,
          "meta",
          ("property", property.as_str()),
          ("content", content.as_str())
        )?;
      }
      | HeadTag::Link { rel, href } => {
        upsert(
          &document,
          &head,
          "link",
          ("rel", rel.as_str()),
          ("href", href.as_str())
        )?;
      }
    }
  }

  while let Some(stale) = document
    .query_selector(&format!(
      "script[{JSON_LD_MARKER}]"
    ))?
  {
    stale.remove();
  }
  for item in data {
    let json = match item.to_inline_json() {
      | Ok(json) => json,
      | Err(err) => {
        tracing::warn!(error = %err, "skipping structured data");
        continue;
      }
    };
    let script =
      document.create_element("script")?;
    script.set_attribute(
      "type",
      "application/ld+json"
    )?;
    script.set_attribute(JSON_LD_MARKER, "")?;
    script.set_text_content(Some(&json));
    head.append_child(&script)?;
  }
  tracing::debug!(title = %meta.title, scripts = data.len(), "document head updated");
  Ok(())
}

/// Finds `<tag key="value">` in the head or
/// creates it, then sets the payload
/// attribute.
fn upsert(
  document: &Document,
  head: &HtmlHeadElement,
  tag: &str,
  (key, value): (&str, &str),
  (attr, payload): (&str, &str)
) -> Result<(), JsValue> {
  let selector =
    format!("{tag}[{key}=\"{value}\"]");
  let element =
    match head.query_selector(&selector)? {
      | Some(element) => element,
      | None => {
        let element =
          document.create_element(tag)?;
        element.set_attribute(key, value)?;
        head.append_child(&element)?;
        element
      }
    };
  element.set_attribute(attr, payload)
}

#[cfg(test)]
mod tests {
  use kestrel_core::config::Config;

  use super::*;
  use crate::app::site::SiteContent;

  fn site() -> Site {
    Site {
      config:  Config::default(),
      content: SiteContent::default()
    }
  }

  #[test]
  fn inner_pages_get_breadcrumbs() {
    let (meta, data) =
      route_head(Route::Components, &site());
    assert_eq!(meta.title, "Components | Kestrel");
    assert_eq!(
      meta.canonical_url,
      "https://example.com/components"
    );
    assert_eq!(data.len(), 2);
    let json = data[1].to_json().expect("json");
    assert_eq!(
      json["itemListElement"][1]["item"],
      "https://example.com/components"
    );
  }

  #[test]
  fn missing_pages_are_not_indexed() {
    let (meta, data) =
      route_head(Route::NotFound, &site());
    assert!(!meta.index);
    assert!(data.is_empty());
  }
}
