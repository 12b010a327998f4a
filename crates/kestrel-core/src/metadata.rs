use serde::Serialize;

use crate::config::SiteConfig;
use crate::slides::escape_html;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OpenGraphType {
  Website,
  Article,
  Profile
}

impl OpenGraphType {
  pub fn as_str(self) -> &'static str {
    match self {
      | OpenGraphType::Website => {
        "website"
      }
      | OpenGraphType::Article => {
        "article"
      }
      | OpenGraphType::Profile => {
        "profile"
      }
    }
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct PageMetadata {
  pub title:         String,
  pub description:   String,
  pub canonical_url: String,
  pub keywords:      Vec<String>,
  pub og_type:       OpenGraphType,
  pub image:         Option<String>,
  pub site_name:     String,
  pub locale:        String,
  pub twitter_card:  &'static str,
  pub twitter_site:  Option<String>,
  pub index:         bool,
  pub follow:        bool
}

/// A single head element.
#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
#[serde(tag = "tag", rename_all = "lowercase")]
pub enum HeadTag {
  Title { text: String },
  Meta {
    key:     MetaKey,
    content: String
  },
  Link {
    rel:  String,
    href: String
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MetaKey {
  Name(String),
  Property(String)
}

/// Joins `path` onto the site base URL;
/// absolute URLs pass through.
pub fn absolute_url(
  base_url: &str,
  path: &str
) -> String {
  if path.starts_with("http://")
    || path.starts_with("https://")
  {
    return path.to_string();
  }
  let base = base_url.trim_end_matches('/');
  let trimmed = path.trim();
  if trimmed.is_empty() || trimmed == "/" {
    return format!("{base}/");
  }
  format!(
    "{base}/{}",
    trimmed.trim_start_matches('/')
  )
}

#[derive(Debug, Clone)]
pub struct MetadataBuilder<'a> {
  site:        &'a SiteConfig,
  title:       Option<String>,
  raw_title:   bool,
  description: Option<String>,
  path:        String,
  keywords:    Vec<String>,
  og_type:     OpenGraphType,
  image:       Option<String>,
  index:       bool,
  follow:      bool
}

impl PageMetadata {
  pub fn builder(
    site: &SiteConfig
  ) -> MetadataBuilder<'_> {
    MetadataBuilder {
      site,
      title: None,
      raw_title: false,
      description: None,
      path: "/".to_string(),
      keywords: vec![],
      og_type: OpenGraphType::Website,
      image: None,
      index: true,
      follow: true
    }
  }

  pub fn robots(&self) -> String {
    format!(
      "{}, {}",
      if self.index {
        "index"
      } else {
        "noindex"
      },
      if self.follow {
        "follow"
      } else {
        "nofollow"
      }
    )
  }

  pub fn head_tags(&self) -> Vec<HeadTag> {
    let name = |k: &str, v: &str| {
      HeadTag::Meta {
        key:     MetaKey::Name(
          k.to_string()
        ),
        content: v.to_string()
      }
    };
    let property = |k: &str, v: &str| {
      HeadTag::Meta {
        key:     MetaKey::Property(
          k.to_string()
        ),
        content: v.to_string()
      }
    };

    let mut tags = vec![
      HeadTag::Title {
        text: self.title.clone()
      },
      name("description", &self.description),
      name("robots", &self.robots()),
      HeadTag::Link {
        rel:  "canonical".to_string(),
        href: self.canonical_url.clone()
      },
    ];
    if !self.keywords.is_empty() {
      tags.push(name(
        "keywords",
        &self.keywords.join(", ")
      ));
    }

    tags.extend([
      property("og:title", &self.title),
      property(
        "og:description",
        &self.description
      ),
      property(
        "og:type",
        self.og_type.as_str()
      ),
      property(
        "og:url",
        &self.canonical_url
      ),
      property(
        "og:site_name",
        &self.site_name
      ),
      property("og:locale", &self.locale),
      name("twitter:card", self.twitter_card),
      name("twitter:title", &self.title),
      name(
        "twitter:description",
        &self.description
      ),
    ]);

    if let Some(image) = &self.image {
      tags.push(property("og:image", image));
      tags.push(name("twitter:image", image));
    }
    if let Some(handle) = &self.twitter_site
    {
      tags.push(name("twitter:site", handle));
    }

    tags
  }

  pub fn render_head_html(&self) -> String {
    self
      .head_tags()
      .iter()
      .map(render_head_tag)
      .collect::<Vec<_>>()
      .join("\n")
  }
}

pub fn render_head_tag(
  tag: &HeadTag
) -> String {
  match tag {
    | HeadTag::Title { text } => {
      format!(
        "<title>{}</title>",
        escape_html(text)
      )
    }
    | HeadTag::Meta {
      key: MetaKey::Name(key),
      content
    } => {
      format!(
        "<meta name=\"{}\" content=\"{}\">",
        escape_html(key),
        escape_html(content)
      )
    }
    | HeadTag::Meta {
      key: MetaKey::Property(key),
      content
    } => {
      format!(
        "<meta property=\"{}\" content=\"{}\">",
        escape_html(key),
        escape_html(content)
      )
    }
    | HeadTag::Link { rel, href } => {
      format!(
        "<link rel=\"{}\" href=\"{}\">",
        escape_html(rel),
        escape_html(href)
      )
    }
  }
}

impl<'a> MetadataBuilder<'a> {
  /// Page title, run through the site's
  /// title template.
  #[must_use]
  pub fn title(
    mut self,
    title: impl Into<String>
  ) -> Self {
    self.title = Some(title.into());
    self.raw_title = false;
    self
  }

  /// Page title used verbatim.
  #[must_use]
  pub fn absolute_title(
    mut self,
    title: impl Into<String>
  ) -> Self {
    self.title = Some(title.into());
    self.raw_title = true;
    self
  }

  #[must_use]
  pub fn description(
    mut self,
    description: impl Into<String>
  ) -> Self {
    self.description =
      Some(description.into());
    self
  }

  #[must_use]
  pub fn path(
    mut self,
    path: impl Into<String>
  ) -> Self {
    self.path = path.into();
    self
  }

  #[must_use]
  pub fn keywords<I, S>(
    mut self,
    keywords: I
  ) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>
  {
    self.keywords = keywords
      .into_iter()
      .map(Into::into)
      .collect();
    self
  }

  #[must_use]
  pub fn og_type(
    mut self,
    og_type: OpenGraphType
  ) -> Self {
    self.og_type = og_type;
    self
  }

  #[must_use]
  pub fn image(
    mut self,
    image: impl Into<String>
  ) -> Self {
    self.image = Some(image.into());
    self
  }

  #[must_use]
  pub fn no_index(mut self) -> Self {
    self.index = false;
    self
  }

  #[must_use]
  pub fn no_follow(mut self) -> Self {
    self.follow = false;
    self
  }

  pub fn build(self) -> PageMetadata {
    let site = self.site;
    let title = match self.title {
      | Some(t) if self.raw_title => t,
      | Some(t) => {
        site.title_template.replace("%s", &t)
      }
      | None => site.name.clone()
    };
    let keywords = if self.keywords.is_empty()
    {
      site.keywords.clone()
    } else {
      self.keywords
    };
    let image = self
      .image
      .or_else(|| site.default_image.clone())
      .map(|img| {
        absolute_url(&site.base_url, &img)
      });
    let twitter_card = if image.is_some() {
      "summary_large_image"
    } else {
      "summary"
    };

    PageMetadata {
      title,
      description: self
        .description
        .unwrap_or_else(|| {
          site.description.clone()
        }),
      canonical_url: absolute_url(
        &site.base_url,
        &self.path
      ),
      keywords,
      og_type: self.og_type,
      image,
      site_name: site.name.clone(),
      locale: site.locale.clone(),
      twitter_card,
      twitter_site: site
        .twitter_handle
        .as_ref()
        .map(|h| {
          if h.starts_with('@') {
            h.clone()
          } else {
            format!("@{h}")
          }
        }),
      index: self.index,
      follow: self.follow
    }
  }
}
