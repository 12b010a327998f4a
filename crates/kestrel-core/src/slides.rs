//! Markdown presentation decks.
//!
//! Source text is split into slides on a
//! delimiter line (`---` by default) or,
//! when the text has none, on `#`/`##`
//! headings. Each slide body is parsed
//! into a handful of block kinds and
//! rendered to HTML with fixed classes.

use serde::Serialize;
use tracing::{
  debug,
  trace
};

pub const DEFAULT_DELIMITER: &str = "---";
pub const DEFAULT_FALLBACK_TITLE: &str =
  "Untitled deck";

const FENCE: &str = "```";

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct Slide {
  pub content:  String,
  pub is_title: bool
}

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlideBlock {
  Heading {
    level: u8,
    text:  String
  },
  Code {
    language: Option<String>,
    code:     String
  },
  Emphasis {
    text: String
  },
  List {
    items: Vec<String>
  },
  Paragraph {
    text: String
  }
}

#[derive(Debug, Clone)]
pub struct SlideParser {
  delimiter:      String,
  fallback_title: String
}

impl Default for SlideParser {
  fn default() -> Self {
    Self::new(
      DEFAULT_DELIMITER,
      DEFAULT_FALLBACK_TITLE
    )
  }
}

impl SlideParser {
  pub fn new(
    delimiter: &str,
    fallback_title: &str
  ) -> Self {
    let delimiter = delimiter.trim();
    Self {
      delimiter:      if delimiter
        .is_empty()
      {
        DEFAULT_DELIMITER.to_string()
      } else {
        delimiter.to_string()
      },
      fallback_title: fallback_title
        .to_string()
    }
  }

  /// Splits `text` into slides. Slide 0
  /// is always flagged as the title.
  /// Every delimiter starts a new slide,
  /// even an empty one; the fallback
  /// title is used only for blank input.
  #[tracing::instrument(skip_all, fields(bytes = text.len()))]
  pub fn split(
    &self,
    text: &str
  ) -> Vec<Slide> {
    let normalized =
      text.replace("\r\n", "\n");
    let chunks = if self
      .has_delimiter(&normalized)
    {
      self.split_on_delimiter(&normalized)
    } else {
      debug!(
        "no delimiter lines; splitting \
         on headings"
      );
      split_on_headings(&normalized)
        .into_iter()
        .filter(|chunk| !chunk.trim().is_empty())
        .collect()
    };

    let mut slides: Vec<Slide> = chunks
      .into_iter()
      .map(|chunk| Slide {
        content:  chunk.trim().to_string(),
        is_title: false
      })
      .collect();

    if slides.is_empty() {
      slides.push(Slide {
        content:  format!(
          "# {}",
          self.fallback_title
        ),
        is_title: true
      });
    }
    slides[0].is_title = true;

    debug!(
      count = slides.len(),
      "split presentation"
    );
    slides
  }

  fn is_delimiter(
    &self,
    line: &str
  ) -> bool {
    line.trim() == self.delimiter
  }

  fn has_delimiter(
    &self,
    text: &str
  ) -> bool {
    let mut in_code = false;
    for line in text.lines() {
      if line.trim_start().starts_with(FENCE)
      {
        in_code = !in_code;
        continue;
      }
      if !in_code
        && self.is_delimiter(line)
      {
        return true;
      }
    }
    false
  }

  fn split_on_delimiter(
    &self,
    text: &str
  ) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut in_code = false;

    for line in text.lines() {
      if line.trim_start().starts_with(FENCE)
      {
        in_code = !in_code;
      } else if !in_code
        && self.is_delimiter(line)
      {
        chunks
          .push(std::mem::take(&mut current));
        continue;
      }
      current.push_str(line);
      current.push('\n');
    }
    chunks.push(current);
    chunks
  }
}

fn is_heading(line: &str) -> bool {
  line.starts_with("# ")
    || line.starts_with("## ")
}

fn split_on_headings(
  text: &str
) -> Vec<String> {
  let mut chunks = Vec::new();
  let mut current = String::new();
  let mut in_code = false;

  for line in text.lines() {
    if line.trim_start().starts_with(FENCE) {
      in_code = !in_code;
    } else if !in_code
      && is_heading(line)
      && !current.trim().is_empty()
    {
      chunks.push(std::mem::take(&mut current));
    }
    current.push_str(line);
    current.push('\n');
  }
  chunks.push(current);
  chunks
}

/// Parses one slide body into blocks.
pub fn parse_blocks(
  content: &str
) -> Vec<SlideBlock> {
  let mut blocks = Vec::new();
  let mut code: Option<(
    Option<String>,
    Vec<&str>
  )> = None;
  let mut list: Vec<String> = Vec::new();

  for line in content.lines() {
    if let Some((language, lines)) =
      code.as_mut()
    {
      if line.trim_start().starts_with(FENCE)
      {
        blocks.push(SlideBlock::Code {
          language: language.take(),
          code:     lines.join("\n")
        });
        code = None;
      } else {
        lines.push(line);
      }
      continue;
    }

    let trimmed = line.trim();

    if let Some(item) = trimmed
      .strip_prefix("- ")
      .or_else(|| trimmed.strip_prefix("* "))
    {
      list.push(item.trim().to_string());
      continue;
    }
    if !list.is_empty() {
      blocks.push(SlideBlock::List {
        items: std::mem::take(&mut list)
      });
    }

    if trimmed.is_empty() {
      continue;
    }

    if let Some(rest) =
      trimmed.strip_prefix(FENCE)
    {
      let language = rest.trim();
      code = Some((
        (!language.is_empty())
          .then(|| language.to_string()),
        Vec::new()
      ));
    } else if let Some(text) =
      trimmed.strip_prefix("## ")
    {
      blocks.push(SlideBlock::Heading {
        level: 2,
        text:  text.trim().to_string()
      });
    } else if let Some(text) =
      trimmed.strip_prefix("# ")
    {
      blocks.push(SlideBlock::Heading {
        level: 1,
        text:  text.trim().to_string()
      });
    } else if let Some(text) =
      bold_only(trimmed)
    {
      blocks.push(SlideBlock::Emphasis {
        text: text.to_string()
      });
    } else {
      blocks.push(SlideBlock::Paragraph {
        text: trimmed.to_string()
      });
    }
  }

  if !list.is_empty() {
    blocks.push(SlideBlock::List {
      items: list
    });
  }
  if let Some((language, lines)) = code {
    trace!("unterminated code fence");
    blocks.push(SlideBlock::Code {
      language,
      code: lines.join("\n")
    });
  }

  blocks
}

fn bold_only(line: &str) -> Option<&str> {
  let inner = line
    .strip_prefix("**")?
    .strip_suffix("**")?;
  if inner.is_empty()
    || inner.contains("**")
  {
    return None;
  }
  Some(inner)
}

pub fn escape_html(raw: &str) -> String {
  let mut out =
    String::with_capacity(raw.len());
  for ch in raw.chars() {
    match ch {
      | '&' => out.push_str("&amp;"),
      | '<' => out.push_str("&lt;"),
      | '>' => out.push_str("&gt;"),
      | '"' => out.push_str("&quot;"),
      | '\'' => out.push_str("&#39;"),
      | _ => out.push(ch)
    }
  }
  out
}

/// A run of inline text, bold or not.
#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct InlineSpan {
  pub text: String,
  pub bold: bool
}

/// Splits `**x**` pairs out of a line. An
/// unpaired trailing `**` stays literal.
pub fn inline_spans(
  text: &str
) -> Vec<InlineSpan> {
  let mut spans = Vec::new();
  let mut current = String::new();
  let mut bold = false;
  let mut parts = text.split("**").peekable();
  let mut first = true;

  while let Some(part) = parts.next() {
    if !first {
      if bold || parts.peek().is_some() {
        if !current.is_empty() {
          spans.push(InlineSpan {
            text: std::mem::take(&mut current),
            bold
          });
        }
        bold = !bold;
      } else {
        current.push_str("**");
      }
    }
    current.push_str(part);
    first = false;
  }
  if !current.is_empty() {
    spans.push(InlineSpan {
      text: current,
      bold
    });
  }
  spans
}

fn render_inline(text: &str) -> String {
  inline_spans(text)
    .iter()
    .map(|span| {
      let escaped = escape_html(&span.text);
      if span.bold {
        format!("<strong>{escaped}</strong>")
      } else {
        escaped
      }
    })
    .collect()
}

pub fn render_block(
  block: &SlideBlock,
  on_title_slide: bool
) -> String {
  match block {
    | SlideBlock::Heading {
      level: 1,
      text
    } => {
      let class = if on_title_slide {
        "slide-hero"
      } else {
        "slide-h1"
      };
      format!(
        "<h1 class=\"{class}\">{}</h1>",
        escape_html(text)
      )
    }
    | SlideBlock::Heading {
      text, ..
    } => {
      format!(
        "<h2 class=\"slide-h2\">{}</h2>",
        escape_html(text)
      )
    }
    | SlideBlock::Code {
      language,
      code
    } => {
      let lang = language
        .as_deref()
        .map(|l| {
          format!(
            " class=\"language-{}\"",
            escape_html(l)
          )
        })
        .unwrap_or_default();
      format!(
        "<pre class=\"slide-code\"><code{lang}>{}</code></pre>",
        escape_html(code)
      )
    }
    | SlideBlock::Emphasis { text } => {
      format!(
        "<p class=\"slide-strong\"><strong>{}</strong></p>",
        escape_html(text)
      )
    }
    | SlideBlock::List { items } => {
      let inner: String = items
        .iter()
        .map(|item| {
          format!(
            "<li>{}</li>",
            render_inline(item)
          )
        })
        .collect();
      format!(
        "<ul class=\"slide-list\">{inner}</ul>"
      )
    }
    | SlideBlock::Paragraph { text } => {
      format!(
        "<p class=\"slide-text\">{}</p>",
        render_inline(text)
      )
    }
  }
}

pub fn render_slide_html(
  slide: &Slide,
  index: usize
) -> String {
  let kind = if slide.is_title {
    "slide slide-title"
  } else {
    "slide slide-content"
  };
  let body: String =
    parse_blocks(&slide.content)
      .iter()
      .map(|block| {
        render_block(block, slide.is_title)
      })
      .collect::<Vec<_>>()
      .join("\n");
  format!(
    "<section class=\"{kind}\" \
     data-index=\"{index}\">\n{body}\n</section>"
  )
}

/// Standalone HTML document for a deck.
pub fn render_deck_html(
  title: &str,
  slides: &[Slide]
) -> String {
  let sections: Vec<String> = slides
    .iter()
    .enumerate()
    .map(|(idx, slide)| {
      render_slide_html(slide, idx)
    })
    .collect();
  format!(
    "<!doctype html>\n<html>\n<head>\n\
     <meta charset=\"utf-8\">\n\
     <title>{}</title>\n</head>\n\
     <body class=\"deck\">\n{}\n</body>\n</html>\n",
    escape_html(title),
    sections.join("\n")
  )
}

/// Navigation state over parsed slides.
#[derive(Debug, Clone)]
pub struct SlideDeck {
  slides:  Vec<Slide>,
  current: usize
}

impl SlideDeck {
  pub fn new(slides: Vec<Slide>) -> Self {
    Self {
      slides,
      current: 0
    }
  }

  pub fn slides(&self) -> &[Slide] {
    &self.slides
  }

  pub fn len(&self) -> usize {
    self.slides.len()
  }

  pub fn is_empty(&self) -> bool {
    self.slides.is_empty()
  }

  pub fn current_index(&self) -> usize {
    self.current
  }

  pub fn current(&self) -> Option<&Slide> {
    self.slides.get(self.current)
  }

  pub fn go_to(
    &mut self,
    index: usize
  ) -> bool {
    if index >= self.slides.len()
      || index == self.current
    {
      return false;
    }
    self.current = index;
    true
  }

  pub fn next(&mut self) -> bool {
    self.go_to(self.current + 1)
  }

  pub fn prev(&mut self) -> bool {
    match self.current.checked_sub(1) {
      | Some(idx) => self.go_to(idx),
      | None => false
    }
  }

  pub fn first(&mut self) -> bool {
    self.go_to(0)
  }

  pub fn last(&mut self) -> bool {
    self.go_to(
      self.slides.len().saturating_sub(1)
    )
  }

  /// Maps a DOM `KeyboardEvent.key` to a
  /// navigation step. Returns whether the
  /// current slide changed.
  pub fn handle_key(
    &mut self,
    key: &str
  ) -> bool {
    match key {
      | "ArrowRight" | "ArrowDown"
      | "PageDown" | " " | "Enter" => {
        self.next()
      }
      | "ArrowLeft" | "ArrowUp"
      | "PageUp" | "Backspace" => {
        self.prev()
      }
      | "Home" => self.first(),
      | "End" => self.last(),
      | _ => false
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn two_delimiters_make_three_slides() {
    let text = "# Kestrel\nBrand deck\n---\n## Why\nBecause\n---\n## How\nLike this";
    let slides =
      SlideParser::default().split(text);
    assert_eq!(slides.len(), 3);
    assert!(slides[0].is_title);
    assert!(!slides[1].is_title);
    assert!(slides[2].content.starts_with("## How"));
  }

  #[test]
  fn empty_chunks_still_count_as_slides() {
    let parser = SlideParser::default();

    let middle = parser.split("# Intro\n---\n\n---\n# Outro");
    assert_eq!(middle.len(), 3);
    assert_eq!(middle[1].content, "");
    assert_eq!(middle[2].content, "# Outro");

    let leading = parser.split("---\n# A\n---\n# B");
    assert_eq!(leading.len(), 3);
    assert!(leading[0].is_title);
    assert_eq!(leading[0].content, "");
    assert_eq!(leading[1].content, "# A");
  }

  #[test]
  fn falls_back_to_heading_split() {
    let text = "# Intro\nhello\n## Part one\nbody\n## Part two\nmore";
    let slides =
      SlideParser::default().split(text);
    assert_eq!(slides.len(), 3);
    assert_eq!(
      slides[1].content,
      "## Part one\nbody"
    );
  }

  #[test]
  fn delimiter_inside_code_fence_is_kept() {
    let text = "# A\n---\n```yaml\n---\nkey: v\n```\n";
    let slides =
      SlideParser::default().split(text);
    assert_eq!(slides.len(), 2);
    assert!(slides[1].content.contains("key: v"));
  }

  #[test]
  fn empty_input_yields_title_slide() {
    let slides =
      SlideParser::new("", "Launch")
        .split("  \n");
    assert_eq!(slides, vec![Slide {
      content:  "# Launch".to_string(),
      is_title: true
    }]);
  }

  #[test]
  fn parses_block_kinds() {
    let blocks = parse_blocks(
      "# Title\n## Sub\n**Big claim**\n- one\n- two\n\n```rust\nfn main() {}\n```\nplain **mixed** text",
    );
    assert_eq!(blocks, vec![
      SlideBlock::Heading {
        level: 1,
        text:  "Title".to_string()
      },
      SlideBlock::Heading {
        level: 2,
        text:  "Sub".to_string()
      },
      SlideBlock::Emphasis {
        text: "Big claim".to_string()
      },
      SlideBlock::List {
        items: vec![
          "one".to_string(),
          "two".to_string()
        ]
      },
      SlideBlock::Code {
        language: Some("rust".to_string()),
        code:     "fn main() {}".to_string()
      },
      SlideBlock::Paragraph {
        text: "plain **mixed** text"
          .to_string()
      },
    ]);
  }

  #[test]
  fn renders_escaped_markup() {
    let slide = Slide {
      content:  "# <Kestrel>\nfast **and** safe\n```\n<script>\n```".to_string(),
      is_title: true
    };
    let html = render_slide_html(&slide, 0);
    assert!(html.contains(
      "<h1 class=\"slide-hero\">&lt;Kestrel&gt;</h1>"
    ));
    assert!(html.contains(
      "fast <strong>and</strong> safe"
    ));
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
  }

  #[test]
  fn unpaired_markers_stay_literal() {
    assert_eq!(inline_spans("a **b** c **d"), vec![
      InlineSpan {
        text: "a ".to_string(),
        bold: false
      },
      InlineSpan {
        text: "b".to_string(),
        bold: true
      },
      InlineSpan {
        text: " c **d".to_string(),
        bold: false
      },
    ]);
  }

  #[test]
  fn deck_navigation_clamps() {
    let slides = SlideParser::default()
      .split("a\n---\nb\n---\nc");
    let mut deck = SlideDeck::new(slides);
    assert!(!deck.prev());
    assert!(deck.handle_key("ArrowRight"));
    assert!(deck.handle_key("End"));
    assert_eq!(deck.current_index(), 2);
    assert!(!deck.next());
    assert!(deck.handle_key("Home"));
    assert!(!deck.handle_key("x"));
  }
}
