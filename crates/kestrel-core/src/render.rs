use std::io::{
  self,
  IsTerminal,
  Write
};

use chrono::{
  Datelike,
  Weekday
};
use unicode_width::UnicodeWidthStr;

use crate::calendar::{
  DayCell,
  MonthGrid
};
use crate::datetime::{
  MONTH_NAMES,
  weekday_labels
};
use crate::slides::{
  Slide,
  SlideBlock,
  parse_blocks
};

const CELL_WIDTH: usize = 4;

/// Terminal output for the site CLI.
#[derive(Debug, Clone)]
pub struct Renderer {
  color: bool
}

impl Renderer {
  /// Colour is only used when requested
  /// and stdout is a terminal.
  pub fn new(color: bool) -> Self {
    Self {
      color: color
        && io::stdout().is_terminal()
    }
  }

  pub fn plain() -> Self {
    Self { color: false }
  }

  /// Month grid with selection markers:
  /// `[d]` selected or range end, `(d)`
  /// inside a range, `*d` today, `d-`
  /// disabled.
  pub fn month_text(
    &self,
    grid: &MonthGrid,
    week_start: Weekday
  ) -> String {
    let row_width = CELL_WIDTH * 7;
    let month_name = MONTH_NAMES
      .get(grid.view.month as usize - 1)
      .copied()
      .unwrap_or("?");
    let title = format!(
      "{month_name} {}",
      grid.view.year
    );
    let pad = row_width.saturating_sub(
      UnicodeWidthStr::width(title.as_str())
    ) / 2;

    let mut out = String::new();
    out.push_str(&" ".repeat(pad));
    out.push_str(&title);
    out.push('\n');

    for label in weekday_labels(week_start)
    {
      out.push_str(&format!(
        "{label:>width$}",
        width = CELL_WIDTH - 1
      ));
      out.push(' ');
    }
    out.push('\n');

    for week in &grid.weeks {
      let line = week
        .iter()
        .map(|cell| self.day_cell(cell))
        .collect::<String>();
      out.push_str(line.trim_end());
      out.push('\n');
    }
    out
  }

  fn day_cell(
    &self,
    cell: &DayCell
  ) -> String {
    if !cell.in_month {
      return " ".repeat(CELL_WIDTH);
    }
    let day = cell.date.day();

    let (text, code) = if cell.selected
      || cell.range_start
      || cell.range_end
    {
      (format!("[{day:>2}]"), "7")
    } else if cell.in_range {
      (format!("({day:>2})"), "36")
    } else if cell.disabled {
      (format!(" {day:>2}-"), "2")
    } else if cell.is_today {
      (format!("*{day:>2} "), "33")
    } else {
      (format!(" {day:>2} "), "")
    };

    if code.is_empty() {
      text
    } else {
      self.paint(&text, code)
    }
  }

  #[tracing::instrument(skip(self, grid))]
  pub fn print_month(
    &self,
    grid: &MonthGrid,
    week_start: Weekday
  ) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    write!(
      out,
      "{}",
      self.month_text(grid, week_start)
    )?;
    Ok(())
  }

  /// One row per slide: index, kind,
  /// first heading and block count.
  #[tracing::instrument(skip_all)]
  pub fn print_slide_outline(
    &self,
    slides: &[Slide]
  ) -> anyhow::Result<()> {
    let headers = vec![
      "#".to_string(),
      "Kind".to_string(),
      "Heading".to_string(),
      "Blocks".to_string(),
    ];
    let rows = slides
      .iter()
      .enumerate()
      .map(|(idx, slide)| {
        let blocks =
          parse_blocks(&slide.content);
        let heading = blocks
          .iter()
          .find_map(|block| match block {
            | SlideBlock::Heading {
              text,
              ..
            } => Some(text.clone()),
            | _ => None
          })
          .unwrap_or_default();
        let kind = if slide.is_title {
          self.paint("title", "33")
        } else {
          "content".to_string()
        };
        vec![
          (idx + 1).to_string(),
          kind,
          heading,
          blocks.len().to_string(),
        ]
      })
      .collect();

    write_table(io::stdout().lock(), headers, rows)
  }

  fn paint(
    &self,
    text: &str,
    code: &str
  ) -> String {
    if !self.color {
      return text.to_string();
    }
    format!("\x1b[{code}m{text}\x1b[0m")
  }
}

fn write_table<W: Write>(
  mut writer: W,
  headers: Vec<String>,
  rows: Vec<Vec<String>>
) -> anyhow::Result<()> {
  let mut widths: Vec<usize> = headers
    .iter()
    .map(|h| UnicodeWidthStr::width(h.as_str()))
    .collect();

  for row in &rows {
    for (idx, cell) in row.iter().enumerate()
    {
      if let Some(width) = widths.get_mut(idx)
      {
        *width = (*width).max(visible_width(
          cell
        ));
      }
    }
  }

  for (header, width) in
    headers.iter().zip(&widths)
  {
    write!(writer, "{header:width$} ")?;
  }
  writeln!(writer)?;
  for width in &widths {
    write!(writer, "{:-<width$} ", "")?;
  }
  writeln!(writer)?;

  for row in rows {
    for (cell, width) in row.iter().zip(&widths)
    {
      let padding = width
        .saturating_sub(visible_width(cell));
      write!(
        writer,
        "{cell}{} ",
        " ".repeat(padding)
      )?;
    }
    writeln!(writer)?;
  }
  Ok(())
}

fn visible_width(s: &str) -> usize {
  UnicodeWidthStr::width(
    strip_ansi(s).as_str()
  )
}

fn strip_ansi(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut escaped = false;
  for ch in s.chars() {
    if escaped {
      if ch == 'm' {
        escaped = false;
      }
      continue;
    }
    if ch == '\x1b' {
      escaped = true;
      continue;
    }
    out.push(ch);
  }
  out
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::calendar::{
    CalendarView,
    build_month_grid
  };
  use crate::selection::{
    DateConstraints,
    SelectionMode
  };

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day)
      .expect("valid date")
  }

  #[test]
  fn marks_range_and_today() {
    let grid = build_month_grid(
      CalendarView {
        year:  2026,
        month: 10
      },
      Weekday::Sun,
      d(2026, 10, 18),
      SelectionMode::Range,
      &[d(2026, 10, 5), d(2026, 10, 7)],
      &DateConstraints::default()
        .with_disabled([d(2026, 10, 30)])
    );
    let text =
      Renderer::plain().month_text(&grid, Weekday::Sun);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0].trim(), "October 2026");
    assert_eq!(
      lines[1].split_whitespace().next(),
      Some("Su")
    );
    assert!(text.contains("[ 5]"));
    assert!(text.contains("( 6)"));
    assert!(text.contains("[ 7]"));
    assert!(text.contains("*18"));
    assert!(text.contains(" 30-"));
    assert!(!text.contains('\x1b'));
  }

  #[test]
  fn table_pads_by_visible_width() {
    let mut buf = Vec::new();
    write_table(
      &mut buf,
      vec!["A".to_string(), "B".to_string()],
      vec![vec![
        "\x1b[33mxx\x1b[0m".to_string(),
        "y".to_string(),
      ]]
    )
    .expect("write table");
    let text =
      String::from_utf8(buf).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "A  B ");
    assert_eq!(lines[1], "-- - ");
  }
}
