use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  Duration,
  NaiveDate,
  NaiveDateTime,
  Utc,
  Weekday
};
use chrono_tz::Tz;

pub static MONTH_NAMES: [&str; 12] = [
  "January",
  "February",
  "March",
  "April",
  "May",
  "June",
  "July",
  "August",
  "September",
  "October",
  "November",
  "December"
];

pub static WEEKDAY_NAMES: [&str; 7] = [
  "Sunday",
  "Monday",
  "Tuesday",
  "Wednesday",
  "Thursday",
  "Friday",
  "Saturday"
];

#[must_use]
pub fn is_same_day(
  a: NaiveDate,
  b: NaiveDate
) -> bool {
  a.year() == b.year()
    && a.month() == b.month()
    && a.day() == b.day()
}

/// Same-day equality for timestamps; the
/// time of day is ignored.
#[must_use]
pub fn is_same_day_time(
  a: NaiveDateTime,
  b: NaiveDateTime
) -> bool {
  is_same_day(a.date(), b.date())
}

#[must_use]
pub fn is_same_month(
  a: NaiveDate,
  b: NaiveDate
) -> bool {
  a.year() == b.year()
    && a.month() == b.month()
}

#[must_use]
pub fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  let (next_year, next_month) =
    if month >= 12 {
      (year + 1, 1)
    } else {
      (year, month + 1)
    };
  NaiveDate::from_ymd_opt(
    next_year, next_month, 1
  )
  .and_then(|first| first.pred_opt())
  .map(|last| last.day())
  .unwrap_or(31)
}

#[must_use]
pub fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .unwrap_or(date)
}

/// Shifts by whole months, clamping the
/// day to the target month's length.
#[must_use]
pub fn add_months(
  date: NaiveDate,
  months: i32
) -> NaiveDate {
  let total = date.year() * 12
    + date.month0() as i32
    + months;
  let year = total.div_euclid(12);
  let month =
    total.rem_euclid(12) as u32 + 1;
  let day = date
    .day()
    .min(days_in_month(year, month));
  NaiveDate::from_ymd_opt(
    year, month, day
  )
  .unwrap_or(date)
}

#[must_use]
pub fn start_of_month(
  date: NaiveDate
) -> NaiveDate {
  date.with_day(1).unwrap_or(date)
}

#[must_use]
pub fn end_of_month(
  date: NaiveDate
) -> NaiveDate {
  date
    .with_day(days_in_month(
      date.year(),
      date.month()
    ))
    .unwrap_or(date)
}

#[must_use]
pub fn start_of_week(
  date: NaiveDate,
  week_start: Weekday
) -> NaiveDate {
  let offset = (date
    .weekday()
    .num_days_from_sunday()
    + 7
    - week_start.num_days_from_sunday())
    % 7;
  add_days(date, -i64::from(offset))
}

/// Weekday labels in display order for a
/// grid starting on `week_start`.
#[must_use]
pub fn weekday_labels(
  week_start: Weekday
) -> Vec<&'static str> {
  let mut day = week_start;
  (0..7)
    .map(|_| {
      let idx = day
        .num_days_from_sunday()
        as usize;
      day = day.succ();
      &WEEKDAY_NAMES[idx][..2]
    })
    .collect()
}

/// Full or three-letter weekday name, in
/// any case.
#[must_use]
pub fn parse_week_start(
  raw: &str
) -> Option<Weekday> {
  raw.trim().parse::<Weekday>().ok()
}

pub fn parse_iso_date(
  raw: &str
) -> anyhow::Result<NaiveDate> {
  NaiveDate::parse_from_str(
    raw.trim(),
    "%Y-%m-%d"
  )
  .with_context(|| {
    format!(
      "invalid date (expected \
       YYYY-MM-DD): {raw}"
    )
  })
}

/// Parses `YYYY-MM` into the first day of
/// that month.
pub fn parse_month(
  raw: &str
) -> anyhow::Result<NaiveDate> {
  let trimmed = raw.trim();
  let (year, month) = trimmed
    .split_once('-')
    .ok_or_else(|| {
      anyhow!(
        "invalid month (expected \
         YYYY-MM): {raw}"
      )
    })?;
  let year: i32 =
    year.parse().with_context(|| {
      format!("invalid year in {raw}")
    })?;
  let month: u32 =
    month.parse().with_context(|| {
      format!("invalid month in {raw}")
    })?;
  NaiveDate::from_ymd_opt(
    year, month, 1
  )
  .ok_or_else(|| {
    anyhow!(
      "month out of range: {raw}"
    )
  })
}

#[must_use]
pub fn today_in(tz: Tz) -> NaiveDate {
  Utc::now()
    .with_timezone(&tz)
    .date_naive()
}

pub fn parse_timezone(
  raw: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => Some(tz),
    | Err(err) => {
      tracing::warn!(
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

/// Formats a date with a small token
/// template: `yyyy yy MMMM MMM MM M dd d
/// EEEE EEE`. Text inside single quotes
/// is copied verbatim.
#[must_use]
pub fn format_date(
  date: NaiveDate,
  template: &str
) -> String {
  let chars: Vec<char> =
    template.chars().collect();
  let mut out = String::with_capacity(
    template.len() + 8
  );
  let mut i = 0;

  while i < chars.len() {
    let ch = chars[i];

    if ch == '\'' {
      i += 1;
      while i < chars.len()
        && chars[i] != '\''
      {
        out.push(chars[i]);
        i += 1;
      }
      i += 1;
      continue;
    }

    let mut run = 1;
    while i + run < chars.len()
      && chars[i + run] == ch
    {
      run += 1;
    }

    match (ch, run) {
      | ('y', 2) => {
        out.push_str(&format!(
          "{:02}",
          date.year().rem_euclid(100)
        ));
      }
      | ('y', _) => {
        out.push_str(&format!(
          "{:04}",
          date.year()
        ));
      }
      | ('M', 1) => {
        out.push_str(
          &date.month().to_string()
        );
      }
      | ('M', 2) => {
        out.push_str(&format!(
          "{:02}",
          date.month()
        ));
      }
      | ('M', 3) => {
        out.push_str(
          &MONTH_NAMES
            [date.month0() as usize]
            [..3]
        );
      }
      | ('M', _) => {
        out.push_str(
          MONTH_NAMES
            [date.month0() as usize]
        );
      }
      | ('d', 1) => {
        out.push_str(
          &date.day().to_string()
        );
      }
      | ('d', _) => {
        out.push_str(&format!(
          "{:02}",
          date.day()
        ));
      }
      | ('E', n) => {
        let name = WEEKDAY_NAMES[date
          .weekday()
          .num_days_from_sunday()
          as usize];
        if n >= 4 {
          out.push_str(name);
        } else {
          out.push_str(&name[..3]);
        }
      }
      | _ => {
        for _ in 0..run {
          out.push(ch);
        }
      }
    }

    i += run;
  }

  out
}

#[cfg(test)]
mod tests {
  use chrono::{
    NaiveDate,
    Weekday
  };

  use super::*;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn same_day_ignores_time_of_day() {
    let morning = date(2026, 3, 4)
      .and_hms_opt(8, 0, 0)
      .expect("valid time");
    let night = date(2026, 3, 4)
      .and_hms_opt(23, 59, 0)
      .expect("valid time");
    assert!(is_same_day_time(
      morning, night
    ));
    assert!(!is_same_day(
      date(2026, 3, 4),
      date(2026, 3, 5)
    ));
    assert!(is_same_month(
      date(2026, 3, 1),
      date(2026, 3, 31)
    ));
  }

  #[test]
  fn add_months_clamps_day() {
    assert_eq!(
      add_months(date(2026, 1, 31), 1),
      date(2026, 2, 28)
    );
    assert_eq!(
      add_months(date(2024, 1, 31), 1),
      date(2024, 2, 29)
    );
    assert_eq!(
      add_months(date(2026, 1, 15), -1),
      date(2025, 12, 15)
    );
    assert_eq!(
      add_months(date(2026, 11, 5), 14),
      date(2028, 1, 5)
    );
  }

  #[test]
  fn start_of_week_respects_configured_day()
  {
    // 2026-10-14 is a Wednesday.
    let wed = date(2026, 10, 14);
    assert_eq!(
      start_of_week(wed, Weekday::Sun),
      date(2026, 10, 11)
    );
    assert_eq!(
      start_of_week(wed, Weekday::Mon),
      date(2026, 10, 12)
    );
    let sun = date(2026, 10, 11);
    assert_eq!(
      start_of_week(sun, Weekday::Mon),
      date(2026, 10, 5)
    );
  }

  #[test]
  fn month_bounds() {
    assert_eq!(days_in_month(2026, 2), 28);
    assert_eq!(days_in_month(2024, 2), 29);
    assert_eq!(days_in_month(2026, 12), 31);
    assert_eq!(
      end_of_month(date(2026, 4, 9)),
      date(2026, 4, 30)
    );
    assert_eq!(
      start_of_month(date(2026, 4, 9)),
      date(2026, 4, 1)
    );
  }

  #[test]
  fn formats_template_tokens() {
    let d = date(2026, 3, 7);
    assert_eq!(
      format_date(d, "yyyy-MM-dd"),
      "2026-03-07"
    );
    assert_eq!(
      format_date(d, "MMMM d, yyyy"),
      "March 7, 2026"
    );
    assert_eq!(
      format_date(d, "EEE, MMM dd ''yy"),
      "Sat, Mar 07 26"
    );
    assert_eq!(
      format_date(d, "'Day' d 'of' M"),
      "Day 7 of 3"
    );
  }

  #[test]
  fn parses_months_and_week_starts() {
    assert_eq!(
      parse_month("2026-02")
        .expect("parse month"),
      date(2026, 2, 1)
    );
    assert!(parse_month("2026-13").is_err());
    assert!(parse_month("feb").is_err());
    assert_eq!(
      parse_week_start("Monday"),
      Some(Weekday::Mon)
    );
    assert_eq!(
      parse_week_start(" mon "),
      Some(Weekday::Mon)
    );
    assert_eq!(
      parse_week_start("SAT"),
      Some(Weekday::Sat)
    );
    assert_eq!(parse_week_start("whatever"), None);
    assert_eq!(parse_week_start(""), None);
    assert_eq!(
      weekday_labels(Weekday::Mon)[0],
      "Mo"
    );
  }
}
