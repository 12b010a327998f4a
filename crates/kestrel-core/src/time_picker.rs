use std::fmt;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  NaiveDate,
  NaiveDateTime,
  NaiveTime,
  Timelike
};
use regex::Regex;
use serde::{
  Deserialize,
  Serialize
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub enum Meridiem {
  Am,
  Pm
}

impl Meridiem {
  pub fn as_str(self) -> &'static str {
    match self {
      | Meridiem::Am => "AM",
      | Meridiem::Pm => "PM"
    }
  }
}

/// A 12-hour clock reading.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct TimeValue {
  hour:     u32,
  minute:   u32,
  meridiem: Meridiem
}

impl Default for TimeValue {
  fn default() -> Self {
    Self {
      hour:     12,
      minute:   0,
      meridiem: Meridiem::Am
    }
  }
}

impl TimeValue {
  pub fn new(
    hour: u32,
    minute: u32,
    meridiem: Meridiem
  ) -> anyhow::Result<Self> {
    if !(1..=12).contains(&hour) {
      return Err(anyhow!(
        "hour must be between 1 and \
         12, got {hour}"
      ));
    }
    if minute > 59 {
      return Err(anyhow!(
        "minute must be between 0 and \
         59, got {minute}"
      ));
    }
    Ok(Self {
      hour,
      minute,
      meridiem
    })
  }

  pub fn from_naive_time(
    time: NaiveTime
  ) -> Self {
    let hour24 = time.hour();
    let meridiem = if hour24 >= 12 {
      Meridiem::Pm
    } else {
      Meridiem::Am
    };
    let hour = match hour24 % 12 {
      | 0 => 12,
      | h => h
    };
    Self {
      hour,
      minute: time.minute(),
      meridiem
    }
  }

  pub fn hour(&self) -> u32 {
    self.hour
  }

  pub fn minute(&self) -> u32 {
    self.minute
  }

  pub fn meridiem(&self) -> Meridiem {
    self.meridiem
  }

  pub fn hour24(&self) -> u32 {
    match (self.meridiem, self.hour) {
      | (Meridiem::Am, 12) => 0,
      | (Meridiem::Am, h) => h,
      | (Meridiem::Pm, 12) => 12,
      | (Meridiem::Pm, h) => h + 12
    }
  }

  /// Out-of-range values are ignored.
  pub fn set_hour(&mut self, hour: u32) {
    if (1..=12).contains(&hour) {
      self.hour = hour;
    }
  }

  pub fn set_minute(
    &mut self,
    minute: u32
  ) {
    if minute <= 59 {
      self.minute = minute;
    }
  }

  pub fn set_meridiem(
    &mut self,
    meridiem: Meridiem
  ) {
    self.meridiem = meridiem;
  }

  pub fn to_naive_time(
    &self
  ) -> NaiveTime {
    NaiveTime::from_hms_opt(
      self.hour24(),
      self.minute,
      0
    )
    .unwrap_or(NaiveTime::MIN)
  }

  /// Places this time of day on `date`.
  pub fn compose(
    &self,
    date: NaiveDate
  ) -> NaiveDateTime {
    date.and_time(self.to_naive_time())
  }
}

impl fmt::Display for TimeValue {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{}:{:02} {}",
      self.hour,
      self.minute,
      self.meridiem.as_str()
    )
  }
}

/// Parses `h:mm am|pm` or 24-hour `HH:MM`.
pub fn parse_time(
  raw: &str
) -> anyhow::Result<TimeValue> {
  let clock_re = Regex::new(
    r"(?i)^(?P<hour>\d{1,2})(?::(?P<minute>\d{2}))?\s*(?P<ampm>[ap]m)?$",
  )
  .map_err(|e| {
    anyhow!("internal regex compile failure: {e}")
  })?;
  let caps = clock_re
    .captures(raw.trim())
    .ok_or_else(|| {
      anyhow!("invalid time: {raw}")
    })?;

  let hour: u32 = caps
    .name("hour")
    .map(|m| m.as_str())
    .unwrap_or_default()
    .parse()
    .with_context(|| {
      format!("invalid hour in {raw}")
    })?;
  let minute: u32 = caps
    .name("minute")
    .map_or(Ok(0), |m| m.as_str().parse())
    .with_context(|| {
      format!("invalid minute in {raw}")
    })?;
  let meridiem = caps.name("ampm").map(|m| {
    if m.as_str().eq_ignore_ascii_case("am") {
      Meridiem::Am
    } else {
      Meridiem::Pm
    }
  });

  match meridiem {
    | Some(meridiem) => {
      TimeValue::new(
        hour, minute, meridiem
      )
    }
    | None => {
      let time = NaiveTime::from_hms_opt(
        hour, minute, 0
      )
      .ok_or_else(|| {
        anyhow!("invalid time: {raw}")
      })?;
      Ok(TimeValue::from_naive_time(
        time
      ))
    }
  }
}

pub fn hour_options() -> Vec<u32> {
  (1..=12).collect()
}

/// Minute choices for a picker; a zero
/// step falls back to one minute.
pub fn minute_options(
  step: u32
) -> Vec<u32> {
  let step = step.clamp(1, 60);
  (0..60).step_by(step as usize).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn converts_between_clocks() {
    let midnight = TimeValue::new(
      12,
      0,
      Meridiem::Am
    )
    .expect("valid");
    assert_eq!(midnight.hour24(), 0);

    let noon = TimeValue::new(
      12,
      30,
      Meridiem::Pm
    )
    .expect("valid");
    assert_eq!(noon.hour24(), 12);

    let evening =
      TimeValue::from_naive_time(
        NaiveTime::from_hms_opt(
          21, 15, 0
        )
        .expect("valid"),
      );
    assert_eq!(evening.hour(), 9);
    assert_eq!(
      evening.meridiem(),
      Meridiem::Pm
    );
    assert_eq!(
      evening.to_string(),
      "9:15 PM"
    );
  }

  #[test]
  fn composes_onto_date() {
    let mut value = TimeValue::default();
    value.set_hour(3);
    value.set_minute(45);
    value.set_meridiem(Meridiem::Pm);
    value.set_hour(13);
    value.set_minute(75);

    let date =
      NaiveDate::from_ymd_opt(2026, 7, 4)
        .expect("valid");
    let composed = value.compose(date);
    assert_eq!(
      composed
        .format("%Y-%m-%d %H:%M")
        .to_string(),
      "2026-07-04 15:45"
    );
  }

  #[test]
  fn parses_both_notations() {
    assert_eq!(
      parse_time("3:23pm")
        .expect("parse")
        .hour24(),
      15
    );
    assert_eq!(
      parse_time("07:05")
        .expect("parse")
        .to_string(),
      "7:05 AM"
    );
    assert!(parse_time("13:00 pm").is_err());
    assert!(parse_time("25:00").is_err());
  }

  #[test]
  fn minute_steps() {
    assert_eq!(
      minute_options(15),
      vec![0, 15, 30, 45]
    );
    assert_eq!(minute_options(0).len(), 60);
    assert_eq!(hour_options().len(), 12);
  }
}
