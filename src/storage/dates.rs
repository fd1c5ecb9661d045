//! Date and time normalization for storage-format content.
//!
//! Confluence expresses dates in several shapes: `date`/`time`/`datetime`
//! structured macros carrying a `value` parameter, `<time datetime>` elements,
//! spans classed as dates, and `data-date` attributes. All of them collapse
//! into a `<span>` tagged `confluence-date`, `confluence-time` or
//! `confluence-datetime` whose text is localized, or a bracketed placeholder
//! when the value cannot be parsed.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::tree::{Element, Node, Visit, rewrite_elements};

pub const DATE_CLASS: &str = "confluence-date";
pub const TIME_CLASS: &str = "confluence-time";
pub const DATETIME_CLASS: &str = "confluence-datetime";

const DATE_MACRO_PLACEHOLDER: &str = "[Date Component]";
const TIME_ELEMENT_PLACEHOLDER: &str = "[Time Element]";
const DATA_DATE_PLACEHOLDER: &str = "[Data Date]";
const TIME_MACRO_PLACEHOLDER: &str = "[Time]";
const DATETIME_MACRO_PLACEHOLDER: &str = "[DateTime]";

const DATE_TIME_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%d %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Locale used when rendering dates and times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
  /// Korean (`2025년 9월 22일`, `오후 02:30`)
  #[default]
  Ko,
  /// English (`Sep 22, 2025`, `02:30 PM`)
  En,
}

/// Parses a date or date-time value into a local wall-clock instant.
///
/// Accepts RFC 3339 / ISO 8601 timestamps (offsets are converted to the local
/// time zone), naive `YYYY-MM-DD[T ]HH:MM[:SS]` values, plain dates in
/// `YYYY-MM-DD` or `YYYY/MM/DD` form, and RFC 2822 timestamps.
///
/// # Returns
/// `None` when the value does not describe a valid instant.
pub fn parse_instant(value: &str) -> Option<NaiveDateTime> {
  let value = value.trim();
  if value.is_empty() {
    return None;
  }

  if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
    return Some(parsed.with_timezone(&Local).naive_local());
  }
  if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
    return Some(parsed.with_timezone(&Local).naive_local());
  }
  if let Some(parsed) = DATE_TIME_FORMATS
    .iter()
    .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
  {
    return Some(parsed);
  }
  if let Some(parsed) = DATE_FORMATS
    .iter()
    .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
  {
    return Some(parsed.and_time(NaiveTime::MIN));
  }
  DateTime::parse_from_rfc2822(value)
    .ok()
    .map(|parsed| parsed.with_timezone(&Local).naive_local())
}

/// Parses a time-of-day value such as `14:30` or `09:05:00`.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
  let value = value.trim();
  TIME_FORMATS
    .iter()
    .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}

/// Year, month and day, e.g. `2025년 9월 22일` or `Sep 22, 2025`.
pub fn format_date(date: NaiveDate, locale: Locale) -> String {
  match locale {
    Locale::Ko => format!("{}년 {}월 {}일", date.year(), date.month(), date.day()),
    Locale::En => date.format("%b %-d, %Y").to_string(),
  }
}

/// Hour and minute on a 12-hour clock, e.g. `오후 02:30` or `02:30 PM`.
pub fn format_time(time: NaiveTime, locale: Locale) -> String {
  match locale {
    Locale::Ko => {
      let (is_pm, hour) = time.hour12();
      let meridiem = if is_pm { "오후" } else { "오전" };
      format!("{meridiem} {hour:02}:{:02}", time.minute())
    }
    Locale::En => time.format("%I:%M %p").to_string(),
  }
}

/// Date followed by time, e.g. `2025년 9월 22일 오후 02:30`.
pub fn format_datetime(instant: NaiveDateTime, locale: Locale) -> String {
  let date = format_date(instant.date(), locale);
  let time = format_time(instant.time(), locale);
  match locale {
    Locale::Ko => format!("{date} {time}"),
    Locale::En => format!("{date}, {time}"),
  }
}

/// Month and day without the year, e.g. `9월 22일` or `Sep 22`.
pub fn format_month_day(date: NaiveDate, locale: Locale) -> String {
  match locale {
    Locale::Ko => format!("{}월 {}일", date.month(), date.day()),
    Locale::En => date.format("%b %-d").to_string(),
  }
}

/// Month, day and time without the year, e.g. `9월 22일 오후 02:30`.
pub fn format_month_day_time(instant: NaiveDateTime, locale: Locale) -> String {
  let day = format_month_day(instant.date(), locale);
  let time = format_time(instant.time(), locale);
  match locale {
    Locale::Ko => format!("{day} {time}"),
    Locale::En => format!("{day}, {time}"),
  }
}

/// Rewrites every date-bearing construct into a semantic date span.
pub fn normalize_dates(nodes: Vec<Node>, locale: Locale) -> Vec<Node> {
  rewrite_elements(nodes, &mut |element| match date_span(&element, locale) {
    Some(span) => Visit::Replace(vec![span]),
    None => Visit::Descend(element),
  })
}

fn date_span(element: &Element, locale: Locale) -> Option<Node> {
  if element.is("ac:structured-macro") && element.attribute("ac:name") == Some("date") {
    let text = macro_value(element)
      .and_then(|value| parse_instant(&value))
      .map(|instant| format_date(instant.date(), locale))
      .unwrap_or_else(|| DATE_MACRO_PLACEHOLDER.to_string());
    return Some(semantic_span(DATE_CLASS, text));
  }

  if element.is("time")
    && let Some(datetime) = element.attribute("datetime")
  {
    let visible = element.text();
    let text = if !visible.trim().is_empty() {
      visible
    } else {
      parse_instant(datetime)
        .map(|instant| format_date(instant.date(), locale))
        .unwrap_or_else(|| TIME_ELEMENT_PLACEHOLDER.to_string())
    };
    return Some(semantic_span(DATE_CLASS, text));
  }

  if element.is("span") && element.class_contains("date") && !is_semantic_span(element) {
    return Some(semantic_span(DATE_CLASS, element.text()));
  }

  if element.has_attribute("data-date") && !is_semantic_span(element) {
    let visible = element.text();
    let text = if visible.trim().is_empty() {
      DATA_DATE_PLACEHOLDER.to_string()
    } else {
      visible
    };
    return Some(semantic_span(DATE_CLASS, text));
  }

  if element.is("ac:structured-macro") && element.attribute("ac:name") == Some("time") {
    let text = macro_value(element)
      .and_then(|value| parse_time_of_day(&value))
      .map(|time| format_time(time, locale))
      .unwrap_or_else(|| TIME_MACRO_PLACEHOLDER.to_string());
    return Some(semantic_span(TIME_CLASS, text));
  }

  if element.is("ac:structured-macro") && element.attribute("ac:name") == Some("datetime") {
    let text = macro_value(element)
      .and_then(|value| parse_instant(&value))
      .map(|instant| format_datetime(instant, locale))
      .unwrap_or_else(|| DATETIME_MACRO_PLACEHOLDER.to_string());
    return Some(semantic_span(DATETIME_CLASS, text));
  }

  None
}

/// Text of the macro's `value` parameter.
fn macro_value(element: &Element) -> Option<String> {
  element.children.iter().find_map(|child| match child {
    Node::Element(parameter) if parameter.is("ac:parameter") && parameter.attribute("ac:name") == Some("value") => {
      Some(parameter.text())
    }
    _ => None,
  })
}

/// Spans this pass already produced; rewriting them again would change
/// `confluence-datetime` into `confluence-date`.
fn is_semantic_span(element: &Element) -> bool {
  element.is("span")
    && element
      .attribute("class")
      .is_some_and(|class| [DATE_CLASS, TIME_CLASS, DATETIME_CLASS].contains(&class))
}

fn semantic_span(class: &str, text: String) -> Node {
  Node::Element(Element::new("span").with_class(class).with_text(text))
}
