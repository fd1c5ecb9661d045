//! `auto_today` mode: find today's page among the grandchildren of a parent
//! page.
//!
//! Team spaces often keep one child page per month or sprint, each holding
//! one page per day or week. The parent's children are listed, every child's
//! own children are fetched concurrently, and the page that looks like
//! today's is picked from the combined set.

use std::cmp::Ordering;

use anyhow::{Context, Result};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use futures::future::join_all;
use regex::Regex;
use tracing::{debug, warn};

use crate::atlassian::{AtlassianApi, ConfluencePage, PageResults};
use crate::storage::markup::plain_text;

/// Days before today scanned for weekday-annotated dates, today included.
const RECENT_DAYS: u64 = 7;

/// Fetch the grandchildren of `parent_id` and select today's page.
///
/// # Errors
/// Fails only when the parent's children cannot be listed. A child whose own
/// children cannot be fetched is logged and skipped.
pub async fn fetch_today_page(api: &dyn AtlassianApi, parent_id: &str, today: NaiveDate) -> Result<PageResults> {
  let children = api
    .child_pages(parent_id, false)
    .await
    .with_context(|| format!("Failed to list child pages of {parent_id}"))?;

  debug!(
    "Fetching grandchildren of {parent_id} across {} child page(s)",
    children.results.len()
  );

  let fetches = children.results.iter().map(|child| async move {
    match api.child_pages(&child.id, true).await {
      Ok(grandchildren) => grandchildren.results,
      Err(e) => {
        warn!("Skipping children of page {} ({}): {e:#}", child.id, child.title);
        Vec::new()
      }
    }
  });
  let grandchildren: Vec<ConfluencePage> = join_all(fetches).await.into_iter().flatten().collect();

  Ok(match select_today_page(grandchildren, today) {
    Some(page) => PageResults::from(page),
    None => PageResults::default(),
  })
}

/// Pick the page that best matches `today`.
///
/// Pages are ordered newest first by creation time (pages without a
/// parseable timestamp last), then each criterion is tried against the whole
/// list before moving to the next:
///
/// 1. the title names today's ISO week (`week 38`, `38주차`)
/// 2. the title or body names today's month and day (`9월 22일`, `9/22`)
/// 3. the title or body names one of the last eight days with its weekday
///    (`9월 19일 (금)`, `9/19 (Fri)`)
///
/// When nothing matches the newest page is returned; `None` only for an empty
/// input.
pub fn select_today_page(mut pages: Vec<ConfluencePage>, today: NaiveDate) -> Option<ConfluencePage> {
  pages.sort_by(|a, b| match (a.created_at(), b.created_at()) {
    (Some(a), Some(b)) => b.cmp(&a),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  });

  let titles: Vec<&str> = pages.iter().map(|page| page.title.as_str()).collect();
  let texts: Vec<String> = pages
    .iter()
    .map(|page| format!("{}\n{}", page.title, plain_text(page.storage())))
    .collect();

  let week = week_pattern(today.iso_week().week());
  let position = titles
    .iter()
    .position(|title| week.is_match(title))
    .or_else(|| {
      let month_day = month_day_pattern(today);
      texts.iter().position(|text| month_day.is_match(text))
    })
    .or_else(|| {
      (0..=RECENT_DAYS)
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .find_map(|day| {
          let annotated = weekday_pattern(day);
          texts.iter().position(|text| annotated.is_match(text))
        })
    });

  match position {
    Some(index) => {
      debug!("Selected today's page {:?}", pages[index].title);
      Some(pages.swap_remove(index))
    }
    None => {
      debug!("No page matched today's date; using the most recent one");
      pages.into_iter().next()
    }
  }
}

fn week_pattern(week: u32) -> Regex {
  pattern(&format!(r"(?i)week\s*0?{week}(?:[^0-9]|$)|(?:^|[^0-9])0?{week}\s*주차"))
}

fn month_day_pattern(day: NaiveDate) -> Regex {
  let (month, date) = (day.month(), day.day());
  pattern(&format!(
    r"(?:^|[^0-9])0?{month}월\s*0?{date}일|(?:^|[^0-9])0?{month}/0?{date}(?:[^0-9]|$)"
  ))
}

fn weekday_pattern(day: NaiveDate) -> Regex {
  let (month, date) = (day.month(), day.day());
  let (korean, english) = weekday_names(day.weekday());
  pattern(&format!(
    r"(?i)(?:^|[^0-9])0?{month}월\s*0?{date}일\s*\(\s*{korean}(?:요일)?\s*\)|(?:^|[^0-9])0?{month}/0?{date}\s*\(\s*{english}[a-z]*\.?\s*\)"
  ))
}

fn weekday_names(weekday: Weekday) -> (&'static str, &'static str) {
  match weekday {
    Weekday::Mon => ("월", "Mon"),
    Weekday::Tue => ("화", "Tue"),
    Weekday::Wed => ("수", "Wed"),
    Weekday::Thu => ("목", "Thu"),
    Weekday::Fri => ("금", "Fri"),
    Weekday::Sat => ("토", "Sat"),
    Weekday::Sun => ("일", "Sun"),
  }
}

fn pattern(source: &str) -> Regex {
  Regex::new(source).expect("date patterns are assembled from integers and fixed text")
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn page(id: &str, title: &str, created: &str, body: &str) -> ConfluencePage {
    serde_json::from_value(json!({
      "id": id,
      "title": title,
      "history": { "createdDate": created },
      "body": { "storage": { "value": body, "representation": "storage" } }
    }))
    .unwrap()
  }

  fn today() -> NaiveDate {
    // Monday of ISO week 39.
    NaiveDate::from_ymd_opt(2025, 9, 22).unwrap()
  }

  fn selected_id(pages: Vec<ConfluencePage>) -> Option<String> {
    select_today_page(pages, today()).map(|page| page.id)
  }

  #[test]
  fn test_empty_input_selects_nothing() {
    assert_eq!(selected_id(Vec::new()), None);
  }

  #[test]
  fn test_week_title_wins_regardless_of_order() {
    let pages = vec![
      page("new", "Standup 9월 22일", "2025-09-22T09:00:00Z", ""),
      page("week", "Week 39 notes", "2025-09-01T09:00:00Z", ""),
      page("old", "Week 3 notes", "2025-01-13T09:00:00Z", ""),
    ];
    assert_eq!(selected_id(pages).as_deref(), Some("week"));
  }

  #[test]
  fn test_week_number_is_digit_bounded() {
    let pages = vec![
      page("a", "Week 390 archive", "2025-09-20T09:00:00Z", ""),
      page("b", "39주차 회의록", "2025-09-10T09:00:00Z", ""),
    ];
    assert_eq!(selected_id(pages).as_deref(), Some("b"));
  }

  #[test]
  fn test_month_day_in_title_or_body() {
    let pages = vec![
      page("newest", "Misc", "2025-09-22T10:00:00Z", "<p>nothing</p>"),
      page("body", "Daily", "2025-09-21T10:00:00Z", "<p>Agenda for <b>9/22</b></p>"),
      page("title", "9월 22일 회의", "2025-09-20T10:00:00Z", ""),
    ];
    assert_eq!(selected_id(pages).as_deref(), Some("body"));

    let not_today = vec![
      page("a", "Notes 9/221", "2025-09-22T10:00:00Z", ""),
      page("b", "Notes 19/22", "2025-09-21T10:00:00Z", ""),
      page("c", "Old", "2025-09-01T10:00:00Z", ""),
    ];
    // No criterion matches, so the newest page is used.
    assert_eq!(selected_id(not_today).as_deref(), Some("a"));
  }

  #[test]
  fn test_recent_weekday_annotated_dates() {
    let pages = vec![
      page("newest", "Misc", "2025-09-22T10:00:00Z", ""),
      page("friday", "Log", "2025-09-19T10:00:00Z", "<p>9월 19일 (금)</p>"),
      page("wednesday", "Log", "2025-09-17T10:00:00Z", "<p>9/17 (Wed)</p>"),
    ];
    assert_eq!(selected_id(pages).as_deref(), Some("friday"));

    let english_only = vec![
      page("newest", "Misc", "2025-09-22T10:00:00Z", ""),
      page("wednesday", "Log", "2025-09-17T10:00:00Z", "<p>9/17 (Wed)</p>"),
    ];
    assert_eq!(selected_id(english_only).as_deref(), Some("wednesday"));
  }

  #[test]
  fn test_weekday_window_covers_eight_days() {
    let last_monday = vec![
      page("newest", "Misc", "2025-09-22T10:00:00Z", ""),
      page("monday", "Log", "2025-09-15T10:00:00Z", "9월 15일 (월)"),
    ];
    assert_eq!(selected_id(last_monday).as_deref(), Some("monday"));

    let too_old = vec![
      page("newest", "Misc", "2025-09-22T10:00:00Z", ""),
      page("sunday", "Log", "2025-09-14T10:00:00Z", "9월 14일 (일)"),
    ];
    assert_eq!(selected_id(too_old).as_deref(), Some("newest"));
  }

  #[test]
  fn test_wrong_weekday_does_not_match() {
    let pages = vec![
      page("newest", "Misc", "2025-09-22T10:00:00Z", ""),
      page("wrong", "Log", "2025-09-19T10:00:00Z", "9월 19일 (월)"),
    ];
    assert_eq!(selected_id(pages).as_deref(), Some("newest"));
  }

  #[test]
  fn test_fallback_orders_by_creation_with_unparseable_last() {
    let pages = vec![
      page("broken", "A", "not a date", ""),
      page("older", "B", "2025-08-01T10:00:00Z", ""),
      page("newer", "C", "2025-09-01T10:00:00+09:00", ""),
    ];
    assert_eq!(selected_id(pages).as_deref(), Some("newer"));
  }
}
