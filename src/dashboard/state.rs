//! Display state and the reducer that folds cycle events into it.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::atlassian::{ConfluencePage, Issue, IssueSearch, PageResults};

/// Which panel of the widget is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
  /// JIRA issues
  #[default]
  Jira,
  /// Confluence pages
  Confluence,
}

/// Outcome of one branch of a fetch cycle. Exactly one of `data` and `error`
/// is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fetched<T> {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<T>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl<T> Fetched<T> {
  pub fn ok(data: T) -> Self {
    Self {
      data: Some(data),
      error: None,
    }
  }

  pub fn failed(message: impl Into<String>) -> Self {
    Self {
      data: None,
      error: Some(message.into()),
    }
  }

  /// Capture a branch result, flattening the error chain into one message.
  pub fn from_result(result: anyhow::Result<T>) -> Self {
    match result {
      Ok(data) => Self::ok(data),
      Err(e) => Self::failed(format!("{e:#}")),
    }
  }

  pub fn is_ok(&self) -> bool {
    self.error.is_none()
  }
}

/// Events the reducer understands. Unknown `type` tags deserialize into
/// [`Event::Unrecognized`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
  FetchSucceeded {
    jira: Fetched<IssueSearch>,
    confluence: Fetched<PageResults>,
    #[serde(rename = "activeTab", default, skip_serializing_if = "Option::is_none")]
    active_tab: Option<Tab>,
  },
  FetchFailed {
    error: String,
  },
  SwitchTab {
    tab: Tab,
  },
  #[serde(other)]
  Unrecognized,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayState {
  #[serde(default)]
  pub issues: Vec<Issue>,
  #[serde(default)]
  pub pages: Vec<ConfluencePage>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub issues_error: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pages_error: Option<String>,
  /// Failure of the whole cycle; replaces the entire display.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(default)]
  pub active_tab: Tab,
}

/// Fold an event into the previous state.
///
/// Total and side-effect free: the previous state is only read, and a fresh
/// value is returned for every event.
pub fn update_state(event: Event, previous: Option<&DisplayState>) -> DisplayState {
  let base = || previous.cloned().unwrap_or_default();

  match event {
    Event::FetchSucceeded {
      jira,
      confluence,
      active_tab,
    } => DisplayState {
      issues: jira.data.map(|search| search.issues).unwrap_or_default(),
      pages: confluence.data.map(|results| results.results).unwrap_or_default(),
      issues_error: jira.error,
      pages_error: confluence.error,
      error: None,
      active_tab: active_tab
        .or_else(|| previous.map(|state| state.active_tab))
        .unwrap_or_default(),
    },
    Event::FetchFailed { error } => DisplayState {
      error: Some(error),
      ..base()
    },
    Event::SwitchTab { tab } => DisplayState {
      active_tab: tab,
      ..base()
    },
    Event::Unrecognized => base(),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn issue_search(keys: &[&str]) -> IssueSearch {
    serde_json::from_value(json!({
      "issues": keys
        .iter()
        .map(|key| json!({ "key": key, "fields": { "summary": format!("Summary {key}") } }))
        .collect::<Vec<_>>()
    }))
    .unwrap()
  }

  fn page_results(ids: &[&str]) -> PageResults {
    serde_json::from_value(json!({
      "results": ids.iter().map(|id| json!({ "id": id, "title": format!("Page {id}") })).collect::<Vec<_>>()
    }))
    .unwrap()
  }

  fn loaded_state() -> DisplayState {
    update_state(
      Event::FetchSucceeded {
        jira: Fetched::ok(issue_search(&["OPS-1", "OPS-2"])),
        confluence: Fetched::failed("Confluence: 500 Internal Server Error - https://x"),
        active_tab: Some(Tab::Confluence),
      },
      None,
    )
  }

  #[test]
  fn test_fetch_succeeded_replaces_collections() {
    let state = loaded_state();
    assert_eq!(state.issues.len(), 2);
    assert!(state.pages.is_empty());
    assert_eq!(state.issues_error, None);
    assert_eq!(
      state.pages_error.as_deref(),
      Some("Confluence: 500 Internal Server Error - https://x")
    );
    assert_eq!(state.active_tab, Tab::Confluence);
  }

  #[test]
  fn test_fetch_succeeded_tab_falls_back_to_previous_then_default() {
    let previous = loaded_state();
    let event = || Event::FetchSucceeded {
      jira: Fetched::ok(issue_search(&[])),
      confluence: Fetched::ok(page_results(&["1"])),
      active_tab: None,
    };

    assert_eq!(update_state(event(), Some(&previous)).active_tab, Tab::Confluence);
    assert_eq!(update_state(event(), None).active_tab, Tab::Jira);
  }

  #[test]
  fn test_fetch_succeeded_clears_top_level_error() {
    let failed = update_state(
      Event::FetchFailed {
        error: "boom".to_string(),
      },
      None,
    );
    let recovered = update_state(
      Event::FetchSucceeded {
        jira: Fetched::ok(issue_search(&["OPS-3"])),
        confluence: Fetched::ok(page_results(&[])),
        active_tab: None,
      },
      Some(&failed),
    );
    assert_eq!(recovered.error, None);
    assert_eq!(recovered.issues.len(), 1);
  }

  #[test]
  fn test_fetch_failed_keeps_previous_data() {
    let previous = loaded_state();
    let state = update_state(
      Event::FetchFailed {
        error: "invalid config".to_string(),
      },
      Some(&previous),
    );
    assert_eq!(state.error.as_deref(), Some("invalid config"));
    assert_eq!(state.issues, previous.issues);
    assert_eq!(state.active_tab, previous.active_tab);
  }

  #[test]
  fn test_switch_tab_changes_only_the_tab() {
    let previous = loaded_state();
    let state = update_state(Event::SwitchTab { tab: Tab::Jira }, Some(&previous));

    assert_eq!(state.active_tab, Tab::Jira);
    let mut before = serde_json::to_value(&previous).unwrap();
    let mut after = serde_json::to_value(&state).unwrap();
    before.as_object_mut().unwrap().remove("activeTab");
    after.as_object_mut().unwrap().remove("activeTab");
    assert_eq!(
      serde_json::to_string(&before).unwrap(),
      serde_json::to_string(&after).unwrap()
    );
  }

  #[test]
  fn test_unrecognized_event() {
    let previous = loaded_state();
    assert_eq!(update_state(Event::Unrecognized, Some(&previous)), previous);

    let initial = update_state(Event::Unrecognized, None);
    assert_eq!(initial, DisplayState::default());
    assert_eq!(
      serde_json::to_value(&initial).unwrap(),
      json!({ "issues": [], "pages": [], "activeTab": "jira" })
    );
  }

  #[test]
  fn test_events_deserialize_by_type_tag() {
    let event: Event = serde_json::from_value(json!({ "type": "SWITCH_TAB", "tab": "confluence" })).unwrap();
    assert_eq!(event, Event::SwitchTab { tab: Tab::Confluence });

    let event: Event = serde_json::from_value(json!({ "type": "FETCH_FAILED", "error": "x" })).unwrap();
    assert_eq!(
      event,
      Event::FetchFailed {
        error: "x".to_string()
      }
    );

    let event: Event = serde_json::from_value(json!({
      "type": "FETCH_SUCCEEDED",
      "jira": { "data": { "issues": [] } },
      "confluence": { "error": "Confluence: 404 Not Found - https://x" }
    }))
    .unwrap();
    let Event::FetchSucceeded { confluence, .. } = event else {
      panic!("expected FetchSucceeded");
    };
    assert!(!confluence.is_ok());

    let event: Event = serde_json::from_value(json!({ "type": "REFRESH_REQUESTED" })).unwrap();
    assert_eq!(event, Event::Unrecognized);
  }
}
