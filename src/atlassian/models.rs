//! Data transfer objects returned by the JIRA and Confluence REST APIs.
//!
//! Only the fields the dashboard reads are modelled; everything else in the
//! responses is ignored. All models serialize back to the same camelCase
//! shape so display states can be handed to the host as JSON.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One JIRA issue from a search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
  /// Issue key such as `OPS-42`.
  pub key: String,
  pub fields: IssueFields,
}

/// The subset of issue fields requested by the search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssueFields {
  #[serde(default)]
  pub summary: String,
  #[serde(default)]
  pub issuetype: Option<IssueType>,
  #[serde(default)]
  pub status: Option<IssueStatus>,
  #[serde(default)]
  pub assignee: Option<User>,
  /// Due date in `YYYY-MM-DD` form.
  #[serde(default)]
  pub duedate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueType {
  pub name: String,
  #[serde(rename = "iconUrl", default)]
  pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStatus {
  pub name: String,
}

/// An Atlassian user reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  #[serde(rename = "displayName")]
  pub display_name: String,
}

/// Issue search response wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssueSearch {
  #[serde(default)]
  pub issues: Vec<Issue>,
  #[serde(rename = "startAt", default, skip_serializing_if = "Option::is_none")]
  pub start_at: Option<u64>,
  #[serde(rename = "maxResults", default, skip_serializing_if = "Option::is_none")]
  pub max_results: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub total: Option<u64>,
}

/// Coarse workflow bucket derived from a status name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
  Done,
  InProgress,
  Review,
  Todo,
}

impl StatusCategory {
  /// Classify a status name by case-insensitive keyword match, covering both
  /// English and Korean workflow names.
  pub fn classify(status_name: &str) -> Self {
    let name = status_name.to_lowercase();
    let has_any = |needles: &[&str]| needles.iter().any(|needle| name.contains(needle));

    if has_any(&["완료", "done", "closed"]) {
      StatusCategory::Done
    } else if has_any(&["진행", "progress"]) {
      StatusCategory::InProgress
    } else if has_any(&["검토", "review"]) {
      StatusCategory::Review
    } else {
      StatusCategory::Todo
    }
  }

  /// CSS class used by the renderer.
  pub fn css_class(&self) -> &'static str {
    match self {
      StatusCategory::Done => "status-done",
      StatusCategory::InProgress => "status-in-progress",
      StatusCategory::Review => "status-review",
      StatusCategory::Todo => "status-todo",
    }
  }
}

impl Issue {
  pub fn status_name(&self) -> &str {
    self.fields.status.as_ref().map_or("", |status| status.name.as_str())
  }

  pub fn status_category(&self) -> StatusCategory {
    StatusCategory::classify(self.status_name())
  }
}

/// Confluence page metadata and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfluencePage {
  /// Unique numeric identifier assigned by Confluence.
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub space: Option<PageSpace>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub body: Option<PageBody>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<PageVersion>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub history: Option<PageHistory>,
  #[serde(rename = "createdDate", default, skip_serializing_if = "Option::is_none")]
  pub created_date: Option<String>,
  #[serde(rename = "createdBy", default, skip_serializing_if = "Option::is_none")]
  pub created_by: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpace {
  pub key: String,
}

/// Page body content; only the storage representation is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBody {
  #[serde(default)]
  pub storage: Option<StorageFormat>,
}

/// Storage format (Confluence's internal format).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageFormat {
  /// Raw XHTML markup returned by the API.
  #[serde(default)]
  pub value: String,
  #[serde(default)]
  pub representation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageVersion {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub when: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub by: Option<User>,
  #[serde(rename = "createdDate", default, skip_serializing_if = "Option::is_none")]
  pub created_date: Option<String>,
  #[serde(rename = "createdBy", default, skip_serializing_if = "Option::is_none")]
  pub created_by: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageHistory {
  #[serde(rename = "lastUpdated", default, skip_serializing_if = "Option::is_none")]
  pub last_updated: Option<LastUpdated>,
  #[serde(rename = "createdDate", default, skip_serializing_if = "Option::is_none")]
  pub created_date: Option<String>,
  #[serde(rename = "createdBy", default, skip_serializing_if = "Option::is_none")]
  pub created_by: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LastUpdated {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub when: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub by: Option<User>,
}

/// Content list response wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageResults {
  #[serde(default)]
  pub results: Vec<ConfluencePage>,
}

impl From<ConfluencePage> for PageResults {
  fn from(page: ConfluencePage) -> Self {
    Self { results: vec![page] }
  }
}

impl ConfluencePage {
  /// Timestamp of the latest edit, falling back through the creation fields.
  pub fn last_updated(&self) -> Option<&str> {
    let history = self.history.as_ref();
    let version = self.version.as_ref();

    history
      .and_then(|h| h.last_updated.as_ref())
      .and_then(|updated| updated.when.as_deref())
      .or_else(|| version.and_then(|v| v.when.as_deref()))
      .or_else(|| history.and_then(|h| h.created_date.as_deref()))
      .or_else(|| version.and_then(|v| v.created_date.as_deref()))
      .or(self.created_date.as_deref())
  }

  /// Display name of whoever last touched the page, if known.
  pub fn author(&self) -> Option<&str> {
    let history = self.history.as_ref();
    let version = self.version.as_ref();

    history
      .and_then(|h| h.last_updated.as_ref())
      .and_then(|updated| updated.by.as_ref())
      .or_else(|| version.and_then(|v| v.by.as_ref()))
      .or_else(|| history.and_then(|h| h.created_by.as_ref()))
      .or_else(|| version.and_then(|v| v.created_by.as_ref()))
      .or(self.created_by.as_ref())
      .map(|user| user.display_name.as_str())
  }

  /// Creation instant used to order candidate pages.
  pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
    self
      .history
      .as_ref()
      .and_then(|h| h.created_date.as_deref())
      .or_else(|| self.version.as_ref().and_then(|v| v.when.as_deref()))
      .or(self.created_date.as_deref())
      .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
  }

  pub fn space_key_or<'a>(&'a self, default: &'a str) -> &'a str {
    self.space.as_ref().map_or(default, |space| space.key.as_str())
  }

  /// Raw storage-format body, empty when the body was not expanded.
  pub fn storage(&self) -> &str {
    self
      .body
      .as_ref()
      .and_then(|body| body.storage.as_ref())
      .map_or("", |storage| storage.value.as_str())
  }
}
