//! Test fixtures for JIRA and Confluence API responses
//!
//! Trimmed-down but realistic payloads in the shapes the REST APIs return.

use jira_glance::config::{Config, ConfluenceConfig, ConfluenceMode};
use serde_json::json;

pub fn config(mode: ConfluenceMode) -> Config {
  Config {
    jira_domain: "acme.atlassian.net".to_string(),
    jira_filter: "10042".to_string(),
    confluence: ConfluenceConfig {
      enabled: true,
      mode,
      space_key: "OPS".to_string(),
      page_id: Some("5001".to_string()),
      parent_page_id: Some("9000".to_string()),
      max_results: 5,
    },
    ..Config::default()
  }
}

pub fn jira_only_config() -> Config {
  let mut config = config(ConfluenceMode::SpacePages);
  config.confluence.enabled = false;
  config
}

// Response of /rest/api/3/search/jql for a two-issue filter
pub fn issue_search_response() -> serde_json::Value {
  json!({
    "startAt": 0,
    "maxResults": 20,
    "total": 2,
    "issues": [
      {
        "id": "10001",
        "key": "OPS-101",
        "fields": {
          "summary": "Rotate the staging certificates",
          "issuetype": { "name": "Task", "iconUrl": "https://acme.atlassian.net/images/task.svg" },
          "status": { "name": "In Progress", "statusCategory": { "key": "indeterminate" } },
          "assignee": { "displayName": "Jiwoo Park", "accountId": "abc" },
          "duedate": "2025-09-24"
        }
      },
      {
        "id": "10002",
        "key": "OPS-102",
        "fields": {
          "summary": "Archive old dashboards",
          "issuetype": { "name": "Story" },
          "status": { "name": "Done" },
          "assignee": null,
          "duedate": null
        }
      }
    ]
  })
}

// Response of /wiki/rest/api/content/{id}
pub fn page_response(id: &str, title: &str, created: &str, body: &str) -> serde_json::Value {
  json!({
    "id": id,
    "type": "page",
    "status": "current",
    "title": title,
    "space": { "key": "OPS", "name": "Operations" },
    "version": { "number": 3 },
    "history": {
      "createdDate": created,
      "lastUpdated": { "when": created, "by": { "displayName": "Jiwoo Park" } }
    },
    "body": { "storage": { "value": body, "representation": "storage" } }
  })
}

pub fn results(pages: Vec<serde_json::Value>) -> serde_json::Value {
  json!({ "results": pages, "size": pages.len() })
}
