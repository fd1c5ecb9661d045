//! Fake Atlassian API client for testing
//!
//! Serves predefined responses without any network access and records every
//! call, so tests can assert which requests a cycle made.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use jira_glance::atlassian::{AtlassianApi, ConfluencePage, IssueQuery, IssueSearch, PageResults};

#[derive(Default)]
pub struct FakeAtlassianClient {
  issues: IssueSearch,
  pages: HashMap<String, ConfluencePage>,
  space_pages: Vec<ConfluencePage>,
  children: HashMap<String, Vec<ConfluencePage>>,
  failures: HashSet<String>,
  calls: Mutex<Vec<String>>,
}

impl FakeAtlassianClient {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_issues(mut self, json: serde_json::Value) -> Self {
    self.issues = serde_json::from_value(json).unwrap();
    self
  }

  pub fn with_page(mut self, json: serde_json::Value) -> Self {
    let page: ConfluencePage = serde_json::from_value(json).unwrap();
    self.pages.insert(page.id.clone(), page);
    self
  }

  pub fn with_space_page(mut self, json: serde_json::Value) -> Self {
    self.space_pages.push(serde_json::from_value(json).unwrap());
    self
  }

  pub fn with_children(mut self, parent_id: &str, pages: Vec<serde_json::Value>) -> Self {
    let pages = pages
      .into_iter()
      .map(|json| serde_json::from_value(json).unwrap())
      .collect();
    self.children.insert(parent_id.to_string(), pages);
    self
  }

  /// Make the call recorded as `call` (see [`Self::calls`]) fail.
  pub fn failing(mut self, call: &str) -> Self {
    self.failures.insert(call.to_string());
    self
  }

  /// Calls made so far, e.g. `search:10042`, `page:5001`, `space:OPS:5`,
  /// `children:9000`, in order.
  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  fn record(&self, call: String, service: &str) -> Result<()> {
    self.calls.lock().unwrap().push(call.clone());
    if self.failures.contains(&call) {
      return Err(anyhow!("{service}: 500 Internal Server Error - fake://{call}"));
    }
    Ok(())
  }
}

#[async_trait]
impl AtlassianApi for FakeAtlassianClient {
  async fn search_issues(&self, query: &IssueQuery) -> Result<IssueSearch> {
    self.record(format!("search:{}", query.filter), "JIRA")?;
    Ok(self.issues.clone())
  }

  async fn get_page(&self, page_id: &str) -> Result<ConfluencePage> {
    self.record(format!("page:{page_id}"), "Confluence")?;
    self
      .pages
      .get(page_id)
      .cloned()
      .ok_or_else(|| anyhow!("Confluence: 404 Not Found - fake://page/{page_id}"))
  }

  async fn space_pages(&self, space_key: &str, limit: u32) -> Result<PageResults> {
    self.record(format!("space:{space_key}:{limit}"), "Confluence")?;
    Ok(PageResults {
      results: self.space_pages.iter().take(limit as usize).cloned().collect(),
    })
  }

  async fn child_pages(&self, page_id: &str, _with_body: bool) -> Result<PageResults> {
    self.record(format!("children:{page_id}"), "Confluence")?;
    Ok(PageResults {
      results: self.children.get(page_id).cloned().unwrap_or_default(),
    })
  }
}
