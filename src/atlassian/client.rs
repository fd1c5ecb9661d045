//! HTTP client implementation for the Atlassian REST APIs.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use super::api::AtlassianApi;
use super::models::{ConfluencePage, IssueSearch, PageResults};
use super::requests::{Endpoints, IssueQuery, RequestSpec};
use crate::config::Config;

/// JIRA and Confluence client for one Atlassian site.
#[derive(Clone)]
pub struct AtlassianClient {
  endpoints: Endpoints,
  client: reqwest::Client,
}

impl AtlassianClient {
  /// Create a new client.
  ///
  /// # Arguments
  /// * `endpoints` - Request builder for the target site.
  /// * `timeout_secs` - Request timeout in seconds
  ///
  /// # Errors
  /// Returns an error if the underlying `reqwest::Client` cannot be built.
  pub fn new(endpoints: Endpoints, timeout_secs: u64) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(timeout_secs))
      .user_agent(format!("jira-glance/{} ({})", env!("CARGO_PKG_VERSION"), env!("TARGET")))
      .build()
      .context("Failed to create HTTP client")?;

    Ok(Self { endpoints, client })
  }

  /// Create a client for the site, credentials and timeout in `config`.
  pub fn from_config(config: &Config) -> Result<Self> {
    Self::new(Endpoints::from_config(config)?, config.timeout_secs)
  }

  pub fn endpoints(&self) -> &Endpoints {
    &self.endpoints
  }

  /// Send a request and decode its JSON body.
  ///
  /// A non-success status becomes `"{service}: {status} {reason} - {url}"`.
  async fn get_json<T: DeserializeOwned>(&self, request: RequestSpec) -> Result<T> {
    debug!("GET {}", request.url);

    let mut builder = self
      .client
      .get(request.url.clone())
      .header("Accept", "application/json");
    if let Some(authorization) = &request.authorization {
      builder = builder.header("Authorization", authorization);
    }

    let response = builder
      .send()
      .await
      .with_context(|| format!("Failed to send request to {}", request.service))?;

    let status = response.status();
    if !status.is_success() {
      return Err(anyhow!("{}: {} - {}", request.service, status, request.url));
    }

    let body = response
      .text()
      .await
      .with_context(|| format!("Failed to read response body from {}", request.service))?;
    trace!(
      "Response from {} (first 500 chars): {}",
      request.url,
      body.chars().take(500).collect::<String>()
    );

    serde_json::from_str(&body).with_context(|| format!("Failed to parse response from {}", request.service))
  }
}

#[async_trait]
impl AtlassianApi for AtlassianClient {
  async fn search_issues(&self, query: &IssueQuery) -> Result<IssueSearch> {
    self.get_json(self.endpoints.issue_search(query)?).await
  }

  async fn get_page(&self, page_id: &str) -> Result<ConfluencePage> {
    self.get_json(self.endpoints.page(page_id)?).await
  }

  async fn space_pages(&self, space_key: &str, limit: u32) -> Result<PageResults> {
    self.get_json(self.endpoints.space_pages(space_key, limit)?).await
  }

  async fn child_pages(&self, page_id: &str, with_body: bool) -> Result<PageResults> {
    self.get_json(self.endpoints.child_pages(page_id, with_body)?).await
  }
}
