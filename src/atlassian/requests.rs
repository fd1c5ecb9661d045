//! Request descriptors for the JIRA and Confluence REST endpoints.
//!
//! Building a request is kept separate from sending it so the exact URLs and
//! query parameters can be checked without a network.

use std::fmt;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use url::Url;

use crate::config::Config;

/// Fields requested for every issue in a search.
pub const ISSUE_FIELDS: &str = "summary,status,issuetype,assignee,duedate";
/// Expansion for a single page fetched by id.
pub const PAGE_EXPAND: &str = "version,space,history.lastUpdated,body.storage";
/// Expansion for the space listing; bodies are not needed there.
pub const SPACE_PAGES_EXPAND: &str = "version,space,history.lastUpdated";
/// Ordering for the space listing, newest edit first.
pub const SPACE_PAGES_ORDER: &str = "history.lastUpdated desc";
/// Expansion for children of the `auto_today` parent.
pub const CHILD_PAGES_EXPAND: &str = "version,history";
/// Expansion for grandchildren, which are rendered and so carry bodies.
pub const GRANDCHILD_PAGES_EXPAND: &str = "version,space,history,history.lastUpdated,body.storage";
/// Page size for child listings.
pub const CHILD_PAGES_LIMIT: u32 = 100;

/// Which service a request targets; used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
  Jira,
  Confluence,
}

impl fmt::Display for Service {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Service::Jira => f.write_str("JIRA"),
      Service::Confluence => f.write_str("Confluence"),
    }
  }
}

/// A fully resolved GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
  pub service: Service,
  pub url: Url,
  /// `Authorization` header value, when credentials are configured.
  pub authorization: Option<String>,
}

impl RequestSpec {
  /// Value of a query parameter, for inspection.
  pub fn query_param(&self, name: &str) -> Option<String> {
    self
      .url
      .query_pairs()
      .find(|(key, _)| key == name)
      .map(|(_, value)| value.into_owned())
  }
}

/// Issue search parameters taken from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
  pub filter: String,
  pub start_at: u32,
  pub max_results: u32,
}

impl IssueQuery {
  pub fn from_config(config: &Config) -> Self {
    Self {
      filter: config.jira_filter.clone(),
      start_at: config.start_at,
      max_results: config.max_results,
    }
  }
}

/// Compose the HTTP Basic `Authorization` header value.
///
/// # Arguments
/// * `username` - Account name, usually an email address.
/// * `password` - Password or API token.
pub fn basic_auth_header(username: &str, password: &str) -> String {
  let credentials = format!("{username}:{password}");
  format!("Basic {}", BASE64.encode(credentials.as_bytes()))
}

/// Builds [`RequestSpec`]s against one Atlassian site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
  base_url: String,
  authorization: Option<String>,
}

impl Endpoints {
  /// # Arguments
  /// * `base_url` - Site root, possibly behind a prefix proxy.
  /// * `credentials` - Basic auth user and password, if any.
  pub fn new(base_url: &Url, credentials: Option<(&str, &str)>) -> Self {
    Self {
      base_url: base_url.as_str().trim_end_matches('/').to_string(),
      authorization: credentials.map(|(user, password)| basic_auth_header(user, password)),
    }
  }

  pub fn from_config(config: &Config) -> Result<Self> {
    Ok(Self::new(&config.base_url()?, config.credentials()))
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  fn build(&self, service: Service, path: &str, params: &[(&str, String)]) -> Result<RequestSpec> {
    let raw = format!("{}{path}", self.base_url);
    let url = Url::parse_with_params(&raw, params).with_context(|| format!("Invalid request URL {raw}"))?;
    Ok(RequestSpec {
      service,
      url,
      authorization: self.authorization.clone(),
    })
  }

  /// `GET /rest/api/3/search/jql` for the saved filter.
  pub fn issue_search(&self, query: &IssueQuery) -> Result<RequestSpec> {
    self.build(
      Service::Jira,
      "/rest/api/3/search/jql",
      &[
        ("jql", format!("filter = {}", query.filter)),
        ("startAt", query.start_at.to_string()),
        ("maxResults", query.max_results.to_string()),
        ("fields", ISSUE_FIELDS.to_string()),
      ],
    )
  }

  /// `GET /wiki/rest/api/content/{id}` with version, space, history and body.
  pub fn page(&self, page_id: &str) -> Result<RequestSpec> {
    self.build(
      Service::Confluence,
      &format!("/wiki/rest/api/content/{page_id}"),
      &[("expand", PAGE_EXPAND.to_string())],
    )
  }

  /// `GET /wiki/rest/api/content` listing one space, newest edit first.
  pub fn space_pages(&self, space_key: &str, limit: u32) -> Result<RequestSpec> {
    self.build(
      Service::Confluence,
      "/wiki/rest/api/content",
      &[
        ("spaceKey", space_key.to_string()),
        ("limit", limit.to_string()),
        ("expand", SPACE_PAGES_EXPAND.to_string()),
        ("orderby", SPACE_PAGES_ORDER.to_string()),
        ("type", "page".to_string()),
      ],
    )
  }

  /// `GET /wiki/rest/api/content/{id}/child/page`.
  ///
  /// `with_body` selects the grandchild expansion, which includes the storage
  /// body and space.
  pub fn child_pages(&self, page_id: &str, with_body: bool) -> Result<RequestSpec> {
    let expand = if with_body {
      GRANDCHILD_PAGES_EXPAND
    } else {
      CHILD_PAGES_EXPAND
    };
    self.build(
      Service::Confluence,
      &format!("/wiki/rest/api/content/{page_id}/child/page"),
      &[("expand", expand.to_string()), ("limit", CHILD_PAGES_LIMIT.to_string())],
    )
  }
}
