//! Widget configuration.
//!
//! Settings come from a flat JSON object (the widget's `config.json` layout)
//! merged over hard-coded defaults. Keys that are not recognized are ignored
//! so one file can be shared with other tools.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use crate::storage::Locale;

/// Which Confluence pages a cycle fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfluenceMode {
  /// Newest-updated pages of one space.
  #[default]
  SpacePages,
  /// A single page by id.
  SpecificPage,
  /// Today's page among the grandchildren of a parent page.
  AutoToday,
}

impl ConfluenceMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      ConfluenceMode::SpacePages => "space_pages",
      ConfluenceMode::SpecificPage => "specific_page",
      ConfluenceMode::AutoToday => "auto_today",
    }
  }
}

/// Confluence settings, stored under `confluence_*` keys in the flat file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfluenceConfig {
  #[serde(rename = "confluence_enabled", default)]
  pub enabled: bool,
  #[serde(rename = "confluence_mode", default)]
  pub mode: ConfluenceMode,
  #[serde(rename = "confluence_space_key", default = "default_space_key")]
  pub space_key: String,
  #[serde(
    rename = "confluence_page_id",
    default,
    deserialize_with = "optional_string_or_number"
  )]
  pub page_id: Option<String>,
  #[serde(
    rename = "confluence_parent_page_id",
    default,
    deserialize_with = "optional_string_or_number"
  )]
  pub parent_page_id: Option<String>,
  #[serde(rename = "confluence_max_results", default = "default_confluence_max_results")]
  pub max_results: u32,
}

impl Default for ConfluenceConfig {
  fn default() -> Self {
    Self {
      enabled: false,
      mode: ConfluenceMode::default(),
      space_key: default_space_key(),
      page_id: None,
      parent_page_id: None,
      max_results: default_confluence_max_results(),
    }
  }
}

impl ConfluenceConfig {
  /// The mode a cycle actually runs: `specific_page` without a page id
  /// lists the space instead.
  pub fn effective_mode(&self) -> ConfluenceMode {
    match self.mode {
      ConfluenceMode::SpecificPage if self.page_id.is_none() => ConfluenceMode::SpacePages,
      mode => mode,
    }
  }
}

/// Complete widget configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
  /// Pagination offset for the issue search.
  #[serde(rename = "startAt", default)]
  pub start_at: u32,
  /// Page size for the issue search.
  #[serde(rename = "maxResults", default = "default_max_results")]
  pub max_results: u32,
  /// Atlassian site host, e.g. `acme.atlassian.net`.
  #[serde(default)]
  pub jira_domain: String,
  /// Saved JIRA filter id.
  #[serde(default, deserialize_with = "string_or_number")]
  pub jira_filter: String,
  /// Prefix proxy the requests are routed through.
  #[serde(default)]
  pub proxy_url: Option<String>,
  #[serde(default)]
  pub username: Option<String>,
  #[serde(default)]
  pub password: Option<String>,
  #[serde(flatten)]
  pub confluence: ConfluenceConfig,
  #[serde(default = "default_refresh_interval_secs")]
  pub refresh_interval_secs: u64,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  #[serde(default)]
  pub locale: Locale,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      start_at: 0,
      max_results: default_max_results(),
      jira_domain: String::new(),
      jira_filter: String::new(),
      proxy_url: None,
      username: None,
      password: None,
      confluence: ConfluenceConfig::default(),
      refresh_interval_secs: default_refresh_interval_secs(),
      timeout_secs: default_timeout_secs(),
      locale: Locale::default(),
    }
  }
}

fn default_max_results() -> u32 {
  20
}

fn default_space_key() -> String {
  "DEV".to_string()
}

fn default_confluence_max_results() -> u32 {
  10
}

fn default_refresh_interval_secs() -> u64 {
  1800
}

fn default_timeout_secs() -> u64 {
  30
}

impl Config {
  /// Load settings from a JSON file.
  ///
  /// # Arguments
  /// * `path` - Location of the `config.json` file.
  ///
  /// # Errors
  /// Returns an error when the file cannot be read or is not a JSON object of
  /// the expected shape.
  pub fn load(path: &Path) -> Result<Self> {
    let contents =
      std::fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse config file {}", path.display()))
  }

  /// Build a configuration from an already-parsed settings object.
  pub fn from_value(value: Value) -> Result<Self> {
    serde_json::from_value(value).context("Invalid configuration object")
  }

  /// Replace the stored credentials with the ones given on the command line.
  pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
    if username.is_some() {
      self.username = username;
    }
    if password.is_some() {
      self.password = password;
    }
    self
  }

  /// Check the invariants a fetch cycle relies on.
  pub fn validate(&self) -> Result<()> {
    if self.domain().is_empty() {
      bail!("jira_domain must be set");
    }
    if self.jira_filter.trim().is_empty() {
      bail!("jira_filter must be set");
    }
    if self.max_results == 0 {
      bail!("maxResults must be at least 1");
    }
    if self.refresh_interval_secs == 0 {
      bail!("refresh_interval_secs must be at least 1");
    }
    if self.confluence.enabled {
      if self.confluence.max_results == 0 {
        bail!("confluence_max_results must be at least 1");
      }
      if self.confluence.mode == ConfluenceMode::AutoToday && self.confluence.parent_page_id.is_none() {
        bail!("confluence_parent_page_id is required in auto_today mode");
      }
    }
    Ok(())
  }

  /// The bare site host with any scheme or trailing slash removed.
  pub fn domain(&self) -> &str {
    let domain = self.jira_domain.trim();
    let domain = domain
      .strip_prefix("https://")
      .or_else(|| domain.strip_prefix("http://"))
      .unwrap_or(domain);
    domain.trim_end_matches('/')
  }

  /// Base URL every REST request is built on, routed through the proxy when
  /// one is configured.
  pub fn base_url(&self) -> Result<Url> {
    let site = format!("https://{}", self.domain());
    let base = match self.proxy_url.as_deref().map(str::trim).filter(|proxy| !proxy.is_empty()) {
      Some(proxy) => format!("{}/{site}", proxy.trim_end_matches('/')),
      None => site,
    };
    Url::parse(&base).with_context(|| format!("Invalid base URL {base}"))
  }

  /// Credentials for Basic auth, present only when both parts are non-empty.
  pub fn credentials(&self) -> Option<(&str, &str)> {
    match (self.username.as_deref(), self.password.as_deref()) {
      (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => Some((user, password)),
      _ => None,
    }
  }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(optional_string_or_number(deserializer)?.unwrap_or_default())
}

/// Ids may be written as strings or bare numbers; blank strings and `null`
/// count as absent.
fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::Null => Ok(None),
    Value::String(text) => {
      let text = text.trim();
      Ok((!text.is_empty()).then(|| text.to_string()))
    }
    Value::Number(number) => Ok(Some(number.to_string())),
    other => Err(serde::de::Error::custom(format!(
      "expected a string or number, found {other}"
    ))),
  }
}
