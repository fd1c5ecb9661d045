//! One fetch cycle: the issue search and the Confluence request run
//! concurrently, and their outcomes are merged into a single [`Event`].

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use super::state::{Event, Fetched, Tab};
use super::today::fetch_today_page;
use crate::atlassian::{AtlassianApi, IssueQuery, IssueSearch, PageResults};
use crate::config::{Config, ConfluenceMode};

/// Run both branches and produce the event for the reducer.
///
/// Invalid configuration yields [`Event::FetchFailed`]. Otherwise a failure
/// in one branch is recorded as that branch's error and never affects the
/// other one.
///
/// # Arguments
/// * `api` - Transport for the REST calls.
/// * `config` - Validated widget configuration.
/// * `selected_tab` - Tab the user last chose; the caller persists it.
/// * `today` - Reference date for `auto_today` selection.
pub async fn run_cycle(api: &dyn AtlassianApi, config: &Config, selected_tab: Option<Tab>, today: NaiveDate) -> Event {
  if let Err(e) = config.validate() {
    return Event::FetchFailed {
      error: format!("{e:#}"),
    };
  }

  let query = IssueQuery::from_config(config);
  let (jira, confluence) = tokio::join!(fetch_issues(api, &query), fetch_pages(api, config, today));

  info!(
    "Fetch cycle finished: {} issue(s){}, {} page(s){}",
    jira.data.as_ref().map_or(0, |search| search.issues.len()),
    if jira.is_ok() { "" } else { " [failed]" },
    confluence.data.as_ref().map_or(0, |results| results.results.len()),
    if confluence.is_ok() { "" } else { " [failed]" },
  );

  Event::FetchSucceeded {
    jira,
    confluence,
    active_tab: Some(suggested_tab(config, selected_tab)),
  }
}

/// Today's date in the local time zone.
pub fn local_today() -> NaiveDate {
  Local::now().date_naive()
}

/// Tab to show after a cycle: the user's choice when it is available,
/// otherwise Confluence whenever it is enabled.
pub fn suggested_tab(config: &Config, selected_tab: Option<Tab>) -> Tab {
  match (selected_tab, config.confluence.enabled) {
    (Some(Tab::Confluence), false) => Tab::Jira,
    (Some(tab), _) => tab,
    (None, true) => Tab::Confluence,
    (None, false) => Tab::Jira,
  }
}

async fn fetch_issues(api: &dyn AtlassianApi, query: &IssueQuery) -> Fetched<IssueSearch> {
  Fetched::from_result(api.search_issues(query).await)
}

async fn fetch_pages(api: &dyn AtlassianApi, config: &Config, today: NaiveDate) -> Fetched<PageResults> {
  let confluence = &config.confluence;
  if !confluence.enabled {
    return Fetched::ok(PageResults::default());
  }

  let mode = confluence.effective_mode();
  debug!("Fetching Confluence pages in {} mode", mode.as_str());

  let result = match mode {
    ConfluenceMode::SpecificPage => match confluence.page_id.as_deref() {
      Some(page_id) => api.get_page(page_id).await.map(PageResults::from),
      None => api.space_pages(&confluence.space_key, confluence.max_results).await,
    },
    ConfluenceMode::SpacePages => api.space_pages(&confluence.space_key, confluence.max_results).await,
    ConfluenceMode::AutoToday => match confluence.parent_page_id.as_deref() {
      Some(parent_id) => fetch_today_page(api, parent_id, today).await,
      None => Err(anyhow::anyhow!("confluence_parent_page_id is required in auto_today mode")),
    },
  };

  Fetched::from_result(result)
}
