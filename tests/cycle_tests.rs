//! End-to-end cycle tests using the fake Atlassian client
//!
//! These drive `run_cycle` and the reducer together, covering each
//! Confluence mode and the ways a single source can fail.

mod common;

use chrono::NaiveDate;
use common::fake_atlassian::FakeAtlassianClient;
use common::fixtures::{self, config, issue_search_response, jira_only_config, page_response};
use jira_glance::config::ConfluenceMode;
use jira_glance::dashboard::{DisplayState, Event, Tab, run_cycle, update_state};
use jira_glance::render::render_state;

fn today() -> NaiveDate {
  NaiveDate::from_ymd_opt(2025, 9, 22).unwrap()
}

#[tokio::test]
async fn test_disabled_confluence_makes_no_content_request() {
  let client = FakeAtlassianClient::new().with_issues(issue_search_response());
  let config = jira_only_config();

  let event = run_cycle(&client, &config, None, today()).await;
  assert_eq!(client.calls(), vec!["search:10042"]);

  let state = update_state(event, None);
  assert_eq!(state.issues.len(), 2);
  assert!(state.pages.is_empty());
  assert_eq!(state.pages_error, None);
  assert_eq!(state.active_tab, Tab::Jira);
}

#[tokio::test]
async fn test_specific_page_is_wrapped_in_results() {
  let client = FakeAtlassianClient::new()
    .with_issues(issue_search_response())
    .with_page(page_response("5001", "Runbook", "2025-09-01T09:00:00Z", "<p>Steps</p>"));

  let event = run_cycle(&client, &config(ConfluenceMode::SpecificPage), None, today()).await;
  let Event::FetchSucceeded {
    confluence,
    active_tab,
    ..
  } = &event
  else {
    panic!("expected FetchSucceeded, got {event:?}");
  };

  let pages = confluence.data.as_ref().unwrap();
  assert_eq!(pages.results.len(), 1);
  assert_eq!(pages.results[0].title, "Runbook");
  assert_eq!(*active_tab, Some(Tab::Confluence));
  assert!(client.calls().contains(&"page:5001".to_string()));
}

#[tokio::test]
async fn test_specific_page_without_id_lists_the_space() {
  let client = FakeAtlassianClient::new()
    .with_space_page(page_response("1", "One", "2025-09-01T09:00:00Z", ""))
    .with_space_page(page_response("2", "Two", "2025-09-02T09:00:00Z", ""));
  let mut config = config(ConfluenceMode::SpecificPage);
  config.confluence.page_id = None;

  let state = update_state(run_cycle(&client, &config, None, today()).await, None);
  assert_eq!(state.pages.len(), 2);
  assert!(client.calls().contains(&"space:OPS:5".to_string()));
}

#[tokio::test]
async fn test_one_failing_source_leaves_the_other_intact() {
  let client = FakeAtlassianClient::new()
    .with_issues(issue_search_response())
    .with_space_page(page_response("1", "One", "2025-09-01T09:00:00Z", ""))
    .failing("space:OPS:5");

  let state = update_state(
    run_cycle(&client, &config(ConfluenceMode::SpacePages), None, today()).await,
    None,
  );
  assert_eq!(state.issues.len(), 2);
  assert!(state.pages.is_empty());
  assert_eq!(
    state.pages_error.as_deref(),
    Some("Confluence: 500 Internal Server Error - fake://space:OPS:5")
  );
  assert_eq!(state.error, None);

  let client = FakeAtlassianClient::new()
    .with_space_page(page_response("1", "One", "2025-09-01T09:00:00Z", ""))
    .failing("search:10042");
  let state = update_state(
    run_cycle(&client, &config(ConfluenceMode::SpacePages), None, today()).await,
    None,
  );
  assert!(state.issues.is_empty());
  assert!(state.issues_error.unwrap().starts_with("JIRA: 500"));
  assert_eq!(state.pages.len(), 1);
}

#[tokio::test]
async fn test_auto_today_skips_failing_children() {
  let client = FakeAtlassianClient::new()
    .with_children(
      "9000",
      vec![
        page_response("100", "September", "2025-09-01T00:00:00Z", ""),
        page_response("200", "Broken", "2025-09-01T00:00:00Z", ""),
      ],
    )
    .with_children(
      "100",
      vec![
        page_response("101", "9월 19일 (금) 회의", "2025-09-19T09:00:00Z", ""),
        page_response("102", "9월 22일 회의", "2025-09-22T09:00:00Z", "<p>오늘</p>"),
      ],
    )
    .failing("children:200");

  let state = update_state(
    run_cycle(&client, &config(ConfluenceMode::AutoToday), None, today()).await,
    None,
  );

  assert_eq!(state.pages_error, None);
  assert_eq!(state.pages.len(), 1);
  assert_eq!(state.pages[0].id, "102");

  let calls = client.calls();
  assert!(calls.contains(&"children:9000".to_string()));
  assert!(calls.contains(&"children:100".to_string()));
  assert!(calls.contains(&"children:200".to_string()));
}

#[tokio::test]
async fn test_auto_today_parent_failure_is_a_source_error() {
  let client = FakeAtlassianClient::new()
    .with_issues(issue_search_response())
    .failing("children:9000");

  let state = update_state(
    run_cycle(&client, &config(ConfluenceMode::AutoToday), None, today()).await,
    None,
  );
  assert_eq!(state.issues.len(), 2);
  assert!(state.pages_error.unwrap().contains("Failed to list child pages of 9000"));
}

#[tokio::test]
async fn test_invalid_config_fails_the_whole_cycle() {
  let client = FakeAtlassianClient::new();
  let mut config = fixtures::config(ConfluenceMode::SpacePages);
  config.jira_filter = String::new();

  let event = run_cycle(&client, &config, None, today()).await;
  assert_eq!(
    event,
    Event::FetchFailed {
      error: "jira_filter must be set".to_string()
    }
  );
  assert!(client.calls().is_empty());

  let html = render_state(&update_state(event, None), &config);
  assert!(html.contains(r#"<div class="error">Error: jira_filter must be set</div>"#));
}

#[tokio::test]
async fn test_selected_tab_is_threaded_through_cycles() {
  let client = FakeAtlassianClient::new().with_issues(issue_search_response());
  let config = config(ConfluenceMode::SpacePages);

  let first = update_state(run_cycle(&client, &config, Some(Tab::Jira), today()).await, None);
  assert_eq!(first.active_tab, Tab::Jira);

  let switched = update_state(Event::SwitchTab { tab: Tab::Confluence }, Some(&first));
  assert_eq!(switched.issues, first.issues);

  let second = update_state(
    run_cycle(&client, &config, Some(switched.active_tab), today()).await,
    Some(&switched),
  );
  assert_eq!(second.active_tab, Tab::Confluence);
}

#[tokio::test]
async fn test_rendered_frame_for_a_full_cycle() {
  let client = FakeAtlassianClient::new()
    .with_issues(issue_search_response())
    .with_space_page(page_response(
      "1",
      "Standup",
      "2025-09-22T09:00:00Z",
      r#"<p>Owner: <ac:link><ri:page ri:content-title="Team"/></ac:link></p><script>x()</script>"#,
    ));
  let config = config(ConfluenceMode::SpacePages);

  let state: DisplayState = update_state(run_cycle(&client, &config, None, today()).await, None);
  let html = render_state(&state, &config);

  assert!(html.contains("📋 JIRA Issues (2)"));
  assert!(html.contains("📄 Confluence Pages (1)"));
  assert!(html.contains(r#"<span class="key">ops-101</span>"#));
  assert!(html.contains(r#"<span class="status status-done">Done</span>"#));
  assert!(html.contains(r##"<p>Owner: <a href="#" title="Team">Team</a></p>"##));
  assert!(!html.contains("script"));
  assert!(html.contains(r#"<div class="tab-content active" data-tab="confluence">"#));
}
