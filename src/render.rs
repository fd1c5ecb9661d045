//! HTML presentation of a [`DisplayState`].
//!
//! The output is a single `div.jira-glance` fragment carrying semantic class
//! names only; styling belongs to the hosting shell.

use crate::atlassian::{ConfluencePage, Issue};
use crate::config::Config;
use crate::dashboard::{DisplayState, Tab};
use crate::storage::dates::{format_month_day, format_month_day_time};
use crate::storage::html_entities::{escape_attribute, escape_text};
use crate::storage::{HtmlOptions, parse_instant, storage_to_html};

const NO_ISSUES: &str = "No issues found.";
const NO_PAGES: &str = "No pages found.";
const NO_CONTENT: &str = "No content available";
const UNKNOWN: &str = "Unknown";
const UNASSIGNED: &str = "Unassigned";

/// Render the whole widget.
///
/// A top-level error replaces everything else. Otherwise the tab header is
/// followed by the JIRA panel and, when Confluence is enabled, the
/// Confluence panel; the active one carries the `active` class.
pub fn render_state(state: &DisplayState, config: &Config) -> String {
  let mut html = String::from(r#"<div class="jira-glance">"#);

  if let Some(error) = &state.error {
    html.push_str(&format!(r#"<div class="error">Error: {}</div>"#, escape_text(error)));
    html.push_str("</div>");
    return html;
  }

  let confluence_enabled = config.confluence.enabled;

  html.push_str(r#"<div class="tab-header">"#);
  html.push_str(&tab(
    Tab::Jira,
    state.active_tab,
    &format!("📋 JIRA Issues ({})", state.issues.len()),
  ));
  if confluence_enabled {
    html.push_str(&tab(
      Tab::Confluence,
      state.active_tab,
      &format!("📄 Confluence Pages ({})", state.pages.len()),
    ));
  }
  html.push_str("</div>");

  html.push_str(&panel_open(Tab::Jira, state.active_tab));
  html.push_str(&render_issues(state, config));
  html.push_str("</div>");

  if confluence_enabled {
    html.push_str(&panel_open(Tab::Confluence, state.active_tab));
    html.push_str(&render_pages(state, config));
    html.push_str("</div>");
  }

  html.push_str("</div>");
  html
}

fn tab_name(tab: Tab) -> &'static str {
  match tab {
    Tab::Jira => "jira",
    Tab::Confluence => "confluence",
  }
}

fn active_class(tab: Tab, active: Tab) -> &'static str {
  if tab == active { " active" } else { "" }
}

fn tab(tab: Tab, active: Tab, label: &str) -> String {
  format!(
    r#"<div class="tab{}" data-tab="{}">{}</div>"#,
    active_class(tab, active),
    tab_name(tab),
    escape_text(label)
  )
}

fn panel_open(tab: Tab, active: Tab) -> String {
  format!(
    r#"<div class="tab-content{}" data-tab="{}">"#,
    active_class(tab, active),
    tab_name(tab)
  )
}

fn render_issues(state: &DisplayState, config: &Config) -> String {
  if let Some(error) = &state.issues_error {
    return format!(
      r#"<div class="source-error">Error loading JIRA: {}</div>"#,
      escape_text(error)
    );
  }
  if state.issues.is_empty() {
    return format!(r#"<div class="empty">{NO_ISSUES}</div>"#);
  }

  let items: String = state.issues.iter().map(|issue| render_issue(issue, config)).collect();
  format!(r#"<ul class="issue-list">{items}</ul>"#)
}

/// One issue row linking to `/browse/{KEY}`.
pub fn render_issue(issue: &Issue, config: &Config) -> String {
  let fields = &issue.fields;
  let href = format!("https://{}/browse/{}", config.domain(), issue.key);

  let mut html = format!(r#"<li class="issue"><a href="{}">"#, escape_attribute(&href));

  if let Some(issue_type) = &fields.issuetype {
    match &issue_type.icon_url {
      Some(icon) => html.push_str(&format!(
        r#"<img class="issue-type" src="{}" alt="{}"/>"#,
        escape_attribute(icon),
        escape_attribute(&issue_type.name)
      )),
      None => html.push_str(&format!(
        r#"<span class="issue-type">{}</span>"#,
        escape_text(&issue_type.name)
      )),
    }
  }

  html.push_str(&format!(
    r#"<span class="key">{}</span>"#,
    escape_text(&issue.key.to_lowercase())
  ));
  html.push_str(&format!(
    r#"<span class="status {}">{}</span>"#,
    issue.status_category().css_class(),
    escape_text(issue.status_name())
  ));

  let assignee = fields
    .assignee
    .as_ref()
    .map_or(UNASSIGNED, |user| user.display_name.as_str());
  html.push_str(&format!(r#"<span class="assignee">{}</span>"#, escape_text(assignee)));
  html.push_str(&format!(r#"<span class="summary">{}</span>"#, escape_text(&fields.summary)));

  if let Some(due) = fields.duedate.as_deref().and_then(parse_instant) {
    html.push_str(&format!(
      r#"<span class="due-date">{}</span>"#,
      escape_text(&format_month_day(due.date(), config.locale))
    ));
  }

  html.push_str("</a></li>");
  html
}

fn render_pages(state: &DisplayState, config: &Config) -> String {
  if let Some(error) = &state.pages_error {
    return format!(
      r#"<div class="source-error">Error loading Confluence: {}</div>"#,
      escape_text(error)
    );
  }
  if state.pages.is_empty() {
    return format!(r#"<div class="empty">{NO_PAGES}</div>"#);
  }

  let items: String = state.pages.iter().map(|page| render_page(page, config)).collect();
  format!(r#"<div class="page-list">{items}</div>"#)
}

/// One page card: linked title, update time, author and converted body.
pub fn render_page(page: &ConfluencePage, config: &Config) -> String {
  let space = page.space_key_or(&config.confluence.space_key);
  let href = format!("https://{}/wiki/spaces/{space}/pages/{}", config.domain(), page.id);

  let updated = page
    .last_updated()
    .and_then(parse_instant)
    .map(|instant| format_month_day_time(instant, config.locale))
    .unwrap_or_else(|| UNKNOWN.to_string());
  let author = page.author().unwrap_or(UNKNOWN);

  let body = storage_to_html(page.storage(), &HtmlOptions { locale: config.locale });
  let content = if body.is_empty() {
    format!(r#"<div class="page-content empty">{NO_CONTENT}</div>"#)
  } else {
    format!(r#"<div class="page-content">{body}</div>"#)
  };

  format!(
    concat!(
      r#"<div class="page">"#,
      r#"<a class="page-title" href="{href}">{title}</a>"#,
      r#"<div class="page-meta"><span class="updated">{updated}</span><span class="author">{author}</span></div>"#,
      "{content}",
      "</div>"
    ),
    href = escape_attribute(&href),
    title = escape_text(&page.title),
    updated = escape_text(&updated),
    author = escape_text(author),
    content = content,
  )
}
