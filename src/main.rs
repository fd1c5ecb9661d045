//! jira-glance - JIRA and Confluence at a glance
//!
//! This is the main entry point for the CLI application.

#[tokio::main]
async fn main() {
  jira_glance::cli::run().await;
}
