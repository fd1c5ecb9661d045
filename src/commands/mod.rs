//! CLI subcommand handlers.
//!
//! This module groups the implementations for each `jira-glance` subcommand,
//! keeping `cli.rs` focused on argument parsing while the handlers share the
//! cycle and output helpers below.

pub mod completions;
pub mod fetch;
pub mod render;
pub mod version;
pub mod watch;

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::atlassian::AtlassianClient;
use crate::config::Config;
use crate::dashboard::{Event, Tab, local_today, run_cycle};

/// Run one cycle against the live REST APIs.
///
/// A client that cannot be built (bad domain or proxy) is reported the same
/// way as invalid configuration: as [`Event::FetchFailed`].
pub(crate) async fn cycle_event(config: &Config, selected_tab: Option<Tab>) -> Event {
  match AtlassianClient::from_config(config) {
    Ok(client) => run_cycle(&client, config, selected_tab, local_today()).await,
    Err(e) => Event::FetchFailed {
      error: format!("{e:#}"),
    },
  }
}

/// Write `text` to `output`, or to stdout when no path is given.
///
/// Files are written to a sibling temporary path first and renamed into
/// place, so a widget host polling the file never reads a half-written
/// fragment.
pub(crate) async fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
  let Some(path) = output else {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    return Ok(());
  };

  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("Failed to create directory {}", parent.display()))?;
  }

  let mut staging = path.as_os_str().to_owned();
  staging.push(".tmp");
  tokio::fs::write(&staging, text)
    .await
    .with_context(|| format!("Failed to write {}", Path::new(&staging).display()))?;
  tokio::fs::rename(&staging, path)
    .await
    .with_context(|| format!("Failed to move output into place at {}", path.display()))?;

  debug!("Wrote {} byte(s) to {}", text.len(), path.display());
  Ok(())
}
