//! `watch`: the widget's polling loop.
//!
//! Each tick runs one cycle, folds its event into the previous state and
//! rewrites the output. Cycles never overlap; a slow cycle delays the next
//! tick instead of queueing extra ones. Shutdown interrupts a cycle in flight.

use std::future::Future;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use super::{cycle_event, write_output};
use crate::cli::OutputOptions;
use crate::color::ColorScheme;
use crate::config::Config;
use crate::dashboard::{DisplayState, Event, update_state};

/// Poll until interrupted with Ctrl-C.
///
/// # Arguments
/// * `options` - Output destination, format and selected tab.
/// * `interval_secs` - Override for `refresh_interval_secs`.
/// * `config` - Loaded widget configuration.
/// * `colors` - Shared color palette for status messages.
pub(crate) async fn handle_watch_command(
  options: &OutputOptions,
  interval_secs: Option<u64>,
  config: &Config,
  colors: &ColorScheme,
) {
  let period = Duration::from_secs(interval_secs.unwrap_or(config.refresh_interval_secs).max(1));

  eprintln!(
    "{} {} every {}s {}",
    colors.progress("→"),
    colors.info("Refreshing"),
    colors.number(period.as_secs()),
    colors.dimmed("(Ctrl-C to stop)")
  );

  let shutdown = async {
    let _ = tokio::signal::ctrl_c().await;
  };
  poll_until(options, period, config, || cycle_event(config, options.tab), shutdown).await;

  eprintln!("{} {}", colors.progress("→"), colors.dimmed("Stopped"));
}

/// Run `next_event` on every tick until `shutdown` resolves, returning the
/// last published state.
async fn poll_until<F, Fut>(
  options: &OutputOptions,
  period: Duration,
  config: &Config,
  mut next_event: F,
  shutdown: impl Future<Output = ()>,
) -> Option<DisplayState>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Event>,
{
  let mut ticker = interval(period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

  let mut previous: Option<DisplayState> = None;
  tokio::pin!(shutdown);

  loop {
    tokio::select! {
      _ = &mut shutdown => return previous,
      _ = ticker.tick() => {}
    }

    tokio::select! {
      _ = &mut shutdown => return previous,
      event = next_event() => {
        let state = update_state(event, previous.as_ref());
        publish(options, config, &state).await;
        previous = Some(state);
      }
    }
  }
}

async fn publish(options: &OutputOptions, config: &Config, state: &DisplayState) {
  if let Some(error) = &state.error {
    warn!("Fetch cycle failed: {error}");
  }

  match options.format.render(state, config) {
    Ok(text) => match write_output(&text, options.output.as_deref()).await {
      Ok(()) => info!(
        "Refreshed: {} issue(s), {} page(s)",
        state.issues.len(),
        state.pages.len()
      ),
      Err(e) => warn!("Failed to write output: {e:#}"),
    },
    Err(e) => warn!("Failed to render output: {e:#}"),
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use tokio::time::{sleep, timeout};

  use super::*;
  use crate::format::OutputFormat;

  fn options(output: Option<PathBuf>) -> OutputOptions {
    OutputOptions {
      format: OutputFormat::Html,
      tab: None,
      output,
    }
  }

  #[tokio::test]
  async fn test_shutdown_interrupts_a_cycle_in_flight() {
    let slow_cycle = || async {
      sleep(Duration::from_secs(3600)).await;
      Event::Unrecognized
    };

    let stopped = timeout(
      Duration::from_secs(5),
      poll_until(
        &options(None),
        Duration::from_secs(1),
        &Config::default(),
        slow_cycle,
        sleep(Duration::from_millis(50)),
      ),
    )
    .await;

    assert_eq!(stopped, Ok(None));
  }

  #[tokio::test]
  async fn test_each_cycle_rewrites_the_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("widget.html");

    let failing_cycle = || async {
      Event::FetchFailed {
        error: "jira_domain must be set".to_string(),
      }
    };

    let last = poll_until(
      &options(Some(path.clone())),
      Duration::from_secs(60),
      &Config::default(),
      failing_cycle,
      sleep(Duration::from_millis(200)),
    )
    .await
    .unwrap();

    assert_eq!(last.error.as_deref(), Some("jira_domain must be set"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains(r#"<div class="error">Error: jira_domain must be set</div>"#));
  }
}
