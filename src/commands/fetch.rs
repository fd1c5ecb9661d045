//! `fetch`: one cycle, one rendered frame.

use std::process;

use super::{cycle_event, write_output};
use crate::cli::OutputOptions;
use crate::color::ColorScheme;
use crate::config::Config;
use crate::dashboard::update_state;

/// Run a single cycle and write the rendered state.
///
/// The frame is written even when the cycle failed as a whole, so the widget
/// shows the error; the process then exits with status 1. Failures of a
/// single source are part of a normal frame and exit 0.
pub(crate) async fn handle_fetch_command(options: &OutputOptions, config: &Config, colors: &ColorScheme) {
  let event = cycle_event(config, options.tab).await;
  let state = update_state(event, None);

  let written = match options.format.render(&state, config) {
    Ok(text) => write_output(&text, options.output.as_deref()).await,
    Err(e) => Err(e),
  };

  if let Err(e) = written {
    eprintln!("{} {}", colors.error("✗"), colors.error("Failed to write output"));
    eprintln!("  {}: {e:#}", colors.emphasis("Error"));
    process::exit(1);
  }

  if let Some(path) = &options.output {
    eprintln!(
      "{} Wrote {} issue(s) and {} page(s) to {}",
      colors.success("✓"),
      colors.number(state.issues.len()),
      colors.number(state.pages.len()),
      colors.path(path.display())
    );
  }

  for (source, error) in [("JIRA", &state.issues_error), ("Confluence", &state.pages_error)] {
    if let Some(error) = error {
      eprintln!("{} {} {}", colors.warning("⚠"), colors.warning(source), error);
    }
  }

  if let Some(error) = &state.error {
    eprintln!("{} {}", colors.error("✗"), colors.error("Fetch cycle failed"));
    eprintln!("  {}: {}", colors.emphasis("Error"), error);
    process::exit(1);
  }
}
