//! Output format definitions and utilities.

use clap::ValueEnum;

use crate::config::Config;
use crate::dashboard::DisplayState;
use crate::render::render_state;

/// What `fetch` and `watch` write for each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
  /// The widget's HTML fragment (default)
  #[default]
  Html,
  /// The display state as JSON, for hosts that render it themselves
  Json,
}

impl OutputFormat {
  /// Render `state` in this format. The result always ends with a newline.
  pub fn render(&self, state: &DisplayState, config: &Config) -> anyhow::Result<String> {
    let mut text = match self {
      OutputFormat::Html => render_state(state, config),
      OutputFormat::Json => serde_json::to_string_pretty(state)?,
    };
    text.push('\n');
    Ok(text)
  }
}
