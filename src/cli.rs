//! Command-line interface definitions for jira-glance.
//!
//! This module defines the CLI structure using clap derives and dispatches
//! each subcommand to its handler.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::color::ColorScheme;
use crate::commands::completions::handle_completions_command;
use crate::commands::fetch::handle_fetch_command;
use crate::commands::render::handle_render_command;
use crate::commands::version::handle_version_command;
use crate::commands::watch::handle_watch_command;
use crate::config::Config;
use crate::dashboard::Tab;
use crate::format::OutputFormat;
use crate::storage::Locale;

/// jira-glance - JIRA and Confluence at a glance
#[derive(Debug, Parser)]
#[command(
  name = "jira-glance",
  version,
  about = "JIRA and Confluence at a glance",
  long_about = "Polls a JIRA saved filter and, optionally, Confluence pages, and renders them as an HTML\n\
                fragment for a desktop widget host.",
  styles = get_clap_styles()
)]
pub struct Cli {
  /// Subcommand to execute
  #[command(subcommand)]
  pub command: Command,

  /// Configuration and credential options
  #[command(flatten)]
  pub auth: AuthOptions,

  /// Behavior options
  #[command(flatten)]
  pub behavior: BehaviorOptions,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Run one fetch cycle and write the result
  Fetch {
    #[command(flatten)]
    output: OutputOptions,
  },

  /// Run fetch cycles forever, rewriting the output on every tick
  Watch {
    #[command(flatten)]
    output: OutputOptions,

    /// Seconds between cycles (defaults to refresh_interval_secs)
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,
  },

  /// Convert a Confluence storage-format file to HTML
  Render {
    /// Storage-format file, or `-` for stdin
    #[arg(value_name = "FILE")]
    input: String,

    /// Locale for dates and times (defaults to the config file, then ko)
    #[arg(long, value_enum)]
    locale: Option<Locale>,
  },

  /// Display version and build information
  Version {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Show only version number
    #[arg(long)]
    short: bool,
  },

  /// Generate shell completion scripts
  Completions {
    /// Target shell for completions
    #[arg(value_enum)]
    shell: Shell,
  },
}

/// Shells supported by `completions`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
  Bash,
  Zsh,
  Fish,
  Powershell,
  Elvish,
}

/// Configuration and credential options
#[derive(Debug, Parser)]
pub struct AuthOptions {
  /// Path to the JSON settings file
  #[arg(long, global = true, env = "JIRA_GLANCE_CONFIG", default_value = "config.json", value_name = "PATH")]
  pub config: PathBuf,

  /// Atlassian account (overrides `username` in the config file)
  #[arg(long, global = true, env = "JIRA_GLANCE_USER", value_name = "EMAIL")]
  pub user: Option<String>,

  /// API token or password (overrides `password` in the config file)
  #[arg(long, global = true, env = "JIRA_GLANCE_PASSWORD", value_name = "TOKEN", hide_env_values = true)]
  pub password: Option<String>,
}

/// Where and how a cycle's result is written
#[derive(Debug, Clone, Parser)]
pub struct OutputOptions {
  /// Output format
  #[arg(long, value_enum, default_value = "html")]
  pub format: OutputFormat,

  /// Tab to show (defaults to Confluence when it is enabled)
  #[arg(long, value_enum)]
  pub tab: Option<Tab>,

  /// Write to a file instead of stdout
  #[arg(short, long, value_name = "FILE")]
  pub output: Option<PathBuf>,
}

/// Behavior options
#[derive(Debug, Parser)]
pub struct BehaviorOptions {
  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, global = true, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Colorize output
  #[arg(long, global = true, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,
}

/// Color output options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

impl Cli {
  /// Parse CLI arguments from the environment
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Validate CLI arguments
  ///
  /// Returns an error if the CLI configuration is invalid.
  pub fn validate(&self) -> Result<(), String> {
    if let Command::Watch {
      interval: Some(0), ..
    } = self.command
    {
      return Err("--interval must be at least 1 second".to_string());
    }

    if let Command::Render { input, .. } = &self.command
      && input != "-"
      && !Path::new(input).exists()
    {
      return Err(format!("Input file not found: {input}"));
    }

    Ok(())
  }

  /// Load the config file and apply the credential overrides.
  pub fn load_config(&self) -> anyhow::Result<Config> {
    let config = Config::load(&self.auth.config)?;
    Ok(config.with_credentials(self.auth.user.clone(), self.auth.password.clone()))
  }
}

/// Parse CLI arguments, initialize shared services, and dispatch to the chosen
/// command.
pub async fn run() {
  let cli = Cli::parse_args();

  init_tracing(&cli.behavior);

  // Create color scheme based on user preference
  let colors = ColorScheme::new(cli.behavior.color);

  // Validate CLI arguments
  if let Err(e) = cli.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    process::exit(4); // Invalid arguments exit code
  }

  match &cli.command {
    Command::Version { json, short } => handle_version_command(*json, *short, &colors),
    Command::Completions { shell } => handle_completions_command(*shell),
    Command::Render { input, locale } => {
      // The config file is optional here; it only supplies a default locale.
      let locale = locale.unwrap_or_else(|| {
        cli
          .load_config()
          .map(|config| config.locale)
          .unwrap_or_default()
      });
      handle_render_command(input, locale, &colors).await;
    }
    Command::Fetch { output } => {
      let config = load_config_or_exit(&cli, &colors);
      handle_fetch_command(output, &config, &colors).await;
    }
    Command::Watch { output, interval } => {
      let config = load_config_or_exit(&cli, &colors);
      handle_watch_command(output, *interval, &config, &colors).await;
    }
  }
}

fn load_config_or_exit(cli: &Cli, colors: &ColorScheme) -> Config {
  let loaded = cli.load_config().and_then(|config| {
    config.validate()?;
    Ok(config)
  });
  match loaded {
    Ok(config) => config,
    Err(e) => {
      eprintln!("{} {e:#}", colors.error("Error:"));
      process::exit(4);
    }
  }
}

fn init_tracing(behavior: &BehaviorOptions) {
  let level = if behavior.quiet {
    LevelFilter::ERROR
  } else {
    match behavior.verbose {
      0 => LevelFilter::WARN,
      1 => LevelFilter::INFO,
      2 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    }
  };

  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Get custom styles for clap help output
fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
  }

  #[test]
  fn test_fetch_defaults() {
    let cli = parse(&["jira-glance", "fetch"]);
    let Command::Fetch { output } = &cli.command else {
      panic!("expected fetch");
    };
    assert_eq!(output.format, OutputFormat::Html);
    assert_eq!(output.tab, None);
    assert_eq!(output.output, None);
    assert_eq!(cli.behavior.verbose, 0);
    assert!(cli.validate().is_ok());
  }

  #[test]
  fn test_global_flags_after_subcommand() {
    let cli = parse(&[
      "jira-glance",
      "fetch",
      "--format",
      "json",
      "--tab",
      "confluence",
      "-vv",
      "--user",
      "me@acme.com",
      "--config",
      "/tmp/widget.json",
    ]);
    let Command::Fetch { output } = &cli.command else {
      panic!("expected fetch");
    };
    assert_eq!(output.format, OutputFormat::Json);
    assert_eq!(output.tab, Some(Tab::Confluence));
    assert_eq!(cli.behavior.verbose, 2);
    assert_eq!(cli.auth.user.as_deref(), Some("me@acme.com"));
    assert_eq!(cli.auth.config, PathBuf::from("/tmp/widget.json"));
  }

  #[test]
  fn test_watch_interval_must_be_positive() {
    let cli = parse(&["jira-glance", "watch", "--interval", "0"]);
    assert!(cli.validate().unwrap_err().contains("--interval"));

    let cli = parse(&["jira-glance", "watch", "--interval", "60", "-o", "widget.html"]);
    assert!(cli.validate().is_ok());
  }

  #[test]
  fn test_render_requires_existing_file_or_stdin() {
    let cli = parse(&["jira-glance", "render", "-", "--locale", "en"]);
    assert!(cli.validate().is_ok());
    let Command::Render { locale, .. } = &cli.command else {
      panic!("expected render");
    };
    assert_eq!(*locale, Some(Locale::En));

    let cli = parse(&["jira-glance", "render", "/definitely/not/here.xml"]);
    assert!(cli.validate().unwrap_err().contains("Input file not found"));
  }

  #[test]
  fn test_quiet_conflicts_with_verbose() {
    assert!(Cli::try_parse_from(["jira-glance", "-q", "-v", "fetch"]).is_err());
  }

  #[test]
  fn test_load_config_applies_credential_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
      &path,
      r#"{ "jira_domain": "acme.atlassian.net", "jira_filter": "1", "username": "file-user", "password": "file-pass" }"#,
    )
    .unwrap();

    let cli = parse(&[
      "jira-glance",
      "fetch",
      "--config",
      path.to_str().unwrap(),
      "--password",
      "cli-pass",
    ]);
    let config = cli.load_config().unwrap();
    assert_eq!(config.username.as_deref(), Some("file-user"));
    assert_eq!(config.password.as_deref(), Some("cli-pass"));
  }
}
