//! `render`: convert a saved storage-format document without any network
//! access.

use std::process;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

use crate::color::ColorScheme;
use crate::storage::{HtmlOptions, Locale, storage_to_html};

/// Print the HTML for the storage document at `input` (`-` reads stdin).
pub(crate) async fn handle_render_command(input: &str, locale: Locale, colors: &ColorScheme) {
  match render_input(input, locale).await {
    Ok(html) => println!("{html}"),
    Err(e) => {
      eprintln!("{} {}", colors.error("✗"), colors.error("Failed to render storage document"));
      eprintln!("  {}: {e:#}", colors.emphasis("Error"));
      process::exit(1);
    }
  }
}

async fn render_input(input: &str, locale: Locale) -> Result<String> {
  let storage = if input == "-" {
    let mut buffer = String::new();
    tokio::io::stdin()
      .read_to_string(&mut buffer)
      .await
      .context("Failed to read stdin")?;
    buffer
  } else {
    tokio::fs::read_to_string(input)
      .await
      .with_context(|| format!("Failed to read {input}"))?
  };

  Ok(storage_to_html(&storage, &HtmlOptions { locale }))
}
