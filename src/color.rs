//! Color utilities for terminal output
//!
//! Status messages go to stderr so stdout stays clean for the rendered
//! widget; the scheme therefore follows stderr's capabilities.

use owo_colors::OwoColorize;

use crate::cli::ColorOption;

/// Semantic styles for status messages.
pub struct ColorScheme {
  enabled: bool,
}

impl ColorScheme {
  /// Create a new color scheme based on user preference and terminal
  /// capabilities
  pub fn new(color_option: ColorOption) -> Self {
    let enabled = match color_option {
      ColorOption::Always => true,
      ColorOption::Never => false,
      ColorOption::Auto => {
        use std::io::IsTerminal;
        std::io::stderr().is_terminal()
      }
    };

    Self { enabled }
  }

  fn paint<T: std::fmt::Display>(&self, text: T, style: impl FnOnce(&T) -> String) -> String {
    if self.enabled { style(&text) } else { text.to_string() }
  }

  /// Style for success messages (green)
  pub fn success<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.green().to_string())
  }

  /// Style for error messages (bright red)
  pub fn error<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_red().bold().to_string())
  }

  /// Style for warning messages (yellow)
  pub fn warning<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.yellow().to_string())
  }

  /// Style for info messages (cyan)
  pub fn info<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.cyan().to_string())
  }

  /// Style for emphasis/important text (bright white, bold)
  pub fn emphasis<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_white().bold().to_string())
  }

  /// Style for file paths (magenta)
  pub fn path<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.magenta().to_string())
  }

  /// Style for numbers and metrics (bright blue)
  pub fn number<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_blue().to_string())
  }

  /// Style for commands and code (bright green)
  pub fn code<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_green().to_string())
  }

  /// Style for dimmed/secondary text (gray)
  pub fn dimmed<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.dimmed().to_string())
  }

  /// Style for progress indicators (bright cyan)
  pub fn progress<T: std::fmt::Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_cyan().to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_color_scheme_disabled() {
    let scheme = ColorScheme::new(ColorOption::Never);
    assert_eq!(scheme.success("test"), "test");
    assert_eq!(scheme.error("test"), "test");
    assert_eq!(scheme.path("widget.html"), "widget.html");
  }

  #[test]
  fn test_color_scheme_enabled() {
    let scheme = ColorScheme::new(ColorOption::Always);
    assert_ne!(scheme.success("test"), "test");
    assert_ne!(scheme.error("test"), "test");
    assert!(scheme.warning("test").contains("test"));
  }

  #[test]
  fn test_all_semantic_colors() {
    let scheme = ColorScheme::new(ColorOption::Always);
    let text = "test";

    for styled in [
      scheme.success(text),
      scheme.error(text),
      scheme.warning(text),
      scheme.info(text),
      scheme.emphasis(text),
      scheme.path(text),
      scheme.number(text),
      scheme.code(text),
      scheme.dimmed(text),
      scheme.progress(text),
    ] {
      assert!(styled.contains(text));
      assert!(styled.contains('\u{1b}'));
    }
  }
}
