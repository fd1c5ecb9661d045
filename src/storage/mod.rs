//! Conversion of Confluence storage format into display-ready HTML.
//!
//! Storage bodies are XHTML-like fragments sprinkled with `ac:` macros and
//! `ri:` resource identifiers. The widget cannot show them directly, so this
//! module rewrites them into plain HTML with semantic class names.
//!
//! # Architecture
//!
//! - [`html_entities`] - HTML entity encoding/decoding
//! - [`markup`] - lenient tag normalization and the plain-text fallback
//! - [`utils`] - synthetic namespace wrapping for `roxmltree`
//! - [`tree`] - the owned node tree the passes rewrite
//! - [`dates`] - date/time macros and elements
//! - [`tasks`] - task lists and checkboxes
//! - [`rewrite`] - script removal, wrapper unwrapping, page links
//! - [`text`] - character and whitespace cleanup
//!
//! # Example
//!
//! ```
//! use jira_glance::storage::{HtmlOptions, storage_to_html};
//!
//! let html = storage_to_html(
//!   r#"<ac:task-list><ac:task><ac:task-status>complete</ac:task-status><ac:task-body>Ship</ac:task-body></ac:task></ac:task-list>"#,
//!   &HtmlOptions::default(),
//! );
//! assert!(html.contains("task-checkbox checked"));
//! ```

use std::time::Instant;

use roxmltree::Document;
use tracing::{debug, trace, warn};

pub mod dates;
pub mod html_entities;
pub mod markup;
pub mod rewrite;
pub mod tasks;
pub mod text;
pub mod tree;
pub mod utils;

pub use dates::{Locale, parse_instant};
use tree::Node;

/// Options that control HTML conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HtmlOptions {
  /// Locale used for rendered dates and times.
  pub locale: Locale,
}

/// Convert a storage-format fragment into sanitized HTML.
///
/// Never fails. Markup that cannot be parsed even after normalization is
/// reduced to its text, which then goes through the same passes, so the
/// result is always safe to embed.
///
/// # Arguments
///
/// * `storage_content` - The storage-format body of a page.
/// * `options` - Conversion options such as the date locale.
///
/// # Returns
///
/// The HTML string, or an empty string for blank input.
///
/// # Examples
///
/// ```
/// # use jira_glance::storage::{storage_to_html, HtmlOptions};
/// let output = storage_to_html("<p>Hello   <strong>world</strong>!</p>", &HtmlOptions::default());
/// assert_eq!(output, "<p>Hello <strong>world</strong>!</p>");
/// ```
pub fn storage_to_html(storage_content: &str, options: &HtmlOptions) -> String {
  if storage_content.trim().is_empty() {
    return String::new();
  }

  let nodes = match parse_fragment(storage_content) {
    Ok(nodes) => nodes,
    Err(e) => {
      warn!("Falling back to plain text for unparseable storage content: {e}");
      vec![Node::Text(markup::plain_text(storage_content))]
    }
  };

  let nodes = rewrite::strip_scripts(nodes);
  let nodes = dates::normalize_dates(nodes, options.locale);
  let nodes = tasks::normalize_tasks(nodes);
  let nodes = rewrite::unwrap_vendor_markup(nodes);
  let nodes = rewrite::convert_page_links(nodes);
  let nodes = text::normalize_characters(nodes);
  let nodes = text::collapse_whitespace(nodes);

  tree::serialize(&nodes).trim().to_string()
}

/// Normalize, wrap and parse a fragment into owned nodes.
fn parse_fragment(storage_content: &str) -> Result<Vec<Node>, roxmltree::Error> {
  let preprocessed = html_entities::preprocess_html_entities(storage_content);
  let normalized = markup::normalize_markup(&preprocessed);
  let wrapped = utils::wrap_with_namespaces(&normalized);

  trace!(
    "Wrapped XML (first 500 chars):\n{}",
    wrapped.chars().take(500).collect::<String>()
  );

  let parse_start = Instant::now();
  let document = Document::parse(&wrapped)?;

  debug!(
    "Parsed storage fragment in {duration:?} (length: {length} chars)",
    duration = parse_start.elapsed(),
    length = wrapped.len()
  );

  Ok(tree::lift_fragment(document.root_element()))
}
