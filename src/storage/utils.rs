//! Namespace helpers for parsing storage-format fragments with `roxmltree`.
//!
//! Storage format references prefixes such as `ac:` and `ri:` without ever
//! declaring them. Wrapping the fragment in a synthetic root that declares
//! each prefix lets the XML parser resolve them, and the helpers here map the
//! synthetic namespace URIs back to their prefixes.

use std::collections::BTreeSet;

/// Synthetic namespace base URL for Confluence namespaces.
pub const SYNTHETIC_NS_BASE: &str = "https://confluence.example/";

/// Name of the synthetic root element wrapped around every fragment.
pub const SYNTHETIC_ROOT: &str = "glance-root";

/// Wraps storage format markup with synthetic namespace declarations.
///
/// # Arguments
/// * `storage_content` - Raw storage format XML/HTML snippet from Confluence.
///
/// # Returns
/// A `String` containing the original content nested inside a synthetic root
/// element with namespace declarations.
pub fn wrap_with_namespaces(storage_content: &str) -> String {
  let mut prefixes = BTreeSet::new();

  for segment in storage_content.split('<').skip(1) {
    let segment = match segment.find('>') {
      Some(idx) => &segment[..idx],
      None => segment,
    };
    let segment = segment.trim_start_matches('/');

    if let Some((prefix, _)) = segment.split_once(':')
      && is_declarable_prefix(prefix)
    {
      prefixes.insert(prefix.to_string());
    }

    for attr in segment.split_whitespace() {
      if let Some((name, _)) = attr.split_once('=')
        && let Some((prefix, _)) = name.split_once(':')
        && is_declarable_prefix(prefix)
      {
        prefixes.insert(prefix.to_string());
      }
    }
  }

  let mut result = format!("<{SYNTHETIC_ROOT}");
  for prefix in prefixes {
    result.push_str(&format!(" xmlns:{prefix}=\"{SYNTHETIC_NS_BASE}{prefix}\""));
  }
  result.push('>');
  result.push_str(storage_content);
  result.push_str(&format!("</{SYNTHETIC_ROOT}>"));
  result
}

/// Check if a string may be declared as a synthetic namespace prefix.
///
/// `xml` and `xmlns` are bound by the XML spec itself and must never be
/// redeclared.
fn is_declarable_prefix(prefix: &str) -> bool {
  if prefix.is_empty() || prefix.eq_ignore_ascii_case("xml") || prefix.eq_ignore_ascii_case("xmlns") {
    return false;
  }
  let mut chars = prefix.chars();
  chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Recovers the storage-format prefix from a resolved namespace URI.
///
/// Returns `None` for namespaces that were declared by the document itself
/// (for example an XHTML default namespace), which are treated as unprefixed.
pub fn prefix_for_namespace(namespace: Option<&str>) -> Option<&str> {
  namespace?.strip_prefix(SYNTHETIC_NS_BASE)
}

/// Joins an optional prefix and a local name into `prefix:name` form.
pub fn qualified_name(prefix: Option<&str>, local: &str) -> String {
  match prefix {
    Some(prefix) => format!("{prefix}:{local}"),
    None => local.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use roxmltree::Document;

  use super::*;

  #[test]
  fn test_wrap_declares_element_and_attribute_prefixes() {
    let input = r#"<ac:link><ri:page ri:content-title="Home" /></ac:link>"#;
    let wrapped = wrap_with_namespaces(input);
    assert!(wrapped.starts_with("<glance-root"));
    assert!(wrapped.contains(r#"xmlns:ac="https://confluence.example/ac""#));
    assert!(wrapped.contains(r#"xmlns:ri="https://confluence.example/ri""#));
    assert!(Document::parse(&wrapped).is_ok());
  }

  #[test]
  fn test_wrap_ignores_urls_and_reserved_prefixes() {
    let input = r#"<p xml:lang="en"><a href="https://example.com">x</a></p>"#;
    let wrapped = wrap_with_namespaces(input);
    assert!(!wrapped.contains("xmlns:xml="));
    assert!(!wrapped.contains("xmlns:https"));
    assert!(Document::parse(&wrapped).is_ok());
  }

  #[test]
  fn test_prefix_for_namespace() {
    assert_eq!(prefix_for_namespace(Some("https://confluence.example/ac")), Some("ac"));
    assert_eq!(prefix_for_namespace(Some("http://www.w3.org/1999/xhtml")), None);
    assert_eq!(prefix_for_namespace(None), None);
  }

  #[test]
  fn test_qualified_name() {
    assert_eq!(qualified_name(Some("ac"), "task"), "ac:task");
    assert_eq!(qualified_name(None, "p"), "p");
  }
}
