//! Lenient markup normalization ahead of XML parsing.
//!
//! Real storage bodies mix XHTML with HTML habits: `<br>` without a closing
//! slash, `<input type="checkbox" checked>`, unquoted attribute values, and
//! bare `<` characters in text. This module rewrites those tags into
//! well-formed XML while leaving everything else byte-for-byte intact. It
//! also provides the plain-text fallback used when a fragment still cannot
//! be parsed.

use super::html_entities::decode_html_entities;

/// HTML elements that never have content or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// Returns `true` when `name` is an HTML void element.
pub fn is_void_element(name: &str) -> bool {
  VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(name))
}

/// Rewrite start tags so the fragment is well-formed XML.
///
/// - void elements are self-closed and their stray end tags dropped
/// - valueless attributes get their own name as value (`checked="checked"`)
/// - unquoted and single-quoted values are re-quoted with `"`
/// - duplicate attributes keep their first occurrence
/// - a `<` that does not open a tag becomes `&lt;`
///
/// Comments, CDATA sections, declarations and end tags are copied as-is.
pub fn normalize_markup(input: &str) -> String {
  let mut output = String::with_capacity(input.len() + input.len() / 16);
  let mut rest = input;

  while let Some(start) = rest.find('<') {
    output.push_str(&rest[..start]);
    let tail = &rest[start..];

    if let Some(section) = verbatim_section(tail) {
      output.push_str(section);
      rest = &tail[section.len()..];
      continue;
    }

    if let Some(after_slash) = tail.strip_prefix("</") {
      match tail.find('>') {
        Some(end) => {
          let name = after_slash[..end - 2].trim();
          if !is_void_element(name) {
            output.push_str(&tail[..=end]);
          }
          rest = &tail[end + 1..];
        }
        None => {
          output.push_str("&lt;");
          rest = &tail[1..];
        }
      }
      continue;
    }

    let opens_tag = tail[1..].chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    match find_tag_end(tail).filter(|_| opens_tag) {
      Some(end) => {
        output.push_str(&normalize_start_tag(&tail[1..end]));
        rest = &tail[end + 1..];
      }
      None => {
        output.push_str("&lt;");
        rest = &tail[1..];
      }
    }
  }

  output.push_str(rest);
  output
}

/// Returns the full text of a comment, CDATA section, declaration or
/// processing instruction starting at `tail`.
pub(super) fn verbatim_section(tail: &str) -> Option<&str> {
  let terminator = if tail.starts_with("<!--") {
    "-->"
  } else if tail.starts_with("<![CDATA[") {
    "]]>"
  } else if tail.starts_with("<!") || tail.starts_with("<?") {
    ">"
  } else {
    return None;
  };

  let end = tail[2..].find(terminator)? + 2 + terminator.len();
  Some(&tail[..end])
}

/// Finds the `>` closing the tag that starts at `tail`, ignoring any `>`
/// inside quoted attribute values.
fn find_tag_end(tail: &str) -> Option<usize> {
  let mut quote: Option<char> = None;
  for (index, ch) in tail.char_indices().skip(1) {
    match (quote, ch) {
      (Some(open), c) if c == open => quote = None,
      (Some(_), _) => {}
      (None, '"' | '\'') => quote = Some(ch),
      (None, '>') => return Some(index),
      (None, '<') => return None,
      (None, _) => {}
    }
  }
  None
}

/// Rebuilds the inside of a start tag (`name attr=...`, without `<`/`>`).
fn normalize_start_tag(inner: &str) -> String {
  let trimmed = inner.trim_end();
  let (inner, self_closing) = match trimmed.strip_suffix('/') {
    Some(stripped) => (stripped, true),
    None => (trimmed, false),
  };

  let name_end = inner.find(|c: char| c.is_whitespace()).unwrap_or(inner.len());
  let name = &inner[..name_end];

  let mut tag = format!("<{name}");
  for (attr_name, value) in parse_attributes(&inner[name_end..]) {
    tag.push_str(&format!(" {attr_name}=\"{}\"", quote_value(&value)));
  }

  if self_closing || is_void_element(name) {
    tag.push_str("/>");
  } else {
    tag.push('>');
  }
  tag
}

fn quote_value(value: &str) -> String {
  value.replace('<', "&lt;").replace('"', "&quot;")
}

/// Splits an attribute list into `(name, value)` pairs.
fn parse_attributes(source: &str) -> Vec<(String, String)> {
  let mut attributes: Vec<(String, String)> = Vec::new();
  let mut chars = source.char_indices().peekable();

  while let Some(&(start, ch)) = chars.peek() {
    if ch.is_whitespace() || ch == '/' {
      chars.next();
      continue;
    }
    if ch == '=' || ch == '"' || ch == '\'' {
      // Garbage without a name; skip it.
      chars.next();
      continue;
    }

    let mut end = start;
    while let Some(&(index, c)) = chars.peek() {
      if c.is_whitespace() || c == '=' || c == '/' {
        break;
      }
      end = index + c.len_utf8();
      chars.next();
    }
    let name = source[start..end].to_string();

    while chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
      chars.next();
    }

    let value = if chars.peek().is_some_and(|&(_, c)| c == '=') {
      chars.next();
      while chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
        chars.next();
      }
      read_value(source, &mut chars)
    } else {
      name.clone()
    };

    if !attributes.iter().any(|(existing, _)| *existing == name) {
      attributes.push((name, value));
    }
  }

  attributes
}

fn read_value(source: &str, chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> String {
  match chars.peek().copied() {
    Some((open, quote @ ('"' | '\''))) => {
      chars.next();
      let value_start = open + 1;
      for (index, c) in chars.by_ref() {
        if c == quote {
          return source[value_start..index].to_string();
        }
      }
      source[value_start..].to_string()
    }
    Some((value_start, _)) => {
      let mut end = value_start;
      while let Some(&(index, c)) = chars.peek() {
        if c.is_whitespace() {
          break;
        }
        end = index + c.len_utf8();
        chars.next();
      }
      source[value_start..end].to_string()
    }
    None => String::new(),
  }
}

/// Reduce markup to its visible text without parsing it.
///
/// Tags are removed, `script`/`style` elements lose their content, and
/// entities are decoded. Text following an unterminated `<` is kept.
pub fn plain_text(input: &str) -> String {
  let mut text = String::with_capacity(input.len());
  let mut rest = input;

  while let Some(start) = rest.find('<') {
    text.push_str(&rest[..start]);
    let tail = &rest[start..];
    let Some(end) = tail.find('>') else {
      text.push_str(tail);
      rest = "";
      break;
    };

    let name = tail[1..end]
      .split(|c: char| c.is_whitespace() || c == '/' || c == '>')
      .next()
      .unwrap_or_default()
      .to_ascii_lowercase();
    rest = &tail[end + 1..];

    if name == "script" || name == "style" {
      let closing = format!("</{name}");
      rest = match rest.to_ascii_lowercase().find(&closing) {
        Some(close) => rest[close..].find('>').map_or("", |gt| &rest[close + gt + 1..]),
        None => "",
      };
    } else {
      // Keep words separated where block tags used to be.
      text.push(' ');
    }
  }

  text.push_str(rest);
  decode_html_entities(&text)
}
