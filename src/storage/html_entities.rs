//! HTML entity encoding and decoding utilities.
//!
//! Storage format is XHTML-ish but routinely carries HTML named entities
//! (`&nbsp;`, `&hellip;`) that an XML parser rejects. These helpers turn them
//! into literal characters before parsing, and escape text again when the
//! rewritten tree is serialized.

use crate::storage::markup::verbatim_section;

/// HTML named entities mapped to the characters they stand for.
///
/// XML's five predefined entities are absent on purpose: `roxmltree` decodes
/// those itself.
const NAMED_ENTITIES: &[(&str, &str)] = &[
  ("&nbsp;", "\u{00A0}"),
  ("&lpar;", "("),
  ("&rpar;", ")"),
  ("&ndash;", "\u{2013}"),
  ("&mdash;", "\u{2014}"),
  ("&ldquo;", "\u{201C}"),
  ("&rdquo;", "\u{201D}"),
  ("&lsquo;", "\u{2018}"),
  ("&rsquo;", "\u{2019}"),
  ("&hellip;", "\u{2026}"),
  ("&bull;", "\u{2022}"),
  ("&middot;", "\u{00B7}"),
  ("&deg;", "\u{00B0}"),
  ("&copy;", "\u{00A9}"),
  ("&reg;", "\u{00AE}"),
  ("&trade;", "\u{2122}"),
  ("&times;", "\u{00D7}"),
  ("&divide;", "\u{00F7}"),
  ("&plusmn;", "\u{00B1}"),
  ("&ne;", "\u{2260}"),
  ("&le;", "\u{2264}"),
  ("&ge;", "\u{2265}"),
  ("&larr;", "\u{2190}"),
  ("&rarr;", "\u{2192}"),
  ("&uarr;", "\u{2191}"),
  ("&darr;", "\u{2193}"),
];

/// XML-predefined entity names, decoded natively by the parser.
const XML_ENTITIES: &[&str] = &["lt", "gt", "amp", "quot", "apos"];

/// Prepare raw storage markup for XML parsing.
///
/// Named HTML entities become literal characters, and any `&` that does not
/// start an XML-predefined or numeric reference is escaped so it survives
/// parsing as text. CDATA sections and comments are copied untouched, since
/// the parser keeps their contents literally.
///
/// # Arguments
/// * `text` - Raw storage-format markup that may contain HTML entities.
///
/// # Returns
/// Markup whose entity references are all valid XML.
pub fn preprocess_html_entities(text: &str) -> String {
  let mut result = String::with_capacity(text.len());
  let mut rest = text;

  while let Some(start) = rest.find("<!") {
    result.push_str(&preprocess_segment(&rest[..start]));
    let tail = &rest[start..];
    match verbatim_section(tail) {
      Some(section) => {
        result.push_str(section);
        rest = &tail[section.len()..];
      }
      None => {
        result.push_str("<!");
        rest = &tail[2..];
      }
    }
  }

  result.push_str(&preprocess_segment(rest));
  result
}

fn preprocess_segment(text: &str) -> String {
  let mut replaced = text.to_string();
  for (entity, literal) in NAMED_ENTITIES {
    if replaced.contains(entity) {
      replaced = replaced.replace(entity, literal);
    }
  }
  escape_stray_ampersands(&replaced)
}

fn escape_stray_ampersands(text: &str) -> String {
  let mut result = String::with_capacity(text.len());
  for (index, ch) in text.char_indices() {
    if ch == '&' && !starts_xml_reference(&text[index + 1..]) {
      result.push_str("&amp;");
    } else {
      result.push(ch);
    }
  }
  result
}

/// Whether `rest` (the text right after an `&`) forms a reference XML accepts.
fn starts_xml_reference(rest: &str) -> bool {
  let Some(end) = rest.find(';') else {
    return false;
  };
  let body = &rest[..end];
  XML_ENTITIES.contains(&body) || decode_numeric_entity(body).is_some()
}

/// Decode common HTML entities to their Unicode equivalents.
///
/// Used on text that never went through the XML parser. Handles named
/// entities plus decimal and hexadecimal numeric references.
///
/// # Arguments
/// * `text` - Text that may contain HTML entity references.
///
/// # Returns
/// A `String` with entity references expanded into their Unicode characters.
pub fn decode_html_entities(text: &str) -> String {
  let mut replaced = text.to_string();
  for (entity, literal) in NAMED_ENTITIES {
    if replaced.contains(entity) {
      replaced = replaced.replace(entity, literal);
    }
  }
  let replaced = replaced
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&apos;", "'");

  // `&amp;` last, so `&amp;lt;` decodes to the literal text `&lt;`.
  decode_numeric_html_entities(&replaced).replace("&amp;", "&")
}

/// Decode numeric HTML entities such as `&#39;` or `&#x1F44B;`.
fn decode_numeric_html_entities(text: &str) -> String {
  let mut result = String::with_capacity(text.len());
  let mut rest = text;

  while let Some(start) = rest.find("&#") {
    result.push_str(&rest[..start]);
    let candidate = &rest[start + 1..];
    let decoded = candidate
      .find(';')
      .and_then(|end| decode_numeric_entity(&candidate[..end]).map(|ch| (ch, end)));

    match decoded {
      Some((ch, end)) => {
        result.push(ch);
        rest = &candidate[end + 1..];
      }
      None => {
        result.push('&');
        rest = candidate;
      }
    }
  }

  result.push_str(rest);
  result
}

/// Decode a single numeric HTML entity (without the `&` and `;`).
///
/// # Arguments
/// * `entity` - Numeric entity body such as `#128075` or `#x1F44B`.
///
/// # Returns
/// `Some(char)` containing the decoded character, or `None` if parsing fails.
fn decode_numeric_entity(entity: &str) -> Option<char> {
  let body = entity.strip_prefix('#')?;

  let (radix, digits) = match body.strip_prefix('x').or_else(|| body.strip_prefix('X')) {
    Some(hex) => (16, hex),
    None => (10, body),
  };

  if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
    return None;
  }

  let value = u32::from_str_radix(digits, radix).ok()?;
  char::from_u32(value)
}

/// Escape text content for HTML output.
pub fn escape_text(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      _ => escaped.push(ch),
    }
  }
  escaped
}

/// Escape an attribute value for use inside double quotes.
pub fn escape_attribute(value: &str) -> String {
  escape_text(value).replace('"', "&quot;")
}
