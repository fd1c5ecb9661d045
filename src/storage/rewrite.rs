//! Structural passes: script removal, vendor wrapper unwrapping and page
//! link conversion.

use super::tree::{Element, Node, Visit, rewrite_elements};

const LINK_PLACEHOLDER: &str = "[Link]";

/// Removes `script` and `style` elements together with their content, along
/// with `on*` event handler attributes and URL attributes holding a
/// `javascript:` or `vbscript:` URL.
pub fn strip_scripts(nodes: Vec<Node>) -> Vec<Node> {
  rewrite_elements(nodes, &mut |mut element| {
    if element.name.eq_ignore_ascii_case("script") || element.name.eq_ignore_ascii_case("style") {
      return Visit::Replace(Vec::new());
    }
    element
      .attributes
      .retain(|(name, value)| !is_event_handler(name) && !is_script_url(name, value));
    Visit::Descend(element)
  })
}

const URL_ATTRIBUTES: &[&str] = &["href", "src", "action", "formaction", "background", "poster"];

fn local_name(name: &str) -> &str {
  name.rsplit(':').next().unwrap_or(name)
}

fn is_event_handler(name: &str) -> bool {
  let local = local_name(name);
  local.len() > 2 && local.get(..2).is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}

fn is_script_url(name: &str, value: &str) -> bool {
  if !URL_ATTRIBUTES.iter().any(|url| local_name(name).eq_ignore_ascii_case(url)) {
    return false;
  }

  // Whitespace and control characters inside the scheme do not count.
  let scheme: String = value
    .chars()
    .filter(|ch| !ch.is_whitespace() && !ch.is_control())
    .take_while(|ch| *ch != ':')
    .collect::<String>()
    .to_ascii_lowercase();
  value.contains(':') && (scheme == "javascript" || scheme == "vbscript")
}

/// Replaces namespaced wrappers (`ac:structured-macro`, `ac:rich-text-body`,
/// `ac:layout-section`, ...) with their children.
///
/// Macro parameters and placeholders are configuration rather than content
/// and are dropped. `ac:link` is left alone for [`convert_page_links`].
pub fn unwrap_vendor_markup(nodes: Vec<Node>) -> Vec<Node> {
  rewrite_elements(nodes, &mut |element| match element.name.as_str() {
    "ac:parameter" | "ac:placeholder" => Visit::Replace(Vec::new()),
    "ac:link" => Visit::Replace(vec![Node::Element(element)]),
    _ if element.prefix().is_some() => Visit::Splice(element.children),
    _ => Visit::Descend(element),
  })
}

/// Turns `ac:link` page references into plain anchors.
pub fn convert_page_links(nodes: Vec<Node>) -> Vec<Node> {
  rewrite_elements(nodes, &mut |element| {
    if element.is("ac:link") {
      return Visit::Replace(vec![page_link(&element)]);
    }
    if element.prefix() == Some("ri") {
      return Visit::Replace(Vec::new());
    }
    Visit::Descend(element)
  })
}

fn page_link(link: &Element) -> Node {
  let title = link
    .child("ri:page")
    .and_then(|page| page.attribute("ri:content-title"))
    .map(str::trim)
    .filter(|title| !title.is_empty());

  let body = ["ac:link-body", "ac:plain-text-link-body"]
    .iter()
    .find_map(|name| link.child(name))
    .map(|body| body.text().trim().to_string())
    .filter(|text| !text.is_empty());

  match (title, body) {
    (Some(title), body) => Node::Element(
      Element::new("a")
        .with_attribute("href", "#")
        .with_attribute("title", title)
        .with_text(body.unwrap_or_else(|| title.to_string())),
    ),
    (None, Some(body)) => Node::Text(body),
    (None, None) => Node::Text(LINK_PLACEHOLDER.to_string()),
  }
}
