//! Task-list normalization.
//!
//! Two markup variants describe checklists. Native storage format uses
//! `<ac:task-list>` with `<ac:task-status>` markers; pasted or rendered
//! content uses `task-list-item` list items with checkbox inputs, or literal
//! `[x]` / `[ ]` brackets in text. Both are mapped onto the same two glyphs.

use std::sync::LazyLock;

use regex::Regex;

use super::tree::{Element, Node, Visit, rewrite_elements, rewrite_text};

const CHECKED_GLYPH: &str = "✅";
const UNCHECKED_GLYPH: &str = "⬜";

static TASK_ID_LABEL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\btask-id:\s*[0-9a-f-]+").expect("valid task-id pattern"));
static UUID: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\b[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\b").expect("valid uuid pattern")
});
static HEX_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b[0-9a-f]{32}\b").expect("valid hex id pattern"));
static BRACKET_CHECKBOX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([xX ])\]").expect("valid checkbox pattern"));

/// Rewrites task markup and checkbox notation into `task-*` classed elements.
pub fn normalize_tasks(nodes: Vec<Node>) -> Vec<Node> {
  let nodes = rewrite_elements(nodes, &mut task_element);
  rewrite_text(nodes, &mut expand_task_text)
}

fn task_element(element: Element) -> Visit {
  match element.name.as_str() {
    "ac:task-list" => Visit::Descend(Element::new("div").with_class("task-list").with_children(element.children)),
    "ac:task" => Visit::Descend(Element::new("div").with_class("task-item").with_children(element.children)),
    "ac:task-id" => Visit::Replace(Vec::new()),
    "ac:task-status" => Visit::Replace(vec![checkbox(element.text().trim() == "complete")]),
    "ac:task-body" => Visit::Descend(Element::new("span").with_class("task-text").with_children(element.children)),
    "li" if element.class_contains("task-list-item") => {
      Visit::Descend(Element::new("li").with_class("task-item").with_children(element.children))
    }
    "input" if element.attribute("type").is_some_and(|kind| kind.eq_ignore_ascii_case("checkbox")) => {
      Visit::Replace(vec![checkbox(element.has_attribute("checked"))])
    }
    _ => Visit::Descend(element),
  }
}

/// Checkbox glyph span; every status other than complete renders unchecked.
pub fn checkbox(checked: bool) -> Node {
  let (state, glyph) = if checked {
    ("checked", CHECKED_GLYPH)
  } else {
    ("unchecked", UNCHECKED_GLYPH)
  };
  Node::Element(
    Element::new("span")
      .with_class(format!("task-checkbox {state}"))
      .with_text(glyph),
  )
}

/// Removes task identifiers that leaked into visible text.
pub fn strip_task_identifiers(text: &str) -> String {
  let text = TASK_ID_LABEL.replace_all(text, "");
  let text = UUID.replace_all(&text, "");
  HEX_ID.replace_all(&text, "").into_owned()
}

fn expand_task_text(text: String) -> Vec<Node> {
  let text = strip_task_identifiers(&text);
  let mut nodes = Vec::new();
  let mut last = 0;

  for captures in BRACKET_CHECKBOX.captures_iter(&text) {
    let (Some(whole), Some(mark)) = (captures.get(0), captures.get(1)) else {
      continue;
    };
    if whole.start() > last {
      nodes.push(Node::Text(text[last..whole.start()].to_string()));
    }
    nodes.push(checkbox(mark.as_str() != " "));
    last = whole.end();
  }

  if last < text.len() || nodes.is_empty() {
    nodes.push(Node::Text(text[last..].to_string()));
  }
  nodes
}
