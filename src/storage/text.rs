//! Text-level cleanup applied after the structural passes.

use super::tree::{Node, rewrite_text};

/// Maps full-width parentheses to ASCII and non-breaking spaces to spaces.
pub fn normalize_characters(nodes: Vec<Node>) -> Vec<Node> {
  rewrite_text(nodes, &mut |text| {
    let normalized: String = text
      .chars()
      .map(|ch| match ch {
        '（' => '(',
        '）' => ')',
        '\u{00A0}' => ' ',
        other => other,
      })
      .collect();
    vec![Node::Text(normalized)]
  })
}

/// Collapses whitespace runs to a single space and drops text nodes that
/// contain nothing but whitespace. Adjacent text nodes are merged first so a
/// run split across nodes collapses as one.
pub fn collapse_whitespace(nodes: Vec<Node>) -> Vec<Node> {
  let mut collapsed: Vec<Node> = Vec::with_capacity(nodes.len());

  for node in nodes {
    match node {
      Node::Text(text) => match collapsed.last_mut() {
        Some(Node::Text(previous)) => previous.push_str(&text),
        _ => collapsed.push(Node::Text(text)),
      },
      Node::Element(mut element) => {
        element.children = collapse_whitespace(std::mem::take(&mut element.children));
        collapsed.push(Node::Element(element));
      }
    }
  }

  collapsed
    .into_iter()
    .filter_map(|node| match node {
      Node::Text(text) if text.trim().is_empty() => None,
      Node::Text(text) => Some(Node::Text(collapse_runs(&text))),
      element => Some(element),
    })
    .collect()
}

fn collapse_runs(text: &str) -> String {
  let mut collapsed = String::with_capacity(text.len());
  let mut in_run = false;
  for ch in text.chars() {
    if ch.is_whitespace() {
      if !in_run {
        collapsed.push(' ');
      }
      in_run = true;
    } else {
      collapsed.push(ch);
      in_run = false;
    }
  }
  collapsed
}
