//! Owned document tree used by the rewrite passes.
//!
//! `roxmltree` documents are read-only, so the parsed fragment is lifted into
//! this small owned representation. Each transformation is then a rewrite
//! from one `Vec<Node>` to the next, and [`serialize`] turns the result back
//! into HTML.

use roxmltree::NodeType;

use super::html_entities::{escape_attribute, escape_text};
use super::markup::is_void_element;
use super::utils::{SYNTHETIC_ROOT, prefix_for_namespace, qualified_name};

/// A node in the owned tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  Element(Element),
  Text(String),
}

/// An element with its qualified name (`ac:task`, `p`), attributes in
/// document order, and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
  pub name: String,
  pub attributes: Vec<(String, String)>,
  pub children: Vec<Node>,
}

impl Element {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      attributes: Vec::new(),
      children: Vec::new(),
    }
  }

  pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.attributes.push((name.into(), value.into()));
    self
  }

  pub fn with_class(self, class: impl Into<String>) -> Self {
    self.with_attribute("class", class)
  }

  pub fn with_text(mut self, text: impl Into<String>) -> Self {
    self.children.push(Node::Text(text.into()));
    self
  }

  pub fn with_children(mut self, children: Vec<Node>) -> Self {
    self.children.extend(children);
    self
  }

  /// Whether the element has exactly this qualified name.
  pub fn is(&self, name: &str) -> bool {
    self.name == name
  }

  /// Namespace prefix of the element (`ac` for `ac:task`).
  pub fn prefix(&self) -> Option<&str> {
    self.name.split_once(':').map(|(prefix, _)| prefix)
  }

  pub fn attribute(&self, name: &str) -> Option<&str> {
    self
      .attributes
      .iter()
      .find(|(attr, _)| attr == name)
      .map(|(_, value)| value.as_str())
  }

  pub fn has_attribute(&self, name: &str) -> bool {
    self.attribute(name).is_some()
  }

  /// Whether the `class` attribute contains `needle` anywhere.
  pub fn class_contains(&self, needle: &str) -> bool {
    self.attribute("class").is_some_and(|class| class.contains(needle))
  }

  /// First child element with the given qualified name.
  pub fn child(&self, name: &str) -> Option<&Element> {
    self.children.iter().find_map(|child| match child {
      Node::Element(element) if element.is(name) => Some(element),
      _ => None,
    })
  }

  /// Concatenated text of all descendants.
  pub fn text(&self) -> String {
    let mut text = String::new();
    collect_text(&self.children, &mut text);
    text
  }
}

fn collect_text(nodes: &[Node], text: &mut String) {
  for node in nodes {
    match node {
      Node::Text(value) => text.push_str(value),
      Node::Element(element) => collect_text(&element.children, text),
    }
  }
}

/// Lifts the children of the synthetic root into owned nodes.
///
/// Comments and processing instructions are dropped; CDATA becomes text.
pub fn lift_fragment(root: roxmltree::Node) -> Vec<Node> {
  debug_assert_eq!(root.tag_name().name(), SYNTHETIC_ROOT);
  root.children().filter_map(lift).collect()
}

fn lift(node: roxmltree::Node) -> Option<Node> {
  match node.node_type() {
    NodeType::Text => node.text().map(|text| Node::Text(text.to_string())),
    NodeType::Element => {
      let tag = node.tag_name();
      let name = qualified_name(prefix_for_namespace(tag.namespace()), tag.name());
      let attributes = node
        .attributes()
        .map(|attr| {
          (
            qualified_name(prefix_for_namespace(attr.namespace()), attr.name()),
            attr.value().to_string(),
          )
        })
        .collect();
      let children = node.children().filter_map(lift).collect();
      Some(Node::Element(Element {
        name,
        attributes,
        children,
      }))
    }
    _ => None,
  }
}

/// Outcome of visiting one element during [`rewrite_elements`].
pub enum Visit {
  /// Keep this (possibly rebuilt) element and continue into its children.
  Descend(Element),
  /// Replace the element with these nodes, which are not visited again.
  Replace(Vec<Node>),
  /// Replace the element with these nodes and visit them too.
  Splice(Vec<Node>),
}

/// Applies `visit` to every element, depth-first in document order.
pub fn rewrite_elements(nodes: Vec<Node>, visit: &mut dyn FnMut(Element) -> Visit) -> Vec<Node> {
  let mut rewritten = Vec::with_capacity(nodes.len());
  for node in nodes {
    match node {
      Node::Text(text) => rewritten.push(Node::Text(text)),
      Node::Element(element) => match visit(element) {
        Visit::Descend(mut element) => {
          element.children = rewrite_elements(std::mem::take(&mut element.children), visit);
          rewritten.push(Node::Element(element));
        }
        Visit::Replace(nodes) => rewritten.extend(nodes),
        Visit::Splice(nodes) => rewritten.extend(rewrite_elements(nodes, visit)),
      },
    }
  }
  rewritten
}

/// Replaces every text node with the nodes `expand` returns for it.
pub fn rewrite_text(nodes: Vec<Node>, expand: &mut dyn FnMut(String) -> Vec<Node>) -> Vec<Node> {
  let mut rewritten = Vec::with_capacity(nodes.len());
  for node in nodes {
    match node {
      Node::Text(text) => rewritten.extend(expand(text)),
      Node::Element(mut element) => {
        element.children = rewrite_text(std::mem::take(&mut element.children), expand);
        rewritten.push(Node::Element(element));
      }
    }
  }
  rewritten
}

/// Serializes nodes as HTML. Void elements are written self-closed so the
/// output can be parsed again.
pub fn serialize(nodes: &[Node]) -> String {
  let mut html = String::new();
  write_nodes(nodes, &mut html);
  html
}

fn write_nodes(nodes: &[Node], html: &mut String) {
  for node in nodes {
    match node {
      Node::Text(text) => html.push_str(&escape_text(text)),
      Node::Element(element) => {
        html.push('<');
        html.push_str(&element.name);
        for (name, value) in &element.attributes {
          html.push_str(&format!(" {name}=\"{}\"", escape_attribute(value)));
        }
        if element.children.is_empty() && is_void_element(&element.name) {
          html.push_str("/>");
          continue;
        }
        html.push('>');
        write_nodes(&element.children, html);
        html.push_str(&format!("</{}>", element.name));
      }
    }
  }
}
