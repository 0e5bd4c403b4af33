//! Visual tree produced by the components.
//!
//! Components are pure functions of their inputs to a [`Node`]. The tree can be
//! handed to a renderer as JSON or serialized to HTML.

use serde::Serialize;
use std::fmt::Write;

/// Elements that never have children or a closing tag
const VOID_TAGS: [&str; 4] = ["img", "br", "hr", "input"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
	Element(Element),
	Text { text: Box<str> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
	pub tag: Box<str>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub attrs: Vec<(Box<str>, Box<str>)>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<Node>,
}

impl Element {
	pub fn new(tag: impl Into<Box<str>>) -> Self {
		Self { tag: tag.into(), attrs: Vec::new(), children: Vec::new() }
	}

	pub fn class(self, class: impl Into<Box<str>>) -> Self {
		self.attr("class", class)
	}

	pub fn attr(mut self, name: impl Into<Box<str>>, value: impl Into<Box<str>>) -> Self {
		self.attrs.push((name.into(), value.into()));
		self
	}

	pub fn child(mut self, child: impl Into<Node>) -> Self {
		self.children.push(child.into());
		self
	}

	pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
		self.children.extend(children);
		self
	}

	pub fn text(self, text: impl Into<Box<str>>) -> Self {
		self.child(Node::text(text))
	}

	pub fn get_attr(&self, name: &str) -> Option<&str> {
		self.attrs.iter().find(|(n, _)| &**n == name).map(|(_, v)| &**v)
	}
}

impl From<Element> for Node {
	fn from(element: Element) -> Self {
		Node::Element(element)
	}
}

impl Node {
	pub fn text(text: impl Into<Box<str>>) -> Self {
		Node::Text { text: text.into() }
	}

	/// True if any text node in the tree contains `needle`
	pub fn contains_text(&self, needle: &str) -> bool {
		match self {
			Node::Text { text } => text.contains(needle),
			Node::Element(element) => element.children.iter().any(|c| c.contains_text(needle)),
		}
	}

	/// All values of attribute `name` in the tree, in document order
	pub fn find_attr(&self, name: &str) -> Vec<&str> {
		let mut found = Vec::new();
		self.collect_attr(name, &mut found);
		found
	}

	fn collect_attr<'a>(&'a self, name: &str, found: &mut Vec<&'a str>) {
		if let Node::Element(element) = self {
			if let Some(value) = element.get_attr(name) {
				found.push(value);
			}
			for child in &element.children {
				child.collect_attr(name, found);
			}
		}
	}

	/// Elements carrying `class` among their classes
	pub fn find_by_class(&self, class: &str) -> Vec<&Element> {
		let mut found = Vec::new();
		self.collect_class(class, &mut found);
		found
	}

	fn collect_class<'a>(&'a self, class: &str, found: &mut Vec<&'a Element>) {
		if let Node::Element(element) = self {
			if element.get_attr("class").is_some_and(|c| c.split_whitespace().any(|c| c == class))
			{
				found.push(element);
			}
			for child in &element.children {
				child.collect_class(class, found);
			}
		}
	}

	pub fn to_html(&self) -> String {
		let mut out = String::new();
		self.write_html(&mut out);
		out
	}

	fn write_html(&self, out: &mut String) {
		match self {
			Node::Text { text } => out.push_str(&escape(text)),
			Node::Element(element) => {
				let _ = write!(out, "<{}", element.tag);
				for (name, value) in &element.attrs {
					let _ = write!(out, " {}=\"{}\"", name, escape(value));
				}
				out.push('>');
				if VOID_TAGS.contains(&&*element.tag) {
					return;
				}
				for child in &element.children {
					child.write_html(out);
				}
				let _ = write!(out, "</{}>", element.tag);
			}
		}
	}
}

fn escape(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			c => out.push(c),
		}
	}
	out
}


// vim: ts=4
