//! HTML serialization of live subtrees, mainly for diagnostics and assertions.

use crate::dom::{Node, NodeKind};
use core::fmt::Write as _;

/// Elements that never have an end tag.
const VOID_ELEMENTS: [&str; 14] = ["area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr"];

impl Node {
	/// Serializes this node including itself.
	#[must_use]
	pub fn outer_html(&self) -> String {
		let mut html = String::new();
		write_node(&mut html, self);
		html
	}

	/// Serializes this node's children.
	#[must_use]
	pub fn inner_html(&self) -> String {
		let mut html = String::new();
		for child in self.child_nodes() {
			write_node(&mut html, &child);
		}
		html
	}
}

fn write_node(html: &mut String, node: &Node) {
	match node.kind() {
		NodeKind::Text(text) => escape_into(html, &text.data(), false),
		NodeKind::Element(element) => {
			let tag_name = element.tag_name();
			html.push('<');
			html.push_str(tag_name);
			for (name, value) in element.attributes() {
				write_attribute(html, &name, &value);
			}
			if let Some(style) = element.get_attribute("style") {
				write_attribute(html, "style", &style);
			}
			html.push('>');

			if VOID_ELEMENTS.iter().any(|void| tag_name.eq_ignore_ascii_case(void)) {
				return;
			}
			for child in node.child_nodes() {
				write_node(html, &child);
			}
			// Infallible for `String`.
			let _ = write!(html, "</{}>", tag_name);
		}
	}
}

fn write_attribute(html: &mut String, name: &str, value: &str) {
	html.push(' ');
	html.push_str(name);
	html.push_str("=\"");
	escape_into(html, value, true);
	html.push('"');
}

fn escape_into(html: &mut String, text: &str, in_attribute: bool) {
	for c in text.chars() {
		match c {
			'&' => html.push_str("&amp;"),
			'<' if !in_attribute => html.push_str("&lt;"),
			'>' if !in_attribute => html.push_str("&gt;"),
			'"' if in_attribute => html.push_str("&quot;"),
			'\u{A0}' => html.push_str("&nbsp;"),
			c => html.push(c),
		}
	}
}
