//! Candidate tree construction.
//!
//! [`ElementBuilder::build`] does what any tree-construction layer feeding [`reconcile`](`crate::reconcile`) has to do:
//! It assigns non-attribute properties live and registers them through [`set_element_props`].

use crate::{
	dom::{Document, Lifecycle, Node},
	props::{set_element_props, Event, EventHandler, PropValue, PropertyBag},
	style::Priority,
};
use std::rc::Rc;
use tracing::trace_span;

/// Starts building a candidate element.
#[must_use]
pub fn element(tag_name: &str) -> ElementBuilder {
	ElementBuilder::new(tag_name)
}

pub enum Child {
	Element(ElementBuilder),
	Text(String),
	Node(Node),
}
impl From<ElementBuilder> for Child {
	fn from(builder: ElementBuilder) -> Self {
		Self::Element(builder)
	}
}
impl From<&str> for Child {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}
impl From<String> for Child {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}
impl From<Node> for Child {
	fn from(node: Node) -> Self {
		Self::Node(node)
	}
}

#[must_use]
pub struct ElementBuilder {
	tag_name: String,
	attributes: Vec<(String, String)>,
	style: Vec<(String, String, Priority)>,
	props: PropertyBag,
	key: Option<String>,
	lifecycle: Option<Rc<dyn Lifecycle>>,
	children: Vec<Child>,
}
impl ElementBuilder {
	pub fn new(tag_name: &str) -> Self {
		Self {
			tag_name: tag_name.to_owned(),
			attributes: Vec::new(),
			style: Vec::new(),
			props: PropertyBag::new(),
			key: None,
			lifecycle: None,
			children: Vec::new(),
		}
	}

	pub fn attr(mut self, name: &str, value: &str) -> Self {
		self.attributes.push((name.to_owned(), value.to_owned()));
		self
	}

	pub fn style(mut self, property: &str, value: &str) -> Self {
		self.style.push((property.to_owned(), value.to_owned(), Priority::Normal));
		self
	}

	pub fn important_style(mut self, property: &str, value: &str) -> Self {
		self.style.push((property.to_owned(), value.to_owned(), Priority::Important));
		self
	}

	pub fn prop(mut self, name: &str, value: impl Into<PropValue>) -> Self {
		self.props.insert(name.to_owned(), value.into());
		self
	}

	/// Binds `handler` to the `on{event_type}` property.
	pub fn on(self, event_type: &str, handler: impl 'static + Fn(&Event)) -> Self {
		self.on_handler(event_type, EventHandler::new(handler))
	}

	pub fn on_handler(self, event_type: &str, handler: EventHandler) -> Self {
		self.prop(&format!("on{}", event_type), handler)
	}

	pub fn key(mut self, key: &str) -> Self {
		self.key = Some(key.to_owned());
		self
	}

	/// Makes the element opaque and stateful.
	pub fn stateful(mut self, lifecycle: Rc<dyn Lifecycle>) -> Self {
		self.lifecycle = Some(lifecycle);
		self
	}

	pub fn child(mut self, child: impl Into<Child>) -> Self {
		self.children.push(child.into());
		self
	}

	pub fn children<I>(mut self, children: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<Child>,
	{
		self.children.extend(children.into_iter().map(Into::into));
		self
	}

	pub fn text(self, text: &str) -> Self {
		self.child(text)
	}

	#[must_use]
	pub fn build(self, document: &Document) -> Node {
		let span = trace_span!("Building candidate element", tag = %self.tag_name, key = ?self.key);
		let _enter = span.enter();

		let node = match self.lifecycle {
			Some(lifecycle) => document.create_stateful_element(&self.tag_name, lifecycle),
			None => document.create_element(&self.tag_name),
		};

		if let Some(element) = node.as_element() {
			for (name, value) in &self.attributes {
				element.set_attribute(name, value);
			}
			for (property, value, priority) in &self.style {
				element.set_style_property(property, value, *priority);
			}
			element.set_key(self.key.as_deref());
			for (name, value) in &self.props {
				element.set_property(name, value.clone());
			}
		}
		if !self.props.is_empty() {
			set_element_props(&node, self.props);
		}

		for child in self.children {
			let child = match child {
				Child::Element(builder) => builder.build(document),
				Child::Text(text) => document.create_text_node(&text),
				Child::Node(node) => node,
			};
			node.append_child(&child);
		}
		node
	}
}
