//! Non-attribute element properties and the side-table of previously applied property bags.
//!
//! The tree-construction layer registers each candidate element's property bag through [`set_element_props`]
//! before handing the candidate to [`reconcile`](`crate::reconcile`).
//! The property patcher diffs against these entries and moves the incoming bag over to the live element afterwards.
//!
//! Entries don't keep their element alive. Once an element is dropped, its entry is pruned after the next reconciliation pass.

use crate::dom::{Node, WeakNode};
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
	ptr,
};
use hashbrown::HashMap;
use std::rc::Rc;
use tracing::{trace, warn};

/// A non-attribute property bag, like `{ onclick: …, value: "…" }`.
pub type PropertyBag = HashMap<String, PropValue>;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropValue {
	#[default]
	Null,
	Bool(bool),
	Number(f64),
	String(String),
	Handler(EventHandler),
}
impl PropValue {
	#[must_use]
	pub fn is_null(&self) -> bool {
		matches!(self, PropValue::Null)
	}

	#[must_use]
	pub fn as_handler(&self) -> Option<&EventHandler> {
		match self {
			PropValue::Handler(handler) => Some(handler),
			_ => None,
		}
	}
}
impl From<bool> for PropValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<f64> for PropValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}
impl From<&str> for PropValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}
impl From<String> for PropValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}
impl From<EventHandler> for PropValue {
	fn from(value: EventHandler) -> Self {
		Self::Handler(value)
	}
}

/// An event as passed to [`EventHandler`]s by [`Element::dispatch_event`](`crate::dom::Element::dispatch_event`).
#[derive(Debug, Clone)]
pub struct Event {
	event_type: String,
	target: Node,
}
impl Event {
	#[must_use]
	pub fn new(event_type: &str, target: Node) -> Self {
		Self {
			event_type: event_type.to_owned(),
			target,
		}
	}

	#[must_use]
	pub fn event_type(&self) -> &str {
		&self.event_type
	}

	#[must_use]
	pub fn target(&self) -> &Node {
		&self.target
	}
}

/// A shared event handler closure.
///
/// Two handlers are equal only if they share the same closure allocation.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);
impl EventHandler {
	pub fn new(handler: impl 'static + Fn(&Event)) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: &Event) {
		(self.0)(event)
	}
}
impl PartialEq for EventHandler {
	fn eq(&self, other: &Self) -> bool {
		ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
	}
}
impl Debug for EventHandler {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("EventHandler").field(&Rc::as_ptr(&self.0).cast::<()>()).finish()
	}
}

/// Whether `name` is shaped like an event handler property (`onclick`, `oninput`, …).
#[must_use]
pub fn is_event_handler_name(name: &str) -> bool {
	name.starts_with("on")
}

#[derive(Default)]
struct PropertyTable(HashMap<usize, (WeakNode, PropertyBag)>);
impl PropertyTable {
	fn get(&self, element: &Node) -> Option<&PropertyBag> {
		match self.0.get(&element.addr()) {
			Some((weak, props)) if weak.is(element) => Some(props),
			_ => None,
		}
	}

	fn drain_dead(&mut self) -> usize {
		let before = self.0.len();
		self.0.retain(|_, (weak, _)| weak.is_alive());
		before - self.0.len()
	}
}

thread_local! {
	static PROPERTY_TABLE: RefCell<PropertyTable> = RefCell::default();
}

/// Registers `props` as the property bag last applied to `element`, replacing any previous entry.
///
/// Text nodes can't carry properties, so registrations for them are ignored with a warning.
pub fn set_element_props(element: &Node, props: PropertyBag) {
	if element.as_element().is_none() {
		return warn!("Tried to register properties for a text node. Ignoring.");
	}

	trace!(count = props.len(), "Registering element properties.");
	PROPERTY_TABLE.with(|table| {
		table.borrow_mut().0.insert(element.addr(), (element.downgrade(), props));
	});
}

/// Retrieves a copy of the property bag registered for `element`, if any.
#[must_use]
pub fn element_props(element: &Node) -> Option<PropertyBag> {
	PROPERTY_TABLE.with(|table| table.borrow().get(element).cloned())
}

/// Drops the entry for `element`, if any. Returns whether there was one.
pub fn clear_element_props(element: &Node) -> bool {
	PROPERTY_TABLE.with(|table| {
		let mut table = table.borrow_mut();
		let addr = element.addr();
		let registered = table.0.get(&addr).map_or(false, |(weak, _)| weak.is(element));
		registered && table.0.remove(&addr).is_some()
	})
}

/// Counts the side-table entries whose elements are still alive on this thread.
#[must_use]
pub fn tracked_element_count() -> usize {
	PROPERTY_TABLE.with(|table| {
		let mut table = table.borrow_mut();
		table.drain_dead();
		table.0.len()
	})
}

/// Frees entries of elements that were dropped. Returns how many were freed.
pub(crate) fn drain_dead() -> usize {
	PROPERTY_TABLE.with(|table| table.borrow_mut().drain_dead())
}
