//! A single-threaded, in-memory live node tree with browser-like mutation semantics.
//!
//! [`Node`] is a cheap reference-counted handle. Identity (not structure) is what [`PartialEq`] compares,
//! which is what reconciliation needs to preserve.
//!
//! Host operations never panic on misuse. Instead, they log an error and resolve the call in the least surprising way,
//! like appending when a reference node isn't actually a child.

use crate::{
	props::{Event, PropValue, PropertyBag},
	style::{Priority, Style, StyleDeclaration},
};
use core::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
};
use std::rc::{Rc, Weak};
use tracing::{error, trace};

/// The marker attribute a reconciliation key is read from when none was assigned through [`Element::set_key`].
pub const KEY_ATTRIBUTE: &str = "data-key";

/// Capability of opaque stateful elements, which own an internal lifecycle.
///
/// Elements created with one through [`Document::create_stateful_element`] are never patched in place.
/// The hooks are called whenever such an element, or a subtree containing it, joins or leaves a tree
/// under a root created with [`Document::create_root_element`]. Building or dismantling candidate trees doesn't call them.
pub trait Lifecycle {
	fn connected(&self, _element: &Node) {}
	fn disconnected(&self, _element: &Node) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
	Attribute,
	Style,
	CharacterData,
	ChildList,
	Property,
}

/// A single observed mutation, similar to a [***MutationRecord***](https://developer.mozilla.org/en-US/docs/Web/API/MutationRecord).
#[derive(Debug, Clone)]
pub struct MutationRecord {
	pub kind: MutationKind,
	pub target: Node,
	/// The attribute, style property or element property name, where applicable.
	pub name: Option<String>,
}

#[derive(Default)]
struct MutationLog {
	observing: Cell<bool>,
	records: RefCell<Vec<MutationRecord>>,
}

/// Node factory and owner of the mutation log shared by all nodes it creates.
#[derive(Clone, Default)]
pub struct Document {
	log: Rc<MutationLog>,
}
impl Document {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn create_element(&self, tag_name: &str) -> Node {
		self.create_node(NodeData::Element(ElementData::new(tag_name, None)), false)
	}

	/// Creates an element that counts as connected, like a document's `<body>`, along with everything attached below it.
	#[must_use]
	pub fn create_root_element(&self, tag_name: &str) -> Node {
		self.create_node(NodeData::Element(ElementData::new(tag_name, None)), true)
	}

	/// Creates an opaque stateful element. See [`Lifecycle`].
	#[must_use]
	pub fn create_stateful_element(&self, tag_name: &str, lifecycle: Rc<dyn Lifecycle>) -> Node {
		self.create_node(NodeData::Element(ElementData::new(tag_name, Some(lifecycle))), false)
	}

	#[must_use]
	pub fn create_text_node(&self, data: &str) -> Node {
		self.create_node(NodeData::Text(RefCell::new(data.to_owned())), false)
	}

	fn create_node(&self, data: NodeData, root: bool) -> Node {
		Node(Rc::new(NodeInner {
			log: self.log.clone(),
			parent: RefCell::new(Weak::new()),
			root,
			data,
		}))
	}

	/// Starts recording every mutating call on nodes of this document, whether it changes anything or not.
	pub fn start_observing(&self) {
		self.log.observing.set(true)
	}

	pub fn stop_observing(&self) {
		self.log.observing.set(false)
	}

	/// Drains the records collected so far.
	#[must_use]
	pub fn take_records(&self) -> Vec<MutationRecord> {
		self.log.records.take()
	}
}
impl Debug for Document {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Document")
			.field("observing", &self.log.observing.get())
			.field("records.len()", &self.log.records.borrow().len())
			.finish()
	}
}

struct NodeInner {
	log: Rc<MutationLog>,
	parent: RefCell<Weak<NodeInner>>,
	root: bool,
	data: NodeData,
}

enum NodeData {
	Text(RefCell<String>),
	Element(ElementData),
}

struct ElementData {
	tag_name: String,
	attributes: RefCell<Vec<(String, String)>>,
	style: RefCell<Style>,
	properties: RefCell<PropertyBag>,
	children: RefCell<Vec<Node>>,
	key: RefCell<Option<String>>,
	lifecycle: Option<Rc<dyn Lifecycle>>,
}
impl ElementData {
	fn new(tag_name: &str, lifecycle: Option<Rc<dyn Lifecycle>>) -> Self {
		Self {
			tag_name: tag_name.to_owned(),
			attributes: RefCell::default(),
			style: RefCell::default(),
			properties: RefCell::default(),
			children: RefCell::default(),
			key: RefCell::default(),
			lifecycle,
		}
	}
}

/// A handle to a live (or candidate) node.
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

/// Borrowed view of a [`Node`]'s variant.
#[derive(Debug, Clone, Copy)]
pub enum NodeKind<'a> {
	Text(Text<'a>),
	Element(Element<'a>),
}

#[derive(Clone, Copy)]
pub struct Text<'a> {
	node: &'a Node,
	data: &'a RefCell<String>,
}

#[derive(Clone, Copy)]
pub struct Element<'a> {
	node: &'a Node,
	data: &'a ElementData,
}

impl Node {
	/// Whether both handles refer to the same node.
	#[must_use]
	pub fn ptr_eq(&self, other: &Node) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	#[must_use]
	pub fn kind(&self) -> NodeKind<'_> {
		match &self.0.data {
			NodeData::Text(data) => NodeKind::Text(Text { node: self, data }),
			NodeData::Element(data) => NodeKind::Element(Element { node: self, data }),
		}
	}

	#[must_use]
	pub fn as_element(&self) -> Option<Element<'_>> {
		match self.kind() {
			NodeKind::Element(element) => Some(element),
			NodeKind::Text(_) => None,
		}
	}

	#[must_use]
	pub fn as_text(&self) -> Option<Text<'_>> {
		match self.kind() {
			NodeKind::Text(text) => Some(text),
			NodeKind::Element(_) => None,
		}
	}

	#[must_use]
	pub fn parent_node(&self) -> Option<Node> {
		self.0.parent.borrow().upgrade().map(Node)
	}

	/// A snapshot of this node's children. Always empty for text nodes.
	#[must_use]
	pub fn child_nodes(&self) -> Vec<Node> {
		match &self.0.data {
			NodeData::Element(data) => data.children.borrow().clone(),
			NodeData::Text(_) => Vec::new(),
		}
	}

	#[must_use]
	pub fn child_count(&self) -> usize {
		match &self.0.data {
			NodeData::Element(data) => data.children.borrow().len(),
			NodeData::Text(_) => 0,
		}
	}

	#[must_use]
	pub fn child_at(&self, index: usize) -> Option<Node> {
		match &self.0.data {
			NodeData::Element(data) => data.children.borrow().get(index).cloned(),
			NodeData::Text(_) => None,
		}
	}

	/// Whether `other` is this node or one of its descendants.
	#[must_use]
	pub fn contains(&self, other: &Node) -> bool {
		let mut current = Some(other.clone());
		while let Some(node) = current {
			if node.ptr_eq(self) {
				return true;
			}
			current = node.parent_node();
		}
		false
	}

	/// Whether this node is a root from [`Document::create_root_element`] or attached below one.
	#[must_use]
	pub fn is_connected(&self) -> bool {
		let mut current = self.clone();
		while let Some(parent) = current.parent_node() {
			current = parent;
		}
		current.0.root
	}

	pub fn append_child(&self, child: &Node) {
		self.insert_before(child, None)
	}

	/// Inserts `child` before `reference`, or at the end if `reference` is [`None`].
	///
	/// If `child` already has a parent, it is moved.
	pub fn insert_before(&self, child: &Node, reference: Option<&Node>) {
		let data = match self.children_host("insert a child") {
			Some(data) => data,
			None => return,
		};
		if child.contains(self) {
			return error!("Tried to insert a node into itself or one of its descendants. Ignoring.");
		}
		if reference.map_or(false, |reference| reference.ptr_eq(child)) {
			trace!("Node is already in place.");
			return;
		}

		child.detach();
		{
			let mut children = data.children.borrow_mut();
			let index = match reference {
				None => children.len(),
				Some(reference) => match children.iter().position(|c| c.ptr_eq(reference)) {
					Some(index) => index,
					None => {
						error!("Reference node is not a child of the parent node. Appending instead.");
						children.len()
					}
				},
			};
			children.insert(index, child.clone());
		}
		*child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
		self.record(MutationKind::ChildList, None);
		if self.is_connected() {
			child.notify_lifecycle(|lifecycle, node| lifecycle.connected(node));
		}
	}

	/// Replaces `old_child` with `new_child` in place.
	pub fn replace_child(&self, new_child: &Node, old_child: &Node) {
		let data = match self.children_host("replace a child") {
			Some(data) => data,
			None => return,
		};
		if new_child.ptr_eq(old_child) {
			return;
		}
		if !old_child.parent_node().map_or(false, |parent| parent.ptr_eq(self)) {
			error!("Tried to replace a node that isn't a child of the parent node. Appending instead.");
			return self.append_child(new_child);
		}
		if new_child.contains(self) {
			return error!("Tried to insert a node into itself or one of its descendants. Ignoring.");
		}

		new_child.detach();
		{
			let mut children = data.children.borrow_mut();
			match children.iter().position(|c| c.ptr_eq(old_child)) {
				Some(index) => children[index] = new_child.clone(),
				None => {
					error!("Parent link and child list disagree. Appending instead.");
					children.push(new_child.clone());
				}
			}
		}
		*old_child.0.parent.borrow_mut() = Weak::new();
		*new_child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
		self.record(MutationKind::ChildList, None);
		if self.is_connected() {
			old_child.notify_lifecycle(|lifecycle, node| lifecycle.disconnected(node));
			new_child.notify_lifecycle(|lifecycle, node| lifecycle.connected(node));
		}
	}

	/// Removes `child` from this node. Returns whether it actually was a child.
	pub fn remove_child(&self, child: &Node) -> bool {
		if child.parent_node().map_or(false, |parent| parent.ptr_eq(self)) {
			child.detach()
		} else {
			error!("Tried to remove a node that isn't a child of the parent node. Ignoring.");
			false
		}
	}

	/// Detaches this node from its parent, if it has one.
	pub fn remove(&self) {
		self.detach();
	}

	fn detach(&self) -> bool {
		let parent = match self.0.parent.replace(Weak::new()).upgrade() {
			Some(parent) => Node(parent),
			None => return false,
		};
		if let NodeData::Element(data) = &parent.0.data {
			data.children.borrow_mut().retain(|c| !c.ptr_eq(self));
		}
		parent.record(MutationKind::ChildList, None);
		if parent.is_connected() {
			self.notify_lifecycle(|lifecycle, node| lifecycle.disconnected(node));
		}
		true
	}

	fn children_host(&self, action: &str) -> Option<&ElementData> {
		match &self.0.data {
			NodeData::Element(data) => Some(data),
			NodeData::Text(_) => {
				error!("Tried to {} on a text node. Ignoring.", action);
				None
			}
		}
	}

	/// Calls `hook` for each stateful element in this subtree, in tree order.
	fn notify_lifecycle(&self, hook: fn(&dyn Lifecycle, &Node)) {
		let mut stateful = Vec::new();
		let mut stack = vec![self.clone()];
		while let Some(node) = stack.pop() {
			if let NodeData::Element(data) = &node.0.data {
				if let Some(lifecycle) = &data.lifecycle {
					stateful.push((node.clone(), lifecycle.clone()));
				}
				stack.extend(data.children.borrow().iter().rev().cloned());
			}
		}

		// Hooks may mutate the tree, so no borrows are held here.
		for (node, lifecycle) in stateful {
			hook(&*lifecycle, &node);
		}
	}

	fn record(&self, kind: MutationKind, name: Option<&str>) {
		let log = &self.0.log;
		if log.observing.get() {
			log.records.borrow_mut().push(MutationRecord {
				kind,
				target: self.clone(),
				name: name.map(ToOwned::to_owned),
			});
		}
	}

	/// Address of the node allocation, stable for as long as any handle (strong or weak) exists.
	pub(crate) fn addr(&self) -> usize {
		Rc::as_ptr(&self.0) as usize
	}

	pub(crate) fn downgrade(&self) -> WeakNode {
		WeakNode(Rc::downgrade(&self.0))
	}
}
impl PartialEq for Node {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}
impl Eq for Node {}
impl Debug for Node {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self.kind() {
			NodeKind::Text(text) => text.fmt(f),
			NodeKind::Element(element) => element.fmt(f),
		}
	}
}

/// A non-owning [`Node`] handle.
#[derive(Clone)]
pub(crate) struct WeakNode(Weak<NodeInner>);
impl WeakNode {
	pub(crate) fn is(&self, node: &Node) -> bool {
		Weak::as_ptr(&self.0) == Rc::as_ptr(&node.0)
	}

	pub(crate) fn is_alive(&self) -> bool {
		self.0.strong_count() > 0
	}
}

impl<'a> Text<'a> {
	#[must_use]
	pub fn node(self) -> &'a Node {
		self.node
	}

	#[must_use]
	pub fn data(self) -> String {
		self.data.borrow().clone()
	}

	pub fn set_data(self, data: &str) {
		self.data.replace(data.to_owned());
		self.node.record(MutationKind::CharacterData, None);
	}
}
impl Debug for Text<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		if cfg!(feature = "dangerous-logging") {
			f.debug_tuple("Text").field(&*self.data.borrow()).finish()
		} else {
			f.debug_struct("Text").field("len", &self.data.borrow().len()).finish()
		}
	}
}

impl<'a> Element<'a> {
	#[must_use]
	pub fn node(self) -> &'a Node {
		self.node
	}

	#[must_use]
	pub fn tag_name(self) -> &'a str {
		&self.data.tag_name
	}

	/// Whether this element is opaque and stateful. See [`Lifecycle`].
	#[must_use]
	pub fn is_stateful(self) -> bool {
		self.data.lifecycle.is_some()
	}

	#[must_use]
	pub fn lifecycle(self) -> Option<&'a Rc<dyn Lifecycle>> {
		self.data.lifecycle.as_ref()
	}

	/// The reconciliation key: The assigned one if present, otherwise the value of the [`KEY_ATTRIBUTE`].
	#[must_use]
	pub fn key(self) -> Option<String> {
		self.data.key.borrow().clone().or_else(|| self.get_attribute(KEY_ATTRIBUTE))
	}

	/// The key assigned through [`Element::set_key`], ignoring the [`KEY_ATTRIBUTE`].
	#[must_use]
	pub fn assigned_key(self) -> Option<String> {
		self.data.key.borrow().clone()
	}

	pub fn set_key(self, key: Option<&str>) {
		self.data.key.replace(key.map(ToOwned::to_owned));
	}

	/// Reads an attribute. `"style"` is serialized from the inline style.
	#[must_use]
	pub fn get_attribute(self, name: &str) -> Option<String> {
		if name == "style" {
			let style = self.data.style.borrow();
			return if style.is_empty() { None } else { Some(style.css_text()) };
		}
		self.data.attributes.borrow().iter().find(|(n, _)| n == name).map(|(_, value)| value.clone())
	}

	#[must_use]
	pub fn has_attribute(self, name: &str) -> bool {
		self.get_attribute(name).is_some()
	}

	/// Names of all attributes except `"style"`, in insertion order.
	#[must_use]
	pub fn attribute_names(self) -> Vec<String> {
		self.data.attributes.borrow().iter().map(|(name, _)| name.clone()).collect()
	}

	/// All attributes except `"style"`, in insertion order.
	#[must_use]
	pub fn attributes(self) -> Vec<(String, String)> {
		self.data.attributes.borrow().clone()
	}

	/// Sets an attribute. `"style"` replaces the inline style with the parsed declarations instead.
	pub fn set_attribute(self, name: &str, value: &str) {
		if name == "style" {
			self.data.style.replace(Style::parse(value));
			return self.node.record(MutationKind::Attribute, Some(name));
		}

		{
			let mut attributes = self.data.attributes.borrow_mut();
			match attributes.iter_mut().find(|(n, _)| n == name) {
				Some((_, v)) => value.clone_into(v),
				None => attributes.push((name.to_owned(), value.to_owned())),
			}
		}
		self.node.record(MutationKind::Attribute, Some(name))
	}

	/// Removes an attribute. Returns whether it was present.
	pub fn remove_attribute(self, name: &str) -> bool {
		let removed = if name == "style" {
			!self.data.style.replace(Style::new()).is_empty()
		} else {
			let mut attributes = self.data.attributes.borrow_mut();
			let before = attributes.len();
			attributes.retain(|(n, _)| n != name);
			attributes.len() != before
		};
		if removed {
			self.node.record(MutationKind::Attribute, Some(name));
		}
		removed
	}

	/// A copy of the inline style.
	#[must_use]
	pub fn style(self) -> Style {
		self.data.style.borrow().clone()
	}

	#[must_use]
	pub fn style_declarations(self) -> Vec<StyleDeclaration> {
		self.data.style.borrow().iter().cloned().collect()
	}

	#[must_use]
	pub fn get_style_property(self, property: &str) -> Option<String> {
		self.data.style.borrow().get(property).map(|declaration| declaration.value.clone())
	}

	#[must_use]
	pub fn get_style_priority(self, property: &str) -> Priority {
		self.data.style.borrow().get(property).map_or(Priority::Normal, |declaration| declaration.priority)
	}

	pub fn set_style_property(self, property: &str, value: &str, priority: Priority) {
		if self.data.style.borrow_mut().set(property, value, priority) {
			self.node.record(MutationKind::Style, Some(property))
		}
	}

	pub fn remove_style_property(self, property: &str) -> bool {
		let removed = self.data.style.borrow_mut().remove(property).is_some();
		if removed {
			self.node.record(MutationKind::Style, Some(property));
		}
		removed
	}

	/// Reads a live property. Missing properties read as [`PropValue::Null`].
	#[must_use]
	pub fn property(self, name: &str) -> PropValue {
		self.data.properties.borrow().get(name).cloned().unwrap_or_default()
	}

	/// Assigns a live property. Assigning [`PropValue::Null`] clears it.
	pub fn set_property(self, name: &str, value: PropValue) {
		{
			let mut properties = self.data.properties.borrow_mut();
			if value.is_null() {
				properties.remove(name);
			} else {
				properties.insert(name.to_owned(), value);
			}
		}
		self.node.record(MutationKind::Property, Some(name))
	}

	/// A copy of all live properties.
	#[must_use]
	pub fn properties(self) -> PropertyBag {
		self.data.properties.borrow().clone()
	}

	/// Invokes the handler stored in the `on{event_type}` property, if there is one.
	///
	/// Returns whether a handler was called.
	pub fn dispatch_event(self, event_type: &str) -> bool {
		let handler = match self.property(&format!("on{}", event_type)) {
			PropValue::Handler(handler) => handler,
			_ => return false,
		};
		trace!(event_type, "Dispatching event.");
		handler.call(&Event::new(event_type, self.node.clone()));
		true
	}
}
impl Debug for Element<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let mut debug = f.debug_struct("Element");
		debug
			.field("tag_name", &self.data.tag_name)
			.field("key", &self.key())
			.field("stateful", &self.is_stateful())
			.field("children", &self.data.children.borrow().len());
		if cfg!(feature = "dangerous-logging") {
			debug.field("attributes", &*self.data.attributes.borrow());
		}
		debug.finish()
	}
}
