//! The reconciliation engine: Mutates a live tree in place so that it matches a disposable candidate tree.
//!
//! Node identity is preserved wherever a live node can be patched safely,
//! so that focus, scroll offsets and any state attached to those nodes survive the update.
//!
//! # Strategy
//!
//! Each live/candidate node pair is either patched in place or replaced wholesale, never anything in between:
//!
//! 1. Identical handles are left alone.
//! 2. Text nodes always keep their identity and only have their data updated if it differs.
//! 3. Elements with equal tag names have their attributes, inline style and properties patched, then their children reconciled.
//! 4. Stateful elements (see [`Lifecycle`](`crate::dom::Lifecycle`)) are always replaced, even if the tag names match.
//! 5. Anything else is replaced.
//!
//! Child lists are matched by position, unless any child on either side carries a key.
//! In that case, keyed children are matched by key and unkeyed children in order among themselves,
//! after which the live children are moved into candidate order in a single left-to-right pass.
//! That pass is simple rather than minimal: A full reorder costs one move per out-of-place child.

use crate::{
	dom::{Node, NodeKind},
	patch, props,
};
use core::fmt::{self, Display, Formatter};
use hashbrown::{hash_map::Entry, HashMap, HashSet};
use std::error::Error;
use tracing::{error, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};

/// The candidate content to reconcile a live parent's children against.
#[derive(Debug, Clone)]
pub enum Content {
	/// A single node.
	Node(Node),
	/// Zero or more sibling nodes without a wrapping container.
	Fragment(Vec<Node>),
}
impl Content {
	#[must_use]
	pub fn into_nodes(self) -> Vec<Node> {
		match self {
			Content::Node(node) => vec![node],
			Content::Fragment(nodes) => nodes,
		}
	}
}
impl From<Node> for Content {
	fn from(node: Node) -> Self {
		Self::Node(node)
	}
}
impl From<&Node> for Content {
	fn from(node: &Node) -> Self {
		Self::Node(node.clone())
	}
}
impl From<Vec<Node>> for Content {
	fn from(nodes: Vec<Node>) -> Self {
		Self::Fragment(nodes)
	}
}
impl From<&[Node]> for Content {
	fn from(nodes: &[Node]) -> Self {
		Self::Fragment(nodes.to_vec())
	}
}

/// Returned by [`reconcile_with_depth_limit`] if the candidate tree nests more deeply than allowed.
///
/// Changes up to that point have been applied and are not rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthLimitReached {
	pub depth_limit: usize,
}
impl Display for DepthLimitReached {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "Depth limit of {} nested child lists reached during reconciliation", self.depth_limit)
	}
}
impl Error for DepthLimitReached {}

/// Mutates `existing_parent`'s children in place to match `new_content`.
///
/// Candidate nodes that are inserted rather than patched become part of the live tree.
/// Everything else from the candidate should be considered consumed afterwards.
///
/// The property bags of candidate elements must have been registered through [`set_element_props`](`crate::set_element_props`) beforehand.
pub fn reconcile(existing_parent: &Node, new_content: impl Into<Content>) {
	if let Err(error) = reconcile_with_depth_limit(existing_parent, new_content, usize::MAX) {
		error!("{}", error);
	}
}

/// Like [`reconcile`], but stops descending once `depth_limit` nested child lists (including the root one) were entered.
///
/// Element pairs that have no children on either side don't count towards the limit.
///
/// # Errors
///
/// Iff the limit was reached. The live tree is left in whatever state it was in at that point.
#[instrument(skip(existing_parent, new_content))]
pub fn reconcile_with_depth_limit(existing_parent: &Node, new_content: impl Into<Content>, depth_limit: usize) -> Result<(), DepthLimitReached> {
	let incoming = new_content.into().into_nodes();
	let result = Reconciliation { depth_limit }.reconcile_children(existing_parent, &incoming, depth_limit);
	drop(incoming);

	let freed = props::drain_dead();
	trace!("Freed {} property side-table entr(y/ies).", freed);
	result
}

struct Reconciliation {
	depth_limit: usize,
}
impl Reconciliation {
	/// Reconciles `parent`'s current children against `incoming`.
	#[instrument(skip(self, parent, incoming), fields(incoming.len = incoming.len()))]
	fn reconcile_children(&self, parent: &Node, incoming: &[Node], depth_limit: usize) -> Result<(), DepthLimitReached> {
		if depth_limit == 0 {
			error!("Depth limit reached");
			return Err(DepthLimitReached { depth_limit: self.depth_limit });
		}

		let existing = parent.child_nodes();
		if existing.iter().chain(incoming).any(|node| key_of(node).is_some()) {
			self.reconcile_keyed(parent, existing, incoming, depth_limit)
		} else {
			self.reconcile_positional(parent, &existing, incoming, depth_limit)
		}
	}

	fn reconcile_positional(&self, parent: &Node, existing: &[Node], incoming: &[Node], depth_limit: usize) -> Result<(), DepthLimitReached> {
		let span = trace_span!("Reconciling positionally", existing.len = existing.len(), incoming.len = incoming.len());
		let _enter = span.enter();

		for i in 0..existing.len().max(incoming.len()) {
			match (existing.get(i), incoming.get(i)) {
				(Some(existing), Some(incoming)) => {
					self.patch_node(parent, existing, incoming, depth_limit)?;
				}
				(None, Some(incoming)) => {
					trace!(i, "Appending.");
					parent.append_child(incoming);
				}
				(Some(existing), None) => {
					trace!(i, "Removing.");
					parent.remove_child(existing);
				}
				(None, None) => (),
			}
		}
		Ok(())
	}

	#[allow(clippy::needless_pass_by_value)]
	fn reconcile_keyed(&self, parent: &Node, existing: Vec<Node>, incoming: &[Node], depth_limit: usize) -> Result<(), DepthLimitReached> {
		let span = trace_span!("Reconciling keyed", existing.len = existing.len(), incoming.len = incoming.len());
		let _enter = span.enter();

		let mut keyed = HashMap::<String, &Node>::new();
		let mut unkeyed = Vec::new();
		for node in &existing {
			match key_of(node) {
				Some(key) => match keyed.entry(key) {
					Entry::Vacant(vacant) => {
						vacant.insert(node);
					}
					Entry::Occupied(occupied) => {
						warn!(key = %occupied.key(), "Duplicate key among live children. Only the first one can be matched.");
					}
				},
				None => unkeyed.push(node),
			}
		}

		if STATIC_MAX_LEVEL >= Level::WARN {
			let mut seen = HashSet::new();
			for key in incoming.iter().filter_map(key_of) {
				if !seen.insert(key.clone()) {
					warn!(key = %key, "Duplicate key among candidate children. Later occurrences are inserted as new nodes.");
				}
			}
		}

		let mut unkeyed = unkeyed.into_iter();
		let mut matched = HashSet::<usize>::new();
		let mut pairs = Vec::with_capacity(incoming.len());
		for incoming in incoming {
			let existing = match key_of(incoming) {
				Some(key) => keyed.remove(&key),
				None => unkeyed.next(),
			};
			if let Some(existing) = existing {
				matched.insert(existing.addr());
			}
			pairs.push((existing, incoming));
		}

		// Unmatched live children go first, so that patching doesn't have to dodge them.
		for node in existing.iter().filter(|node| !matched.contains(&node.addr())) {
			trace!(key = ?key_of(node), "Removing unmatched.");
			parent.remove_child(node);
		}

		let mut result = Vec::with_capacity(pairs.len());
		for (existing, incoming) in pairs {
			result.push(match existing {
				Some(existing) => self.patch_node(parent, existing, incoming, depth_limit)?,
				None => {
					trace!(key = ?key_of(incoming), "No match. Inserting candidate.");
					incoming.clone()
				}
			});
		}

		for (i, expected) in result.iter().enumerate() {
			let current = parent.child_at(i);
			if current.as_ref().map_or(true, |current| !current.ptr_eq(expected)) {
				trace!(i, key = ?key_of(expected), "Moving into place.");
				parent.insert_before(expected, current.as_ref());
			}
		}
		Ok(())
	}

	/// Reconciles one live/candidate pair and returns the node that ends up in the live tree.
	fn patch_node(&self, parent: &Node, existing: &Node, incoming: &Node, depth_limit: usize) -> Result<Node, DepthLimitReached> {
		if existing.ptr_eq(incoming) {
			trace!("Identical node.");
			return Ok(existing.clone());
		}

		match (existing.kind(), incoming.kind()) {
			(NodeKind::Text(existing_text), NodeKind::Text(incoming_text)) => {
				let span = trace_span!("Patching text");
				let _enter = span.enter();
				let data = incoming_text.data();
				if existing_text.data() != data {
					if cfg!(feature = "dangerous-logging") {
						trace!(old = %existing_text.data(), new = %data, "Updating text.");
					} else {
						trace!("Updating text.");
					}
					existing_text.set_data(&data);
				}
				Ok(existing.clone())
			}

			(NodeKind::Element(existing_element), NodeKind::Element(incoming_element))
				if !existing_element.is_stateful() && existing_element.tag_name() == incoming_element.tag_name() =>
			{
				let span = trace_span!("Patching element", tag = existing_element.tag_name());
				let _enter = span.enter();

				patch::patch_attributes(existing_element, incoming_element);
				patch::patch_style(existing_element, incoming_element);
				patch::patch_properties(existing_element, incoming_element);
				patch::patch_key(existing_element, incoming_element);

				let incoming_children = incoming.child_nodes();
				if existing.child_count() > 0 || !incoming_children.is_empty() {
					self.reconcile_children(existing, &incoming_children, depth_limit - 1)?;
				}
				Ok(existing.clone())
			}

			(existing_kind, incoming_kind) => {
				let span = trace_span!("Replacing");
				let _enter = span.enter();

				if let (NodeKind::Element(existing_element), NodeKind::Element(incoming_element)) = (existing_kind, incoming_kind) {
					if existing_element.is_stateful() {
						trace!(tag = existing_element.tag_name(), "Replacing stateful element.");
					} else if STATIC_MAX_LEVEL >= Level::WARN && existing_element.tag_name().eq_ignore_ascii_case(incoming_element.tag_name()) {
						warn!(
							"Replacing element due to different tag name casing: {:?} -> {:?}",
							existing_element.tag_name(),
							incoming_element.tag_name()
						);
					}
				}

				parent.replace_child(incoming, existing);
				Ok(incoming.clone())
			}
		}
	}
}

fn key_of(node: &Node) -> Option<String> {
	match node.kind() {
		NodeKind::Element(element) => element.key(),
		NodeKind::Text(_) => None,
	}
}
