//! Self-contained patchers that bring one live element's attributes, inline style and properties in line with a candidate's.
//!
//! Each of them is idempotent: A second run against the same candidate doesn't set anything it didn't set the first time
//! (apart from event handlers, which are always reassigned).

use crate::{
	dom::Element,
	props::{self, is_event_handler_name, PropValue},
};
use hashbrown::HashSet;
use tracing::{instrument, trace};

/// Property name prefixes that belong to attribute or style patching.
const NON_PROPERTY_PREFIXES: [&str; 3] = ["style", "data-", "aria-"];

/// `input` types that are neither single-line text inputs nor checkable. A missing or unknown `type` means `text`.
const NON_TEXT_INPUT_TYPES: [&str; 13] = [
	"button",
	"color",
	"date",
	"datetime-local",
	"file",
	"hidden",
	"image",
	"month",
	"range",
	"reset",
	"submit",
	"time",
	"week",
];

#[instrument(skip_all, fields(tag = existing.tag_name()))]
pub(crate) fn patch_attributes(existing: Element<'_>, incoming: Element<'_>) {
	let existing_names = existing.attribute_names();
	let mut stale: HashSet<&str> = existing_names.iter().map(String::as_str).collect();

	for (name, value) in incoming.attributes() {
		stale.remove(name.as_str());
		if existing.get_attribute(&name).as_deref() != Some(value.as_str()) {
			if cfg!(feature = "dangerous-logging") {
				trace!(name = %name, value = %value, "Setting attribute.");
			} else {
				trace!(name = %name, "Setting attribute.");
			}
			existing.set_attribute(&name, &value);
		}
	}

	for name in existing_names.iter().filter(|name| stale.contains(name.as_str())) {
		trace!(name = %name, "Removing attribute.");
		existing.remove_attribute(name);
	}
}

/// Takes over the candidate's assigned key, so that the live element stays matchable by the key it was matched with
/// even if that key came from the other source (assigned vs. [`KEY_ATTRIBUTE`](`crate::dom::KEY_ATTRIBUTE`)).
pub(crate) fn patch_key(existing: Element<'_>, incoming: Element<'_>) {
	let key = incoming.assigned_key();
	if existing.assigned_key() != key {
		trace!(key = ?key, "Assigning key.");
		existing.set_key(key.as_deref());
	}
}

#[instrument(skip_all, fields(tag = existing.tag_name()))]
pub(crate) fn patch_style(existing: Element<'_>, incoming: Element<'_>) {
	let existing_style = existing.style();
	let mut stale: HashSet<&str> = existing_style.iter().map(|declaration| declaration.property.as_str()).collect();

	for declaration in incoming.style().iter() {
		stale.remove(declaration.property.as_str());
		let current = existing_style.get(&declaration.property);
		if current.map_or(true, |current| current.value != declaration.value || current.priority != declaration.priority) {
			trace!(property = %declaration.property, priority = declaration.priority.as_str(), "Setting style property.");
			existing.set_style_property(&declaration.property, &declaration.value, declaration.priority);
		}
	}

	for declaration in existing_style.iter().filter(|declaration| stale.contains(declaration.property.as_str())) {
		trace!(property = %declaration.property, "Removing style property.");
		existing.remove_style_property(&declaration.property);
	}
}

/// Diffs the side-table entries of both elements onto `existing`'s live properties,
/// then moves the incoming entry over to `existing`.
#[instrument(skip_all, fields(tag = existing.tag_name()))]
pub(crate) fn patch_properties(existing: Element<'_>, incoming: Element<'_>) {
	let previous = props::element_props(existing.node()).unwrap_or_default();
	let next = props::element_props(incoming.node()).unwrap_or_default();

	let mut stale_handlers: Vec<&String> = previous.keys().filter(|name| is_event_handler_name(name) && !next.contains_key(*name)).collect();
	stale_handlers.sort();
	for name in stale_handlers {
		trace!(name = %name, "Clearing stale event handler.");
		existing.set_property(name, PropValue::Null);
	}

	let mut names: Vec<&String> = next.keys().collect();
	names.sort();
	for name in names {
		let value = &next[name];
		if is_event_handler_name(name) {
			trace!(name = %name, "Assigning event handler.");
			existing.set_property(name, value.clone());
		} else if NON_PROPERTY_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
			trace!(name = %name, "Skipping attribute-like property.");
		} else if existing.property(name) != *value {
			trace!(name = %name, "Assigning property.");
			existing.set_property(name, value.clone());
		}
	}

	if let Some(live_names) = form_control_properties(existing) {
		patch_form_control(existing, incoming, live_names);
	}

	props::set_element_props(existing.node(), next);
}

/// Syncs live form state as properties, never as attributes.
///
/// Unchanged values are left alone so the cursor position and selection range survive.
fn patch_form_control(existing: Element<'_>, incoming: Element<'_>, live_names: [&str; 2]) {
	for name in live_names {
		let wanted = incoming.property(name);
		if !wanted.is_null() && existing.property(name) != wanted {
			trace!(name, "Syncing live form control property.");
			existing.set_property(name, wanted);
		}
	}
}

/// The live properties user interaction can desynchronize, for single-line text inputs, text areas, selects and checkable inputs.
///
/// Other `input` types (`file`, `button`, `range`, …) only take part in the regular property pass.
fn form_control_properties(element: Element<'_>) -> Option<[&'static str; 2]> {
	let tag_name = element.tag_name();
	if tag_name.eq_ignore_ascii_case("textarea") || tag_name.eq_ignore_ascii_case("select") {
		return Some(["value", "disabled"]);
	}
	if !tag_name.eq_ignore_ascii_case("input") {
		return None;
	}

	let input_type = element.get_attribute("type").unwrap_or_default().trim().to_ascii_lowercase();
	match input_type.as_str() {
		"checkbox" | "radio" => Some(["checked", "disabled"]),
		input_type if NON_TEXT_INPUT_TYPES.contains(&input_type) => None,
		_ => Some(["value", "disabled"]),
	}
}
