//! Inline style declarations, as found in an element's [***style***](https://developer.mozilla.org/en-US/docs/Web/API/HTMLElement/style) property.

use core::fmt::{self, Display, Formatter};

/// Priority of a single style declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
	#[default]
	Normal,
	/// `!important`
	Important,
}
impl Priority {
	/// The priority as returned by [***getPropertyPriority***](https://developer.mozilla.org/en-US/docs/Web/API/CSSStyleDeclaration/getPropertyPriority).
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Priority::Normal => "",
			Priority::Important => "important",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDeclaration {
	pub property: String,
	pub value: String,
	pub priority: Priority,
}

/// An ordered list of inline style declarations.
///
/// Each property appears at most once. Setting a property that is already present updates it where it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style(Vec<StyleDeclaration>);
impl Style {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a `cssText` value like `"color: red; margin: 0 !important"`.
	///
	/// Declarations without a `:` or with an empty property name or value are skipped.
	/// Semicolons inside quoted strings or parentheses (like in `url("data:…;base64,…")`) don't end a declaration.
	#[must_use]
	pub fn parse(css_text: &str) -> Self {
		let mut style = Self::new();
		for declaration in split_declarations(css_text) {
			let (property, value) = match declaration.split_once(':') {
				Some((property, value)) => (property.trim(), value.trim()),
				None => continue,
			};
			let (value, priority) = split_priority(value);
			if !property.is_empty() && !value.is_empty() {
				style.set(property, value, priority);
			}
		}
		style
	}

	#[must_use]
	pub fn css_text(&self) -> String {
		self.to_string()
	}

	#[must_use]
	pub fn get(&self, property: &str) -> Option<&StyleDeclaration> {
		self.0.iter().find(|declaration| declaration.property == property)
	}

	/// Sets or updates `property`. An empty `value` removes it instead, matching the CSSOM.
	///
	/// Returns whether the declaration list was touched at all.
	pub fn set(&mut self, property: &str, value: &str, priority: Priority) -> bool {
		if value.is_empty() {
			return self.remove(property).is_some();
		}

		match self.0.iter_mut().find(|declaration| declaration.property == property) {
			Some(declaration) => {
				declaration.value = value.to_owned();
				declaration.priority = priority;
			}
			None => self.0.push(StyleDeclaration {
				property: property.to_owned(),
				value: value.to_owned(),
				priority,
			}),
		}
		true
	}

	pub fn remove(&mut self, property: &str) -> Option<StyleDeclaration> {
		let index = self.0.iter().position(|declaration| declaration.property == property)?;
		Some(self.0.remove(index))
	}

	pub fn iter(&self) -> impl '_ + ExactSizeIterator<Item = &StyleDeclaration> {
		self.0.iter()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl Display for Style {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		for (i, StyleDeclaration { property, value, priority }) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(" ")?;
			}
			match priority {
				Priority::Normal => write!(f, "{}: {};", property, value)?,
				Priority::Important => write!(f, "{}: {} !important;", property, value)?,
			}
		}
		Ok(())
	}
}

fn split_declarations(css_text: &str) -> Vec<&str> {
	let mut declarations = Vec::new();
	let mut start = 0;
	let mut quote = None;
	let mut depth = 0_usize;
	let mut escaped = false;
	for (i, c) in css_text.char_indices() {
		if escaped {
			escaped = false;
			continue;
		}
		match (quote, c) {
			(_, '\\') => escaped = true,
			(Some(open), c) if c == open => quote = None,
			(Some(_), _) => (),
			(None, '"' | '\'') => quote = Some(c),
			(None, '(') => depth += 1,
			(None, ')') => depth = depth.saturating_sub(1),
			(None, ';') if depth == 0 => {
				declarations.push(&css_text[start..i]);
				start = i + 1;
			}
			(None, _) => (),
		}
	}
	declarations.push(&css_text[start..]);
	declarations
}

fn split_priority(value: &str) -> (&str, Priority) {
	const IMPORTANT: &str = "!important";
	if value.len() >= IMPORTANT.len() {
		let split = value.len() - IMPORTANT.len();
		if value.is_char_boundary(split) && value[split..].eq_ignore_ascii_case(IMPORTANT) {
			return (value[..split].trim_end(), Priority::Important);
		}
	}
	(value, Priority::Normal)
}
