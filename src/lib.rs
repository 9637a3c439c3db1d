#![doc(html_root_url = "https://docs.rs/graft-dom/0.0.1")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod build;
pub mod diff;
pub mod dom;
pub mod markup;
mod patch;
pub mod props;
pub mod style;

pub use diff::{reconcile, reconcile_with_depth_limit, Content, DepthLimitReached};
pub use dom::{Document, Element, Lifecycle, Node, NodeKind, Text};
pub use props::{set_element_props, Event, EventHandler, PropValue, PropertyBag};
