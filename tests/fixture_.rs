#![allow(dead_code)]

use graft_dom::{
	dom::{MutationKind, MutationRecord},
	Document, Node,
};

/// A fresh document with an observed, empty and connected `<body>` to reconcile into.
pub fn body() -> (Document, Node) {
	let document = Document::new();
	let body = document.create_root_element("body");
	document.start_observing();
	(document, body)
}

/// Counts attribute, style, text and child list mutations, leaving out property assignments.
pub fn structural(records: &[MutationRecord]) -> usize {
	records.iter().filter(|record| record.kind != MutationKind::Property).count()
}

pub fn count(records: &[MutationRecord], kind: MutationKind) -> usize {
	records.iter().filter(|record| record.kind == kind).count()
}

pub fn text_of(node: &Node) -> String {
	node.child_nodes()
		.iter()
		.filter_map(|child| child.as_text().map(|text| text.data()))
		.collect()
}
