use graft_dom::{build::element, reconcile, Content};

mod fixture_;
use fixture_::body;

#[test]
fn text_keeps_identity() {
	let (document, body) = body();
	let hello = document.create_text_node("hello");
	body.append_child(&hello);

	reconcile(&body, document.create_text_node("world"));

	assert!(body.child_at(0).unwrap().ptr_eq(&hello));
	assert_eq!(hello.as_text().unwrap().data(), "world");
}

#[test]
fn element_keeps_identity_when_all_attributes_change() {
	let (document, body) = body();
	let section = element("section").attr("id", "a").attr("title", "b").style("color", "red").build(&document);
	body.append_child(&section);

	reconcile(&body, element("section").attr("lang", "en").style("margin", "0").build(&document));

	assert!(body.child_at(0).unwrap().ptr_eq(&section));
	assert_eq!(section.outer_html(), r#"<section lang="en" style="margin: 0;"></section>"#);
}

#[test]
fn mixed_kinds_are_replaced() {
	let (document, body) = body();
	let text = document.create_text_node("text");
	let em = document.create_element("em");
	body.append_child(&text);
	body.append_child(&em);

	let strong = element("strong").build(&document);
	let replacement_text = document.create_text_node("now text");
	reconcile(&body, vec![strong.clone(), replacement_text.clone()]);

	assert_eq!(body.child_nodes(), vec![strong, replacement_text]);
	assert!(text.parent_node().is_none());
	assert!(em.parent_node().is_none());
}

#[test]
fn different_tags_are_replaced() {
	let (document, body) = body();
	let old = element("h1").text("Title").build(&document);
	body.append_child(&old);
	let new = element("h2").text("Title").build(&document);

	reconcile(&body, new.clone());

	assert_eq!(body.child_nodes(), vec![new]);
	assert!(old.parent_node().is_none());
}

#[test]
fn tag_case_differences_are_replaced() {
	let (document, body) = body();
	let old = document.create_element("DIV");
	body.append_child(&old);
	let new = document.create_element("div");

	reconcile(&body, new.clone());

	assert_eq!(body.child_nodes(), vec![new]);
}

#[test]
fn extra_candidates_are_appended() {
	let (document, body) = body();
	let first = element("p").text("1").build(&document);
	body.append_child(&first);

	reconcile(
		&body,
		vec![
			element("p").text("1").build(&document),
			element("p").text("2").build(&document),
			element("p").text("3").build(&document),
		],
	);

	assert!(body.child_at(0).unwrap().ptr_eq(&first));
	assert_eq!(body.inner_html(), "<p>1</p><p>2</p><p>3</p>");
}

#[test]
fn empty_fragment_clears() {
	let (document, body) = body();
	body.append_child(&element("p").build(&document));
	body.append_child(&document.create_text_node("tail"));

	reconcile(&body, Content::Fragment(Vec::new()));

	assert_eq!(body.child_count(), 0);
}

#[test]
fn nested_children_are_reconciled_depth_first() {
	let (document, body) = body();
	let table = element("table")
		.child(element("tr").child(element("td").text("1")).child(element("td").text("2")))
		.build(&document);
	body.append_child(&table);
	let tr = table.child_at(0).unwrap();
	let td = tr.child_at(0).unwrap();

	reconcile(
		&body,
		element("table")
			.child(element("tr").child(element("td").text("one")))
			.child(element("tr").child(element("td").text("two")))
			.build(&document),
	);

	assert!(body.child_at(0).unwrap().ptr_eq(&table));
	assert!(table.child_at(0).unwrap().ptr_eq(&tr));
	assert!(tr.child_at(0).unwrap().ptr_eq(&td));
	assert_eq!(table.outer_html(), "<table><tr><td>one</td></tr><tr><td>two</td></tr></table>");
}
