use graft_dom::{build::element, reconcile};
use std::{cell::Cell, rc::Rc};

mod fixture_;
use fixture_::{body, text_of};

#[test]
fn paragraph_text_is_patched_in_place() {
	let (document, body) = body();
	let div = element("div").child(element("p").text("old")).build(&document);
	body.append_child(&div);
	let p = div.child_at(0).unwrap();
	let text = p.child_at(0).unwrap();

	reconcile(&div, vec![element("p").text("new").build(&document)]);

	assert_eq!(div.child_count(), 1);
	assert!(div.child_at(0).unwrap().ptr_eq(&p));
	assert!(p.child_at(0).unwrap().ptr_eq(&text));
	assert_eq!(div.outer_html(), "<div><p>new</p></div>");
}

#[test]
fn keyed_list_items_swap() {
	let (document, body) = body();
	let ul = element("ul")
		.child(element("li").key("a").text("A"))
		.child(element("li").key("b").text("B"))
		.build(&document);
	body.append_child(&ul);
	let li_a = ul.child_at(0).unwrap();
	let li_b = ul.child_at(1).unwrap();

	reconcile(
		&ul,
		vec![
			element("li").key("b").text("B2").build(&document),
			element("li").key("a").text("A2").build(&document),
		],
	);

	assert_eq!(ul.child_nodes(), vec![li_b.clone(), li_a.clone()]);
	assert_eq!(text_of(&li_b), "B2");
	assert_eq!(text_of(&li_a), "A2");
}

#[test]
fn span_attributes_change() {
	let (document, body) = body();
	let span = element("span").attr("class", "old").build(&document);
	body.append_child(&span);

	reconcile(&body, element("span").attr("class", "new").attr("data-id", "5").build(&document));

	assert!(body.child_at(0).unwrap().ptr_eq(&span));
	let span = span.as_element().unwrap();
	assert_eq!(span.get_attribute("class").as_deref(), Some("new"));
	assert_eq!(span.get_attribute("data-id").as_deref(), Some("5"));
}

#[test]
fn button_click_reaches_latest_handler() {
	let (document, body) = body();
	let f1_calls = Rc::new(Cell::new(0));
	let f2_calls = Rc::new(Cell::new(0));

	let button = element("button")
		.on("click", {
			let f1_calls = f1_calls.clone();
			move |_| f1_calls.set(f1_calls.get() + 1)
		})
		.build(&document);
	body.append_child(&button);

	reconcile(
		&body,
		element("button")
			.on("click", {
				let f2_calls = f2_calls.clone();
				move |_| f2_calls.set(f2_calls.get() + 1)
			})
			.build(&document),
	);

	assert!(body.child_at(0).unwrap().ptr_eq(&button));
	assert!(button.as_element().unwrap().dispatch_event("click"));
	assert_eq!(f1_calls.get(), 0);
	assert_eq!(f2_calls.get(), 1);
}

#[test]
fn surplus_unkeyed_children_are_removed() {
	let (document, body) = body();
	for tag in ["p", "span", "div"] {
		body.append_child(&document.create_element(tag));
	}
	let p = body.child_at(0).unwrap();
	let span = body.child_at(1).unwrap();
	let div = body.child_at(2).unwrap();

	reconcile(&body, element("p").build(&document));

	assert_eq!(body.child_count(), 1);
	assert!(body.child_at(0).unwrap().ptr_eq(&p));
	assert!(span.parent_node().is_none());
	assert!(div.parent_node().is_none());
}
