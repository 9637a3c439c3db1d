use graft_dom::{build::element, reconcile_with_depth_limit, DepthLimitReached};

mod fixture_;
use fixture_::body;

fn nested(depth: usize, leaf: &str) -> graft_dom::build::ElementBuilder {
	let mut builder = element("div").text(leaf);
	for _ in 1..depth {
		builder = element("div").child(builder);
	}
	builder
}

#[test]
fn within_limit() {
	let (document, body) = body();
	body.append_child(&nested(3, "old").build(&document));

	assert_eq!(reconcile_with_depth_limit(&body, nested(3, "new").build(&document), 4), Ok(()));
	assert_eq!(body.inner_html(), "<div><div><div>new</div></div></div>");
}

#[test]
fn beyond_limit() {
	let (document, body) = body();
	body.append_child(&nested(3, "old").build(&document));

	assert_eq!(
		reconcile_with_depth_limit(&body, nested(3, "new").build(&document), 3),
		Err(DepthLimitReached { depth_limit: 3 })
	);
	// Outer levels were patched, the innermost text was not.
	assert_eq!(body.inner_html(), "<div><div><div>old</div></div></div>");
}

#[test]
fn childless_elements_do_not_count() {
	let (document, body) = body();
	body.append_child(&document.create_element("hr"));

	assert_eq!(reconcile_with_depth_limit(&body, element("hr").attr("class", "thin").build(&document), 1), Ok(()));
	assert_eq!(body.inner_html(), r#"<hr class="thin">"#);
}

#[test]
fn insertions_do_not_count() {
	let (document, body) = body();

	assert_eq!(reconcile_with_depth_limit(&body, nested(10, "deep").build(&document), 1), Ok(()));
	assert_eq!(body.child_count(), 1);
}
