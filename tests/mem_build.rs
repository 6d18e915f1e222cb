use rebuild_dom::{
	build, h,
	mem::{MemEvent, MemNode, MemoryHost},
	BuildError, Child, Descriptor, Host, Prop, Snapshot,
};
use std::{cell::Cell, rc::Rc};
use tracing_subscriber::EnvFilter;

fn init_logging() {
	let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_test_writer().try_init();
}

fn text(text: &str) -> Snapshot {
	Snapshot::Text(text.to_owned())
}

#[test]
fn tag_attributes_and_child_order() {
	init_logging();
	let host = MemoryHost::new();

	let element = build(
		&host,
		"input",
		vec![
			Prop::attr("type", "email"),
			Prop::attr("name", "email"),
			Prop::attr("placeholder", "Email"),
			Prop::attr("aria-label", "Email"),
		],
		vec![],
	)
	.unwrap();

	assert_eq!(element.tag().as_deref(), Some("input"));
	assert_eq!(element.attribute("type").as_deref(), Some("email"));
	assert_eq!(element.attribute("aria-label").as_deref(), Some("Email"));
	assert!(!element.is_attached());

	let list = build(
		&host,
		"ul",
		vec![],
		vec![
			Child::from("a"),
			Child::from(vec![Child::from("b"), Child::from(vec!["c", "d"])]),
			Child::from(h!("li", [], "e")),
			Child::from(5_u32),
		],
	)
	.unwrap();

	assert_eq!(
		list.snapshot(),
		Snapshot::element(
			"ul",
			vec![],
			vec![text("a"), text("b"), text("c"), text("d"), Snapshot::element("li", vec![], vec![text("e")]), text("5")],
		)
	);
}

#[test]
fn attribute_coercion() {
	let host = MemoryHost::new();
	let image = build(
		&host,
		"img",
		vec![
			Prop::attr("src", "rex.jpg"),
			Prop::attr("alt", ""),
			Prop::attr("width", 300_i32),
			Prop::attr("height", 300.0_f64),
			Prop::attr("hidden", false),
			Prop::attr("draggable", true),
			Prop::attr("title", None::<String>),
			Prop::attr("className", "dog"),
		],
		vec![],
	)
	.unwrap();

	assert_eq!(
		image.snapshot(),
		Snapshot::element(
			"img",
			vec![
				("src".into(), "rex.jpg".into()),
				("alt".into(), "".into()),
				("width".into(), "300".into()),
				("height".into(), "300".into()),
				("draggable".into(), "".into()),
				("class".into(), "dog".into()),
			],
			vec![],
		)
	);
	assert_eq!(image.attribute("title"), None);
	assert_eq!(image.attribute("hidden"), None);
}

#[test]
fn equal_arguments_build_independent_elements() {
	let host = MemoryHost::new();
	let make = || build(&host, "div", vec![Prop::attr("className", "page-layout")], vec![Child::from("🐶")]).unwrap();

	let first = make();
	let second = make();
	assert!(!first.ptr_eq(&second));
	assert_eq!(first.snapshot(), second.snapshot());
	assert!(!first.children()[0].ptr_eq(&second.children()[0]));
}

#[test]
fn already_built_elements_are_attached_as_is() {
	let host = MemoryHost::new();
	let logo = build(&host, "span", vec![Prop::attr("className", "logo")], vec![Child::from("🐶")]).unwrap();

	let header = build(&host, "header", vec![], vec![Child::element(logo.clone()), Child::from("Dogs")]).unwrap();

	assert!(header.children()[0].ptr_eq(&logo));
	assert!(logo.parent().unwrap().ptr_eq(&header));
	assert_eq!(header.text_content(), "🐶Dogs");
}

#[test]
fn click_invokes_handler_once() {
	init_logging();
	let host = MemoryHost::new();
	let clicks = Rc::new(Cell::new(0));

	let button = build(
		&host,
		"button",
		vec![Prop::on("click", {
			let clicks = Rc::clone(&clicks);
			move || clicks.set(clicks.get() + 1)
		})],
		vec![Child::from("Log out")],
	)
	.unwrap();

	assert_eq!(clicks.get(), 0);
	assert_eq!(button.click(), 1);
	assert_eq!(clicks.get(), 1);
	assert_eq!(button.dispatch(&MemEvent::new("submit")), 0);
	assert_eq!(clicks.get(), 1);
}

#[test]
fn listeners_receive_the_event() {
	let host = MemoryHost::new();
	let typed = Rc::new(std::cell::RefCell::new(String::new()));

	let input = build(
		&host,
		"input",
		vec![Prop::on_event("input", {
			let typed = Rc::clone(&typed);
			move |event: &MemEvent| *typed.borrow_mut() = event.value().unwrap_or_default().to_owned()
		})],
		vec![],
	)
	.unwrap();

	input.dispatch(&MemEvent::with_value("input", "hunter2"));
	assert_eq!(*typed.borrow(), "hunter2");
}

#[test]
fn nested_listeners_are_bound_to_their_own_element() {
	let host = MemoryHost::new();
	let clicks = Rc::new(Cell::new(0));
	let tree: Descriptor<MemoryHost> = h!(
		"form",
		[],
		h!("button", [Prop::on("click", {
			let clicks = Rc::clone(&clicks);
			move || clicks.set(clicks.get() + 1)
		})], "Log in"),
	);
	let form = rebuild_dom::Builder::new().realize(&host, tree).unwrap();

	assert_eq!(form.click(), 0);
	let buttons: Vec<MemNode> = form.find_all("button");
	assert_eq!(buttons.len(), 1);
	assert_eq!(buttons[0].click(), 1);
	assert_eq!(clicks.get(), 1);
}

#[test]
fn malformed_tags() {
	let host = MemoryHost::new();
	assert_eq!(build(&host, "", vec![], vec![]).unwrap_err(), BuildError::EmptyTag);
	assert_eq!(build(&host, "dogs list", vec![], vec![]).unwrap_err(), BuildError::UnknownTag("dogs list".to_owned()));
}

#[test]
fn building_does_not_attach() {
	let host = MemoryHost::new();
	let mount = host.mount_point("app");
	let _ = build(&host, "p", vec![], vec![Child::from("unattached")]).unwrap();
	assert!(host.snapshot_children(&mount).is_empty());
}

#[test]
fn attribute_names_snapshot_lowercase_like_the_dom() {
	let host = MemoryHost::new();
	let input = build(&host, "input", vec![Prop::attr("tabIndex", 0_i32), Prop::attr("readOnly", true)], vec![]).unwrap();

	assert_eq!(input.attribute("tabindex").as_deref(), Some("0"));
	assert_eq!(
		input.snapshot(),
		Snapshot::element("input", vec![("readonly".into(), "".into()), ("tabindex".into(), "0".into())], vec![])
	);
}

#[test]
fn appending_an_element_into_its_own_subtree_is_refused() {
	init_logging();
	let host = MemoryHost::new();
	let outer = build(&host, "div", vec![], vec![Child::from("outer")]).unwrap();
	let inner = build(&host, "section", vec![], vec![Child::element(outer.clone())]).unwrap();

	let mut outer_mut = outer.clone();
	host.append_child(&mut outer_mut, inner.clone());

	assert!(inner.parent().is_none());
	assert_eq!(outer.children().len(), 1);
	assert_eq!(inner.text_content(), "outer");
	assert_eq!(outer.snapshot(), Snapshot::element("div", vec![], vec![text("outer")]));
}
