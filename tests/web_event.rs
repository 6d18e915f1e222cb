#![cfg(target_arch = "wasm32")]

use rebuild_dom::{build, web::WebHost, Child, Prop};
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

static mut LOG_INITIALIZED: bool = false;

fn init_logging() {
	unsafe {
		if !LOG_INITIALIZED {
			tracing_wasm::set_as_global_default();
			LOG_INITIALIZED = true;
		}
	}
}

#[wasm_bindgen_test]
fn click() {
	init_logging();
	let host = WebHost::from_window().unwrap();

	let click_count = Rc::new(RefCell::new(0));

	let button = build(
		&host,
		"button",
		vec![
			Prop::attr("id", "test-button"),
			Prop::on_event("click", {
				let click_count = Rc::clone(&click_count);
				move |event: &web_sys::Event| {
					let event: &JsValue = event.as_ref();
					event.dyn_ref::<web_sys::MouseEvent>().expect("Expected MouseEvent but received something else.");
					*click_count.borrow_mut() += 1;
				}
			}),
		],
		vec![Child::from("Log out")],
	)
	.unwrap();
	assert_eq!(button.listener_count(), 1);

	assert_eq!(*click_count.borrow(), 0);
	let element: HtmlElement = button.node().clone().dyn_into().unwrap();
	assert_eq!(element.tag_name(), "BUTTON");
	assert_eq!(element.id(), "test-button");
	assert_eq!(element.text_content().as_deref(), Some("Log out"));

	element.click();
	assert_eq!(*click_count.borrow(), 1);

	drop(button);
	element.click();
	assert_eq!(*click_count.borrow(), 1);
}

#[wasm_bindgen_test]
fn unknown_tags_fail_before_reaching_the_document() {
	init_logging();
	let host = WebHost::from_window().unwrap();
	assert!(build(&host, "1nvalid", vec![], vec![]).is_err());
	assert!(build(&host, "", vec![], vec![]).is_err());
}
