//! Small web-platform helpers shared by the effect modules.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, DomTokenList, Element, Window};

/// The host window. The runtime only ever runs inside a page.
pub fn window() -> Window {
	web_sys::window().unwrap()
}

/// The host document.
pub fn document() -> Document {
	window().document().unwrap()
}

/// All elements matching `selector`, in document order. An invalid selector
/// or empty result yields an empty vec.
pub fn query_all(document: &Document, selector: &str) -> Vec<Element> {
	let Ok(list) = document.query_selector_all(selector) else {
		return Vec::new();
	};
	(0..list.length())
		.filter_map(|i| list.item(i))
		.filter_map(|node| node.dyn_into::<Element>().ok())
		.collect()
}

/// Run `f` against the body's class list, if the body exists.
pub fn with_body_classes(f: impl FnOnce(&DomTokenList)) {
	if let Some(body) = document().body() {
		f(&body.class_list());
	}
}

/// Whether the user has asked for reduced motion, read at call time.
pub fn prefers_reduced_motion() -> bool {
	window()
		.match_media("(prefers-reduced-motion: reduce)")
		.ok()
		.flatten()
		.map(|query| query.matches())
		.unwrap_or(false)
}

/// Fire-and-forget delayed continuation. Each call is an independent timer;
/// the closure is leaked into the host's timer table, which is the intended
/// page-lifetime ownership for one-shot schedules.
pub fn schedule(delay_ms: u32, f: impl FnOnce() + 'static) {
	let cb = Closure::once(f);
	let _ = window().set_timeout_with_callback_and_timeout_and_arguments_0(
		cb.as_ref().unchecked_ref(),
		delay_ms as i32,
	);
	cb.forget();
}

/// Run `f` on the next animation frame.
pub fn next_frame(f: impl FnOnce() + 'static) {
	let cb = Closure::once(move |_timestamp: f64| f());
	let _ = window().request_animation_frame(cb.as_ref().unchecked_ref());
	cb.forget();
}
