//! Thin theme collaborator.
//!
//! The theme itself is just one persisted scalar and a body class; it matters
//! to the effects runtime only because a swap invalidates the palette. After
//! applying a theme this module waits one frame (so the new custom properties
//! are computed) and then republishes the palette on the bus.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::dom;
use super::palette::{self, PaletteBus};

const STORAGE_KEY: &str = "aether-theme";
const DEFAULT_THEME: &str = "night";
const ALTERNATE_THEME: &str = "dawn";

fn stored_theme() -> String {
	dom::window()
		.local_storage()
		.ok()
		.flatten()
		.and_then(|storage| storage.get_item(STORAGE_KEY).ok().flatten())
		.unwrap_or_else(|| DEFAULT_THEME.to_string())
}

fn apply_theme(name: &str) {
	dom::with_body_classes(|classes| {
		let _ = classes.remove_2(
			&format!("theme-{DEFAULT_THEME}"),
			&format!("theme-{ALTERNATE_THEME}"),
		);
		let _ = classes.add_1(&format!("theme-{name}"));
	});
	if let Ok(Some(storage)) = dom::window().local_storage() {
		let _ = storage.set_item(STORAGE_KEY, name);
	}
}

/// Apply the persisted theme and bind the toggle, republishing the palette
/// one frame after each swap. Absent toggle means the theme stays fixed;
/// the initial application still runs.
pub fn init(bus: &Rc<PaletteBus>) {
	apply_theme(&stored_theme());

	let Ok(Some(toggle)) = dom::document().query_selector(".theme-toggle") else {
		return;
	};

	let bus = Rc::clone(bus);
	let on_click = Closure::<dyn FnMut()>::new(move || {
		let next = if stored_theme() == DEFAULT_THEME {
			ALTERNATE_THEME
		} else {
			DEFAULT_THEME
		};
		apply_theme(next);

		let bus = Rc::clone(&bus);
		dom::next_frame(move || {
			bus.publish(&palette::read_palette(&dom::document()));
		});
	});
	let _ = toggle.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
	on_click.forget();
}
