//! Scroll-triggered page decorations.
//!
//! These are the trigger pool's consumers: small class mutations and the
//! typewriter, each registered through `observe_once`/`observe_live` exactly
//! as the host page uses them. None of them carry state beyond what the
//! trigger pool already tracks.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use super::config::EffectsConfig;
use super::dom;
use super::triggers::{self, VisibilityWatcher};

/// Register every decoration found in the document. The returned watchers
/// must be kept alive by the caller for the page lifetime.
pub fn bind_all(document: &Document, cfg: &EffectsConfig) -> Vec<VisibilityWatcher> {
	let mut watchers = Vec::new();
	watchers.extend(bind_shake(document, cfg));
	watchers.extend(bind_typed(document, cfg));
	watchers.extend(bind_section_dots(document, cfg));
	watchers
}

/// `.fx-shake` elements rattle once when they come well into view.
fn bind_shake(document: &Document, cfg: &EffectsConfig) -> Option<VisibilityWatcher> {
	let clear_after = cfg.shake_clear_ms;
	triggers::observe_once(
		dom::query_all(document, ".fx-shake"),
		cfg.triggers.shake,
		move |el| {
			let _ = el.class_list().add_1("shake");
			let el = el.clone();
			dom::schedule(clear_after, move || {
				let _ = el.class_list().remove_1("shake");
			});
		},
	)
}

/// `.fx-typed[data-typed]` elements retype their own markup when revealed.
fn bind_typed(document: &Document, cfg: &EffectsConfig) -> Option<VisibilityWatcher> {
	let speed = cfg.type_speed_ms;
	triggers::observe_once(
		dom::query_all(document, ".fx-typed[data-typed]"),
		cfg.triggers.typed,
		move |el| typewriter(el, speed),
	)
}

/// Section progress dots: as headings scroll into view, dots light up to the
/// current index. Live registration, tracks both directions of travel.
fn bind_section_dots(document: &Document, cfg: &EffectsConfig) -> Option<VisibilityWatcher> {
	let headings = dom::query_all(document, ".section-heading");
	let dots = dom::query_all(document, ".section-dot");
	if headings.is_empty() || dots.is_empty() {
		return None;
	}

	let tracked = headings.clone();
	triggers::observe_live(headings, cfg.triggers.sections, move |el, visible| {
		if !visible {
			return;
		}
		let Some(idx) = tracked.iter().position(|h| h == el) else {
			return;
		};
		for (i, dot) in dots.iter().enumerate() {
			let classes = dot.class_list();
			let _ = classes.toggle_with_force("active", i <= idx);
			let _ = classes.toggle_with_force("current", i == idx);
		}
	})
}

/// Advance the typewriter cursor by one step: a whole HTML tag in one step,
/// otherwise a single character. Returns the new cursor position.
fn typed_step_end(source: &str, cursor: usize) -> usize {
	let rest = &source[cursor..];
	let Some(ch) = rest.chars().next() else {
		return source.len();
	};
	if ch == '<' {
		match rest.find('>') {
			Some(close) => cursor + close + 1,
			None => source.len(),
		}
	} else {
		cursor + ch.len_utf8()
	}
}

/// Retype an element's markup one step per tick through a self-rescheduling
/// timeout chain. The element is cleared first and made visible so the page
/// can hide untyped text without a flash of content.
fn typewriter(el: &Element, speed_ms: u32) {
	let source = el.inner_html();
	el.set_inner_html("");
	if let Some(html) = el.dyn_ref::<HtmlElement>() {
		let _ = html.style().set_property("visibility", "visible");
	}
	type_step(el.clone(), source, 0, speed_ms);
}

fn type_step(el: Element, source: String, cursor: usize, speed_ms: u32) {
	if cursor >= source.len() {
		return;
	}
	let next = typed_step_end(&source, cursor);
	el.set_inner_html(&source[..next]);
	if next < source.len() {
		dom::schedule(speed_ms, move || type_step(el, source, next, speed_ms));
	}
}
