//! Pooled viewport-visibility triggers.
//!
//! One `IntersectionObserver` is a heavier resource than a callback, so each
//! registration shares a single observer across all of its elements instead
//! of creating one watcher per decorated node. Two modes exist: ONCE fires a
//! callback the first time an element crosses the threshold and then releases
//! that element; LIVE reports every visibility transition for the page
//! lifetime.
//!
//! The firing decisions are made by pure ledgers keyed by element ordinal, so
//! the once/live semantics are testable without a DOM.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::rc::Rc;

use js_sys::Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

/// One-shot firing ledger: each key fires at most once, ever.
///
/// Processing a batch decides every key's outcome before any callback runs,
/// so releasing one key mid-batch can neither skip nor double-fire a sibling
/// from the same batch.
pub struct OnceLedger<K> {
	pending: HashSet<K>,
}

impl<K: Hash + Eq + Copy> OnceLedger<K> {
	/// Track the given keys as not-yet-fired.
	pub fn new(keys: impl IntoIterator<Item = K>) -> Self {
		Self {
			pending: keys.into_iter().collect(),
		}
	}

	/// Decide which keys fire for this notification batch, in batch order.
	/// Fired keys leave the ledger; duplicates within one batch collapse.
	pub fn process(&mut self, batch: &[(K, bool)]) -> Vec<K> {
		let mut fired = Vec::new();
		for &(key, visible) in batch {
			if visible && self.pending.remove(&key) {
				fired.push(key);
			}
		}
		fired
	}

	/// Whether any keys are still waiting to fire.
	pub fn is_exhausted(&self) -> bool {
		self.pending.is_empty()
	}
}

/// Transition ledger: reports `(key, visible)` on every state change.
///
/// The first report for a key always passes through (the watcher delivers
/// the initial state on registration); after that, same-state duplicates are
/// suppressed so callers only see genuine transitions.
pub struct LiveLedger<K> {
	last: HashMap<K, bool>,
}

impl<K: Hash + Eq + Copy> LiveLedger<K> {
	/// Empty ledger; keys are learned from the first batch that mentions them.
	pub fn new() -> Self {
		Self {
			last: HashMap::new(),
		}
	}

	/// Filter a batch down to actual transitions, preserving batch order.
	pub fn process(&mut self, batch: &[(K, bool)]) -> Vec<(K, bool)> {
		let mut transitions = Vec::new();
		for &(key, visible) in batch {
			if self.last.insert(key, visible) != Some(visible) {
				transitions.push((key, visible));
			}
		}
		transitions
	}
}

impl<K: Hash + Eq + Copy> Default for LiveLedger<K> {
	fn default() -> Self {
		Self::new()
	}
}

/// Keeps a registration's observer and callback alive.
///
/// The orchestrator holds these for the page lifetime; dropping one
/// disconnects the underlying observer.
pub struct VisibilityWatcher {
	observer: IntersectionObserver,
	_callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl Drop for VisibilityWatcher {
	fn drop(&mut self) {
		self.observer.disconnect();
	}
}

/// Decode a raw entry array into `(ordinal, visible)` pairs against the
/// registration's element list. Unknown targets are skipped.
fn decode_batch(entries: &Array, elements: &[Element]) -> Vec<(usize, bool)> {
	entries
		.iter()
		.filter_map(|value| {
			let entry: IntersectionObserverEntry = value.dyn_into().ok()?;
			let target = entry.target();
			let key = elements.iter().position(|el| *el == target)?;
			Some((key, entry.is_intersecting()))
		})
		.collect()
}

fn make_observer(
	callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
	elements: &[Element],
	threshold: f64,
) -> Option<VisibilityWatcher> {
	let options = IntersectionObserverInit::new();
	options.set_threshold(&JsValue::from_f64(threshold));
	let observer =
		match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options) {
			Ok(observer) => observer,
			Err(err) => {
				log::warn!("visibility watcher unavailable: {err:?}");
				return None;
			}
		};
	for el in elements {
		observer.observe(el);
	}
	Some(VisibilityWatcher {
		observer,
		_callback: callback,
	})
}

/// Fire `on_fire(element)` exactly once per element, the first time its
/// visible fraction crosses `threshold`, then release that element.
///
/// An empty element set is a no-op: no watcher is created. Elements
/// registered together keep being observed independently of each other, and
/// one element's callback cannot prevent the rest of a batch from firing.
pub fn observe_once(
	elements: Vec<Element>,
	threshold: f64,
	on_fire: impl Fn(&Element) + 'static,
) -> Option<VisibilityWatcher> {
	if elements.is_empty() {
		return None;
	}
	let elements = Rc::new(elements);
	let ledger = RefCell::new(OnceLedger::new(0..elements.len()));

	let els = Rc::clone(&elements);
	let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
		move |entries: Array, observer: IntersectionObserver| {
			let batch = decode_batch(&entries, &els);
			for key in ledger.borrow_mut().process(&batch) {
				// Release first so a re-notification during the callback
				// cannot re-enter this element.
				observer.unobserve(&els[key]);
				on_fire(&els[key]);
			}
		},
	);
	make_observer(callback, &elements, threshold)
}

/// Report every visibility transition of every element as
/// `on_change(element, is_now_visible)`. Never auto-unregisters.
pub fn observe_live(
	elements: Vec<Element>,
	threshold: f64,
	on_change: impl Fn(&Element, bool) + 'static,
) -> Option<VisibilityWatcher> {
	if elements.is_empty() {
		return None;
	}
	let elements = Rc::new(elements);
	let ledger = RefCell::new(LiveLedger::new());

	let els = Rc::clone(&elements);
	let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
		move |entries: Array, _observer: IntersectionObserver| {
			let batch = decode_batch(&entries, &els);
			for (key, visible) in ledger.borrow_mut().process(&batch) {
				on_change(&els[key], visible);
			}
		},
	);
	make_observer(callback, &elements, threshold)
}
