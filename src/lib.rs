//! aether-fx: ambient visual-effects runtime for long-form narrative pages.
//!
//! This crate animates the host document rather than rendering it: a pooled
//! particle field on a fixed canvas, scroll-visibility triggers for page
//! decorations, and the multi-phase forge reveal for title elements. The
//! page itself stays authored HTML; the runtime mounts alongside it and
//! degrades silently wherever its target elements are absent.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

pub mod components;

use components::effects::forge::{self, ForgeSequencer};
use components::effects::{decor, dom, palette, theme};
pub use components::effects::{AmbientCanvas, EffectsConfig, PaletteBus, VisibilityWatcher};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("aether-fx: logging initialized");
}

/// Load engine configuration from a script element with id="effects-config".
/// Expected format: a JSON object overriding any subset of the defaults.
fn load_effects_config() -> Option<EffectsConfig> {
	let document = web_sys::window()?.document()?;
	let element = document.get_element_by_id("effects-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<EffectsConfig>(&json_text) {
		Ok(cfg) => {
			info!("aether-fx: host configuration loaded");
			Some(cfg)
		}
		Err(e) => {
			warn!("aether-fx: failed to parse effects config, using defaults: {e}");
			None
		}
	}
}

/// Root orchestrator component.
///
/// Owns the palette bus and the registrations that must stay alive for the
/// page lifetime: visibility watchers, forge sequencer records, and the
/// ambient canvas loop. Everything is wired once on mount.
#[component]
pub fn App() -> impl IntoView {
	let cfg = load_effects_config().unwrap_or_default();
	let bus = Rc::new(PaletteBus::new());

	// Page-lifetime registrations, rooted in the mount effect's closure.
	let watchers: Rc<RefCell<Vec<VisibilityWatcher>>> = Rc::new(RefCell::new(Vec::new()));
	let sequencers: Rc<RefCell<Vec<Rc<ForgeSequencer>>>> = Rc::new(RefCell::new(Vec::new()));

	{
		let (cfg, bus) = (cfg.clone(), bus.clone());
		let (watchers, sequencers) = (watchers.clone(), sequencers.clone());
		Effect::new(move |_| {
			let mut registered = watchers.borrow_mut();
			if !registered.is_empty() {
				return;
			}
			let document = dom::document();

			theme::init(&bus);
			bus.publish(&palette::read_palette(&document));

			registered.extend(decor::bind_all(&document, &cfg));

			let (records, forge_watcher) = forge::bind(&document, &cfg);
			registered.extend(forge_watcher);
			info!(
				"aether-fx: bound {} watchers, {} forge targets",
				registered.len(),
				records.len()
			);
			*sequencers.borrow_mut() = records;
		});
	}

	let particle_cfg = cfg.particles.clone();
	view! { <AmbientCanvas cfg=particle_cfg bus=bus /> }
}
