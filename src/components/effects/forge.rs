//! The forge reveal: a multi-phase timed choreography for title elements.
//!
//! The timeline is a pure function of the character count and the timing
//! constants — a flat list of `(offset, cue)` pairs measured from sequence
//! start. Scheduling is a separate concern: every cue becomes its own
//! fire-and-forget timeout, so a delay in one phase can never swallow a later
//! cleanup, and the two impact cleanups fire regardless of when the complete
//! transition lands.
//!
//! Markup contract: a container carrying `forge-reveal`, inside it a
//! `.forge-title` with the text to split in `data-forge-text`, and optionally
//! a `.forge-flash` overlay. Per-character stagger is expressed through a
//! `--i` ordinal custom property consumed by the stylesheet, not by
//! per-character timers.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use super::config::{EffectsConfig, ForgeTiming};
use super::dom;
use super::triggers::{self, VisibilityWatcher};

/// A scheduled class mutation within one sequence run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
	/// Atmosphere cues engage on the container.
	Activate,
	/// Micro-tremor begins.
	TremorStart,
	/// Characters begin forging (staggered by ordinal in CSS).
	Forge,
	/// Tremor ends ahead of the impact.
	TremorEnd,
	/// Flash fires, impact shake and page-wide pulse begin.
	ImpactStart,
	/// Impact visuals clear.
	ImpactClear,
	/// Page-wide pulse clears.
	WorldFlashClear,
	/// Sequence complete; resting presentation from here on.
	Complete,
}

impl Cue {
	/// The state the sequencer enters when this cue is applied, if any.
	/// Cleanup cues mutate classes without advancing the state machine.
	pub fn phase_after(self) -> Option<ForgePhase> {
		match self {
			Cue::Activate => Some(ForgePhase::Active),
			Cue::TremorStart => Some(ForgePhase::Tremor),
			Cue::Forge => Some(ForgePhase::Forged),
			Cue::ImpactStart => Some(ForgePhase::Impact),
			Cue::Complete => Some(ForgePhase::Complete),
			Cue::TremorEnd | Cue::ImpactClear | Cue::WorldFlashClear => None,
		}
	}
}

/// Sequence state for one target element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForgePhase {
	/// Not yet triggered; the only state a run may start from.
	Idle,
	/// Atmosphere engaged.
	Active,
	/// Tremor running.
	Tremor,
	/// Characters forging.
	Forged,
	/// Flash and pulse in flight.
	Impact,
	/// Resting state after a full run.
	Complete,
	/// Terminal state of the accessibility bypass.
	Reduced,
}

/// Absolute millisecond offsets for one sequence run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline {
	/// When the last character finishes its reveal animation.
	pub forge_end: u32,
	/// When the flash and impact begin.
	pub flash_at: u32,
	/// When the sequence enters its resting state.
	pub complete_at: u32,
	/// Every scheduled mutation, in derivation order.
	pub cues: Vec<(u32, Cue)>,
}

/// Derive the timeline for `char_count` staggered characters.
///
/// Pure: two runs with equal counts and constants produce identical
/// timelines. A zero-character title saturates the stagger term instead of
/// underflowing.
pub fn timeline(char_count: usize, t: &ForgeTiming) -> Timeline {
	let staggered = char_count.saturating_sub(1) as u32;
	let forge_end = t.buildup_ms + staggered * t.stagger_ms + t.char_anim_ms;
	let flash_at = forge_end + t.flash_gap_ms;
	let complete_at = flash_at + t.impact_ms;

	let cues = vec![
		(0, Cue::Activate),
		(t.tremor_lead_ms, Cue::TremorStart),
		(t.buildup_ms, Cue::Forge),
		(flash_at.saturating_sub(t.tremor_lead_ms), Cue::TremorEnd),
		(flash_at, Cue::ImpactStart),
		(flash_at + t.impact_clear_ms, Cue::ImpactClear),
		(flash_at + t.world_flash_clear_ms, Cue::WorldFlashClear),
		(complete_at, Cue::Complete),
	];

	Timeline {
		forge_end,
		flash_at,
		complete_at,
		cues,
	}
}

/// One title element's sequencer record: the per-element state field is the
/// one-shot entry guard, so a second visibility fire before the first run
/// completes cannot start a second run.
pub struct ForgeSequencer {
	container: Element,
	flash: Option<Element>,
	chars: Vec<Element>,
	phase: Cell<ForgePhase>,
	timing: ForgeTiming,
}

impl ForgeSequencer {
	/// Prepare a container: split the title text into per-character spans
	/// and record the sub-elements to stagger.
	pub fn mount(document: &Document, container: Element, timing: ForgeTiming) -> Rc<Self> {
		let flash = container.query_selector(".forge-flash").ok().flatten();
		let chars = container
			.query_selector(".forge-title")
			.ok()
			.flatten()
			.and_then(|title| {
				let text = title.get_attribute("data-forge-text")?;
				split_title(document, &title, &text)
			})
			.unwrap_or_default();

		Rc::new(Self {
			container,
			flash,
			chars,
			phase: Cell::new(ForgePhase::Idle),
			timing,
		})
	}

	/// Current sequence state.
	pub fn phase(&self) -> ForgePhase {
		self.phase.get()
	}

	/// The element this sequencer owns.
	pub fn container(&self) -> &Element {
		&self.container
	}

	/// Start the sequence. Runs at most once per element; the reduced-motion
	/// preference, read now, substitutes the synchronous end-state with zero
	/// scheduled continuations.
	pub fn begin(self: &Rc<Self>) {
		if self.phase.get() != ForgePhase::Idle {
			return;
		}

		if dom::prefers_reduced_motion() {
			self.phase.set(ForgePhase::Reduced);
			self.complete_instantly();
			return;
		}

		self.phase.set(ForgePhase::Active);
		let run = timeline(self.chars.len(), &self.timing);
		for (offset, cue) in run.cues {
			if offset == 0 {
				self.apply(cue);
			} else {
				let seq = Rc::clone(self);
				dom::schedule(offset, move || seq.apply(cue));
			}
		}
	}

	/// Apply one cue's class mutations and state transition. Safe against a
	/// detached container: class changes on a removed node are no-ops.
	fn apply(&self, cue: Cue) {
		let classes = self.container.class_list();
		match cue {
			Cue::Activate => {
				let _ = classes.add_1("forge-active");
			}
			Cue::TremorStart => {
				let _ = classes.add_1("forge-tremor");
			}
			Cue::Forge => {
				for c in &self.chars {
					let _ = c.class_list().add_1("forged");
				}
			}
			Cue::TremorEnd => {
				let _ = classes.remove_1("forge-tremor");
			}
			Cue::ImpactStart => {
				if let Some(flash) = &self.flash {
					let _ = flash.class_list().add_1("forge-flash-fire");
				}
				let _ = classes.add_1("forge-impact");
				dom::with_body_classes(|body| {
					let _ = body.add_1("forge-world-flash");
				});
			}
			Cue::ImpactClear => {
				let _ = classes.remove_1("forge-impact");
				if let Some(flash) = &self.flash {
					let _ = flash.class_list().remove_1("forge-flash-fire");
				}
			}
			Cue::WorldFlashClear => {
				dom::with_body_classes(|body| {
					let _ = body.remove_1("forge-world-flash");
				});
			}
			Cue::Complete => {
				let _ = classes.add_1("forge-complete");
			}
		}
		if let Some(next) = cue.phase_after() {
			self.phase.set(next);
		}
	}

	/// Accessibility bypass: the final visual state, synchronously, in the
	/// same turn.
	fn complete_instantly(&self) {
		let classes = self.container.class_list();
		let _ = classes.add_1("forge-active");
		let _ = classes.add_1("forge-complete");
		for c in &self.chars {
			if let Some(el) = c.dyn_ref::<web_sys::HtmlElement>() {
				let style = el.style();
				let _ = style.set_property("opacity", "1");
				let _ = style.set_property("transform", "none");
			}
		}
	}
}

/// Replace the title's content with one span per character, spaces becoming
/// spacer spans and each visible character carrying its ordinal as `--i`.
fn split_title(document: &Document, title: &Element, text: &str) -> Option<Vec<Element>> {
	let fragment = document.create_document_fragment();
	let mut chars = Vec::new();
	let mut ordinal = 0usize;

	for ch in text.chars() {
		let span = document.create_element("span").ok()?;
		if ch == ' ' {
			span.set_class_name("forge-space");
		} else {
			span.set_class_name("forge-char");
			span.set_text_content(Some(&ch.to_string()));
			let _ = span.set_attribute("style", &format!("--i: {ordinal}"));
			ordinal += 1;
			chars.push(span.clone());
		}
		let _ = fragment.append_child(&span);
	}

	title.set_inner_html("");
	let _ = title.append_child(&fragment);
	Some(chars)
}

/// Find every forge container on the page, prepare it, and arm its one-shot
/// visibility trigger. Returns the sequencer records and the shared watcher.
pub fn bind(
	document: &Document,
	cfg: &EffectsConfig,
) -> (Vec<Rc<ForgeSequencer>>, Option<VisibilityWatcher>) {
	let containers = dom::query_all(document, ".forge-reveal");
	let sequencers: Vec<Rc<ForgeSequencer>> = containers
		.iter()
		.map(|el| ForgeSequencer::mount(document, el.clone(), cfg.forge.clone()))
		.collect();
	if sequencers.is_empty() {
		return (sequencers, None);
	}

	let records = sequencers.clone();
	let watcher = triggers::observe_once(containers, cfg.triggers.forge, move |el| {
		if let Some(seq) = records.iter().find(|s| s.container() == el) {
			seq.begin();
		}
	});
	(sequencers, watcher)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn default_timing() -> ForgeTiming {
		ForgeTiming::default()
	}

	#[test]
	fn worked_example_offsets() {
		// n=5, stagger=70, charDur=500, buildup=400, gap=200, impact=600.
		let run = timeline(5, &default_timing());
		assert_eq!(run.forge_end, 400 + 4 * 70 + 500);
		assert_eq!(run.forge_end, 1180);
		assert_eq!(run.flash_at, 1380);
		assert_eq!(run.complete_at, 1980);
	}

	#[test]
	fn full_cue_table() {
		let run = timeline(5, &default_timing());
		assert_eq!(
			run.cues,
			vec![
				(0, Cue::Activate),
				(100, Cue::TremorStart),
				(400, Cue::Forge),
				(1280, Cue::TremorEnd),
				(1380, Cue::ImpactStart),
				(1880, Cue::ImpactClear),
				(2180, Cue::WorldFlashClear),
				(1980, Cue::Complete),
			]
		);
	}

	#[test]
	fn equal_counts_produce_identical_timelines() {
		let t = default_timing();
		assert_eq!(timeline(12, &t), timeline(12, &t));
	}

	#[test]
	fn cleanups_are_independent_of_complete() {
		// With the shipped constants the world-flash cleanup lands after the
		// complete transition; it must still be present as its own entry
		// rather than chained behind it.
		let run = timeline(5, &default_timing());
		let world = run
			.cues
			.iter()
			.find(|(_, c)| *c == Cue::WorldFlashClear)
			.expect("world flash cleanup scheduled");
		let impact = run
			.cues
			.iter()
			.find(|(_, c)| *c == Cue::ImpactClear)
			.expect("impact cleanup scheduled");
		assert_eq!(impact.0, run.flash_at + 500);
		assert_eq!(world.0, run.flash_at + 800);
		assert!(world.0 > run.complete_at);
	}

	#[test]
	fn empty_title_saturates_instead_of_underflowing() {
		let t = default_timing();
		let run = timeline(0, &t);
		assert_eq!(run.forge_end, t.buildup_ms + t.char_anim_ms);
		assert_eq!(timeline(1, &t).forge_end, run.forge_end);
	}

	#[test]
	fn tremor_bracket_sits_inside_the_run() {
		let run = timeline(8, &default_timing());
		let start = run.cues.iter().find(|(_, c)| *c == Cue::TremorStart).unwrap().0;
		let end = run.cues.iter().find(|(_, c)| *c == Cue::TremorEnd).unwrap().0;
		assert!(start < end);
		assert_eq!(end, run.flash_at - 100);
	}

	#[test]
	fn cue_phase_mapping() {
		assert_eq!(Cue::Activate.phase_after(), Some(ForgePhase::Active));
		assert_eq!(Cue::TremorStart.phase_after(), Some(ForgePhase::Tremor));
		assert_eq!(Cue::Forge.phase_after(), Some(ForgePhase::Forged));
		assert_eq!(Cue::ImpactStart.phase_after(), Some(ForgePhase::Impact));
		assert_eq!(Cue::Complete.phase_after(), Some(ForgePhase::Complete));
		assert_eq!(Cue::TremorEnd.phase_after(), None);
		assert_eq!(Cue::ImpactClear.phase_after(), None);
		assert_eq!(Cue::WorldFlashClear.phase_after(), None);
	}
}
