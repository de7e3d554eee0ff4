//! Runtime configuration for the effects engine.
//!
//! Every tunable the engine uses lives here with its shipped default, so a
//! host page can override any subset via a JSON `<script id="effects-config">`
//! element without touching the crate. Missing fields fall back to defaults.

use serde::Deserialize;

/// Particle simulation and drawing parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
	/// Fixed pool cardinality; never changes after startup.
	pub count: usize,
	/// Nominal time between display refreshes, used to normalize physics
	/// to `delta_frames` units (16.667 ms ≈ 60 Hz).
	pub frame_interval_ms: f64,
	/// Lower clamp on `delta_frames` per tick.
	pub delta_min: f64,
	/// Upper clamp on `delta_frames` per tick. Keeps a resumed background
	/// tab from teleporting particles across the viewport.
	pub delta_max: f64,
	/// Particle radius range in pixels, `(min, max)`.
	pub size_range: (f64, f64),
	/// Horizontal drift range in pixels per reference frame.
	pub drift_x: (f64, f64),
	/// Vertical drift range in pixels per reference frame. Negative values
	/// drift upward.
	pub drift_y: (f64, f64),
	/// Per-frame opacity delta range, `(min, max)`.
	pub fade_range: (f64, f64),
	/// Opacity range particles spawn with at pool creation.
	pub spawn_opacity: (f64, f64),
	/// Opacity at which a growing particle flips to fading.
	pub fade_midpoint: f64,
	/// Opacity a recycled particle restarts from.
	pub reset_opacity: f64,
	/// Fraction of viewport height excluded from the top when a particle
	/// respawns: 0.3 biases respawns to the lower 70%.
	pub reset_band: f64,
	/// How far outside the viewport a particle may travel before recycling.
	pub edge_margin: f64,
	/// Halo radius as a multiple of the particle radius.
	pub halo_scale: f64,
	/// Halo alpha as a fraction of the core alpha.
	pub halo_alpha: f64,
}

impl Default for ParticleConfig {
	fn default() -> Self {
		Self {
			count: 35,
			frame_interval_ms: 16.667,
			delta_min: 0.1,
			delta_max: 3.0,
			size_range: (0.5, 3.0),
			drift_x: (-0.15, 0.15),
			drift_y: (-0.4, -0.1),
			fade_range: (0.001, 0.004),
			spawn_opacity: (0.1, 0.4),
			fade_midpoint: 0.5,
			reset_opacity: 0.05,
			reset_band: 0.3,
			edge_margin: 10.0,
			halo_scale: 3.0,
			halo_alpha: 0.15,
		}
	}
}

/// Timing constants for the forge reveal choreography, all in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ForgeTiming {
	/// Delay between successive character reveals.
	pub stagger_ms: u32,
	/// Length of one character's reveal animation.
	pub char_anim_ms: u32,
	/// Initial delay before the character stagger begins.
	pub buildup_ms: u32,
	/// Pause between the last character settling and the flash.
	pub flash_gap_ms: u32,
	/// Length of the impact phase (flash to complete).
	pub impact_ms: u32,
	/// Lead-in before the tremor starts, and lead-out before the flash.
	pub tremor_lead_ms: u32,
	/// Offset past the flash at which the impact visuals clear.
	pub impact_clear_ms: u32,
	/// Offset past the flash at which the page-wide pulse clears.
	pub world_flash_clear_ms: u32,
}

impl Default for ForgeTiming {
	fn default() -> Self {
		Self {
			stagger_ms: 70,
			char_anim_ms: 500,
			buildup_ms: 400,
			flash_gap_ms: 200,
			impact_ms: 600,
			tremor_lead_ms: 100,
			impact_clear_ms: 500,
			world_flash_clear_ms: 800,
		}
	}
}

/// Visible-fraction thresholds per trigger use site.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TriggerThresholds {
	/// Shake-on-view decorations.
	pub shake: f64,
	/// Typewriter decorations.
	pub typed: f64,
	/// Section progress dots (live tracking).
	pub sections: f64,
	/// Forge reveal containers.
	pub forge: f64,
}

impl Default for TriggerThresholds {
	fn default() -> Self {
		Self {
			shake: 0.8,
			typed: 0.5,
			sections: 0.3,
			forge: 0.4,
		}
	}
}

/// Complete engine configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
	/// Particle pool parameters.
	pub particles: ParticleConfig,
	/// Forge reveal timings.
	pub forge: ForgeTiming,
	/// Visibility thresholds.
	pub triggers: TriggerThresholds,
	/// Delay between typewriter steps.
	pub type_speed_ms: u32,
	/// How long a shake decoration stays applied.
	pub shake_clear_ms: u32,
}

impl Default for EffectsConfig {
	fn default() -> Self {
		Self {
			particles: ParticleConfig::default(),
			forge: ForgeTiming::default(),
			triggers: TriggerThresholds::default(),
			type_speed_ms: 30,
			shake_clear_ms: 500,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_shipped_constants() {
		let cfg = EffectsConfig::default();
		assert_eq!(cfg.particles.count, 35);
		assert_eq!(cfg.particles.delta_max, 3.0);
		assert_eq!(cfg.forge.stagger_ms, 70);
		assert_eq!(cfg.forge.char_anim_ms, 500);
		assert_eq!(cfg.forge.buildup_ms, 400);
		assert_eq!(cfg.forge.flash_gap_ms, 200);
		assert_eq!(cfg.forge.impact_ms, 600);
		assert_eq!(cfg.triggers.shake, 0.8);
		assert_eq!(cfg.triggers.typed, 0.5);
		assert_eq!(cfg.triggers.sections, 0.3);
		assert_eq!(cfg.triggers.forge, 0.4);
	}

	#[test]
	fn partial_override_keeps_other_defaults() {
		let cfg: EffectsConfig =
			serde_json::from_str(r#"{ "particles": { "count": 12 }, "forge": { "stagger_ms": 90 } }"#)
				.unwrap();
		assert_eq!(cfg.particles.count, 12);
		assert_eq!(cfg.particles.frame_interval_ms, 16.667);
		assert_eq!(cfg.forge.stagger_ms, 90);
		assert_eq!(cfg.forge.buildup_ms, 400);
	}
}
