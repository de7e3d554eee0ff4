//! Property sweep over the particle pool: whatever the frame deltas, the
//! pool keeps its cardinality, every field stays finite, and opacity stays
//! inside its documented bound.

#![cfg(not(target_arch = "wasm32"))]

use aether_fx::components::effects::config::ParticleConfig;
use aether_fx::components::effects::palette::{Color, Palette};
use aether_fx::components::effects::particles::ParticlePool;
use proptest::prelude::*;

fn palette() -> Palette {
	Palette::new([
		Color::rgb(94, 129, 172),
		Color::rgb(129, 161, 193),
		Color::rgb(100, 148, 160),
	])
}

proptest! {
	#[test]
	fn pool_survives_arbitrary_tick_sequences(
		seed in any::<u64>(),
		deltas in prop::collection::vec(0.0f64..500.0, 1..300),
	) {
		let cfg = ParticleConfig::default();
		let eps = cfg.fade_range.1 * cfg.delta_max;
		let mut pool = ParticlePool::new(cfg, palette(), 1280.0, 720.0, seed);
		let count = pool.particles.len();

		for dt in deltas {
			pool.tick(dt);
			prop_assert_eq!(pool.particles.len(), count);
			for p in &pool.particles {
				prop_assert!(p.x.is_finite() && p.y.is_finite());
				prop_assert!(p.opacity.is_finite());
				prop_assert!(p.opacity >= 0.0);
				prop_assert!(p.opacity <= 1.0 + eps);
				prop_assert!(p.size.is_finite() && p.size > 0.0);
			}
		}
	}

	#[test]
	fn oversized_deltas_collapse_to_the_clamp(
		seed in any::<u64>(),
		excess in 4.0f64..1.0e12,
	) {
		let cfg = ParticleConfig::default();
		let max = cfg.delta_max;
		let mut clamped = ParticlePool::new(cfg.clone(), palette(), 1280.0, 720.0, seed);
		let mut oversized = ParticlePool::new(cfg, palette(), 1280.0, 720.0, seed);

		clamped.tick(max);
		oversized.tick(excess);
		prop_assert_eq!(&clamped.particles, &oversized.particles);
	}

	#[test]
	fn palette_swaps_never_touch_motion_state(
		seed in any::<u64>(),
		steps in 1usize..50,
	) {
		let mut pool =
			ParticlePool::new(ParticleConfig::default(), palette(), 1280.0, 720.0, seed);
		for _ in 0..steps {
			pool.tick(1.0);
		}
		let motion: Vec<_> = pool
			.particles
			.iter()
			.map(|p| (p.x, p.y, p.vx, p.vy, p.opacity, p.phase))
			.collect();

		let swapped = Palette::new([
			Color::rgb(180, 120, 100),
			Color::rgb(170, 130, 95),
			Color::rgb(185, 145, 110),
		]);
		pool.set_palette(swapped);

		for (p, before) in pool.particles.iter().zip(&motion) {
			prop_assert!(swapped.contains(p.color));
			prop_assert_eq!((p.x, p.y, p.vx, p.vy, p.opacity, p.phase), *before);
		}
	}
}
