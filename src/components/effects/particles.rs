//! Ambient particle simulation with arena-style object pooling.
//!
//! The pool allocates its fixed-size particle vector once; particles are
//! recycled in place when their fade cycle ends or they drift out of bounds,
//! so the per-frame path never allocates. Drawing lives in `render`; this
//! module is pure state and runs on any target.

use super::config::ParticleConfig;
use super::palette::{PALETTE_SIZE, Color, Palette};

/// Deterministic xorshift64 generator.
///
/// The web layer seeds it from the clock; tests seed it with constants.
#[derive(Clone, Debug)]
pub struct XorShift {
	state: u64,
}

impl XorShift {
	/// Create a generator from a seed (zero is remapped, the xorshift
	/// zero state is a fixed point).
	pub fn new(seed: u64) -> Self {
		Self { state: seed | 1 }
	}

	fn next(&mut self) -> u64 {
		let mut x = self.state;
		x ^= x << 13;
		x ^= x >> 7;
		x ^= x << 17;
		self.state = x;
		x
	}

	/// Uniform value in `[0, 1)`.
	pub fn next_f64(&mut self) -> f64 {
		(self.next() >> 11) as f64 / (1u64 << 53) as f64
	}

	/// Uniform value in `[lo, hi)`.
	pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
		lo + self.next_f64() * (hi - lo)
	}

	/// Uniform index in `0..len`.
	pub fn index(&mut self, len: usize) -> usize {
		(self.next_f64() * len as f64) as usize % len.max(1)
	}
}

/// A particle's fade direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecyclePhase {
	/// Opacity rising toward the midpoint.
	Growing,
	/// Opacity falling toward zero.
	Fading,
}

/// One pooled simulation entity, mutated in place for the page lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
	/// Horizontal position, viewport pixels.
	pub x: f64,
	/// Vertical position, viewport pixels.
	pub y: f64,
	/// Horizontal displacement per reference frame.
	pub vx: f64,
	/// Vertical displacement per reference frame.
	pub vy: f64,
	/// Radius in pixels, fixed for the current lifecycle.
	pub size: f64,
	/// Current opacity; clamped to [0, 1] at draw time only.
	pub opacity: f64,
	/// Opacity delta magnitude per reference frame.
	pub fade_speed: f64,
	/// Fade direction.
	pub phase: LifecyclePhase,
	/// Color copied by value from the palette at creation/reset.
	pub color: Color,
}

/// Fixed-cardinality particle pool.
pub struct ParticlePool {
	/// The arena. Length never changes after construction.
	pub particles: Vec<Particle>,
	cfg: ParticleConfig,
	palette: Palette,
	rng: XorShift,
	width: f64,
	height: f64,
}

impl ParticlePool {
	/// Allocate the pool and spawn every particle across the full viewport.
	pub fn new(cfg: ParticleConfig, palette: Palette, width: f64, height: f64, seed: u64) -> Self {
		let mut rng = XorShift::new(seed);
		let particles = (0..cfg.count)
			.map(|_| Self::spawn(&mut rng, &cfg, &palette, width, height))
			.collect();
		Self {
			particles,
			cfg,
			palette,
			rng,
			width,
			height,
		}
	}

	/// Viewport width the simulation is bounded to.
	pub fn width(&self) -> f64 {
		self.width
	}

	/// Viewport height the simulation is bounded to.
	pub fn height(&self) -> f64 {
		self.height
	}

	/// Pool parameters, shared with the drawing pass.
	pub fn config(&self) -> &ParticleConfig {
		&self.cfg
	}

	/// Initial spawn: position uniform over the whole viewport so the field
	/// does not start as a band at the bottom.
	fn spawn(
		rng: &mut XorShift,
		cfg: &ParticleConfig,
		palette: &Palette,
		width: f64,
		height: f64,
	) -> Particle {
		Particle {
			x: rng.range(0.0, width),
			y: rng.range(0.0, height),
			vx: rng.range(cfg.drift_x.0, cfg.drift_x.1),
			vy: rng.range(cfg.drift_y.0, cfg.drift_y.1),
			size: rng.range(cfg.size_range.0, cfg.size_range.1),
			opacity: rng.range(cfg.spawn_opacity.0, cfg.spawn_opacity.1),
			fade_speed: rng.range(cfg.fade_range.0, cfg.fade_range.1),
			phase: LifecyclePhase::Growing,
			color: palette.get(rng.index(PALETTE_SIZE)),
		}
	}

	/// The single reset routine: both the faded-out and the out-of-bounds
	/// exits route through here. Respawns biased to the lower band of the
	/// viewport with a small seed opacity.
	fn reset(
		p: &mut Particle,
		rng: &mut XorShift,
		cfg: &ParticleConfig,
		palette: &Palette,
		width: f64,
		height: f64,
	) {
		p.x = rng.range(0.0, width);
		p.y = rng.range(height * cfg.reset_band, height);
		p.vx = rng.range(cfg.drift_x.0, cfg.drift_x.1);
		p.vy = rng.range(cfg.drift_y.0, cfg.drift_y.1);
		p.size = rng.range(cfg.size_range.0, cfg.size_range.1);
		p.opacity = cfg.reset_opacity;
		p.fade_speed = rng.range(cfg.fade_range.0, cfg.fade_range.1);
		p.phase = LifecyclePhase::Growing;
		p.color = palette.get(rng.index(PALETTE_SIZE));
	}

	/// Advance every particle by `delta_frames` reference-frame units.
	///
	/// The delta is clamped before use; a tab resuming from the background
	/// hands us elapsed hours and must produce the same bounded step as the
	/// clamp maximum.
	pub fn tick(&mut self, delta_frames: f64) {
		let dt = if delta_frames.is_finite() {
			delta_frames.clamp(self.cfg.delta_min, self.cfg.delta_max)
		} else {
			self.cfg.delta_max
		};

		let Self {
			particles,
			cfg,
			palette,
			rng,
			width,
			height,
		} = self;
		let (w, h) = (*width, *height);

		for p in particles.iter_mut() {
			p.x += p.vx * dt;
			p.y += p.vy * dt;

			match p.phase {
				LifecyclePhase::Growing => {
					p.opacity += p.fade_speed * dt;
					if p.opacity >= cfg.fade_midpoint {
						p.phase = LifecyclePhase::Fading;
					}
				}
				LifecyclePhase::Fading => {
					p.opacity -= p.fade_speed * dt;
					if p.opacity <= 0.0 {
						Self::reset(p, rng, cfg, palette, w, h);
						continue;
					}
				}
			}

			// Upward drift means the vertical exit is the top edge; sideways
			// exits are symmetric.
			if p.y < -cfg.edge_margin || p.x < -cfg.edge_margin || p.x > w + cfg.edge_margin {
				Self::reset(p, rng, cfg, palette, w, h);
			}
		}
	}

	/// Swap the palette and re-sample every live particle's color once.
	/// No other field changes: fades and positions continue uninterrupted.
	pub fn set_palette(&mut self, palette: Palette) {
		self.palette = palette;
		let Self {
			particles,
			palette,
			rng,
			..
		} = self;
		for p in particles.iter_mut() {
			p.color = palette.get(rng.index(PALETTE_SIZE));
		}
	}

	/// Rescale to a new viewport, carrying positions proportionally.
	pub fn resize(&mut self, width: f64, height: f64) {
		if self.width > 0.0 && self.height > 0.0 {
			let (sx, sy) = (width / self.width, height / self.height);
			for p in &mut self.particles {
				p.x *= sx;
				p.y *= sy;
			}
		}
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn test_palette() -> Palette {
		Palette::new([
			Color::rgb(10, 0, 0),
			Color::rgb(0, 20, 0),
			Color::rgb(0, 0, 30),
		])
	}

	fn pool(seed: u64) -> ParticlePool {
		ParticlePool::new(ParticleConfig::default(), test_palette(), 800.0, 600.0, seed)
	}

	#[test]
	fn pool_cardinality_is_stable() {
		let mut pool = pool(7);
		let before = pool.particles.len();
		for _ in 0..5_000 {
			pool.tick(1.0);
		}
		assert_eq!(pool.particles.len(), before);
	}

	#[test]
	fn opacity_and_position_stay_bounded_and_finite() {
		let mut pool = pool(21);
		let cfg = pool.config().clone();
		let eps = cfg.fade_range.1 * cfg.delta_max;
		for step in 0..10_000 {
			pool.tick(if step % 7 == 0 { 2.5 } else { 0.6 });
			for p in &pool.particles {
				assert!(p.opacity.is_finite());
				assert!(p.x.is_finite() && p.y.is_finite());
				assert!(p.opacity >= 0.0, "opacity {} below zero", p.opacity);
				assert!(p.opacity <= 1.0 + eps, "opacity {} over bound", p.opacity);
			}
		}
	}

	#[test]
	fn huge_delta_matches_clamp_maximum() {
		let mut a = pool(99);
		let mut b = pool(99);
		a.tick(1.0e9);
		b.tick(b.config().delta_max);
		assert_eq!(a.particles, b.particles);
	}

	#[test]
	fn non_finite_delta_is_absorbed() {
		let mut pool = pool(5);
		pool.tick(f64::NAN);
		pool.tick(f64::INFINITY);
		for p in &pool.particles {
			assert!(p.x.is_finite() && p.y.is_finite() && p.opacity.is_finite());
		}
	}

	#[test]
	fn growing_flips_to_fading_at_midpoint() {
		let mut pool = pool(3);
		let midpoint = pool.config().fade_midpoint;
		pool.particles[0].opacity = midpoint - 1.0e-4;
		pool.particles[0].phase = LifecyclePhase::Growing;
		// Pin it inside bounds so the edge exit cannot mask the flip.
		pool.particles[0].x = 400.0;
		pool.particles[0].y = 300.0;
		pool.particles[0].vx = 0.0;
		pool.particles[0].vy = 0.0;
		pool.tick(1.0);
		assert_eq!(pool.particles[0].phase, LifecyclePhase::Fading);
	}

	#[test]
	fn faded_out_particle_resets_into_lower_band() {
		let mut pool = pool(11);
		let cfg = pool.config().clone();
		pool.particles[0].opacity = 1.0e-6;
		pool.particles[0].phase = LifecyclePhase::Fading;
		pool.particles[0].x = 400.0;
		pool.particles[0].y = 300.0;
		pool.particles[0].vx = 0.0;
		pool.particles[0].vy = 0.0;
		pool.tick(1.0);
		let p = &pool.particles[0];
		assert_eq!(p.phase, LifecyclePhase::Growing);
		assert_eq!(p.opacity, cfg.reset_opacity);
		assert!(p.y >= pool.height() * cfg.reset_band && p.y <= pool.height());
	}

	#[test]
	fn top_exit_resets_immediately() {
		let mut pool = pool(13);
		pool.particles[0].y = -pool.config().edge_margin - 5.0;
		pool.particles[0].vy = 0.0;
		pool.particles[0].vx = 0.0;
		pool.particles[0].opacity = 0.3;
		pool.tick(0.1);
		assert!(pool.particles[0].y >= 0.0);
		assert_eq!(pool.particles[0].opacity, pool.config().reset_opacity);
	}

	#[test]
	fn palette_swap_recolors_without_disturbing_motion() {
		let mut pool = pool(17);
		let snapshot: Vec<_> = pool
			.particles
			.iter()
			.map(|p| (p.x, p.y, p.opacity, p.phase, p.size))
			.collect();
		let next = Palette::new([
			Color::rgb(200, 0, 0),
			Color::rgb(0, 200, 0),
			Color::rgb(0, 0, 200),
		]);
		pool.set_palette(next);
		for (p, before) in pool.particles.iter().zip(&snapshot) {
			assert!(next.contains(p.color));
			assert_eq!((p.x, p.y, p.opacity, p.phase, p.size), *before);
		}
	}

	#[test]
	fn particle_colors_are_copies_not_references() {
		let pool = pool(29);
		let held: Vec<_> = pool.particles.iter().map(|p| p.color).collect();
		// Replacing the pool's palette elsewhere cannot touch these copies;
		// Color is a value type, so the held snapshot is the proof.
		for (p, c) in pool.particles.iter().zip(&held) {
			assert_eq!(p.color, *c);
		}
	}

	#[test]
	fn resize_scales_positions_proportionally() {
		let mut pool = pool(31);
		pool.particles[0].x = 400.0;
		pool.particles[0].y = 300.0;
		pool.resize(1600.0, 300.0);
		assert_eq!(pool.particles[0].x, 800.0);
		assert_eq!(pool.particles[0].y, 150.0);
		assert_eq!(pool.width(), 1600.0);
		assert_eq!(pool.height(), 300.0);
	}
}
