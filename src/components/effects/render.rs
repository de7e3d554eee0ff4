//! Canvas drawing for the particle pool.
//!
//! Each particle is two filled circles: a low-opacity halo at a multiple of
//! its radius, then the core at its own radius, drawn in pool order after the
//! surface is cleared for the frame.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::particles::ParticlePool;

/// Draw one frame of the pool.
pub fn draw(ctx: &CanvasRenderingContext2d, pool: &ParticlePool) {
	let cfg = pool.config();
	ctx.clear_rect(0.0, 0.0, pool.width(), pool.height());

	for p in &pool.particles {
		let alpha = p.opacity.clamp(0.0, 1.0);

		ctx.set_fill_style_str(&p.color.css_alpha(alpha * cfg.halo_alpha));
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, p.size * cfg.halo_scale, 0.0, PI * 2.0);
		ctx.fill();

		ctx.set_fill_style_str(&p.color.css_alpha(alpha));
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, p.size, 0.0, PI * 2.0);
		ctx.fill();
	}
}
