//! Leptos component wrapping the ambient particle canvas.
//!
//! The component renders a viewport-filling canvas and wires the simulation
//! into a `requestAnimationFrame` loop. The loop timestamps each frame and
//! hands the pool a `delta_frames` value normalized to the reference frame
//! interval, so physics speed is independent of the display refresh rate;
//! the pool clamps the delta, which also absorbs the oversized gap a
//! backgrounded tab reports on resume.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use super::config::ParticleConfig;
use super::dom;
use super::palette::{self, PaletteBus};
use super::particles::ParticlePool;
use super::render;

/// Renders the ambient particle field behind the page content.
///
/// If the canvas or its 2D context is unavailable the component is inert:
/// no pool is allocated and no loop starts.
#[component]
pub fn AmbientCanvas(
	/// Particle simulation parameters.
	cfg: ParticleConfig,
	/// Palette swap bus; the pool subscribes on mount.
	bus: Rc<PaletteBus>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let pool: Rc<RefCell<Option<ParticlePool>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (pool_init, animate_init, resize_cb_init) =
		(pool.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();
		let document = dom::document();

		let (w, h) = (
			window.inner_width().unwrap().as_f64().unwrap(),
			window.inner_height().unwrap().as_f64().unwrap(),
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|obj| obj.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				log::warn!("ambient canvas: no 2d context, effects disabled");
				return;
			}
		};

		let seed = js_sys::Date::now() as u64;
		let initial = palette::read_palette(&document);
		*pool_init.borrow_mut() = Some(ParticlePool::new(cfg.clone(), initial, w, h, seed));

		// Stylesheets may still be settling during mount; re-read the
		// palette once the first frame has been laid out.
		let pool_settle = pool_init.clone();
		dom::next_frame(move || {
			if let Some(pool) = pool_settle.borrow_mut().as_mut() {
				pool.set_palette(palette::read_palette(&dom::document()));
			}
		});

		let pool_swap = pool_init.clone();
		bus.subscribe(move |next| {
			if let Some(pool) = pool_swap.borrow_mut().as_mut() {
				pool.set_palette(*next);
			}
		});

		let (pool_resize, canvas_resize) = (pool_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let win: Window = web_sys::window().unwrap();
			let (nw, nh) = (
				win.inner_width().unwrap().as_f64().unwrap(),
				win.inner_height().unwrap().as_f64().unwrap(),
			);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(pool) = pool_resize.borrow_mut().as_mut() {
				pool.resize(nw, nh);
			}
		}));
		if let Some(cb) = resize_cb_init.borrow().as_ref() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let frame_interval = cfg.frame_interval_ms;
		let last_time = Rc::new(Cell::new(0.0_f64));
		let (pool_anim, animate_inner) = (pool_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			let delta_frames = (now - last_time.get()) / frame_interval;
			last_time.set(now);
			if let Some(pool) = pool_anim.borrow_mut().as_mut() {
				pool.tick(delta_frames);
				render::draw(&ctx, pool);
			}
			if let Some(cb) = animate_inner.borrow().as_ref() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(cb) = animate_init.borrow().as_ref() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="ambient-canvas"
			aria-hidden="true"
			style="position: fixed; inset: 0; pointer-events: none;"
		/>
	}
}
