//! Theme-sourced effect colors and the palette change bus.
//!
//! The active theme exposes its three effect colors as CSS custom properties
//! (`--particle-1-r` .. `--particle-3-b`) on the body. [`read_palette`]
//! snapshots them into a [`Palette`]; particles copy single entries by value,
//! so a palette swap never retroactively recolors an in-flight particle.

use std::cell::RefCell;

use web_sys::{CssStyleDeclaration, Document};

/// Number of effect colors a theme provides.
pub const PALETTE_SIZE: usize = 3;

/// An RGB triple in 0..=255 channel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
}

impl Color {
	/// Construct from channel values.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	/// CSS `rgba()` string with the given alpha, for canvas fill styles.
	pub fn css_alpha(self, a: f64) -> String {
		format!("rgba({},{},{},{})", self.r, self.g, self.b, a)
	}
}

impl Default for Color {
	fn default() -> Self {
		Self::rgb(0, 0, 0)
	}
}

/// The current theme's effect colors, replaced wholesale on theme change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Palette {
	colors: [Color; PALETTE_SIZE],
}

impl Palette {
	/// Build a palette from its three entries.
	pub const fn new(colors: [Color; PALETTE_SIZE]) -> Self {
		Self { colors }
	}

	/// Entry at `index`, wrapping past the end.
	pub fn get(&self, index: usize) -> Color {
		self.colors[index % PALETTE_SIZE]
	}

	/// Whether `color` is one of this palette's entries.
	pub fn contains(&self, color: Color) -> bool {
		self.colors.contains(&color)
	}
}

/// Parse one CSS custom-property value as a color channel.
///
/// Anything malformed, missing, or non-finite coerces to 0 so a broken theme
/// sheet can never push `NaN` into the drawing calls.
fn parse_channel(raw: &str) -> u8 {
	raw.trim()
		.parse::<f64>()
		.ok()
		.filter(|n| n.is_finite())
		.map(|n| n.clamp(0.0, 255.0) as u8)
		.unwrap_or(0)
}

fn channel(style: &CssStyleDeclaration, name: &str) -> u8 {
	style
		.get_property_value(name)
		.map(|v| parse_channel(&v))
		.unwrap_or(0)
}

/// Snapshot the active theme's effect colors from the body's computed style.
///
/// A missing body or unavailable computed style yields an all-black palette
/// rather than an error; the particles keep running, just invisibly tinted.
pub fn read_palette(document: &Document) -> Palette {
	let style = document
		.body()
		.and_then(|body| {
			document
				.default_view()
				.and_then(|w| w.get_computed_style(&body).ok().flatten())
		});
	let Some(style) = style else {
		return Palette::default();
	};

	let mut colors = [Color::default(); PALETTE_SIZE];
	for (i, slot) in colors.iter_mut().enumerate() {
		let n = i + 1;
		*slot = Color::rgb(
			channel(&style, &format!("--particle-{n}-r")),
			channel(&style, &format!("--particle-{n}-g")),
			channel(&style, &format!("--particle-{n}-b")),
		);
	}
	Palette::new(colors)
}

/// Publish/subscribe list for palette swaps, owned by the orchestrator.
///
/// Handlers are registered once at construction time and invoked
/// synchronously, in registration order, after each theme change.
#[derive(Default)]
pub struct PaletteBus {
	handlers: RefCell<Vec<Box<dyn Fn(&Palette)>>>,
}

impl PaletteBus {
	/// Create an empty bus.
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a swap handler.
	pub fn subscribe(&self, handler: impl Fn(&Palette) + 'static) {
		self.handlers.borrow_mut().push(Box::new(handler));
	}

	/// Invoke every handler with the freshly read palette.
	pub fn publish(&self, palette: &Palette) {
		for handler in self.handlers.borrow().iter() {
			handler(palette);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;

	#[test]
	fn channel_parsing_coerces_garbage_to_zero() {
		assert_eq!(parse_channel("138"), 138);
		assert_eq!(parse_channel("  42 "), 42);
		assert_eq!(parse_channel("120.7"), 120);
		assert_eq!(parse_channel("999"), 255);
		assert_eq!(parse_channel(""), 0);
		assert_eq!(parse_channel("teal"), 0);
		assert_eq!(parse_channel("NaN"), 0);
	}

	#[test]
	fn palette_get_wraps() {
		let p = Palette::new([
			Color::rgb(1, 0, 0),
			Color::rgb(0, 2, 0),
			Color::rgb(0, 0, 3),
		]);
		assert_eq!(p.get(0), Color::rgb(1, 0, 0));
		assert_eq!(p.get(4), Color::rgb(0, 2, 0));
	}

	#[test]
	fn css_alpha_format() {
		assert_eq!(Color::rgb(10, 20, 30).css_alpha(0.5), "rgba(10,20,30,0.5)");
	}

	#[test]
	fn bus_invokes_handlers_in_order() {
		let bus = PaletteBus::new();
		let calls = Rc::new(Cell::new(0u32));
		for expected in 0..3u32 {
			let calls = Rc::clone(&calls);
			bus.subscribe(move |_| {
				assert_eq!(calls.get() % 3, expected);
				calls.set(calls.get() + 1);
			});
		}
		let p = Palette::default();
		bus.publish(&p);
		bus.publish(&p);
		assert_eq!(calls.get(), 6);
	}
}
