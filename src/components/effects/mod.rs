//! The visual-effects runtime.
//!
//! Three cooperating pieces with real temporal state, plus their glue:
//! - A fixed-size ambient [`particles::ParticlePool`] advanced by a
//!   delta-timed animation-frame loop and drawn to a canvas.
//! - A pooled visibility [`triggers`] abstraction deciding when effects
//!   fire, once or continuously.
//! - The [`forge`] sequencer: a content-length-derived, multi-phase timed
//!   reveal with independent cleanup timers and a reduced-motion bypass.
//!
//! Palette swaps flow through an explicit [`palette::PaletteBus`] owned by
//! the orchestrator; every tunable lives in [`config::EffectsConfig`].

mod component;
pub mod config;
pub(crate) mod decor;
pub(crate) mod dom;
pub mod forge;
pub mod palette;
pub mod particles;
mod render;
pub(crate) mod theme;
pub mod triggers;

pub use component::AmbientCanvas;
pub use config::EffectsConfig;
pub use palette::{Color, Palette, PaletteBus};
pub use particles::ParticlePool;
pub use triggers::{VisibilityWatcher, observe_live, observe_once};
