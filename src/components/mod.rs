//! Page-level components.

pub mod effects;
