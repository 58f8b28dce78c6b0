//! Static content consumed by the combat resolution core.
//!
//! This crate houses concrete ability and condition records plus the
//! registry that serves them through the core's content oracle. Content is
//! registered once at startup and never appears in battle state.
pub mod registry;
pub mod resonance;
pub use registry::ContentRegistry;
