//! Infrastructure adapters for the player crate.

pub mod clock;
pub mod platform;
