//! Application layer: slot persistence, profile persistence, story sessions
//! and autosave, all written against the outbound ports.

pub mod error;
pub mod services;

pub use error::{SaveError, SessionError};
