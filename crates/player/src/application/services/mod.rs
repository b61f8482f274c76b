//! Application services
//!
//! This module contains application services that implement use cases
//! for the Hero Story player. Services depend on port traits, not concrete
//! infrastructure implementations.

pub mod autosave;
pub mod profile_service;
mod records;
pub mod save_slot_service;
pub mod story_session;

pub use autosave::{spawn_autosave, AutosaveHandle, DEFAULT_AUTOSAVE_INTERVAL};
pub use profile_service::ProfileStore;
pub use save_slot_service::SaveSlotStore;
pub use story_session::{GameSession, NewStoryDetails, PlayerAction, SessionServices};
