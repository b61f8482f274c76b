//! Hero Story player crate.
//!
//! Save slots, profile records, story sessions and autosave over a durable
//! key-value medium. UI layers call into [`application::services`].

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod state;

pub use application::services::{
    spawn_autosave, AutosaveHandle, GameSession, NewStoryDetails, PlayerAction, ProfileStore,
    SaveSlotStore, SessionServices,
};
pub use application::{SaveError, SessionError};
pub use config::PlayerConfig;
pub use state::Platform;
