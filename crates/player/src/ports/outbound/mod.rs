//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing application services to interact with the storage medium, the clock
//! and the text generator without depending on concrete implementations.

pub mod platform;
pub mod story_generator;

pub use platform::{storage_keys, ClockPort, StorageError, StorageProvider};
pub use story_generator::{
    GenerationError, GenerationRequest, GenerationResult, StoryGenerator, WorldDescriptors,
};

#[cfg(test)]
pub use platform::MockClockPort;
#[cfg(test)]
pub use story_generator::MockStoryGenerator;
