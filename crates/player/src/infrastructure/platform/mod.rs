//! Platform-specific implementations
//!
//! This module provides implementations of the storage port defined in
//! ports/outbound/platform.rs.

mod desktop;

pub mod mock;

pub use desktop::{create_platform, DesktopStorageProvider};
pub use mock::{MemoryStorageProvider, UnavailableStorageProvider};

