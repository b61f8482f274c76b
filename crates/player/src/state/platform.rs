//! Platform DI Container
//!
//! This module provides the `Platform` struct - a dependency injection container
//! that aggregates the platform-specific service implementations behind port traits.
//!
//! Usage:
//! - Created by `create_platform()` in infrastructure/platform/desktop.rs
//! - Handed to application services, which keep only the ports they need

use std::sync::Arc;

use crate::ports::outbound::{ClockPort, StorageProvider};

/// Unified platform services container
#[derive(Clone)]
pub struct Platform {
    storage: Arc<dyn StorageProvider>,
    clock: Arc<dyn ClockPort>,
}

impl Platform {
    pub fn new<S, C>(storage: S, clock: C) -> Self
    where
        S: StorageProvider + 'static,
        C: ClockPort + 'static,
    {
        Self {
            storage: Arc::new(storage),
            clock: Arc::new(clock),
        }
    }

    pub fn storage(&self) -> Arc<dyn StorageProvider> {
        Arc::clone(&self.storage)
    }

    pub fn clock(&self) -> Arc<dyn ClockPort> {
        Arc::clone(&self.clock)
    }
}
