//! Common utility functions shared by the domain and player crates.
//!
//! # Design Principles
//!
//! - **Pure functions only** - no side effects, no I/O
//! - **Minimal dependencies** - only chrono for datetime utilities

pub mod datetime;
pub mod string;

// Re-export commonly used functions at crate root for convenience
pub use datetime::{datetime_from_millis, format_day_month_year};
pub use string::{none_if_empty, truncate_with_ellipsis};
