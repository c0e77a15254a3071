//! Utility functions and helpers

pub mod time;

pub use time::{current_minute, truncate_to_minute};
