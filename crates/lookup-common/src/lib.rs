//! Shared types and utilities for the lookup tool.

pub mod duration;
pub mod paths;
pub mod types;

pub use duration::*;
pub use paths::*;
pub use types::*;
