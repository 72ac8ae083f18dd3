//! Application-level utilities for the Media Diary CLI.
//!
//! This module provides:
//! - Path resolution for config, store and session files
//! - The lazily-configured application context

mod context;
mod resolver;

// Re-export public API
pub use context::{AppContext, DiaryStore};
pub use resolver::{missing_config_error, resolve_config_path};
