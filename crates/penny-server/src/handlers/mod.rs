//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod classify;
pub mod health;
pub mod suggestions;

// Re-export all handlers for use in router
pub use classify::*;
pub use health::*;
pub use suggestions::*;
