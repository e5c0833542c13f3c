//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `classify` - Run the classification pipeline for one merchant
//! - `ollama` - AI backend connection test
//! - `prompts` - Prompt library management commands
//! - `serve` - Web server command
//! - `suggest` - Run the suggestion pipeline for one transaction
//! - `taxonomy` - Taxonomy validation and listing

pub mod classify;
pub mod ollama;
pub mod prompts;
pub mod serve;
pub mod suggest;
pub mod taxonomy;

// Re-export command functions for main.rs
pub use classify::*;
pub use ollama::*;
pub use prompts::*;
pub use serve::*;
pub use suggest::*;
pub use taxonomy::*;

use std::path::Path;

use anyhow::{Context, Result};
use penny_core::Taxonomy;

/// Load the taxonomy file, with the path in the error message
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy> {
    Taxonomy::from_path(path)
        .with_context(|| format!("Failed to load taxonomy from {}", path.display()))
}
