//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bundled taxonomy, relative to the repository root
pub const DEFAULT_TAXONOMY: &str = "data/taxonomy.json";

/// Penny - Classify merchants and suggest goal-aligned alternatives
#[derive(Parser)]
#[command(name = "penny")]
#[command(about = "Merchant classification and spending advice service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Taxonomy JSON file (relative to the working directory)
        #[arg(long, env = "PENNY_TAXONOMY", default_value = DEFAULT_TAXONOMY)]
        taxonomy: PathBuf,
    },

    /// Classify a merchant and print the result as JSON
    Classify {
        /// Merchant name (e.g. "Starbucks")
        merchant: String,

        /// Taxonomy JSON file (relative to the working directory)
        #[arg(long, env = "PENNY_TAXONOMY", default_value = DEFAULT_TAXONOMY)]
        taxonomy: PathBuf,
    },

    /// Generate alternatives for a transaction and print them as JSON
    Suggest {
        #[arg(long)]
        merchant: String,

        /// Merchant description (usually from `penny classify`)
        #[arg(long, default_value = "")]
        description: String,

        /// General category
        #[arg(long)]
        category: String,

        #[arg(long)]
        subcategory: String,

        /// Savings goal in free text
        #[arg(long)]
        goal: String,

        /// Monthly income in rupees (must be positive)
        #[arg(long, allow_negative_numbers = true)]
        income: i64,
    },

    /// Validate and print the taxonomy tree
    Taxonomy {
        /// Taxonomy JSON file (relative to the working directory)
        #[arg(long, env = "PENNY_TAXONOMY", default_value = DEFAULT_TAXONOMY)]
        taxonomy: PathBuf,
    },

    /// Manage AI prompts (list, show, path)
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Test the AI backend connection
    Ollama {
        #[command(subcommand)]
        action: OllamaAction,
    },
}

#[derive(Subcommand)]
pub enum OllamaAction {
    /// Check backend health and run a sample classification
    Test {
        /// Merchant to classify instead of the built-in samples
        #[arg(long)]
        merchant: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., classify_general_category, beautify_suggestion)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}
