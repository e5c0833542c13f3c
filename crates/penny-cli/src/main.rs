//! Penny CLI - Merchant classification and spending advice
//!
//! Usage:
//!   penny serve --port 8000          Start web server
//!   penny classify "Starbucks"       Classify one merchant
//!   penny taxonomy                   Validate and print the taxonomy

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the environment may already be set
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Serve {
            port,
            host,
            taxonomy,
        } => commands::cmd_serve(&taxonomy, &host, port).await,
        Commands::Classify { merchant, taxonomy } => {
            commands::cmd_classify(&taxonomy, &merchant).await
        }
        Commands::Suggest {
            merchant,
            description,
            category,
            subcategory,
            goal,
            income,
        } => {
            let request = penny_core::SuggestionRequest {
                merchant,
                description,
                category,
                subcategory,
                goal,
                income,
            };
            commands::cmd_suggest(&request).await
        }
        Commands::Taxonomy { taxonomy } => commands::cmd_taxonomy(&taxonomy),
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Ollama { action } => match action {
            OllamaAction::Test { merchant } => {
                commands::cmd_ollama_test(merchant.as_deref()).await
            }
        },
    }
}
