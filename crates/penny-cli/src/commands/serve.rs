//! Server command implementation

use std::path::Path;

use anyhow::Result;
use penny_server::ServerConfig;

use super::load_taxonomy;

pub async fn cmd_serve(taxonomy_path: &Path, host: &str, port: u16) -> Result<()> {
    let taxonomy = load_taxonomy(taxonomy_path)?;
    let config = ServerConfig::from_env();

    println!("🚀 Starting Penny web server...");
    println!("   Taxonomy: {}", taxonomy_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if config.allowed_origins.is_empty() {
        println!("   CORS: any origin");
    } else {
        println!(
            "   CORS: {} (PENNY_ALLOWED_ORIGINS)",
            config.allowed_origins.join(", ")
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    penny_server::serve_with_config(taxonomy, host, port, config).await?;

    Ok(())
}
