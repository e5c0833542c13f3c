//! AI backend test command

use anyhow::Result;
use penny_core::ai::{AIBackend, AIClient, DEFAULT_OLLAMA_HOST};

/// Categories used for the sample classification
const SAMPLE_CATEGORIES: &[&str] = &["Food & Dining", "Transport", "Shopping", "Other"];

/// Check backend health and run sample general-category classifications
pub async fn cmd_ollama_test(merchant: Option<&str>) -> Result<()> {
    println!("🔍 Testing AI backend connection...\n");

    let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());
    println!("  AI_BACKEND: {}", backend);
    if std::env::var("OLLAMA_HOST").is_err() && backend == "ollama" {
        println!(
            "  ⚠️  OLLAMA_HOST not set (defaulting to {})",
            DEFAULT_OLLAMA_HOST
        );
    }

    let client = AIClient::from_env();
    println!("  Host: {}", client.host());
    println!("  Model: {}", client.model());

    let router_info = client.router_info();
    for (task, model) in &router_info.task_models {
        println!("    {}: {}", task, model);
    }
    println!();

    print!("Checking backend availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not connect to {}", client.host());
        println!("\nTo set up Ollama:");
        println!("  1. Install Ollama: https://ollama.ai/download");
        println!("  2. Start the server: ollama serve");
        println!("  3. Pull the model: ollama pull {}", client.model());
        println!("  4. Set environment variable: export OLLAMA_HOST={}", client.host());
        return Ok(());
    }

    let samples: Vec<String> = match merchant {
        Some(m) => vec![m.to_string()],
        None => vec![
            "A multinational chain of coffeehouses".to_string(),
            "A fuel station selling petrol and diesel".to_string(),
            "An online marketplace for electronics and clothing".to_string(),
        ],
    };

    println!("\n📋 Testing general category classification...\n");
    println!("  Categories: {}\n", SAMPLE_CATEGORIES.join(", "));

    for description in &samples {
        print!("  \"{}\" → ", description);
        match client
            .classify_general_category(description, SAMPLE_CATEGORIES)
            .await
        {
            Ok(answer) => println!("{}", answer),
            Err(e) => println!("❌ Error: {}", e),
        }
    }

    println!("\n✅ AI backend test complete");

    Ok(())
}
