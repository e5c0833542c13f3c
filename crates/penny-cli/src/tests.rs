//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use clap::Parser;
use penny_core::{
    AIClient, MockBackend, MockSearchProvider, SearchClient, SuggestionRequest, Taxonomy,
};

use crate::cli::{Cli, Commands, OllamaAction, PromptsAction, DEFAULT_TAXONOMY};
use crate::commands::{self, classify_with, render_taxonomy, suggest_with};

const TAXONOMY: &str = r#"{
    "Food & Dining": {
        "Coffee Shop": {"code": 5814, "description": "Fast food restaurants and coffee shops", "need": "Want"}
    },
    "Transport": {
        "Fuel": {"code": 5541, "description": "Service stations", "need": "Need"}
    },
    "Other": {}
}"#;

fn write_taxonomy(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn request(income: i64) -> SuggestionRequest {
    SuggestionRequest {
        merchant: "Starbucks".to_string(),
        description: "Daily latte".to_string(),
        category: "Food & Dining".to_string(),
        subcategory: "Coffee Shop".to_string(),
        goal: "Save for a bike".to_string(),
        income,
    }
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_serve_defaults() {
    let cli = Cli::try_parse_from(["penny", "serve"]).unwrap();
    match cli.command {
        Commands::Serve {
            port,
            host,
            taxonomy,
        } => {
            assert_eq!(port, 8000);
            assert_eq!(host, "127.0.0.1");
            if std::env::var_os("PENNY_TAXONOMY").is_none() {
                assert_eq!(taxonomy, std::path::PathBuf::from(DEFAULT_TAXONOMY));
            }
        }
        _ => panic!("expected serve"),
    }
}

#[test]
fn test_parse_serve_overrides() {
    let cli = Cli::try_parse_from([
        "penny",
        "serve",
        "--port",
        "9000",
        "--host",
        "0.0.0.0",
        "--taxonomy",
        "data/taxonomy.json",
        "-v",
    ])
    .unwrap();
    assert!(cli.verbose);
    match cli.command {
        Commands::Serve {
            port,
            host,
            taxonomy,
        } => {
            assert_eq!(port, 9000);
            assert_eq!(host, "0.0.0.0");
            assert_eq!(taxonomy.to_str(), Some("data/taxonomy.json"));
        }
        _ => panic!("expected serve"),
    }
}

#[test]
fn test_parse_classify_merchant() {
    let cli = Cli::try_parse_from(["penny", "classify", "Starbucks"]).unwrap();
    match cli.command {
        Commands::Classify { merchant, .. } => assert_eq!(merchant, "Starbucks"),
        _ => panic!("expected classify"),
    }
}

#[test]
fn test_parse_suggest_accepts_negative_income() {
    // Rejected later by validation, not by the parser
    let cli = Cli::try_parse_from([
        "penny",
        "suggest",
        "--merchant",
        "Starbucks",
        "--category",
        "Food & Dining",
        "--subcategory",
        "Coffee Shop",
        "--goal",
        "Save",
        "--income",
        "-5",
    ])
    .unwrap();
    match cli.command {
        Commands::Suggest {
            income,
            description,
            ..
        } => {
            assert_eq!(income, -5);
            assert_eq!(description, "");
        }
        _ => panic!("expected suggest"),
    }
}

#[test]
fn test_parse_suggest_requires_income() {
    let result = Cli::try_parse_from([
        "penny",
        "suggest",
        "--merchant",
        "Starbucks",
        "--category",
        "Food & Dining",
        "--subcategory",
        "Coffee Shop",
        "--goal",
        "Save",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_parse_prompts_and_ollama() {
    let cli = Cli::try_parse_from(["penny", "prompts", "show", "beautify_suggestion"]).unwrap();
    match cli.command {
        Commands::Prompts {
            action: Some(PromptsAction::Show { prompt_id }),
        } => assert_eq!(prompt_id, "beautify_suggestion"),
        _ => panic!("expected prompts show"),
    }

    let cli = Cli::try_parse_from(["penny", "prompts"]).unwrap();
    assert!(matches!(cli.command, Commands::Prompts { action: None }));

    let cli = Cli::try_parse_from(["penny", "ollama", "test", "--merchant", "Shell"]).unwrap();
    match cli.command {
        Commands::Ollama {
            action: OllamaAction::Test { merchant },
        } => assert_eq!(merchant.as_deref(), Some("Shell")),
        _ => panic!("expected ollama test"),
    }
}

// ========== Taxonomy Command Tests ==========

#[test]
fn test_cmd_taxonomy_valid_file() {
    let file = write_taxonomy(TAXONOMY);
    assert!(commands::cmd_taxonomy(file.path()).is_ok());
}

#[test]
fn test_cmd_taxonomy_invalid_file() {
    let file = write_taxonomy("{\"Food\": [1, 2]}");
    let err = commands::cmd_taxonomy(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to load taxonomy"));
}

#[test]
fn test_cmd_taxonomy_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(commands::cmd_taxonomy(&dir.path().join("missing.json")).is_err());
}

#[test]
fn test_render_taxonomy_lists_every_subcategory() {
    let taxonomy = Taxonomy::from_json_str(TAXONOMY).unwrap();
    let rendered = render_taxonomy(&taxonomy);

    assert!(rendered.contains("Food & Dining\n"));
    assert!(rendered.contains("Coffee Shop"));
    assert!(rendered.contains("5541"));
    assert!(rendered.contains("Other\n"));
}

#[test]
fn test_bundled_taxonomy_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(DEFAULT_TAXONOMY);
    let taxonomy = commands::load_taxonomy(&path).unwrap();
    assert!(taxonomy.contains_category("Other"));
}

// ========== Pipeline Command Tests ==========

#[tokio::test]
async fn test_classify_with_mock_backends() {
    let taxonomy = Taxonomy::from_json_str(TAXONOMY).unwrap();
    let ai = AIClient::Mock(MockBackend::new().with_responses(["Transport", "Fuel"]));
    let search = SearchClient::Mock(MockSearchProvider::with_answer("Shell sells fuel."));

    let result = classify_with(&ai, &search, &taxonomy, "Shell").await.unwrap();
    assert_eq!(result.subcategory, "Fuel");
    assert_eq!(result.details.code, 5541);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["description"], "Shell sells fuel.");
}

#[tokio::test]
async fn test_classify_with_failing_backend_has_context() {
    let taxonomy = Taxonomy::from_json_str(TAXONOMY).unwrap();
    let ai = AIClient::Mock(MockBackend::failing());
    let search = SearchClient::Mock(MockSearchProvider::failing());

    let err = classify_with(&ai, &search, &taxonomy, "Shell")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to classify \"Shell\""));
}

#[tokio::test]
async fn test_suggest_with_mock_backend() {
    let ai = AIClient::mock();
    let outcome = suggest_with(&ai, &request(40_000)).await.unwrap();
    assert!(outcome.is_parsed());
    assert_eq!(outcome.items().unwrap().len(), 4);
}

#[tokio::test]
async fn test_suggest_with_zero_income_fails() {
    let ai = AIClient::mock();
    assert!(suggest_with(&ai, &request(0)).await.is_err());
}
