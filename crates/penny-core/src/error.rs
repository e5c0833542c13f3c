//! Error types for Penny

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Taxonomy error: {0}")]
    Taxonomy(String),

    #[error("Search provider error: {0}")]
    Search(String),

    #[error("Search provider rejected credentials: {0}")]
    SearchAuth(String),

    #[error("AI backend error: {0}")]
    Backend(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
