//! Error types shared across the poolwatch crates.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid pool data: {0}")]
    InvalidPool(String),

    #[error("Invalid numeric field {field}: {value:?}")]
    InvalidNumeric { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
