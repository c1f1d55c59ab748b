//! Sealbox - settings resolution and key-ring storage for the `sbx` tool.
//!
//! This library provides the core functionality behind the `sbx` CLI:
//! resolving which of the portable/global/local settings locations is
//! authoritative, and maintaining the content-addressed store of RSA key
//! records that the resolved settings point at.

pub mod cli;
pub mod commands;
pub mod config;
pub mod keystore;
pub mod models;


/// Library-level error type for sealbox operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported settings mode: {0}")]
    UnsupportedMode(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for sealbox operations.
pub type Result<T> = std::result::Result<T, Error>;
