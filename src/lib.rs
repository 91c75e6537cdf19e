//! Itch-Gleaner: an automated claimer for free itch.io promotions
//!
//! This crate implements the crawl-and-claim engine behind the gleaner:
//! a resumable sale-id crawler, a profile/collection discovery crawler,
//! a reward-claim state machine, a rate-limited fetch layer, and a
//! segmented-log report aggregator.

pub mod claim;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod report;
pub mod session;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for gleaner operations
#[derive(Debug, Error)]
pub enum GleanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Extraction failed for {url}: {message}")]
    Extract { url: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid claim transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::ClaimState,
        to: state::ClaimState,
    },

    #[error("Session error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for gleaner operations
pub type Result<T> = std::result::Result<T, GleanError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use session::Session;
pub use state::{ClaimState, RunState, SaleStatus};
