use thiserror::Error;

/// Top-level error type for the payout job
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Notification error: {0}")]
    Notification(String),
}

/// Configuration errors - always fatal, raised before any chain interaction
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Unknown notification mode: {0} (expected all, success_only or failed_only)")]
    UnknownNotificationMode(String),

    #[error("Unknown network: {0} (expected polkadot, kusama or westend)")]
    UnknownNetwork(String),

    #[error("Failed to read {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("Failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),
}

/// Key material errors
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Seed file {0} not found")]
    NotFound(String),

    #[error("Failed to read seed file {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("Seed file {0} is empty")]
    Empty(String),

    #[error("Invalid secret phrase: {0}")]
    InvalidPhrase(String),
}

/// Chain access errors
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Failed to connect to {url}: {message}")]
    Connection { url: String, message: String },

    #[error("Storage query {entry} failed: {message}")]
    Query { entry: &'static str, message: String },

    #[error("Failed to decode {entry}: {message}")]
    Decode { entry: &'static str, message: String },

    #[error("Invalid account address {address}: {message}")]
    InvalidAddress { address: String, message: String },

    #[error("Transaction submission failed: {0}")]
    Submission(String),

    #[error("Transaction included but dispatch failed: {0}")]
    Dispatch(String),
}

// The request URL embeds the bot token, so it is stripped before formatting
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::Notification(format!("HTTP request error: {}", error.without_url()))
    }
}

/// Result type alias for the application
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for chain calls
pub type ChainResult<T> = Result<T, ChainError>;
