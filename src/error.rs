//! Error types for the eth-videoz downloader.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error(
        "Collection list file not found. Looked in: {searched}. \
         Create a 'urls' file with one series URL per line, or pass a series URL to add it."
    )]
    CollectionListNotFound { searched: String },

    // Network / portal errors
    #[error("Cannot reach {url}. Check your Internet connection and try again: {message}")]
    Connectivity { url: String, message: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Access tier of '{0}' is already assigned")]
    TierAlreadyAssigned(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    // Browser collaborator errors
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Timed out after {seconds}s waiting for {what}")]
    Timeout { what: String, seconds: u64 },

    // Transfer errors
    #[error("Unexpected HTTP status {status} for {url}")]
    TransferStatus { status: u16, url: String },

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("No usable media source for item {0}")]
    NoMediaSource(String),

    // File system errors
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Interrupted by the user")]
    Interrupted,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ABORT: i32 = 1;
    pub const NETWORK_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
    pub const INTERRUPTED: i32 = 130;
}
