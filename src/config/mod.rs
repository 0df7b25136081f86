//! Configuration module for the eth-videoz downloader.
//!
//! This module handles:
//! - Loading settings from TOML files
//! - Quality and subtitle modes
//! - The collection list file
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod urls;
pub mod validation;

pub use loader::{
    config_dir, default_config_path, AccountConfig, BrowserConfig, Config, OptionsConfig,
    PortalConfig,
};
pub use modes::{AudioQuality, SubtitleSelection, VideoQuality};
pub use urls::{
    append_collection, create_collection_list, decrement_notice, default_collection_list_path,
    load_collection_list, locate_collection_list, parse_collection_list, CollectionList,
    CollectionSpec,
};
pub use validation::{collection_path, validate_collection_url, validate_config};

/// Concurrency cap for metadata fetches (collections and items).
pub const METADATA_CONCURRENCY: usize = 10;

/// Concurrency cap for size probes.
pub const PROBE_CONCURRENCY: usize = 10;

/// Concurrency cap for byte transfers, kept lower to bound outbound connections.
pub const TRANSFER_CONCURRENCY: usize = 5;
