//! Filesystem module.
//!
//! Provides:
//! - Filename sanitization and generation
//! - Directory layout of downloaded recordings

pub mod naming;
pub mod paths;

pub use naming::{
    format_timestamp, media_file_name, safe_name, subtitle_file_name, url_extension,
    TIMESTAMP_FORMAT,
};
pub use paths::{collection_folder, ensure_dir, existing_len};
