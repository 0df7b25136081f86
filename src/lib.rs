//! eth-videoz - lecture recording downloader for the ETH video portal
//!
//! This library downloads every recording of a list of lecture series,
//! whatever access tier each series sits behind.
//!
//! # Features
//!
//! - Access tier detection per series (open, password-protected, institution login)
//! - Institution login performed once per run, series passwords asked at most once
//! - Bounded concurrency for metadata, size probes and transfers
//! - Resumable byte-range downloads with tail verification
//! - Subtitle tracks alongside each recording
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use eth_videoz_dl::{
//!     auth::ConsolePrompt, browser::ChromiumBrowser, config::load_collection_list,
//!     download::NoProgress, output::ClickCounter, AcquisitionOrchestrator, Collaborators,
//!     Config, PortalClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_or_default(Path::new("config.toml"))?;
//!     let list = load_collection_list(Path::new("urls"), config.base_url())?;
//!     let portal = PortalClient::new(&config)?;
//!     let browser = ChromiumBrowser::launch(&config.browser, &config.portal.user_agent).await?;
//!
//!     let orchestrator = AcquisitionOrchestrator::new(
//!         Collaborators {
//!             browser: Arc::new(browser),
//!             catalog: Arc::new(portal.clone()),
//!             prompt: Arc::new(ConsolePrompt::new(false)),
//!             http: portal.http().clone(),
//!             progress: Arc::new(NoProgress),
//!             counter: Arc::new(ClickCounter::new()),
//!         },
//!         &config,
//!     );
//!     let report = orchestrator.run(list.collections).await;
//!     println!("{} file(s) downloaded", report.files_transferred());
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod auth;
pub mod browser;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;
pub mod portal;

// Re-exports for convenience
pub use access::{AccessTierClassifier, Classification, Tier};
pub use auth::{AuthenticationCoordinator, Credentials};
pub use config::{CollectionSpec, Config};
pub use download::{
    AcquisitionOrchestrator, Collaborators, ConcurrencyLimiter, ResumableTransfer, RunReport,
};
pub use error::{Error, Result};
pub use media::{Collection, Item};
pub use portal::PortalClient;
