//! Video portal module.
//!
//! This module provides:
//! - The metadata collaborator (`Catalog`) and its GraphQL client
//! - Metadata response types
//! - Session cookie state shared across requests

pub mod client;
pub mod session;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use crate::media::CollectionMetadata;

pub use client::{PortalClient, DEFAULT_METADATA_QUERY};
pub use session::SessionState;

/// Source of collection-level metadata.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch the title and entry list of the collection at `url`, sending
    /// whatever cookies `session` holds.
    async fn fetch_collection(&self, url: &str, session: &SessionState)
        -> Result<CollectionMetadata>;
}
