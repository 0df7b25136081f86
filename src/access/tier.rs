//! Access tiers.

use std::fmt;

use crate::auth::{credential_cache, CredentialCache, Credentials};

/// Outcome of probing a collection, before credentials are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Public; the download control is visible without logging in.
    Open,
    /// Guarded by per-collection credentials.
    Protected,
    /// Only visible after an institution login.
    EthRequired,
    /// Probe timed out or showed neither control.
    Unknown,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Open => write!(f, "open"),
            Classification::Protected => write!(f, "protected"),
            Classification::EthRequired => write!(f, "institution login required"),
            Classification::Unknown => write!(f, "unknown"),
        }
    }
}

/// Access tier of a collection.
///
/// Only `Protected` carries credentials; they live in a cache shared by all
/// logins for the collection.
#[derive(Debug, Clone)]
pub enum Tier {
    Open,
    Protected { credentials: CredentialCache },
    EthRequired,
    Unknown,
}

impl Tier {
    /// Attach configured credentials to a classification. Credentials of
    /// collections that turn out not to be protected are dropped here.
    pub fn from_classification(
        classification: Classification,
        configured: Option<Credentials>,
    ) -> Self {
        match classification {
            Classification::Open => Tier::Open,
            Classification::Protected => Tier::Protected {
                credentials: credential_cache(configured),
            },
            Classification::EthRequired => Tier::EthRequired,
            Classification::Unknown => Tier::Unknown,
        }
    }

    pub fn classification(&self) -> Classification {
        match self {
            Tier::Open => Classification::Open,
            Tier::Protected { .. } => Classification::Protected,
            Tier::EthRequired => Classification::EthRequired,
            Tier::Unknown => Classification::Unknown,
        }
    }
}
