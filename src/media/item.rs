//! Collection and item representation.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::access::Tier;
use crate::auth::Credentials;
use crate::config::{AudioQuality, CollectionSpec, VideoQuality};
use crate::error::{Error, Result};

/// Entry of a collection as listed by the metadata endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Available(EntryInfo),
    /// Listed but hidden until an institution login.
    NotAllowed,
}

/// Listing data of an accessible entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Short id, without the event kind prefix.
    pub id: String,
    pub title: String,
    pub created: DateTime<Utc>,
    pub collection_title: String,
}

impl EntryInfo {
    /// Item page of this entry under `collection_url`.
    pub fn page_url(&self, collection_url: &str) -> String {
        format!("{}/v/{}", collection_url.trim_end_matches('/'), self.id)
    }
}

/// Collection-level metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionMetadata {
    pub title: String,
    pub entries: Vec<Entry>,
}

/// A fully fetched recording with its sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub created: DateTime<Utc>,
    pub collection_title: String,
    pub page_url: String,
    pub video_sources: HashMap<VideoQuality, String>,
    /// Video offered at a resolution outside the known labels.
    pub unranked_video: Option<String>,
    pub audio_sources: HashMap<AudioQuality, String>,
    /// Subtitle language tag to URL.
    pub subtitle_sources: BTreeMap<String, String>,
}

/// A configured series, its metadata and its access tier.
#[derive(Debug)]
pub struct Collection {
    pub url: String,
    pub title: String,
    pub entries: Vec<Entry>,
    configured_credentials: Option<Credentials>,
    tier: Option<Tier>,
}

impl Collection {
    pub fn new(spec: CollectionSpec, metadata: CollectionMetadata) -> Self {
        Self {
            url: spec.url,
            title: metadata.title,
            entries: metadata.entries,
            configured_credentials: spec.credentials,
            tier: None,
        }
    }

    pub fn tier(&self) -> Option<&Tier> {
        self.tier.as_ref()
    }

    /// Assign the access tier. A tier is assigned exactly once; configured
    /// credentials move into it (or are dropped for unprotected tiers).
    pub fn assign_tier(&mut self, make: impl FnOnce(Option<Credentials>) -> Tier) -> Result<()> {
        if self.tier.is_some() {
            return Err(Error::TierAlreadyAssigned(self.title.clone()));
        }
        self.tier = Some(make(self.configured_credentials.take()));
        Ok(())
    }

    /// Entry probed to classify the whole collection.
    pub fn representative(&self) -> Option<&Entry> {
        self.entries.first()
    }

    /// Replace title and entries with freshly fetched metadata, keeping the tier.
    pub fn refresh(&mut self, metadata: CollectionMetadata) {
        self.title = metadata.title;
        self.entries = metadata.entries;
    }

    pub fn available_entries(&self) -> impl Iterator<Item = &EntryInfo> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Available(info) => Some(info),
            Entry::NotAllowed => None,
        })
    }
}
