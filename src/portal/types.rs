//! Metadata endpoint response types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::media::{CollectionMetadata, Entry, EntryInfo};

/// Generic GraphQL response wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// `data` of the realm query.
#[derive(Debug, Clone, Deserialize)]
pub struct RealmData {
    pub realm: Option<Realm>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Realm {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Content block of a realm page.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum Block {
    SeriesBlock {
        series: Option<SeriesNode>,
    },
    PlaylistBlock {
        playlist: Option<SeriesNode>,
    },
    VideoBlock {
        event: Option<RawEntry>,
    },
    #[serde(other)]
    Other,
}

/// A series or playlist with its entries.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesNode {
    pub title: Option<String>,
    #[serde(default)]
    pub entries: Vec<RawEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesRef {
    pub title: Option<String>,
}

/// Entry of a series; `NotAllowed` hides everything behind institution login.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum RawEntry {
    AuthorizedEvent {
        id: String,
        title: String,
        created: DateTime<Utc>,
        #[serde(default)]
        series: Option<SeriesRef>,
    },
    NotAllowed {},
    #[serde(other)]
    Unsupported,
}

impl RawEntry {
    fn into_entry(self, collection_title: &str) -> Option<Entry> {
        match self {
            RawEntry::AuthorizedEvent {
                id,
                title,
                created,
                series,
            } => Some(Entry::Available(EntryInfo {
                id: short_id(&id).to_string(),
                title: clean_title(&title),
                created,
                collection_title: series
                    .and_then(|s| s.title)
                    .map(|t| clean_title(&t))
                    .unwrap_or_else(|| collection_title.to_string()),
            })),
            RawEntry::NotAllowed {} => Some(Entry::NotAllowed),
            RawEntry::Unsupported => None,
        }
    }
}

/// Strip the `ev` kind prefix from an event id. Only the first occurrence is
/// removed, so ids whose body starts with `ev` survive.
pub fn short_id(id: &str) -> &str {
    id.split_once("ev").map(|(_, rest)| rest).unwrap_or(id)
}

fn clean_title(title: &str) -> String {
    title.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace()).to_string()
}

impl GraphqlResponse<RealmData> {
    /// Flatten all series, playlist and video blocks into collection metadata.
    pub fn into_metadata(self, fallback_title: &str) -> Result<CollectionMetadata> {
        if let Some(first) = self.errors.first() {
            if self.data.is_none() {
                return Err(Error::Metadata(first.message.clone()));
            }
            tracing::debug!("Metadata response carried errors: {}", first.message);
        }

        let realm = self
            .data
            .and_then(|d| d.realm)
            .ok_or_else(|| Error::Metadata("No realm found at this path".into()))?;

        let title = realm
            .blocks
            .iter()
            .find_map(|block| match block {
                Block::SeriesBlock { series: Some(s) }
                | Block::PlaylistBlock { playlist: Some(s) } => s.title.clone(),
                _ => None,
            })
            .map(|t| clean_title(&t))
            .unwrap_or_else(|| fallback_title.to_string());

        let mut raw_entries = Vec::new();
        for block in realm.blocks {
            match block {
                Block::SeriesBlock { series: Some(s) } => raw_entries.extend(s.entries),
                Block::PlaylistBlock { playlist: Some(p) } => raw_entries.extend(p.entries),
                Block::VideoBlock { event: Some(e) } => raw_entries.push(e),
                _ => {}
            }
        }

        let entries: Vec<Entry> = raw_entries
            .into_iter()
            .filter_map(|raw| raw.into_entry(&title))
            .collect();

        tracing::debug!("Found {} entries in '{}'", entries.len(), title);

        Ok(CollectionMetadata { title, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "data": {
        "realm": {
          "blocks": [
            {"__typename": "TextBlock", "content": "hello"},
            {"__typename": "SeriesBlock", "series": {
              "title": "\"Algorithms\" ",
              "entries": [
                {"__typename": "AuthorizedEvent", "id": "evAbC123", "title": " Lecture 1",
                 "created": "2024-09-17T08:15:00Z", "series": {"title": "Algorithms"}},
                {"__typename": "NotAllowed", "dummy": null},
                {"__typename": "SomethingNew"}
              ]
            }},
            {"__typename": "VideoBlock", "event": {
              "__typename": "AuthorizedEvent", "id": "evXyZ", "title": "Extra",
              "created": "2024-10-01T12:00:00Z"}}
          ]
        }
      }
    }"#;

    #[test]
    fn test_parse_realm_blocks() {
        let response: GraphqlResponse<RealmData> = serde_json::from_str(SAMPLE).unwrap();
        let metadata = response.into_metadata("fallback").unwrap();

        assert_eq!(metadata.title, "Algorithms");
        assert_eq!(metadata.entries.len(), 3);

        match &metadata.entries[0] {
            Entry::Available(info) => {
                assert_eq!(info.id, "AbC123");
                assert_eq!(info.title, "Lecture 1");
                assert_eq!(info.collection_title, "Algorithms");
            }
            other => panic!("unexpected entry {:?}", other),
        }
        assert!(matches!(metadata.entries[1], Entry::NotAllowed));

        match &metadata.entries[2] {
            Entry::Available(info) => assert_eq!(info.collection_title, "Algorithms"),
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn test_missing_realm_is_error() {
        let response: GraphqlResponse<RealmData> =
            serde_json::from_str(r#"{"data": {"realm": null}}"#).unwrap();
        assert!(matches!(response.into_metadata("x"), Err(Error::Metadata(_))));
    }

    #[test]
    fn test_errors_without_data() {
        let response: GraphqlResponse<RealmData> =
            serde_json::from_str(r#"{"data": null, "errors": [{"message": "boom"}]}"#).unwrap();
        match response.into_metadata("x") {
            Err(Error::Metadata(msg)) => assert_eq!(msg, "boom"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("evAbc"), "Abc");
        assert_eq!(short_id("evevXY"), "evXY");
        assert_eq!(short_id("plain"), "plain");
    }
}
