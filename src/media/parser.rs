//! Download-dialog link parsing.

use std::collections::{BTreeMap, HashMap};

use crate::browser::SourceLink;
use crate::config::{AudioQuality, VideoQuality};
use crate::fs::url_extension;
use crate::media::item::{EntryInfo, Item};

/// What a download-dialog link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Video(VideoQuality),
    /// Video of a resolution without a quality label.
    UnrankedVideo,
    Audio(AudioQuality),
    Subtitle(String),
}

/// Classify one link by its label and URL extension.
///
/// Videos are labelled with their width ("Video 1280x720"), captions with
/// their language ("Caption (en-US)"). Videos of other resolutions are kept
/// as unranked; links of unknown format are ignored.
pub fn classify_link(link: &SourceLink) -> Option<SourceKind> {
    let label = link.label.trim();
    let extension = url_extension(&link.href).map(|e| e.to_ascii_lowercase());

    if label.contains("Video") && extension.as_deref() == Some("mp4") {
        let quality = if label.contains("640") {
            VideoQuality::Low
        } else if label.contains("1280") {
            VideoQuality::Mid
        } else if label.contains("1920") {
            VideoQuality::High
        } else {
            return Some(SourceKind::UnrankedVideo);
        };
        return Some(SourceKind::Video(quality));
    }

    if label.contains("Caption") && extension.as_deref() == Some("vtt") {
        let language = label
            .split_once("Caption")
            .map(|(_, rest)| rest)
            .unwrap_or(label)
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .trim();
        if language.is_empty() {
            return None;
        }
        return Some(SourceKind::Subtitle(language.to_string()));
    }

    if label.contains("Audio") {
        return match extension.as_deref() {
            Some("m4a") => Some(SourceKind::Audio(AudioQuality::M4a)),
            Some("mpeg") => Some(SourceKind::Audio(AudioQuality::Mpeg)),
            Some("ogg") => Some(SourceKind::Audio(AudioQuality::Ogg)),
            _ => None,
        };
    }

    None
}

/// Build an item from its listing data and the links of its download dialog.
pub fn build_item(info: &EntryInfo, page_url: String, links: &[SourceLink]) -> Item {
    let mut video_sources = HashMap::new();
    let mut unranked_video = None;
    let mut audio_sources = HashMap::new();
    let mut subtitle_sources = BTreeMap::new();

    for link in links {
        match classify_link(link) {
            Some(SourceKind::Video(q)) => {
                video_sources.insert(q, link.href.clone());
            }
            Some(SourceKind::UnrankedVideo) => {
                unranked_video.get_or_insert_with(|| link.href.clone());
            }
            Some(SourceKind::Audio(q)) => {
                audio_sources.insert(q, link.href.clone());
            }
            Some(SourceKind::Subtitle(lang)) => {
                subtitle_sources.insert(lang, link.href.clone());
            }
            None => tracing::debug!("Ignoring download link '{}'", link.label),
        }
    }

    Item {
        id: info.id.clone(),
        title: info.title.clone(),
        created: info.created,
        collection_title: info.collection_title.clone(),
        page_url,
        video_sources,
        unranked_video,
        audio_sources,
        subtitle_sources,
    }
}
