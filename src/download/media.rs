//! Per-item source selection and destination planning.

use std::path::{Path, PathBuf};

use crate::config::{AudioQuality, OptionsConfig, SubtitleSelection, VideoQuality};
use crate::error::{Error, Result};
use crate::fs::{collection_folder, media_file_name, subtitle_file_name, url_extension};
use crate::media::Item;

/// What a planned file holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    Video(VideoQuality),
    /// Video of a resolution without a quality label.
    UnrankedVideo,
    Audio(AudioQuality),
    Subtitle(String),
}

/// One file to fetch for an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub url: String,
    pub path: PathBuf,
    pub kind: FileKind,
}

/// Pick the main media source of an item.
///
/// The configured video quality wins; an item with other video qualities
/// gets the closest one (higher on ties), then any video of unlabelled
/// resolution. Items without any video fall back to the configured audio
/// container.
pub fn select_media(
    item: &Item,
    video: VideoQuality,
    audio: AudioQuality,
) -> Result<(FileKind, &str)> {
    if let Some(url) = item.video_sources.get(&video) {
        return Ok((FileKind::Video(video), url.as_str()));
    }

    let closest = VideoQuality::ALL
        .iter()
        .rev()
        .filter_map(|q| item.video_sources.get(q).map(|url| (*q, url)))
        .min_by_key(|(q, _)| q.distance(video));

    if let Some((quality, url)) = closest {
        tracing::info!(
            "'{}' has no {} quality video, using {}",
            item.title,
            video,
            quality
        );
        return Ok((FileKind::Video(quality), url.as_str()));
    }

    if let Some(url) = &item.unranked_video {
        tracing::info!("'{}' only has video of another resolution", item.title);
        return Ok((FileKind::UnrankedVideo, url.as_str()));
    }

    if let Some(url) = item.audio_sources.get(&audio) {
        tracing::info!("'{}' is audio-only, using the {} track", item.title, audio);
        return Ok((FileKind::Audio(audio), url.as_str()));
    }

    Err(Error::NoMediaSource(format!("'{}' ({})", item.title, item.id)))
}

/// Subtitle tracks to fetch as `(language, url)` pairs.
///
/// Configured languages the item lacks are skipped.
pub fn select_subtitles<'a>(
    item: &'a Item,
    selection: &SubtitleSelection,
) -> Vec<(&'a str, &'a str)> {
    match selection {
        SubtitleSelection::None => Vec::new(),
        SubtitleSelection::All => item
            .subtitle_sources
            .iter()
            .map(|(lang, url)| (lang.as_str(), url.as_str()))
            .collect(),
        SubtitleSelection::Languages(languages) => languages
            .iter()
            .filter_map(|lang| match item.subtitle_sources.get_key_value(lang) {
                Some((lang, url)) => Some((lang.as_str(), url.as_str())),
                None => {
                    tracing::debug!("'{}' has no {} subtitles", item.title, lang);
                    None
                }
            })
            .collect(),
    }
}

/// Every file an item contributes, media first.
pub fn plan_item(
    item: &Item,
    options: &OptionsConfig,
    save_dir: &Path,
) -> Result<Vec<PlannedFile>> {
    let folder = collection_folder(save_dir, item)?;
    let (kind, url) = select_media(item, options.video_quality, options.audio_quality)?;

    let extension = match &kind {
        FileKind::Audio(quality) => url_extension(url).unwrap_or(quality.extension()),
        _ => url_extension(url).unwrap_or("mp4"),
    };
    let media_name = media_file_name(&item.created, &item.title, &item.id, extension)?;

    let mut files = vec![PlannedFile {
        url: url.to_string(),
        path: folder.join(&media_name),
        kind,
    }];

    for (language, url) in select_subtitles(item, &options.subtitles) {
        let extension = url_extension(url).unwrap_or("vtt");
        files.push(PlannedFile {
            url: url.to_string(),
            path: folder.join(subtitle_file_name(&media_name, language, extension)?),
            kind: FileKind::Subtitle(language.to_string()),
        });
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::{BTreeMap, HashMap};

    fn item(videos: &[VideoQuality], audio: &[AudioQuality], subs: &[&str]) -> Item {
        Item {
            id: "AbC".into(),
            title: "Intro".into(),
            created: Utc.with_ymd_and_hms(2024, 9, 17, 8, 15, 0).unwrap(),
            collection_title: "Algorithms".into(),
            page_url: "https://p/s/v/AbC".into(),
            video_sources: videos
                .iter()
                .map(|q| (*q, format!("https://cdn/{}.mp4", q)))
                .collect::<HashMap<_, _>>(),
            unranked_video: None,
            audio_sources: audio
                .iter()
                .map(|q| (*q, format!("https://cdn/a.{}", q.extension())))
                .collect(),
            subtitle_sources: subs
                .iter()
                .map(|l| (l.to_string(), format!("https://cdn/{}.vtt", l)))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_select_configured_video() {
        let item = item(&[VideoQuality::Low, VideoQuality::High], &[], &[]);
        let (kind, url) = select_media(&item, VideoQuality::High, AudioQuality::Ogg).unwrap();
        assert_eq!(kind, FileKind::Video(VideoQuality::High));
        assert_eq!(url, "https://cdn/high.mp4");
    }

    #[test]
    fn test_select_closest_video_prefers_higher() {
        let item = item(&[VideoQuality::Low, VideoQuality::High], &[], &[]);
        let (kind, _) = select_media(&item, VideoQuality::Mid, AudioQuality::Ogg).unwrap();
        assert_eq!(kind, FileKind::Video(VideoQuality::High));

        let item = item_low_only();
        let (kind, _) = select_media(&item, VideoQuality::High, AudioQuality::Ogg).unwrap();
        assert_eq!(kind, FileKind::Video(VideoQuality::Low));
    }

    fn item_low_only() -> Item {
        item(&[VideoQuality::Low], &[], &[])
    }

    #[test]
    fn test_audio_fallback_and_failure() {
        let audio_only = item(&[], &[AudioQuality::Ogg, AudioQuality::M4a], &[]);
        let (kind, url) = select_media(&audio_only, VideoQuality::Mid, AudioQuality::M4a).unwrap();
        assert_eq!(kind, FileKind::Audio(AudioQuality::M4a));
        assert_eq!(url, "https://cdn/a.m4a");

        let mut unranked = item(&[], &[AudioQuality::M4a], &[]);
        unranked.unranked_video = Some("https://cdn/uhd.mp4".into());
        let (kind, url) = select_media(&unranked, VideoQuality::Mid, AudioQuality::M4a).unwrap();
        assert_eq!(kind, FileKind::UnrankedVideo);
        assert_eq!(url, "https://cdn/uhd.mp4");

        let wrong_audio = item(&[], &[AudioQuality::Ogg], &[]);
        assert!(matches!(
            select_media(&wrong_audio, VideoQuality::Mid, AudioQuality::Mpeg),
            Err(Error::NoMediaSource(_))
        ));
    }

    #[test]
    fn test_subtitle_selection() {
        let item = item(&[VideoQuality::Mid], &[], &["en-US", "fr-FR"]);
        let wanted = SubtitleSelection::Languages(vec!["en-US".into(), "de-DE".into()]);
        assert_eq!(
            select_subtitles(&item, &wanted),
            vec![("en-US", "https://cdn/en-US.vtt")]
        );
        assert_eq!(select_subtitles(&item, &SubtitleSelection::All).len(), 2);
        assert!(select_subtitles(&item, &SubtitleSelection::None).is_empty());
    }

    #[test]
    fn test_plan_item_layout() {
        let item = item(&[VideoQuality::Mid], &[], &["en-US"]);
        let options = OptionsConfig {
            subtitles: SubtitleSelection::Languages(vec!["en-US".into(), "de-DE".into()]),
            ..OptionsConfig::default()
        };

        let files = plan_item(&item, &options, Path::new("/data")).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(
            files[0].path,
            PathBuf::from("/data/2024_Algorithms/2024-09-17__08_15__Intro__AbC.mp4")
        );
        assert_eq!(
            files[1].path,
            PathBuf::from("/data/2024_Algorithms/2024-09-17__08_15__Intro__AbC.en-US.vtt")
        );
        assert_eq!(files[1].kind, FileKind::Subtitle("en-US".into()));
    }
}
