//! Quality and subtitle selection modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Video resolution label as offered by the portal's download dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoQuality {
    /// 640px wide.
    Low,
    /// 1280px wide (default).
    #[default]
    Mid,
    /// 1920px wide.
    High,
}

impl VideoQuality {
    /// All qualities, lowest first.
    pub const ALL: [VideoQuality; 3] = [VideoQuality::Low, VideoQuality::Mid, VideoQuality::High];

    fn rank(self) -> i32 {
        match self {
            VideoQuality::Low => 0,
            VideoQuality::Mid => 1,
            VideoQuality::High => 2,
        }
    }

    /// Distance between two quality labels, used to pick a fallback.
    pub fn distance(self, other: VideoQuality) -> i32 {
        (self.rank() - other.rank()).abs()
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoQuality::Low => write!(f, "low"),
            VideoQuality::Mid => write!(f, "mid"),
            VideoQuality::High => write!(f, "high"),
        }
    }
}

impl FromStr for VideoQuality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(VideoQuality::Low),
            "mid" => Ok(VideoQuality::Mid),
            "high" => Ok(VideoQuality::High),
            _ => Err(format!("Unknown video quality: {} (expected low/mid/high)", s)),
        }
    }
}

/// Audio container for audio-only recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioQuality {
    M4a,
    Mpeg,
    /// Best compression (default).
    #[default]
    Ogg,
}

impl AudioQuality {
    /// File extension the portal uses for this container.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioQuality::M4a => "m4a",
            AudioQuality::Mpeg => "mpeg",
            AudioQuality::Ogg => "ogg",
        }
    }
}

impl fmt::Display for AudioQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioQuality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "m4a" => Ok(AudioQuality::M4a),
            "mpeg" => Ok(AudioQuality::Mpeg),
            "ogg" => Ok(AudioQuality::Ogg),
            _ => Err(format!("Unknown audio quality: {} (expected m4a/mpeg/ogg)", s)),
        }
    }
}

/// Which subtitle tracks to fetch alongside each recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtitleSelection {
    None,
    All,
    Languages(Vec<String>),
}

impl Default for SubtitleSelection {
    fn default() -> Self {
        SubtitleSelection::Languages(vec!["en-US".to_string(), "de-DE".to_string()])
    }
}

impl SubtitleSelection {
    /// Configured language tags, empty for `None` and `All`.
    pub fn languages(&self) -> &[String] {
        match self {
            SubtitleSelection::Languages(langs) => langs,
            _ => &[],
        }
    }
}

impl fmt::Display for SubtitleSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubtitleSelection::None => write!(f, "none"),
            SubtitleSelection::All => write!(f, "all"),
            SubtitleSelection::Languages(langs) => write!(f, "{}", langs.join(",")),
        }
    }
}

impl FromStr for SubtitleSelection {
    type Err = String;

    /// Accepts `none`, `all`, or a comma/space separated list of tags.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "" | "none" => return Ok(SubtitleSelection::None),
            "all" => return Ok(SubtitleSelection::All),
            _ => {}
        }

        let langs: Vec<String> = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();

        Ok(SubtitleSelection::Languages(langs))
    }
}

// Stored as either a keyword string or a list of tags in the TOML file.
impl Serialize for SubtitleSelection {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match self {
            SubtitleSelection::Languages(langs) => langs.serialize(serializer),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for SubtitleSelection {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Keyword(String),
            List(Vec<String>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Keyword(s) => s.parse().map_err(serde::de::Error::custom),
            Raw::List(langs) => Ok(SubtitleSelection::Languages(langs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_quality_parse() {
        assert_eq!("HIGH".parse::<VideoQuality>().unwrap(), VideoQuality::High);
        assert!("ultra".parse::<VideoQuality>().is_err());
    }

    #[test]
    fn test_audio_quality_extension() {
        assert_eq!(AudioQuality::default().extension(), "ogg");
        assert_eq!("m4a".parse::<AudioQuality>().unwrap(), AudioQuality::M4a);
    }

    #[test]
    fn test_subtitle_selection_parse() {
        assert_eq!("none".parse::<SubtitleSelection>().unwrap(), SubtitleSelection::None);
        assert_eq!("All".parse::<SubtitleSelection>().unwrap(), SubtitleSelection::All);
        assert_eq!(
            "en-US, de-DE".parse::<SubtitleSelection>().unwrap(),
            SubtitleSelection::Languages(vec!["en-US".into(), "de-DE".into()])
        );
    }

    #[test]
    fn test_subtitle_selection_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            subtitles: SubtitleSelection,
        }

        let list: Wrapper = toml::from_str(r#"subtitles = ["en-US"]"#).unwrap();
        assert_eq!(list.subtitles, SubtitleSelection::Languages(vec!["en-US".into()]));

        let none: Wrapper = toml::from_str(r#"subtitles = "none""#).unwrap();
        assert_eq!(none.subtitles, SubtitleSelection::None);
    }

    #[test]
    fn test_quality_distance() {
        assert_eq!(VideoQuality::Low.distance(VideoQuality::High), 2);
        assert_eq!(VideoQuality::Mid.distance(VideoQuality::Mid), 0);
    }
}
