//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{AudioQuality, Config, SubtitleSelection, VideoQuality};

/// ETH video portal downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "eth-videoz",
    version,
    about = "Download lecture recordings from the ETH video portal",
    long_about = "Downloads every recording of the lecture series listed in a 'urls' file.\n\n\
                  Open series are fetched first, then password-protected series, then series \
                  that require an institution login. Interrupted downloads resume where they stopped."
)]
pub struct Args {
    /// Series URL to add to the list file before downloading.
    pub quick_add: Option<String>,

    /// Institution login username.
    #[arg(short, long, env = "ETH_USERNAME")]
    pub username: Option<String>,

    /// Read the institution password as one line from stdin.
    #[arg(long)]
    pub password_from_stdin: bool,

    /// Subtitle languages (e.g. "en-US,de-DE"), "all" or "none".
    #[arg(long)]
    pub subtitles: Option<SubtitleSelection>,

    /// Base directory for downloads.
    #[arg(short, long = "save-dir")]
    pub save_dir: Option<PathBuf>,

    /// Preferred video quality (low, mid, high).
    #[arg(long)]
    pub video_quality: Option<VideoQuality>,

    /// Audio container for audio-only recordings (m4a, mpeg, ogg).
    #[arg(long)]
    pub audio_quality: Option<AudioQuality>,

    /// Path to the series list file.
    #[arg(long)]
    pub urls: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run the browser without a window.
    #[arg(long)]
    pub headless: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        if let Some(username) = self.username {
            config.account.username = Some(username);
        }

        if let Some(subtitles) = self.subtitles {
            config.options.subtitles = subtitles;
        }

        if let Some(dir) = self.save_dir {
            config.options.save_directory = Some(dir);
        }

        if let Some(quality) = self.video_quality {
            config.options.video_quality = quality;
        }

        if let Some(quality) = self.audio_quality {
            config.options.audio_quality = quality;
        }

        // Boolean flags (only override if set)
        if self.password_from_stdin {
            config.account.password_from_stdin = true;
        }

        if self.headless {
            config.browser.headless = true;
        }
    }
}
