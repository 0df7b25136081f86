//! Configuration validation logic.

use crate::config::loader::Config;
use crate::config::modes::SubtitleSelection;
use crate::error::{Error, Result};
use regex::Regex;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_base_url(&config.portal.base_url)?;
    validate_user_agent(&config.portal.user_agent)?;
    validate_subtitles(&config.options.subtitles)?;

    if config.portal.classify_timeout_secs == 0 {
        return Err(Error::ConfigValidation {
            field: "classify_timeout_secs".to_string(),
            message: "Timeout must be greater than zero".to_string(),
        });
    }

    if config.portal.login_timeout_secs == 0 {
        return Err(Error::ConfigValidation {
            field: "login_timeout_secs".to_string(),
            message: "Timeout must be greater than zero".to_string(),
        });
    }

    Ok(())
}

/// Validate the portal base URL.
pub fn validate_base_url(base_url: &str) -> Result<()> {
    let parsed = url::Url::parse(base_url)?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::ConfigValidation {
            field: "base_url".to_string(),
            message: format!("Unsupported scheme '{}'", parsed.scheme()),
        });
    }

    Ok(())
}

/// Validate the user agent string.
pub fn validate_user_agent(user_agent: &str) -> Result<()> {
    if user_agent.trim().is_empty() {
        return Err(Error::MissingConfig("user_agent".to_string()));
    }
    Ok(())
}

/// Validate subtitle language tags (`en`, `en-US`).
pub fn validate_subtitles(selection: &SubtitleSelection) -> Result<()> {
    let tag_pattern = Regex::new(r"^[a-zA-Z]{2,3}(-[a-zA-Z0-9]{2,8})?$")
        .map_err(|e| Error::Config(e.to_string()))?;

    for lang in selection.languages() {
        if !tag_pattern.is_match(lang) {
            return Err(Error::ConfigValidation {
                field: "subtitles".to_string(),
                message: format!(
                    "'{}' is not a language tag. Use tags like 'en-US' or 'de-DE', 'all' or 'none'.",
                    lang
                ),
            });
        }
    }

    Ok(())
}

/// A collection URL must live under the portal root.
///
/// The trailing slash matters: `https://video.ethz.ch.example.xyz` must not pass.
pub fn validate_collection_url(url: &str, base_url: &str) -> Result<()> {
    let prefix = format!("{}/", base_url.trim_end_matches('/'));

    if !url.starts_with(&prefix) {
        return Err(Error::ConfigValidation {
            field: "collection url".to_string(),
            message: format!("'{}' must start with '{}'", url, prefix),
        });
    }

    url::Url::parse(url)?;
    Ok(())
}

/// Path of a collection relative to the portal root, starting with `/`.
pub fn collection_path(url: &str, base_url: &str) -> Result<String> {
    validate_collection_url(url, base_url)?;
    let path = &url[base_url.trim_end_matches('/').len()..];
    Ok(path.trim_end_matches('/').to_string())
}
