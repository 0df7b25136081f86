//! Collection list file (`urls`): one series per line.
//!
//! ```text
//! ### starme = 2
//! # Algorithms and Data Structures
//! https://video.ethz.ch/lectures/d-infk/2024/autumn/252-0026-00L
//! https://video.ethz.ch/lectures/d-math/2024/autumn/401-0000-00L jdoe secret
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::Credentials;
use crate::config::loader::config_dir;
use crate::config::validation::validate_collection_url;
use crate::error::{Error, Result};

/// File name looked up in the working and config directories.
pub const COLLECTION_LIST_NAME: &str = "urls";

/// Prefix of the notice counter line.
const NOTICE_PREFIX: &str = "### starme = ";

/// Initial counter written to a freshly created list (this run counts as the first).
const NOTICE_INITIAL: u32 = 2;

/// One configured collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSpec {
    pub url: String,
    pub credentials: Option<Credentials>,
}

impl CollectionSpec {
    pub fn public(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credentials: None,
        }
    }
}

/// Parsed contents of the collection list file.
#[derive(Debug, Clone, Default)]
pub struct CollectionList {
    /// Remaining runs the notice is shown for, if the counter line is present.
    pub notice: Option<u32>,
    pub collections: Vec<CollectionSpec>,
}

impl CollectionList {
    pub fn contains_url(&self, url: &str) -> bool {
        let url = url.trim_end_matches('/');
        self.collections
            .iter()
            .any(|c| c.url.trim_end_matches('/') == url)
    }
}

/// Find the list file: explicit path, then `./urls`, then the config directory.
pub fn locate_collection_list(explicit: Option<&Path>) -> Result<PathBuf> {
    let mut searched = Vec::new();

    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        searched.push(path.display().to_string());
    }

    let local = PathBuf::from(COLLECTION_LIST_NAME);
    if local.is_file() {
        return Ok(local);
    }
    searched.push(format!(
        "{}/{}",
        std::env::current_dir()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|_| ".".into()),
        COLLECTION_LIST_NAME
    ));

    if let Some(path) = default_collection_list_path() {
        if path.is_file() {
            return Ok(path);
        }
        searched.push(path.display().to_string());
    }

    Err(Error::CollectionListNotFound {
        searched: searched.join(", "),
    })
}

/// `<config_dir>/urls`, where a new list is created when none exists.
pub fn default_collection_list_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(COLLECTION_LIST_NAME))
}

/// Parse the list file contents.
pub fn parse_collection_list(content: &str, base_url: &str) -> Result<CollectionList> {
    let mut list = CollectionList::default();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();

        if index == 0 {
            if let Some(counter) = parse_notice(line) {
                list.notice = Some(counter);
                continue;
            }
        }

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let spec = match parts.as_slice() {
            [url] => CollectionSpec::public(*url),
            [url, username, password] => CollectionSpec {
                url: url.to_string(),
                credentials: Some(Credentials::new(*username, *password)),
            },
            _ => {
                return Err(Error::ConfigValidation {
                    field: format!("{} line {}", COLLECTION_LIST_NAME, index + 1),
                    message: "expected either `url` or `url username password` \
                              separated by spaces"
                        .to_string(),
                })
            }
        };

        validate_collection_url(&spec.url, base_url)?;
        list.collections.push(spec);
    }

    Ok(list)
}

/// Read and parse the list file.
pub fn load_collection_list(path: &Path, base_url: &str) -> Result<CollectionList> {
    let content = fs::read_to_string(path)?;
    parse_collection_list(&content, base_url)
}

fn parse_notice(line: &str) -> Option<u32> {
    line.strip_prefix(NOTICE_PREFIX)
        .map(str::trim)
        .filter(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        .and_then(|n| n.parse().ok())
}

/// Create a new list file holding only the notice counter.
pub fn create_collection_list(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, format!("{}{}\n", NOTICE_PREFIX, NOTICE_INITIAL))?;
    Ok(())
}

/// Decrement the notice counter, dropping the line once it reaches zero.
///
/// Returns the new counter, or `None` when the file carries no counter.
pub fn decrement_notice(path: &Path) -> Result<Option<u32>> {
    let content = fs::read_to_string(path)?;
    let (first, rest) = content.split_once('\n').unwrap_or((content.as_str(), ""));

    let Some(counter) = parse_notice(first.trim()) else {
        return Ok(None);
    };

    let remaining = counter.saturating_sub(1);
    let updated = if remaining == 0 {
        rest.to_string()
    } else {
        format!("{}{}\n{}", NOTICE_PREFIX, remaining, rest)
    };

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, updated)?;
    fs::rename(&tmp, path)?;

    Ok(Some(remaining))
}

/// Append a collection under a `# title` comment.
pub fn append_collection(path: &Path, title: &str, url: &str) -> Result<()> {
    use std::io::Write;

    let mut file = fs::OpenOptions::new().append(true).create(true).open(path)?;
    write!(file, "\n# {}\n{}\n", title, url)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BASE: &str = "https://video.ethz.ch";

    #[test]
    fn test_parse_public_and_protected() {
        let content = "### starme = 2\n\
                       # comment\n\
                       \n\
                       https://video.ethz.ch/lectures/a\n\
                       https://video.ethz.ch/lectures/b  user  pass\n";

        let list = parse_collection_list(content, BASE).unwrap();
        assert_eq!(list.notice, Some(2));
        assert_eq!(list.collections.len(), 2);
        assert!(list.collections[0].credentials.is_none());

        let creds = list.collections[1].credentials.as_ref().unwrap();
        assert_eq!(creds.username(), "user");
        assert_eq!(creds.password(), "pass");
    }

    #[test]
    fn test_parse_rejects_two_tokens() {
        let err = parse_collection_list("https://video.ethz.ch/lectures/a user\n", BASE);
        assert!(matches!(err, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_parse_rejects_foreign_url() {
        let err = parse_collection_list("https://video.ethz.ch.evil.xyz/lectures\n", BASE);
        assert!(err.is_err());
    }

    #[test]
    fn test_notice_only_on_first_line() {
        let content = "https://video.ethz.ch/lectures/a\n### starme = 3\n";
        let list = parse_collection_list(content, BASE).unwrap();
        assert_eq!(list.notice, None);
        assert_eq!(list.collections.len(), 1);
    }

    #[test]
    fn test_decrement_notice_until_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("urls");
        fs::write(&path, "### starme = 2\nhttps://video.ethz.ch/lectures/a\n").unwrap();

        assert_eq!(decrement_notice(&path).unwrap(), Some(1));
        assert!(fs::read_to_string(&path).unwrap().starts_with("### starme = 1\n"));

        assert_eq!(decrement_notice(&path).unwrap(), Some(0));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "https://video.ethz.ch/lectures/a\n"
        );

        assert_eq!(decrement_notice(&path).unwrap(), None);
    }

    #[test]
    fn test_create_and_append() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("urls");

        create_collection_list(&path).unwrap();
        append_collection(&path, "Algorithms", "https://video.ethz.ch/lectures/a").unwrap();

        let list = load_collection_list(&path, BASE).unwrap();
        assert_eq!(list.notice, Some(NOTICE_INITIAL));
        assert!(list.contains_url("https://video.ethz.ch/lectures/a/"));
    }
}
