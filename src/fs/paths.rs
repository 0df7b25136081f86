//! On-disk layout of downloaded recordings.

use std::path::{Path, PathBuf};

use chrono::Datelike;

use crate::error::Result;
use crate::fs::naming::safe_name;
use crate::media::Item;

/// `<save_dir>/<year>_<collection title>` for an item.
///
/// The year is the item's creation year, so a series spanning New Year is
/// split across two folders.
pub fn collection_folder(save_dir: &Path, item: &Item) -> Result<PathBuf> {
    let folder = format!(
        "{}_{}",
        item.created.year(),
        safe_name(&item.collection_title)?
    );
    Ok(save_dir.join(folder))
}

/// Ensure a directory exists, creating it (and parents) if needed.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path).await?;
        tracing::debug!("Created directory {}", path.display());
    }
    Ok(())
}

/// Current size of a file, 0 if it does not exist.
pub async fn existing_len(path: &Path) -> Result<u64> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn item(title: &str, year: i32) -> Item {
        Item {
            id: "X1".into(),
            title: "t".into(),
            created: Utc.with_ymd_and_hms(year, 1, 2, 3, 4, 0).unwrap(),
            collection_title: title.into(),
            page_url: "https://video.example/s/v/X1".into(),
            video_sources: Default::default(),
            unranked_video: None,
            audio_sources: Default::default(),
            subtitle_sources: Default::default(),
        }
    }

    #[test]
    fn test_collection_folder() {
        let folder = collection_folder(Path::new("/data"), &item("Linear Algebra", 2024)).unwrap();
        assert_eq!(folder, PathBuf::from("/data/2024_Linear_Algebra"));
    }

    #[tokio::test]
    async fn test_ensure_dir_and_len() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        ensure_dir(&nested).await.unwrap();
        assert!(nested.is_dir());

        let file = nested.join("f.bin");
        assert_eq!(existing_len(&file).await.unwrap(), 0);
        tokio::fs::write(&file, b"12345").await.unwrap();
        assert_eq!(existing_len(&file).await.unwrap(), 5);
    }
}
