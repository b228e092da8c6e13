//! Local JSON post store, used when Airtable is not configured.
//!
//! Layout:
//! ```text
//! state_dir/
//! └── posts/
//!     └── series-<uuid>/
//!         ├── 0001-post-<uuid>.json
//!         └── 0002-post-<uuid>.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use postcraft_models::{Post, SeriesId};

use crate::atomic::{ensure_dir, read_json, write_json_atomic};
use crate::error::{PersistenceError, Result};
use crate::store::PostStore;

/// Post store writing one JSON file per post.
pub struct JsonPostStore {
    posts_dir: PathBuf,
}

impl JsonPostStore {
    /// Open (and create if needed) the store under `state_dir`.
    pub fn new(state_dir: impl Into<PathBuf>) -> Result<Self> {
        let posts_dir = state_dir.into().join("posts");
        ensure_dir(&posts_dir)?;
        info!(path = %posts_dir.display(), "Using local post store");
        Ok(Self { posts_dir })
    }

    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }

    fn series_dir(&self, series_id: &SeriesId) -> PathBuf {
        self.posts_dir.join(series_id.as_str())
    }

    fn post_path(&self, post: &Post) -> PathBuf {
        self.series_dir(&post.series_id)
            .join(format!("{:04}-{}.json", post.sequence, post.id))
    }

    fn read_dir_posts(dir: &Path) -> Result<Vec<Post>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistenceError::ReadError {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        };

        let mut posts = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_json::<Post>(&path) {
                Ok(post) => posts.push(post),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable post file"),
            }
        }
        Ok(posts)
    }
}

#[async_trait]
impl PostStore for JsonPostStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn save_post(&self, post: &Post) -> Result<()> {
        let path = self.post_path(post);
        write_json_atomic(&path, post)?;
        debug!(post_id = %post.id, path = %path.display(), "Saved post locally");
        Ok(())
    }

    async fn series_posts(&self, series_id: &SeriesId) -> Result<Vec<Post>> {
        let mut posts = Self::read_dir_posts(&self.series_dir(series_id))?;
        posts.sort_by_key(|p| p.sequence);
        Ok(posts)
    }

    async fn recent_posts(&self, limit: usize) -> Result<Vec<Post>> {
        let series_dirs = fs::read_dir(&self.posts_dir).map_err(|source| PersistenceError::ReadError {
            path: self.posts_dir.clone(),
            source,
        })?;

        let mut posts = Vec::new();
        for entry in series_dirs.flatten() {
            if entry.path().is_dir() {
                posts.extend(Self::read_dir_posts(&entry.path())?);
            }
        }

        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit);
        Ok(posts)
    }

    async fn health_check(&self) -> Result<()> {
        ensure_dir(&self.posts_dir)?;
        tempfile::NamedTempFile::new_in(&self.posts_dir).map_err(|source| {
            PersistenceError::WriteError {
                path: self.posts_dir.clone(),
                source,
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use postcraft_models::{AudienceType, GeneratedPost, Tone};
    use tempfile::TempDir;

    fn create_test_store() -> (JsonPostStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonPostStore::new(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    fn post(series: &SeriesId, sequence: u32, minutes_ago: i64) -> Post {
        let generated = GeneratedPost {
            tone: Tone::BehindTheBuild,
            post_content: format!("Post {}", sequence),
            reason: String::new(),
            fallback: false,
        };
        let mut post = Post::from_generated(&generated, AudienceType::Business, series.clone(), sequence);
        post.created_at = Utc::now() - Duration::minutes(minutes_ago);
        post.approve();
        post
    }

    #[tokio::test]
    async fn test_save_and_read_series_in_sequence_order() {
        let (store, _dir) = create_test_store();
        let series = SeriesId::new();

        store.save_post(&post(&series, 2, 1)).await.unwrap();
        store.save_post(&post(&series, 1, 2)).await.unwrap();
        store.save_post(&post(&SeriesId::new(), 1, 3)).await.unwrap();

        let posts = store.series_posts(&series).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].sequence, 1);
        assert_eq!(posts[1].sequence, 2);
    }

    #[tokio::test]
    async fn test_unknown_series_is_empty() {
        let (store, _dir) = create_test_store();
        assert!(store.series_posts(&SeriesId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recent_posts_newest_first_across_series() {
        let (store, _dir) = create_test_store();
        let a = SeriesId::new();
        let b = SeriesId::new();

        store.save_post(&post(&a, 1, 30)).await.unwrap();
        store.save_post(&post(&b, 1, 10)).await.unwrap();
        store.save_post(&post(&a, 2, 20)).await.unwrap();

        let recent = store.recent_posts(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].series_id, b);
        assert_eq!(recent[1].series_id, a);
        assert_eq!(recent[1].sequence, 2);
    }

    #[tokio::test]
    async fn test_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let series = SeriesId::new();
        let saved = post(&series, 1, 0);
        {
            let store = JsonPostStore::new(temp_dir.path()).unwrap();
            store.save_post(&saved).await.unwrap();
        }

        let store = JsonPostStore::new(temp_dir.path()).unwrap();
        let loaded = store.series_posts(&series).await.unwrap();
        assert_eq!(loaded, vec![saved]);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_skipped() {
        let (store, _dir) = create_test_store();
        let series = SeriesId::new();
        store.save_post(&post(&series, 1, 0)).await.unwrap();
        fs::write(store.series_dir(&series).join("0002-bad.json"), b"{not json").unwrap();

        assert_eq!(store.series_posts(&series).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_health_check() {
        let (store, _dir) = create_test_store();
        assert!(store.health_check().await.is_ok());
        assert_eq!(store.backend_name(), "local");
    }
}
