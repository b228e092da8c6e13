//! PostStore trait definition for post storage backends.

use async_trait::async_trait;

use postcraft_models::{Post, SeriesId};

use crate::error::Result;

/// Trait for post storage backends.
///
/// One record per approved post. Backends do not deduplicate: saving the
/// same post twice creates two records.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Short backend name for logs and `/sessions` output.
    fn backend_name(&self) -> &'static str;

    /// Persist one post.
    async fn save_post(&self, post: &Post) -> Result<()>;

    /// Every stored post of a series, ordered by sequence number.
    async fn series_posts(&self, series_id: &SeriesId) -> Result<Vec<Post>>;

    /// The `limit` most recently created posts, newest first.
    async fn recent_posts(&self, limit: usize) -> Result<Vec<Post>>;

    /// Verify the backend is reachable and writable.
    async fn health_check(&self) -> Result<()>;
}
