//! Series of posts generated from the same source.

use serde::{Deserialize, Serialize};

use crate::ids::SeriesId;
use crate::post::Post;
use crate::tone::Tone;

/// An ordered group of posts sharing one originating markdown source.
///
/// Has no lifecycle of its own beyond the session that created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    /// Unique identifier for the series.
    pub id: SeriesId,

    /// Name of the source document.
    pub source_name: String,

    /// Approved posts in sequence order.
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl Series {
    /// Creates an empty series for a source document.
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            id: SeriesId::new(),
            source_name: source_name.into(),
            posts: Vec::new(),
        }
    }

    /// Sequence number the next post will get.
    pub fn next_sequence(&self) -> u32 {
        self.posts.len() as u32 + 1
    }

    /// Appends an approved post.
    pub fn push(&mut self, post: Post) {
        self.posts.push(post);
    }

    /// Most recently added post.
    pub fn last(&self) -> Option<&Post> {
        self.posts.last()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Tones already used in this series, in order of first use.
    pub fn tones_used(&self) -> Vec<Tone> {
        let mut tones = Vec::new();
        for post in &self.posts {
            if !tones.contains(&post.tone) {
                tones.push(post.tone);
            }
        }
        tones
    }
}
