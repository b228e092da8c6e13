//! Crash-safe file writes for the local post store.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PersistenceError, Result};

fn write_error(path: &Path) -> impl Fn(std::io::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::WriteError {
        path: path.to_path_buf(),
        source,
    }
}

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| PersistenceError::DirectoryError {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `value` as pretty JSON to `path` through a temp file and rename.
///
/// Readers never observe a half-written post file.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    ensure_dir(dir)?;

    let json = serde_json::to_vec_pretty(value)?;
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_error(path))?;
    temp.write_all(&json).map_err(write_error(path))?;
    temp.flush().map_err(write_error(path))?;
    temp.persist(path)
        .map_err(|e| write_error(path)(e.error))?;
    Ok(())
}

/// Read and decode a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read(path).map_err(|source| PersistenceError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_slice(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use postcraft_models::{AudienceType, GeneratedPost, Post, SeriesId, Tone};
    use tempfile::tempdir;

    fn sample_post() -> Post {
        let generated = GeneratedPost {
            tone: Tone::FinishedAndProud,
            post_content: "Shipped the release.".into(),
            reason: String::new(),
            fallback: false,
        };
        Post::from_generated(&generated, AudienceType::Business, SeriesId::new(), 1)
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("posts/series-1/post-1.json");

        write_json_atomic(&path, &sample_post()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_post_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("post.json");
        let post = sample_post();

        write_json_atomic(&path, &post).unwrap();
        let loaded: Post = read_json(&path).unwrap();
        assert_eq!(loaded, post);
    }

    #[test]
    fn test_overwrite_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("post.json");

        write_json_atomic(&path, &sample_post()).unwrap();
        write_json_atomic(&path, &sample_post()).unwrap();

        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_read_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = read_json::<Post>(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, PersistenceError::ReadError { .. }));
    }
}
