//! Post storage for Postcraft.
//!
//! Approved posts are written through the [`PostStore`] trait to one of two
//! backends:
//!
//! - [`AirtableStore`]: one row per post in an Airtable table
//! - [`JsonPostStore`]: one JSON file per post under the state directory,
//!   written atomically (temp file + rename)
//!
//! # Example
//!
//! ```no_run
//! use postcraft_persistence::{JsonPostStore, PostStore};
//!
//! # async fn run() -> postcraft_persistence::Result<()> {
//! let store = JsonPostStore::new("/tmp/postcraft")?;
//! let recent = store.recent_posts(10).await?;
//! println!("{} posts", recent.len());
//! # Ok(())
//! # }
//! ```

pub mod airtable;
pub mod atomic;
pub mod error;
pub mod local;
pub mod store;

pub use airtable::AirtableStore;
pub use error::{PersistenceError, Result};
pub use local::JsonPostStore;
pub use store::PostStore;
