//! Segment store adapter.
//!
//! The compilation pipeline only ever touches remote content through the
//! narrow [`SegmentStore`] trait: list a per-user folder, download/upload
//! files, delete, and resolve folder handles. [`BucketStore`] implements
//! it against any S3-compatible endpoint, treating folders as key
//! prefixes.

pub mod bucket;
pub mod error;
pub mod store;

pub use bucket::{BucketConfig, BucketStore};
pub use error::{StorageError, StorageResult};
pub use store::{content_type_for_name, FolderId, RemoteFile, SegmentStore};
