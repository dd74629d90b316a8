//! synchub-blob: filesystem storage for uploaded files.
//!
//! Uploaded bytes live as plain files in a single directory, addressed by a
//! collision-resistant stored name derived from the original filename. All
//! other metadata (uploader, timestamps, the original name itself) belongs to
//! the server's database; this crate only moves bytes.

pub mod error;
pub mod store;

pub use error::{BlobError, Result};
pub use store::{sanitize_filename, BlobStore, DiskStore};
