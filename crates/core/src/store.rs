//! ObjectStore capability trait
//!
//! The exact operation set the session needs from a storage backend,
//! modelled as an explicit trait so the S3 adapter can be swapped for a
//! test double. Listings are pulled page by page; `next_token == None`
//! signals end-of-listing.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::error::Result;
use crate::types::{BucketPage, BucketUpdate, ObjectPage, ObjectRecord};

/// Source of an upload payload.
///
/// `File` is streamed by the backend without full buffering; `Bytes` is an
/// in-memory payload (used by tests and small writes).
#[derive(Debug, Clone)]
pub enum ObjectBody {
    File(PathBuf),
    Bytes(Bytes),
}

impl ObjectBody {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ObjectBody::File(path.into())
    }
}

impl From<Bytes> for ObjectBody {
    fn from(bytes: Bytes) -> Self {
        ObjectBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for ObjectBody {
    fn from(bytes: Vec<u8>) -> Self {
        ObjectBody::Bytes(Bytes::from(bytes))
    }
}

/// Streaming handle for an object read; callers decide whether to buffer
/// it fully or copy it straight to disk.
pub type ObjectReader = Box<dyn AsyncRead + Send + Unpin>;

/// Operations bkt requires from a storage backend.
///
/// Implementations perform exactly one remote call per method and never
/// retry; transient failures surface to the caller unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create or replace the object at `key`, streaming `body`
    async fn put_object<'a>(
        &self,
        bucket: &str,
        key: &str,
        body: ObjectBody,
        content_type: Option<&'a str>,
    ) -> Result<ObjectRecord>;

    /// Open a read stream for the object at `key`
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectReader>;

    /// Delete the object at `key`, or one specific version of it
    async fn delete_object<'a>(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&'a str>,
    ) -> Result<()>;

    /// Pull one page of the bucket's object listing, in backend order.
    /// With `include_versions`, historical versions and delete markers are
    /// listed too.
    async fn list_objects(
        &self,
        bucket: &str,
        include_versions: bool,
        page_token: Option<String>,
    ) -> Result<ObjectPage>;

    /// Pull one page of the account's bucket listing
    async fn list_buckets(&self, page_token: Option<String>) -> Result<BucketPage>;

    /// Create `bucket` in `location`
    async fn create_bucket<'a>(&self, bucket: &str, location: Option<&'a str>) -> Result<()>;

    /// Delete `bucket`; the backend rejects non-empty buckets
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    /// Apply an attribute patch to `bucket`
    async fn update_bucket(&self, bucket: &str, update: &BucketUpdate) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_body_from_path() {
        let body = ObjectBody::from_path("data/report.csv");
        match body {
            ObjectBody::File(p) => assert_eq!(p, PathBuf::from("data/report.csv")),
            ObjectBody::Bytes(_) => panic!("expected file body"),
        }
    }

    #[test]
    fn test_object_body_from_bytes() {
        let body: ObjectBody = vec![1u8, 2, 3].into();
        match body {
            ObjectBody::Bytes(b) => assert_eq!(b.as_ref(), &[1, 2, 3]),
            ObjectBody::File(_) => panic!("expected bytes body"),
        }
    }
}
