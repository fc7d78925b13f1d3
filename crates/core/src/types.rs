//! Data records exchanged with the storage backend
//!
//! All of these are remote-owned snapshots: the session never caches them
//! between calls, so there is no local consistency concern.

use jiff::Timestamp;
use serde::Serialize;

/// One object (or object version) as reported by a listing or a put
#[derive(Debug, Clone, Serialize)]
pub struct ObjectRecord {
    /// Key, unique within the bucket
    pub key: String,
    /// Version id when the backend lists historical versions
    pub version_id: Option<String>,
    /// Size in bytes, when the backend reports it
    pub size_bytes: Option<i64>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    /// Creation time. Objects are immutable blobs here, so backends that
    /// only report last-modified report creation time by the same token.
    pub created: Option<Timestamp>,
    pub updated: Option<Timestamp>,
    /// Soft-delete time for versioned backends
    pub deleted: Option<Timestamp>,
    /// True when this entry is a delete marker, not real content
    pub is_delete_marker: bool,
}

impl ObjectRecord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: None,
            size_bytes: None,
            content_type: None,
            etag: None,
            created: None,
            updated: None,
            deleted: None,
            is_delete_marker: false,
        }
    }

    /// Age in whole days at `now`, truncated toward zero.
    ///
    /// An object created 30 days and 23 hours ago has an age of 30; one
    /// created 29 days and 23 hours ago has an age of 29. The expiry sweep
    /// deletes at `age >= threshold`, so the boundary is inclusive and the
    /// truncation makes "almost N days" count as N-1. Returns `None` when
    /// the backend reported no creation time.
    pub fn age_days(&self, now: Timestamp) -> Option<i64> {
        let created = self.created?;
        let secs = now.as_second() - created.as_second();
        Some(secs / 86_400)
    }
}

/// One bucket as reported by the account listing
#[derive(Debug, Clone, Serialize)]
pub struct BucketRecord {
    pub name: String,
    pub location: Option<String>,
    pub storage_class: Option<String>,
    pub versioning_enabled: Option<bool>,
    pub public_access_blocked: Option<bool>,
    /// Retention period in seconds, when the backend enforces one
    pub retention_secs: Option<u64>,
    pub created: Option<Timestamp>,
}

impl BucketRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
            storage_class: None,
            versioning_enabled: None,
            public_access_blocked: None,
            retention_secs: None,
            created: None,
        }
    }
}

/// Attribute patch applied by `update_bucket`; `None` fields are untouched
#[derive(Debug, Clone, Default)]
pub struct BucketUpdate {
    pub versioning_enabled: Option<bool>,
    pub public_access_blocked: Option<bool>,
    pub storage_class: Option<String>,
}

impl BucketUpdate {
    /// True when the patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.versioning_enabled.is_none()
            && self.public_access_blocked.is_none()
            && self.storage_class.is_none()
    }
}

/// One page of an object listing.
///
/// `next_token == None` is the end-of-listing sentinel; it is a normal
/// termination condition, distinct from an error.
#[derive(Debug, Clone)]
pub struct ObjectPage {
    pub items: Vec<ObjectRecord>,
    pub next_token: Option<String>,
}

/// One page of the account's bucket listing
#[derive(Debug, Clone)]
pub struct BucketPage {
    pub items: Vec<BucketRecord>,
    pub next_token: Option<String>,
}

/// Outcome of one expiry sweep.
///
/// The sweep visits every listed object exactly once; per-object delete
/// failures are recorded here instead of aborting the scan.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub threshold_days: i64,
    /// Objects the listing produced
    pub visited: usize,
    /// Objects actually deleted
    pub deleted: usize,
    /// (key, error message) per failed delete
    pub failures: Vec<(String, String)>,
}

impl SweepReport {
    pub fn new(threshold_days: i64) -> Self {
        Self {
            threshold_days,
            visited: 0,
            deleted: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
