//! StorageSession: the per-invocation façade over a storage backend
//!
//! A session is created once at startup, bound to one bucket, one project
//! label, one location, and one wall-clock deadline. It holds no state
//! between calls; every operation re-queries the backend.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use tokio::io::AsyncReadExt;

use crate::error::{Error, Result};
use crate::store::{ObjectBody, ObjectStore};
use crate::types::{BucketRecord, BucketUpdate, SweepReport};

/// Session façade bound to a single bucket.
///
/// Operations run sequentially and are single-shot: any remote failure is
/// wrapped with an operation-specific error and returned immediately, with
/// no retry. The per-invocation deadline applies to every remote call; an
/// elapsed deadline surfaces as [`Error::Cancelled`].
pub struct StorageSession {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    location: Option<String>,
    project: Option<String>,
    deadline: Option<tokio::time::Instant>,
}

impl StorageSession {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            location: None,
            project: None,
            deadline: None,
        }
    }

    /// Location used when creating the bound bucket
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Project/account label, carried through to messages only
    pub fn with_project(mut self, project: Option<String>) -> Self {
        self.project = project;
        self
    }

    /// Set the wall-clock budget for the whole invocation, measured from now
    pub fn with_timeout(mut self, budget: Duration) -> Self {
        self.deadline = Some(tokio::time::Instant::now() + budget);
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Run one remote call under the session deadline
    async fn guard<T, F>(&self, op: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, fut).await {
                Ok(result) => result,
                Err(_) => Err(Error::Cancelled(format!(
                    "invocation deadline elapsed during {op}"
                ))),
            },
            None => fut.await,
        }
    }

    // ---- object operations ----

    /// Upload local file `name` to the remote key of the same name,
    /// replacing any existing object. Partial remote writes are not rolled
    /// back: a finalize failure reports and exits, it does not clean up.
    pub async fn upload_object(&self, name: &str) -> Result<()> {
        tracing::debug!(bucket = %self.bucket, key = name, "upload object");

        // Surface an unreadable local file as an I/O error before any
        // remote call is made.
        let meta = tokio::fs::metadata(name).await?;
        if meta.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{name} is a directory"),
            )));
        }

        let content_type = mime_guess::from_path(name).first_raw();
        let body = ObjectBody::from_path(name);
        self.guard(
            "upload",
            self.store
                .put_object(&self.bucket, name, body, content_type),
        )
        .await?;
        Ok(())
    }

    /// Read remote object `key` fully into memory
    pub async fn read_object(&self, key: &str) -> Result<Vec<u8>> {
        tracing::debug!(bucket = %self.bucket, key, "read object");

        let mut reader = self
            .guard("read", self.store.get_object(&self.bucket, key))
            .await?;

        let mut data = Vec::new();
        reader.read_to_end(&mut data).await.map_err(|e| {
            Error::RemoteRead(format!("draining object '{key}' from '{}': {e}", self.bucket))
        })?;
        Ok(data)
    }

    /// Download remote object `key` into a local file of the same name,
    /// streaming without full buffering. See [`download_object_to`].
    ///
    /// [`download_object_to`]: StorageSession::download_object_to
    pub async fn download_object(&self, key: &str) -> Result<u64> {
        self.download_object_to(key, Path::new(key)).await
    }

    /// Download remote object `key` into `dest`.
    ///
    /// The remote stream is opened before the destination file is created,
    /// so an absent key never leaves an empty local file behind. A stream
    /// failure mid-copy leaves `dest` truncated; there is no rollback.
    pub async fn download_object_to(&self, key: &str, dest: &Path) -> Result<u64> {
        tracing::debug!(bucket = %self.bucket, key, dest = %dest.display(), "download object");

        let reader = self
            .guard("download", self.store.get_object(&self.bucket, key))
            .await?;

        let mut file = tokio::fs::File::create(dest).await?;
        let copy = async {
            let mut reader = reader;
            tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
                Error::RemoteRead(format!(
                    "streaming object '{key}' to '{}' (file may be truncated): {e}",
                    dest.display()
                ))
            })
        };
        let written = self.guard("download", copy).await?;
        Ok(written)
    }

    /// Delete remote object `key`. Deleting an absent key is an error,
    /// never a silent success.
    pub async fn delete_object(&self, key: &str) -> Result<()> {
        tracing::debug!(bucket = %self.bucket, key, "delete object");
        self.guard(
            "delete",
            self.store.delete_object(&self.bucket, key, None),
        )
        .await
    }

    /// Delete every object (all versions) whose age in whole days is at
    /// least `threshold_days`.
    ///
    /// Age is `now - created`, truncated to whole days: an object created
    /// 30 days and 23 hours ago has age 30 and is swept at threshold 30;
    /// one created 29 days and 23 hours ago has age 29 and is kept.
    ///
    /// The sweep visits every listed record once, in listing order, and is
    /// not transactional: per-object delete failures are recorded in the
    /// report and do not halt the scan. Only a listing failure aborts.
    pub async fn delete_older_than(&self, threshold_days: i64) -> Result<SweepReport> {
        tracing::debug!(bucket = %self.bucket, threshold_days, "expiry sweep");

        let now = Timestamp::now();
        let mut report = SweepReport::new(threshold_days);
        let mut token: Option<String> = None;

        loop {
            let page = self
                .guard(
                    "sweep listing",
                    self.store.list_objects(&self.bucket, true, token.clone()),
                )
                .await?;

            for record in page.items {
                report.visited += 1;

                // Removing a delete marker would resurrect the object
                // underneath it, the opposite of expiry.
                if record.is_delete_marker {
                    continue;
                }

                let Some(age) = record.age_days(now) else {
                    tracing::debug!(key = %record.key, "no creation time, skipping");
                    continue;
                };
                if age < threshold_days {
                    continue;
                }

                let result = self
                    .guard(
                        "sweep delete",
                        self.store.delete_object(
                            &self.bucket,
                            &record.key,
                            record.version_id.as_deref(),
                        ),
                    )
                    .await;
                match result {
                    Ok(()) => {
                        tracing::debug!(key = %record.key, age, "expired object deleted");
                        report.deleted += 1;
                    }
                    // An elapsed deadline aborts the whole sweep; a plain
                    // delete failure is recorded and the scan continues.
                    Err(e @ Error::Cancelled(_)) => return Err(e),
                    Err(e) => {
                        tracing::warn!(key = %record.key, error = %e, "sweep delete failed");
                        report.failures.push((record.key, e.to_string()));
                    }
                }
            }

            token = page.next_token;
            if token.is_none() {
                break;
            }
        }

        Ok(report)
    }

    // ---- bucket operations ----

    /// All buckets visible to the bound account, drained page by page
    pub async fn list_buckets(&self) -> Result<Vec<BucketRecord>> {
        tracing::debug!(project = ?self.project, "list buckets");

        let mut buckets = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self
                .guard("bucket listing", self.store.list_buckets(token.clone()))
                .await?;
            buckets.extend(page.items);
            token = page.next_token;
            if token.is_none() {
                break;
            }
        }
        Ok(buckets)
    }

    /// Keys of the bound bucket's current objects, in backend listing order
    pub async fn list_bucket_objects(&self) -> Result<Vec<String>> {
        tracing::debug!(bucket = %self.bucket, "list objects");

        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self
                .guard(
                    "object listing",
                    self.store.list_objects(&self.bucket, false, token.clone()),
                )
                .await?;
            keys.extend(page.items.into_iter().map(|r| r.key));
            token = page.next_token;
            if token.is_none() {
                break;
            }
        }
        Ok(keys)
    }

    /// True when the bound bucket appears in the account's bucket listing
    async fn bucket_listed(&self) -> Result<bool> {
        let buckets = self.list_buckets().await?;
        Ok(buckets.iter().any(|b| b.name == self.bucket))
    }

    /// Create the bound bucket.
    ///
    /// The existence check and the create call are two separate steps;
    /// another actor creating the same name in between wins the race and
    /// the create call's failure is reported as-is. The window is
    /// inherent to the backend's non-conditional create.
    pub async fn create_bucket(&self) -> Result<()> {
        tracing::debug!(bucket = %self.bucket, location = ?self.location, "create bucket");

        if self.bucket_listed().await? {
            return Err(Error::AlreadyExists(format!(
                "bucket '{}' already exists",
                self.bucket
            )));
        }

        self.guard(
            "bucket create",
            self.store
                .create_bucket(&self.bucket, self.location.as_deref()),
        )
        .await
    }

    /// Delete the bound bucket.
    ///
    /// Refuses with [`Error::NotEmpty`] before any delete call when the
    /// bucket still holds objects, then re-confirms existence against the
    /// bucket listing. Both pre-checks share the create-side caveat: they
    /// are not atomic with the delete.
    pub async fn delete_bucket(&self) -> Result<()> {
        tracing::debug!(bucket = %self.bucket, "delete bucket");

        let objects = self.list_bucket_objects().await?;
        if !objects.is_empty() {
            return Err(Error::NotEmpty(format!(
                "bucket '{}' holds {} object(s) and cannot be deleted",
                self.bucket,
                objects.len()
            )));
        }

        if !self.bucket_listed().await? {
            return Err(Error::NotFound(format!(
                "bucket '{}' does not exist",
                self.bucket
            )));
        }

        self.guard("bucket delete", self.store.delete_bucket(&self.bucket))
            .await
    }

    /// Apply an attribute patch to the bound bucket, after re-confirming
    /// it exists
    pub async fn update_bucket(&self, update: &BucketUpdate) -> Result<()> {
        tracing::debug!(bucket = %self.bucket, ?update, "update bucket");

        if !self.bucket_listed().await? {
            return Err(Error::NotFound(format!(
                "bucket '{}' does not exist",
                self.bucket
            )));
        }

        self.guard(
            "bucket update",
            self.store.update_bucket(&self.bucket, update),
        )
        .await
    }
}
