//! S3 adapter
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from bkt-core.
//! One remote call per method (plus the documented head-object preflight
//! on unversioned deletes), no retries.

use async_trait::async_trait;

use bkt_core::{
    BucketPage, BucketRecord, BucketUpdate, Error, ObjectBody, ObjectPage, ObjectReader,
    ObjectRecord, ObjectStore, Profile, Result,
};
use jiff::Timestamp;

/// Separator inside a version-listing page token, between the key marker
/// and the version-id marker
const VERSION_TOKEN_SEP: char = '\u{1}';

/// S3-backed ObjectStore
pub struct S3Store {
    inner: aws_sdk_s3::Client,
}

impl S3Store {
    /// Build a client from a profile: static credentials, explicit
    /// endpoint, path-style addressing for S3-compatible servers
    pub async fn from_profile(profile: &Profile) -> Result<Self> {
        let credentials = aws_credential_types::Credentials::new(
            profile.access_key.clone(),
            profile.secret_key.clone(),
            None, // session token
            None, // expiry
            "bkt-static-credentials",
        );

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(profile.region.clone()))
            .endpoint_url(&profile.endpoint)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
        })
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    /// Format an SDK error into a detailed message
    fn format_sdk_error<E: std::fmt::Display>(error: &aws_sdk_s3::error::SdkError<E>) -> String {
        match error {
            aws_sdk_s3::error::SdkError::ServiceError(service_err) => {
                let err = service_err.err();
                let meta = service_err.raw();
                let mut msg = format!("service error: {}", err);
                if let Some(code) = meta.headers().get("x-amz-error-code")
                    && let Ok(code_str) = std::str::from_utf8(code.as_bytes())
                {
                    msg.push_str(&format!(" (code: {})", code_str));
                }
                msg
            }
            aws_sdk_s3::error::SdkError::ConstructionFailure(err) => {
                format!("request construction failed: {:?}", err)
            }
            aws_sdk_s3::error::SdkError::TimeoutError(_) => "request timeout".to_string(),
            aws_sdk_s3::error::SdkError::DispatchFailure(err) => {
                format!("network dispatch error: {:?}", err)
            }
            aws_sdk_s3::error::SdkError::ResponseError(err) => {
                format!("response error: {:?}", err)
            }
            _ => error.to_string(),
        }
    }
}

/// True when the backend's error text names an absent key or bucket
fn names_missing_target(msg: &str) -> bool {
    msg.contains("NotFound") || msg.contains("NoSuchKey") || msg.contains("NoSuchBucket")
}

/// Convert an SDK timestamp to a jiff one
fn to_timestamp(dt: &aws_smithy_types::DateTime) -> Option<Timestamp> {
    Timestamp::from_second(dt.secs()).ok()
}

/// Join the two markers of a version listing into one opaque page token
fn encode_version_token(key_marker: &str, version_marker: &str) -> String {
    format!("{key_marker}{VERSION_TOKEN_SEP}{version_marker}")
}

/// Split a version-listing page token back into its markers
fn decode_version_token(token: &str) -> (String, String) {
    match token.split_once(VERSION_TOKEN_SEP) {
        Some((key, version)) => (key.to_string(), version.to_string()),
        None => (token.to_string(), String::new()),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object<'a>(
        &self,
        bucket: &str,
        key: &str,
        body: ObjectBody,
        content_type: Option<&'a str>,
    ) -> Result<ObjectRecord> {
        let (stream, size) = match body {
            ObjectBody::File(path) => {
                let size = tokio::fs::metadata(&path).await.ok().map(|m| m.len() as i64);
                let stream = aws_sdk_s3::primitives::ByteStream::from_path(&path)
                    .await
                    .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
                (stream, size)
            }
            ObjectBody::Bytes(bytes) => {
                let size = Some(bytes.len() as i64);
                (aws_sdk_s3::primitives::ByteStream::from(bytes), size)
            }
        };

        let mut request = self.inner.put_object().bucket(bucket).key(key).body(stream);
        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        let response = request.send().await.map_err(|e| {
            Error::RemoteWrite(format!(
                "putting '{key}' into '{bucket}': {}",
                Self::format_sdk_error(&e)
            ))
        })?;

        let mut record = ObjectRecord::new(key);
        record.size_bytes = size;
        record.content_type = content_type.map(|s| s.to_string());
        record.etag = response.e_tag().map(|s| s.trim_matches('"').to_string());
        record.created = Some(Timestamp::now());
        Ok(record)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectReader> {
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let msg = Self::format_sdk_error(&e);
                if names_missing_target(&msg) {
                    Error::RemoteRead(format!("object '{key}' not found in '{bucket}'"))
                } else {
                    Error::RemoteRead(format!("opening '{key}' from '{bucket}': {msg}"))
                }
            })?;

        Ok(Box::new(response.body.into_async_read()))
    }

    async fn delete_object<'a>(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&'a str>,
    ) -> Result<()> {
        // S3 reports a successful delete for keys that never existed.
        // The CLI's contract is "deleting a missing key is an error", so
        // unversioned deletes probe first. Version ids come straight out
        // of a listing and skip the probe.
        if version_id.is_none() {
            self.inner
                .head_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| {
                    let msg = Self::format_sdk_error(&e);
                    if names_missing_target(&msg) || msg.contains("404") {
                        Error::NotFound(format!("object '{key}' in '{bucket}'"))
                    } else {
                        Error::RemoteDelete(format!("probing '{key}' in '{bucket}': {msg}"))
                    }
                })?;
        }

        let mut request = self.inner.delete_object().bucket(bucket).key(key);
        if let Some(vid) = version_id {
            request = request.version_id(vid);
        }

        request.send().await.map_err(|e| {
            Error::RemoteDelete(format!(
                "deleting '{key}' from '{bucket}': {}",
                Self::format_sdk_error(&e)
            ))
        })?;

        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        include_versions: bool,
        page_token: Option<String>,
    ) -> Result<ObjectPage> {
        if include_versions {
            let mut request = self.inner.list_object_versions().bucket(bucket);
            if let Some(token) = &page_token {
                let (key_marker, version_marker) = decode_version_token(token);
                request = request.key_marker(key_marker);
                if !version_marker.is_empty() {
                    request = request.version_id_marker(version_marker);
                }
            }

            let response = request.send().await.map_err(|e| {
                Error::RemoteList(format!(
                    "listing versions in '{bucket}': {}",
                    Self::format_sdk_error(&e)
                ))
            })?;

            let mut items = Vec::new();
            for v in response.versions() {
                let mut record = ObjectRecord::new(v.key().unwrap_or_default());
                record.version_id = v.version_id().map(|s| s.to_string());
                record.size_bytes = v.size();
                record.etag = v.e_tag().map(|s| s.trim_matches('"').to_string());
                record.created = v.last_modified().and_then(to_timestamp);
                record.updated = record.created;
                items.push(record);
            }
            for m in response.delete_markers() {
                let mut record = ObjectRecord::new(m.key().unwrap_or_default());
                record.version_id = m.version_id().map(|s| s.to_string());
                record.is_delete_marker = true;
                record.created = m.last_modified().and_then(to_timestamp);
                record.deleted = record.created;
                items.push(record);
            }

            let next_token = if response.is_truncated().unwrap_or(false) {
                response.next_key_marker().map(|k| {
                    encode_version_token(k, response.next_version_id_marker().unwrap_or_default())
                })
            } else {
                None
            };

            Ok(ObjectPage { items, next_token })
        } else {
            let mut request = self.inner.list_objects_v2().bucket(bucket);
            if let Some(token) = &page_token {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|e| {
                let msg = Self::format_sdk_error(&e);
                if names_missing_target(&msg) {
                    Error::RemoteList(format!("bucket '{bucket}' not found"))
                } else {
                    Error::RemoteList(format!("listing '{bucket}': {msg}"))
                }
            })?;

            let items = response
                .contents()
                .iter()
                .map(|object| {
                    let mut record = ObjectRecord::new(object.key().unwrap_or_default());
                    record.size_bytes = object.size();
                    record.etag = object.e_tag().map(|s| s.trim_matches('"').to_string());
                    record.created = object.last_modified().and_then(to_timestamp);
                    record.updated = record.created;
                    record
                })
                .collect();

            let next_token = response.next_continuation_token().map(|s| s.to_string());
            Ok(ObjectPage { items, next_token })
        }
    }

    async fn list_buckets(&self, page_token: Option<String>) -> Result<BucketPage> {
        let mut request = self.inner.list_buckets();
        if let Some(token) = &page_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(|e| {
            Error::RemoteList(format!(
                "listing buckets: {}",
                Self::format_sdk_error(&e)
            ))
        })?;

        let items = response
            .buckets()
            .iter()
            .map(|b| {
                let mut record = BucketRecord::new(b.name().unwrap_or_default());
                record.created = b.creation_date().and_then(to_timestamp);
                record.location = b.bucket_region().map(|s| s.to_string());
                record
            })
            .collect();

        let next_token = response.continuation_token().map(|s| s.to_string());
        Ok(BucketPage { items, next_token })
    }

    async fn create_bucket<'a>(&self, bucket: &str, location: Option<&'a str>) -> Result<()> {
        let mut request = self.inner.create_bucket().bucket(bucket);

        // us-east-1 is the one region the API refuses as an explicit
        // location constraint.
        if let Some(location) = location.filter(|l| *l != "us-east-1") {
            let constraint = aws_sdk_s3::types::BucketLocationConstraint::from(location);
            let config = aws_sdk_s3::types::CreateBucketConfiguration::builder()
                .location_constraint(constraint)
                .build();
            request = request.create_bucket_configuration(config);
        }

        request.send().await.map_err(|e| {
            let msg = Self::format_sdk_error(&e);
            if msg.contains("BucketAlreadyExists") || msg.contains("BucketAlreadyOwnedByYou") {
                Error::AlreadyExists(format!("bucket '{bucket}'"))
            } else {
                Error::RemoteCreate(format!("creating '{bucket}': {msg}"))
            }
        })?;

        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.inner
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| {
                let msg = Self::format_sdk_error(&e);
                if names_missing_target(&msg) {
                    Error::NotFound(format!("bucket '{bucket}'"))
                } else if msg.contains("BucketNotEmpty") {
                    Error::NotEmpty(format!("bucket '{bucket}' is not empty"))
                } else {
                    Error::RemoteDelete(format!("deleting bucket '{bucket}': {msg}"))
                }
            })?;

        Ok(())
    }

    async fn update_bucket(&self, bucket: &str, update: &BucketUpdate) -> Result<()> {
        // Storage class is a per-object attribute on S3; there is no
        // bucket-level call to patch it, so asking for one is an error
        // rather than a silent no-op.
        if update.storage_class.is_some() {
            return Err(Error::RemoteUpdate(
                "this backend has no bucket-level storage class".to_string(),
            ));
        }

        if let Some(enabled) = update.versioning_enabled {
            let status = if enabled {
                aws_sdk_s3::types::BucketVersioningStatus::Enabled
            } else {
                aws_sdk_s3::types::BucketVersioningStatus::Suspended
            };
            let config = aws_sdk_s3::types::VersioningConfiguration::builder()
                .status(status)
                .build();

            self.inner
                .put_bucket_versioning()
                .bucket(bucket)
                .versioning_configuration(config)
                .send()
                .await
                .map_err(|e| {
                    Error::RemoteUpdate(format!(
                        "setting versioning on '{bucket}': {}",
                        Self::format_sdk_error(&e)
                    ))
                })?;
            tracing::debug!(bucket, enabled, "bucket versioning updated");
        }

        if let Some(blocked) = update.public_access_blocked {
            let config = aws_sdk_s3::types::PublicAccessBlockConfiguration::builder()
                .block_public_acls(blocked)
                .ignore_public_acls(blocked)
                .block_public_policy(blocked)
                .restrict_public_buckets(blocked)
                .build();

            self.inner
                .put_public_access_block()
                .bucket(bucket)
                .public_access_block_configuration(config)
                .send()
                .await
                .map_err(|e| {
                    Error::RemoteUpdate(format!(
                        "setting public access block on '{bucket}': {}",
                        Self::format_sdk_error(&e)
                    ))
                })?;
            tracing::debug!(bucket, blocked, "public access block updated");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_missing_target() {
        assert!(names_missing_target("service error: NoSuchKey"));
        assert!(names_missing_target("service error: NoSuchBucket"));
        assert!(names_missing_target("NotFound"));
        assert!(!names_missing_target("service error: AccessDenied"));
    }

    #[test]
    fn test_version_token_roundtrip() {
        let token = encode_version_token("photos/cat.png", "3HL4kqtJ");
        let (key, version) = decode_version_token(&token);
        assert_eq!(key, "photos/cat.png");
        assert_eq!(version, "3HL4kqtJ");
    }

    #[test]
    fn test_version_token_without_marker() {
        let (key, version) = decode_version_token("plain-key");
        assert_eq!(key, "plain-key");
        assert_eq!(version, "");
    }

    #[test]
    fn test_sdk_timestamp_conversion() {
        let dt = aws_smithy_types::DateTime::from_secs(1_700_000_000);
        let ts = to_timestamp(&dt).unwrap();
        assert_eq!(ts.as_second(), 1_700_000_000);
    }
}
