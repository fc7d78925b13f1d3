//! bkt-core: Core library for the bkt object storage CLI
//!
//! This crate provides the backend-independent pieces of bkt:
//! - Error types shared across the workspace
//! - Profile (endpoint/credentials/bucket binding) management
//! - The ObjectStore capability trait the storage backend implements
//! - The StorageSession façade, including the age-based expiry sweep
//!
//! It is deliberately free of any storage SDK dependency so backends can
//! be swapped for test doubles.

pub mod error;
pub mod profile;
pub mod session;
pub mod store;
pub mod types;

pub use error::{Error, Result};
pub use profile::{DEFAULT_TIMEOUT_SECS, Profile, ProfileStore};
pub use session::StorageSession;
pub use store::{ObjectBody, ObjectReader, ObjectStore};
pub use types::{BucketPage, BucketRecord, BucketUpdate, ObjectPage, ObjectRecord, SweepReport};
