//! bkt-s3: aws-sdk-s3 adapter implementing bkt-core's ObjectStore trait

mod client;

pub use client::S3Store;
