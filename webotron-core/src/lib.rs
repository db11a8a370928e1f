#![doc = "webotron-core: core logic library for webotron."]

//! This crate holds the bucket manager, sync planning and the storage-service contract.
//! It has no cloud SDK dependency: the `webotron` binary supplies the S3 implementation of
//! [`contract::ObjectStore`], and tests use the generated `MockObjectStore` or an in-memory fake.

pub mod bucket;
pub mod content_type;
pub mod contract;
pub mod error;
pub mod synchronise;

pub use bucket::{BucketHandle, BucketManager, Session};
pub use contract::{CreateBucketOutcome, ObjectStore, StoreError, WebsiteConfig};
pub use error::{Error, Result};
