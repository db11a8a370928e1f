//! # contract: the object-storage collaborator
//!
//! Everything webotron does to a bucket goes through the [`ObjectStore`] trait defined here.
//! The core crate never talks to a cloud SDK directly; the `webotron` binary crate supplies
//! the AWS-backed implementation and tests supply mocks or in-memory fakes.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so `MockObjectStore` is available in tests and,
//!   with the default `test-export-mocks` feature, to downstream crates.
//!
//! ## Errors
//! - Every method returns [`StoreError`], which keeps the service operation, the service error
//!   code and the raw service message. Callers surface it verbatim.

use std::path::Path;

use async_trait::async_trait;
use mockall::automock;

/// Result of a bucket creation request.
///
/// The service reports "already owned by you" as an error; implementors translate that single
/// case into [`CreateBucketOutcome::AlreadyOwned`] so callers never match on error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum CreateBucketOutcome {
    /// The bucket did not exist and was created.
    Created,
    /// The bucket already exists and belongs to the caller.
    AlreadyOwned,
}

/// Static-website settings for a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsiteConfig {
    /// Suffix appended to directory requests (e.g. `index.html`).
    pub index_document: String,
    /// Key served for 4xx errors.
    pub error_document: String,
}

/// Error reported by an [`ObjectStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The storage service rejected the request, or it could not be delivered.
    #[error("{operation} failed ({}): {message}", .code.as_deref().unwrap_or("no error code"))]
    Service {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },
    /// A local file could not be read for upload.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    /// Service error code, if the service supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            StoreError::Service { code, .. } => code.as_deref(),
            StoreError::Read { .. } => None,
        }
    }
}

/// Bucket, policy, website and object capabilities of the storage service.
///
/// Implemented by the real S3 client in the CLI crate and by test doubles.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Names of all buckets owned by the authenticated account.
    async fn list_buckets(&self) -> Result<Vec<String>, StoreError>;

    /// Every object key in `bucket`, across all result pages.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, StoreError>;

    /// Create `bucket`, constrained to `location_constraint` when given.
    async fn create_bucket<'a>(
        &self,
        bucket: &str,
        location_constraint: Option<&'a str>,
    ) -> Result<CreateBucketOutcome, StoreError>;

    /// Replace the bucket policy with `policy` (a JSON document).
    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), StoreError>;

    /// Replace the bucket's website configuration.
    async fn put_bucket_website(
        &self,
        bucket: &str,
        website: &WebsiteConfig,
    ) -> Result<(), StoreError>;

    /// Upload the file at `source` to `key`, overwriting any existing object.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
        content_type: &str,
    ) -> Result<(), StoreError>;
}
