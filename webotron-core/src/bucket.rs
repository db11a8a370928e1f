//! Bucket manager: the domain façade over an [`ObjectStore`].
//!
//! Every operation is a direct, one-shot call (or a sequence of them) into the store, with one
//! translation: creating a bucket the caller already owns succeeds. Everything else the store
//! reports is returned to the caller unchanged. Uploads during a sync are strictly sequential.

use std::path::Path;

use serde_json::json;
use tracing::{debug, error, info};

use crate::content_type::content_type_for;
use crate::contract::{CreateBucketOutcome, ObjectStore, WebsiteConfig};
use crate::error::Result;
use crate::synchronise::{plan_sync, resolve_root, SyncReport, UploadedObject};

/// Index document served for directory requests.
pub const INDEX_DOCUMENT: &str = "index.html";
/// Document served for error responses.
pub const ERROR_DOCUMENT: &str = "error.html";

/// Region in which the service rejects an explicit location constraint.
const DEFAULT_SERVICE_REGION: &str = "us-east-1";

/// Credential and region context, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub region: String,
    pub profile: Option<String>,
}

impl Session {
    pub fn new(region: impl Into<String>, profile: Option<String>) -> Self {
        Self {
            region: region.into(),
            profile,
        }
    }

    /// Location constraint to send when creating buckets in this session's region.
    pub fn location_constraint(&self) -> Option<&str> {
        if self.region == DEFAULT_SERVICE_REGION {
            None
        } else {
            Some(self.region.as_str())
        }
    }
}

/// A bucket that exists and is owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketHandle {
    pub name: String,
    pub outcome: CreateBucketOutcome,
}

/// Public-read policy granting `s3:GetObject` on every object in `bucket`.
pub fn public_read_policy(bucket: &str) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Sid": "PublicReadGetObject",
            "Effect": "Allow",
            "Principal": "*",
            "Action": ["s3:GetObject"],
            "Resource": [format!("arn:aws:s3:::{bucket}/*")]
        }]
    })
    .to_string()
}

/// The fixed website configuration applied by [`BucketManager::configure_website`].
pub fn website_config() -> WebsiteConfig {
    WebsiteConfig {
        index_document: INDEX_DOCUMENT.to_string(),
        error_document: ERROR_DOCUMENT.to_string(),
    }
}

/// Domain operations on buckets, backed by an injected [`ObjectStore`].
pub struct BucketManager<S> {
    session: Session,
    store: S,
}

impl<S: ObjectStore> BucketManager<S> {
    pub fn new(session: Session, store: S) -> Self {
        info!(region = %session.region, profile = ?session.profile, "Bucket manager created");
        Self { session, store }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Names of all buckets owned by the account.
    pub async fn all_buckets(&self) -> Result<Vec<String>> {
        let buckets = self.store.list_buckets().await?;
        debug!(count = buckets.len(), "Listed buckets");
        Ok(buckets)
    }

    /// Keys of all objects in `bucket`.
    pub async fn all_objects(&self, bucket: &str) -> Result<Vec<String>> {
        let keys = self.store.list_objects(bucket).await?;
        debug!(bucket, count = keys.len(), "Listed objects");
        Ok(keys)
    }

    /// Create `name` in the session's region; a bucket the caller already owns is accepted.
    pub async fn ensure_bucket(&self, name: &str) -> Result<BucketHandle> {
        let constraint = self.session.location_constraint();
        info!(bucket = name, location_constraint = ?constraint, "Creating bucket");

        let outcome = match self.store.create_bucket(name, constraint).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(bucket = name, error = %e, "Bucket creation failed");
                return Err(e.into());
            }
        };
        match outcome {
            CreateBucketOutcome::Created => info!(bucket = name, "Bucket created"),
            CreateBucketOutcome::AlreadyOwned => {
                info!(bucket = name, "{name} is already owned by you")
            }
        }
        Ok(BucketHandle {
            name: name.to_string(),
            outcome,
        })
    }

    /// Make every object in `bucket` publicly readable.
    pub async fn set_public_read_policy(&self, bucket: &str) -> Result<()> {
        let policy = public_read_policy(bucket);
        debug!(bucket, %policy, "Applying public-read policy");
        self.store.put_bucket_policy(bucket, &policy).await?;
        info!(bucket, "Public-read policy applied");
        Ok(())
    }

    /// Serve `bucket` as a static website with `index.html` / `error.html`.
    pub async fn configure_website(&self, bucket: &str) -> Result<()> {
        let website = website_config();
        self.store.put_bucket_website(bucket, &website).await?;
        info!(
            bucket,
            index = %website.index_document,
            error = %website.error_document,
            "Static website hosting enabled"
        );
        Ok(())
    }

    /// Upload one file to `key`, typed by the key's extension.
    pub async fn upload_file(
        &self,
        bucket: &str,
        path: &Path,
        key: &str,
    ) -> Result<UploadedObject> {
        let content_type = content_type_for(key);
        debug!(bucket, key, content_type = %content_type, path = %path.display(), "Uploading file");
        self.store
            .put_object(bucket, key, path, &content_type)
            .await?;
        Ok(UploadedObject {
            key: key.to_string(),
            content_type,
        })
    }

    /// Upload every file under `root` to `bucket`, keyed by its relative path.
    ///
    /// Stops at the first failed upload; objects uploaded before it stay in the bucket.
    pub async fn sync(&self, root: &Path, bucket: &str) -> Result<SyncReport> {
        let root = resolve_root(root)?;
        let plan = plan_sync(&root)?;
        info!(root = %root.display(), bucket, files = plan.len(), "Starting sync");

        let mut uploaded = Vec::with_capacity(plan.len());
        for entry in &plan {
            match self.upload_file(bucket, &entry.local_path, &entry.key).await {
                Ok(object) => uploaded.push(object),
                Err(e) => {
                    error!(
                        bucket,
                        key = %entry.key,
                        uploaded = uploaded.len(),
                        error = %e,
                        "Sync aborted"
                    );
                    return Err(e);
                }
            }
        }

        let report = SyncReport {
            root,
            bucket: bucket.to_string(),
            uploaded,
        };
        match serde_json::to_string(&report) {
            Ok(json) => debug!(%json, "Sync report"),
            Err(e) => error!(error = ?e, "Failed to serialise sync report"),
        }
        info!(bucket, files = report.uploaded.len(), "Sync complete");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_constraint_omitted_only_for_default_region() {
        assert_eq!(Session::new("us-east-1", None).location_constraint(), None);
        assert_eq!(
            Session::new("us-east-2", None).location_constraint(),
            Some("us-east-2")
        );
    }

    #[test]
    fn policy_targets_every_object_in_bucket() {
        let policy: serde_json::Value =
            serde_json::from_str(&public_read_policy("example.com")).unwrap();
        let statement = &policy["Statement"][0];

        assert_eq!(policy["Version"], "2012-10-17");
        assert_eq!(statement["Sid"], "PublicReadGetObject");
        assert_eq!(statement["Effect"], "Allow");
        assert_eq!(statement["Principal"], "*");
        assert_eq!(statement["Action"], json!(["s3:GetObject"]));
        assert_eq!(statement["Resource"], json!(["arn:aws:s3:::example.com/*"]));
    }

    #[test]
    fn website_documents_are_fixed() {
        let website = website_config();
        assert_eq!(website.index_document, "index.html");
        assert_eq!(website.error_document, "error.html");
    }
}
