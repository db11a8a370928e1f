//! # S3 store
//!
//! Implements the core [`ObjectStore`] contract on top of aws-sdk-s3.
//!
//! [`S3Store`] is the production [`ObjectStore`]. [`connect`] builds it from the resolved
//! [`Settings`] together with the [`Session`] describing the region it talks to, and hands
//! both to a [`BucketManager`].
//!
//! Service errors are reduced to [`StoreError::Service`] carrying the operation name, the
//! service error code and the service message. The one exception is `BucketAlreadyOwnedByYou`
//! on bucket creation, which becomes [`CreateBucketOutcome::AlreadyOwned`].

use std::path::Path;

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, ErrorDocument, IndexDocument,
    WebsiteConfiguration,
};
use webotron_core::{
    BucketManager, CreateBucketOutcome, ObjectStore, Session, StoreError, WebsiteConfig,
};

use crate::load_config::Settings;

/// Region used when neither settings nor the AWS provider chain name one.
pub const FALLBACK_REGION: &str = "us-east-2";

pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

/// Build the S3-backed bucket manager for `settings`.
pub async fn connect(settings: &Settings) -> BucketManager<S3Store> {
    let region_provider = RegionProviderChain::first_try(settings.region.clone().map(Region::new))
        .or_default_provider()
        .or_else(FALLBACK_REGION);

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
    if let Some(profile) = &settings.profile {
        loader = loader.profile_name(profile);
    }
    let sdk_config = loader.load().await;

    let region = sdk_config
        .region()
        .map(ToString::to_string)
        .unwrap_or_else(|| FALLBACK_REGION.to_string());

    let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
    if let Some(endpoint) = &settings.endpoint_url {
        s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
    }
    tracing::info!(
        %region,
        profile = ?settings.profile,
        endpoint_url = ?settings.endpoint_url,
        "Initialised S3 client"
    );

    let store = S3Store::new(aws_sdk_s3::Client::from_conf(s3_config.build()));
    BucketManager::new(Session::new(region, settings.profile.clone()), store)
}

fn service_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_owned);
    let message = err.message().map(str::to_owned);
    let message = message.unwrap_or_else(|| DisplayErrorContext(err).to_string());
    tracing::error!(operation, code = ?code, %message, "S3 request failed");
    StoreError::Service {
        operation,
        code,
        message,
    }
}

fn build_error(operation: &'static str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Service {
        operation,
        code: None,
        message: err.to_string(),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_buckets(&self) -> Result<Vec<String>, StoreError> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| service_error("ListBuckets", e))?;
        Ok(output
            .buckets()
            .iter()
            .filter_map(|b| b.name())
            .map(str::to_owned)
            .collect())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, StoreError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| service_error("ListObjectsV2", e))?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(str::to_owned),
            );
        }
        Ok(keys)
    }

    async fn create_bucket<'a>(
        &self,
        bucket: &str,
        location_constraint: Option<&'a str>,
    ) -> Result<CreateBucketOutcome, StoreError> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if let Some(constraint) = location_constraint {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(constraint))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => Ok(CreateBucketOutcome::Created),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(CreateBucketError::is_bucket_already_owned_by_you) =>
            {
                Ok(CreateBucketOutcome::AlreadyOwned)
            }
            Err(err) => Err(service_error("CreateBucket", err)),
        }
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), StoreError> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(|e| service_error("PutBucketPolicy", e))?;
        Ok(())
    }

    async fn put_bucket_website(
        &self,
        bucket: &str,
        website: &WebsiteConfig,
    ) -> Result<(), StoreError> {
        let index = IndexDocument::builder()
            .suffix(&website.index_document)
            .build()
            .map_err(|e| build_error("PutBucketWebsite", e))?;
        let error = ErrorDocument::builder()
            .key(&website.error_document)
            .build()
            .map_err(|e| build_error("PutBucketWebsite", e))?;
        let configuration = WebsiteConfiguration::builder()
            .index_document(index)
            .error_document(error)
            .build();

        self.client
            .put_bucket_website()
            .bucket(bucket)
            .website_configuration(configuration)
            .send()
            .await
            .map_err(|e| service_error("PutBucketWebsite", e))?;
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let body = ByteStream::from_path(source)
            .await
            .map_err(|e| StoreError::Read {
                path: source.to_path_buf(),
                source: Box::new(e),
            })?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| service_error("PutObject", e))?;
        tracing::debug!(bucket, key, content_type, "Uploaded object");
        Ok(())
    }
}
