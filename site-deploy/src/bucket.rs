use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, BucketVersioningStatus, CreateBucketConfiguration, IndexDocument,
    PublicAccessBlockConfiguration, Tag, Tagging, VersioningConfiguration, WebsiteConfiguration,
};
use serde_json::json;
use aws_sdk_s3::Client as S3Client;
use tracing::info;

use crate::error::StageError;
use crate::stages::{Artifact, SiteUploader};

/// Index document served for directory requests
pub const INDEX_DOCUMENT: &str = "index.html";

/// Tag key identifying resources of this application
pub const PROJECT_TAG_KEY: &str = "Project";
/// Tag value identifying resources of this application
pub const PROJECT_TAG_VALUE: &str = "Todo-App";

/// Region where buckets are created without a location constraint
const DEFAULT_REGION: &str = "us-east-1";

/// S3 bucket that hosts the built site
#[derive(Debug, Clone)]
pub struct SiteBucket {
    s3_client: S3Client,
    name: String,
}

impl SiteBucket {
    /// Creates a handle for bucket `name`
    #[must_use]
    pub const fn new(s3_client: S3Client, name: String) -> Self {
        Self { s3_client, name }
    }

    /// Bucket name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates the bucket if needed, then configures it to serve the site publicly
    ///
    /// Enables versioning and website hosting, lifts the bucket-policy parts of the public
    /// access block, grants anonymous `s3:GetObject` and tags the bucket.
    ///
    /// Returns `true` when the bucket was created by this call.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Bucket`] if any S3 request fails
    pub async fn ensure(&self) -> Result<bool, StageError> {
        let created = match self.s3_client.head_bucket().bucket(&self.name).send().await {
            Ok(_) => false,
            Err(SdkError::ServiceError(err)) if err.err().is_not_found() => {
                self.create().await?;
                true
            }
            Err(err) => return Err(bucket_error("head bucket", &err)),
        };

        self.s3_client
            .put_bucket_versioning()
            .bucket(&self.name)
            .versioning_configuration(
                VersioningConfiguration::builder()
                    .status(BucketVersioningStatus::Enabled)
                    .build(),
            )
            .send()
            .await
            .map_err(|err| bucket_error("enable versioning", &err))?;

        let index_document = IndexDocument::builder()
            .suffix(INDEX_DOCUMENT)
            .build()
            .map_err(|err| StageError::Bucket(err.to_string()))?;

        self.s3_client
            .put_bucket_website()
            .bucket(&self.name)
            .website_configuration(
                WebsiteConfiguration::builder()
                    .index_document(index_document)
                    .build(),
            )
            .send()
            .await
            .map_err(|err| bucket_error("configure website", &err))?;

        self.allow_public_read().await?;
        self.tag().await?;

        info!(bucket = %self.name, created, "Site bucket ready");
        Ok(created)
    }

    async fn allow_public_read(&self) -> Result<(), StageError> {
        // ACLs stay blocked; access is granted by the bucket policy only
        self.s3_client
            .put_public_access_block()
            .bucket(&self.name)
            .public_access_block_configuration(
                PublicAccessBlockConfiguration::builder()
                    .block_public_acls(true)
                    .ignore_public_acls(true)
                    .block_public_policy(false)
                    .restrict_public_buckets(false)
                    .build(),
            )
            .send()
            .await
            .map_err(|err| bucket_error("configure public access block", &err))?;

        self.s3_client
            .put_bucket_policy()
            .bucket(&self.name)
            .policy(public_read_policy(&self.name))
            .send()
            .await
            .map_err(|err| bucket_error("put bucket policy", &err))?;

        Ok(())
    }

    async fn tag(&self) -> Result<(), StageError> {
        let tag = Tag::builder()
            .key(PROJECT_TAG_KEY)
            .value(PROJECT_TAG_VALUE)
            .build()
            .map_err(|err| StageError::Bucket(err.to_string()))?;
        let tagging = Tagging::builder()
            .tag_set(tag)
            .build()
            .map_err(|err| StageError::Bucket(err.to_string()))?;

        self.s3_client
            .put_bucket_tagging()
            .bucket(&self.name)
            .tagging(tagging)
            .send()
            .await
            .map_err(|err| bucket_error("tag bucket", &err))?;

        Ok(())
    }

    async fn create(&self) -> Result<(), StageError> {
        let mut request = self.s3_client.create_bucket().bucket(&self.name);

        let region = self
            .s3_client
            .config()
            .region()
            .map(ToString::to_string);
        if let Some(region) = region.filter(|region| region != DEFAULT_REGION) {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                info!(bucket = %self.name, "Created site bucket");
                Ok(())
            }
            Err(SdkError::ServiceError(err)) if err.err().is_bucket_already_owned_by_you() => {
                Ok(())
            }
            Err(err) => Err(bucket_error("create bucket", &err)),
        }
    }
}

#[async_trait]
impl SiteUploader for SiteBucket {
    async fn upload(&self, artifact: &Artifact) -> Result<(), StageError> {
        let body = ByteStream::from_path(&artifact.path)
            .await
            .map_err(|err| StageError::Upload {
                key: artifact.key.clone(),
                message: err.to_string(),
            })?;

        self.s3_client
            .put_object()
            .bucket(&self.name)
            .key(&artifact.key)
            .content_type(&artifact.content_type)
            .body(body)
            .send()
            .await
            .map_err(|err| StageError::Upload {
                key: artifact.key.clone(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        Ok(())
    }
}

/// Bucket policy granting anonymous read access to every object in `bucket`
#[must_use]
pub fn public_read_policy(bucket: &str) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Sid": "PublicReadGetObject",
            "Effect": "Allow",
            "Principal": "*",
            "Action": "s3:GetObject",
            "Resource": format!("arn:aws:s3:::{bucket}/*"),
        }]
    })
    .to_string()
}

fn bucket_error<E, R>(action: &str, err: &SdkError<E, R>) -> StageError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    StageError::Bucket(format!("{action}: {}", DisplayErrorContext(err)))
}
