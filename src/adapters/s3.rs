use crate::adapters::classify;
use crate::domain::model::ObjectUpload;
use crate::domain::ports::ObjectStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client as S3Client;

const SERVICE: &str = "s3";
const NO_SUCH_BUCKET: &[&str] = &["NoSuchBucket"];

#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        let mut request = self.client.create_bucket().bucket(bucket);

        // us-east-1 rejects an explicit location constraint.
        if region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        request.send().await.map_err(|e| {
            classify(
                SERVICE,
                "CreateBucket",
                &format!("Bucket {}", bucket),
                e,
                &["BucketAlreadyOwnedByYou"],
                &[],
            )
        })?;
        Ok(())
    }

    async fn put_object(&self, bucket: &str, object: ObjectUpload) -> Result<()> {
        let key = object.key;
        self.client
            .put_object()
            .bucket(bucket)
            .key(&key)
            .content_type(object.content_type)
            .body(ByteStream::from(object.body))
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "PutObject",
                    &format!("Bucket {}", bucket),
                    e,
                    &[],
                    NO_SUCH_BUCKET,
                )
            })?;
        Ok(())
    }

    async fn list_object_keys(&self, bucket: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(|e| {
                    classify(
                        SERVICE,
                        "ListObjectsV2",
                        &format!("Bucket {}", bucket),
                        e,
                        &[],
                        NO_SUCH_BUCKET,
                    )
                })?;

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(str::to_string),
            );

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(keys)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "DeleteObject",
                    &format!("Bucket {}", bucket),
                    e,
                    &[],
                    NO_SUCH_BUCKET,
                )
            })?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| {
                classify(
                    SERVICE,
                    "DeleteBucket",
                    &format!("Bucket {}", bucket),
                    e,
                    &[],
                    NO_SUCH_BUCKET,
                )
            })?;
        Ok(())
    }
}
