//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from hs-core.

use async_trait::async_trait;
use aws_smithy_types::error::display::DisplayErrorContext;

use hs_core::{Error, ListOptions, ListResult, ObjectInfo, ObjectStore, Result, StorageConfig};

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a new S3 client from the storage configuration
    ///
    /// Unset settings fall back to the SDK's default credential and region
    /// provider chains.
    pub async fn new(storage: &StorageConfig) -> Result<Self> {
        storage.validate()?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &storage.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        if let Some(endpoint) = &storage.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        if let (Some(access_key), Some(secret_key)) = (&storage.access_key, &storage.secret_key) {
            let credentials = aws_credential_types::Credentials::new(
                access_key,
                secret_key,
                None, // session token
                None, // expiry
                "history-sync-static-credentials",
            );
            loader = loader.credentials_provider(credentials);
        }

        let config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(storage.force_path_style())
            .build();

        tracing::debug!(
            endpoint = storage.endpoint.as_deref().unwrap_or("default"),
            path_style = storage.force_path_style(),
            "Created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
        })
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }
}

/// Map an SDK error message onto the core error kinds
fn classify_error(message: String, subject: impl FnOnce() -> String) -> Error {
    if message.contains("NoSuchKey")
        || message.contains("NoSuchBucket")
        || message.contains("NotFound")
    {
        Error::NotFound(subject())
    } else if message.contains("AccessDenied")
        || message.contains("InvalidAccessKeyId")
        || message.contains("SignatureDoesNotMatch")
    {
        Error::Auth(message)
    } else {
        Error::Network(message)
    }
}

/// ETags come back wrapped in double quotes
fn unquote_etag(etag: &str) -> &str {
    etag.trim_matches('"')
}

fn sdk_error<E: std::error::Error>(err: E, subject: impl FnOnce() -> String) -> Error {
    classify_error(DisplayErrorContext(&err).to_string(), subject)
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_objects(&self, bucket: &str, options: ListOptions) -> Result<ListResult> {
        let mut request = self.inner.list_objects_v2().bucket(bucket);

        if let Some(prefix) = &options.prefix {
            request = request.prefix(prefix);
        }

        if let Some(max) = options.max_keys {
            request = request.max_keys(max);
        }

        if let Some(token) = &options.continuation_token {
            request = request.continuation_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| sdk_error(e, || format!("Bucket not found: {bucket}")))?;

        let items = response
            .contents()
            .iter()
            .filter_map(|object| object.key().map(ObjectInfo::new))
            .collect();

        Ok(ListResult {
            items,
            truncated: response.is_truncated().unwrap_or(false),
            continuation_token: response.next_continuation_token().map(|s| s.to_string()),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error(e, || format!("{bucket}/{key}")))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Network(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<ObjectInfo> {
        let body = aws_sdk_s3::primitives::ByteStream::from(data);

        let response = self
            .inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .set_content_type(content_type)
            .send()
            .await
            .map_err(|e| sdk_error(e, || format!("Bucket not found: {bucket}")))?;

        let info = ObjectInfo::new(key);
        Ok(match response.e_tag() {
            Some(etag) => info.with_etag(unquote_etag(etag)),
            None => info,
        })
    }
}
