use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_types::SdkConfig;

use crate::error::{Error, Result};
use crate::services::inventory::SnapshotSource;

/// The inventory CSV object.
#[derive(Debug, Clone)]
pub struct SnapshotObject {
    pub bucket: String,
    pub key: String,
    pub cli: Client,
}

impl SnapshotObject {
    pub fn new(shared_config: &SdkConfig, bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            cli: Client::new(shared_config),
        }
    }
}

#[async_trait]
impl SnapshotSource for SnapshotObject {
    async fn fetch(&self) -> Result<Vec<u8>> {
        let out = self
            .cli
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
            .map_err(|e| Error::from_sdk(&format!("failed get_object s3://{}/{}", self.bucket, self.key), &e))?;
        let body = out.body.collect().await.map_err(|e| Error::Api {
            message: format!("failed reading s3://{}/{}: {e}", self.bucket, self.key),
            retryable: true,
        })?;
        Ok(body.into_bytes().to_vec())
    }

    fn describe(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
