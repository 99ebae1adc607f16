use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    error::SdkError,
    operation::get_object::GetObjectError,
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::StorageConfig;

/// Key-value cache used for backup mirrors and demo data.
///
/// A missing key is `Ok(None)`, never an error.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Bytes>>;
    async fn set(&self, key: &str, value: Bytes) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// Cache entries stored as objects in an S3-compatible bucket.
#[derive(Clone)]
pub struct ObjectStore {
    client: Client,
    bucket: String,
    prefix: String,
}

impl ObjectStore {
    pub async fn new(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
            prefix: cfg.prefix.trim_end_matches('/').to_string(),
        })
    }

    fn object_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            format!("{}.json", key)
        } else {
            format!("{}/{}.json", self.prefix, key)
        }
    }
}

#[async_trait]
impl KeyValueStore for ObjectStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        let object_key = self.object_key(key);
        let out = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
        {
            Ok(out) => out,
            Err(e) => return missing_or_error(e, &object_key),
        };
        let body = out
            .body
            .collect()
            .await
            .with_context(|| format!("read s3 object {}", object_key))?;
        Ok(Some(body.into_bytes()))
    }

    async fn set(&self, key: &str, value: Bytes) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .body(ByteStream::from(value))
            .content_type("application/json")
            .send()
            .await
            .context("s3 put_object")?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .send()
            .await
            .context("s3 delete_object")?;
        Ok(())
    }
}

/// A missing object is a cache miss. Anything else, including dispatch and
/// timeout failures, keeps the original SDK error.
fn missing_or_error(e: SdkError<GetObjectError>, object_key: &str) -> anyhow::Result<Option<Bytes>> {
    match e {
        SdkError::ServiceError(service) if service.err().is_no_such_key() => {
            debug!(key = %object_key, "cache miss");
            Ok(None)
        }
        other => Err(other).with_context(|| format!("s3 get_object {}", object_key)),
    }
}

/// In-process cache. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Bytes) -> anyhow::Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
