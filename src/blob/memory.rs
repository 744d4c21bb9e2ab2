use async_trait::async_trait;
use bytes::Bytes;
use dashmap::{DashMap, DashSet};
use tracing::trace;

use super::{BlobBackend, BlobMetadata, BlobStat};
use crate::errors::{PastelinkerError, Result};

struct StoredObject {
    bytes: Bytes,
    metadata: BlobMetadata,
}

/// 进程内对象存储（测试与单机试用）
#[derive(Default)]
pub struct MemoryBlobBackend {
    buckets: DashSet<String>,
    objects: DashMap<String, StoredObject>,
}

impl MemoryBlobBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn object_key(bucket: &str, location: &str) -> String {
        format!("{}/{}", bucket, location)
    }

    /// 直接删除对象，绕过索引（模拟对象丢失）
    pub fn remove(&self, bucket: &str, location: &str) -> bool {
        self.objects
            .remove(&Self::object_key(bucket, location))
            .is_some()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

#[async_trait]
impl BlobBackend for MemoryBlobBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<()> {
        self.buckets.insert(bucket.to_string());
        Ok(())
    }

    async fn put(
        &self,
        bucket: &str,
        location: &str,
        bytes: Bytes,
        size: u64,
        metadata: &BlobMetadata,
    ) -> Result<()> {
        if !self.buckets.contains(bucket) {
            return Err(PastelinkerError::storage(format!(
                "Bucket '{}' does not exist",
                bucket
            )));
        }
        if bytes.len() as u64 != size {
            return Err(PastelinkerError::storage(format!(
                "Size mismatch for '{}': declared {}, got {}",
                location,
                size,
                bytes.len()
            )));
        }

        self.objects.insert(
            Self::object_key(bucket, location),
            StoredObject {
                bytes,
                metadata: metadata.clone(),
            },
        );
        trace!("Stored object {}/{}", bucket, location);
        Ok(())
    }

    async fn get(&self, bucket: &str, location: &str) -> Result<Bytes> {
        self.objects
            .get(&Self::object_key(bucket, location))
            .map(|obj| obj.bytes.clone())
            .ok_or_else(|| {
                PastelinkerError::storage(format!("Object {}/{} does not exist", bucket, location))
            })
    }

    async fn stat(&self, bucket: &str, location: &str) -> Result<Option<BlobStat>> {
        Ok(self
            .objects
            .get(&Self::object_key(bucket, location))
            .map(|obj| BlobStat {
                size: obj.bytes.len() as u64,
                metadata: obj.metadata.clone(),
            }))
    }
}
