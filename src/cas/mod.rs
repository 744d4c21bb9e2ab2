//! Content-Addressable Store
//!
//! Text is stored once per SHA-256 digest. `put` consults the cache, then the
//! persisted index, verifies the object still exists in the blob backend and
//! either reuses it (bumping `access_count`) or writes a new object under a
//! freshly allocated location.
//!
//! Deduplication is best-effort: two concurrent writers of the same content
//! may both miss, in which case the unique `hash` constraint rejects the
//! second index insert and the loser adopts the winning row. The loser's
//! object stays behind unreferenced.

mod digest;

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::blob::{BlobBackend, BlobMetadata};
use crate::cache::CacheLayer;
use crate::errors::{PastelinkerError, Result};
use crate::storage::{Blob, NewBlob, SeaOrmStorage};

pub use digest::ContentDigest;

/// digest -> location
pub fn hash_cache_key(digest: &str) -> String {
    format!("file-hash:{}", digest)
}

/// location -> content
pub fn content_cache_key(location: &str) -> String {
    format!("content:{}", location)
}

/// 为新对象分配位置：`content/{摘要前两位}/{毫秒时间戳}-{uuid}.txt`
pub fn allocate_location(digest: &ContentDigest) -> String {
    format!(
        "content/{}/{}-{}.txt",
        digest.prefix(),
        Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4()
    )
}

#[derive(Clone)]
pub struct ContentStore {
    blobs: Arc<dyn BlobBackend>,
    index: SeaOrmStorage,
    cache: CacheLayer,
    bucket: String,
    public_base_url: Option<String>,
}

impl ContentStore {
    pub fn new(
        blobs: Arc<dyn BlobBackend>,
        index: SeaOrmStorage,
        cache: CacheLayer,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            blobs,
            index,
            cache,
            bucket: bucket.into(),
            public_base_url: None,
        }
    }

    pub fn with_public_base_url(mut self, base_url: Option<String>) -> Self {
        self.public_base_url = base_url.map(|url| url.trim_end_matches('/').to_string());
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// 存储内容并返回其位置；相同内容返回同一位置
    pub async fn put(&self, content: &str) -> Result<String> {
        let digest = ContentDigest::of(content.as_bytes());
        let hash_key = hash_cache_key(digest.as_str());

        // 1. 缓存
        if let Some(location) = self.cache.get(&hash_key).await {
            if !self.object_exists(&location).await? {
                warn!(
                    "Cached location {} for {} no longer exists, dropping cache entry",
                    location, digest
                );
            } else if self.index.touch_blob(digest.as_str()).await? {
                self.cache.set(&hash_key, &location, None).await;
                debug!("Dedup hit (cache): {} -> {}", digest, location);
                return Ok(location);
            } else {
                // 缓存必须能由索引重建，索引中没有就不信任缓存
                warn!(
                    "Cached location {} for {} has no index row, dropping cache entry",
                    location, digest
                );
            }
            self.cache.delete(&hash_key).await;
        }

        // 2. 持久化索引
        if let Some(blob) = self.index.find_blob_by_hash(digest.as_str()).await? {
            if self.object_exists(&blob.location).await? {
                self.index.touch_blob(digest.as_str()).await?;
                self.cache.set(&hash_key, &blob.location, None).await;
                debug!("Dedup hit (index): {} -> {}", digest, blob.location);
                return Ok(blob.location);
            }
            warn!(
                "Indexed location {} for {} no longer exists, removing stale entry",
                blob.location, digest
            );
            self.index.delete_blob_by_hash(digest.as_str()).await?;
            self.cache.delete(&hash_key).await;
        }

        // 3. 新对象：先写对象，再写索引和缓存
        let location = allocate_location(&digest);
        let size = content.len() as u64;
        self.blobs
            .put(
                &self.bucket,
                &location,
                Bytes::copy_from_slice(content.as_bytes()),
                size,
                &BlobMetadata::text_plain(digest.as_str()),
            )
            .await?;

        let location = match self
            .index
            .insert_blob(NewBlob {
                hash: digest.to_string(),
                location: location.clone(),
                size,
            })
            .await
        {
            Ok(blob) => blob.location,
            Err(e) if e.is_conflict() => {
                debug!(
                    "Concurrent put of {} detected at insert, adopting winning row",
                    digest
                );
                let winner = self
                    .index
                    .find_blob_by_hash(digest.as_str())
                    .await?
                    .ok_or_else(|| {
                        PastelinkerError::conflict(format!(
                            "Blob {} conflicted on insert but no winning row was found",
                            digest
                        ))
                    })?;
                self.index.touch_blob(digest.as_str()).await?;
                winner.location
            }
            Err(e) => return Err(e),
        };

        self.cache.set(&hash_key, &location, None).await;
        self.cache
            .set(&content_cache_key(&location), content, None)
            .await;

        info!("Stored blob {} at {} ({} bytes)", digest, location, size);
        Ok(location)
    }

    /// 按位置读取内容（先查缓存）
    pub async fn get(&self, location: &str) -> Result<String> {
        let key = content_cache_key(location);
        if let Some(content) = self.cache.get(&key).await {
            return Ok(content);
        }

        let bytes = self.blobs.get(&self.bucket, location).await?;
        let content = String::from_utf8(bytes.to_vec()).map_err(|e| {
            PastelinkerError::storage(format!("Blob {} is not valid UTF-8: {}", location, e))
        })?;

        self.cache.set(&key, &content, None).await;
        Ok(content)
    }

    /// 索引中的 Blob 记录
    pub async fn blob_info(&self, digest: &ContentDigest) -> Result<Option<Blob>> {
        self.index.find_blob_by_hash(digest.as_str()).await
    }

    /// `{public_base_url}/{bucket}/{location}`，未配置时返回 `None`
    pub fn public_url(&self, location: &str) -> Option<String> {
        self.public_base_url
            .as_ref()
            .map(|base| format!("{}/{}/{}", base, self.bucket, location))
    }

    async fn object_exists(&self, location: &str) -> Result<bool> {
        Ok(self.blobs.stat(&self.bucket, location).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_namespaces() {
        assert_eq!(hash_cache_key("abc"), "file-hash:abc");
        assert_eq!(content_cache_key("content/ab/1.txt"), "content:content/ab/1.txt");
    }

    #[test]
    fn test_allocated_locations_are_sharded_and_unique() {
        let digest = ContentDigest::of(b"hello");
        let a = allocate_location(&digest);
        let b = allocate_location(&digest);

        assert!(a.starts_with("content/2c/"));
        assert!(a.ends_with(".txt"));
        assert_ne!(a, b);
    }
}
