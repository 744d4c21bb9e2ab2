//! ContentStore tests
//!
//! Deduplication, self-healing of stale index/cache entries, late duplicate
//! detection and error propagation from the blob backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use pastelinker::blob::{BlobBackend, BlobMetadata, BlobStat, MemoryBlobBackend};
use pastelinker::cache::{CacheLayer, MokaCacheBackend};
use pastelinker::cas::{ContentDigest, ContentStore, content_cache_key, hash_cache_key};
use pastelinker::errors::{PastelinkerError, Result};
use pastelinker::storage::{NewBlob, SeaOrmStorage};
use tempfile::TempDir;

const BUCKET: &str = "links-bucket";

// =============================================================================
// Test Setup
// =============================================================================

struct Fixture {
    store: ContentStore,
    blobs: Arc<MemoryBlobBackend>,
    index: SeaOrmStorage,
    cache: CacheLayer,
    _dir: TempDir,
}

async fn create_index() -> (SeaOrmStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("cas.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let index = SeaOrmStorage::new(&db_url, "sqlite", 1)
        .await
        .expect("Failed to create storage");
    (index, temp_dir)
}

async fn create_fixture() -> Fixture {
    let (index, dir) = create_index().await;
    let blobs = Arc::new(MemoryBlobBackend::new());
    blobs.ensure_bucket(BUCKET).await.unwrap();
    let cache = CacheLayer::new(Arc::new(MokaCacheBackend::new(1000)), 3600);
    let store = ContentStore::new(blobs.clone(), index.clone(), cache.clone(), BUCKET);

    Fixture {
        store,
        blobs,
        index,
        cache,
        _dir: dir,
    }
}

fn digest(content: &str) -> ContentDigest {
    ContentDigest::of(content.as_bytes())
}

// =============================================================================
// Deduplication
// =============================================================================

#[tokio::test]
async fn test_put_same_content_is_deduplicated() {
    let f = create_fixture().await;

    let first = f.store.put("hello").await.unwrap();
    let after_first = f.store.blob_info(&digest("hello")).await.unwrap().unwrap();
    assert_eq!(after_first.access_count, 1);

    let second = f.store.put("hello").await.unwrap();
    let after_second = f.store.blob_info(&digest("hello")).await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(after_second.access_count, after_first.access_count + 1);
    assert_eq!(f.blobs.object_count(), 1);
}

#[tokio::test]
async fn test_dedup_works_from_index_when_cache_is_cold() {
    let f = create_fixture().await;

    let first = f.store.put("hello").await.unwrap();
    f.cache.flush_all().await;
    let second = f.store.put("hello").await.unwrap();

    assert_eq!(first, second);
    let blob = f.store.blob_info(&digest("hello")).await.unwrap().unwrap();
    assert_eq!(blob.access_count, 2);
    // 索引命中后重新写回缓存
    assert_eq!(
        f.cache.get(&hash_cache_key(digest("hello").as_str())).await.as_deref(),
        Some(first.as_str())
    );
}

#[tokio::test]
async fn test_distinct_content_gets_distinct_locations() {
    let f = create_fixture().await;

    let a = f.store.put("hello").await.unwrap();
    let b = f.store.put("world").await.unwrap();

    assert_ne!(a, b);
    assert_eq!(f.blobs.object_count(), 2);
}

#[tokio::test]
async fn test_new_blob_layout_and_metadata() {
    let f = create_fixture().await;
    let hash = digest("hello");

    let location = f.store.put("hello").await.unwrap();

    assert!(location.starts_with(&format!("content/{}/", hash.prefix())));
    assert!(location.ends_with(".txt"));

    let stat = f.blobs.stat(BUCKET, &location).await.unwrap().unwrap();
    assert_eq!(stat.size, 5);
    assert_eq!(stat.metadata, BlobMetadata::text_plain(hash.as_str()));

    // 两类缓存条目都已写入
    assert_eq!(
        f.cache.get(&hash_cache_key(hash.as_str())).await.as_deref(),
        Some(location.as_str())
    );
    assert_eq!(
        f.cache.get(&content_cache_key(&location)).await.as_deref(),
        Some("hello")
    );
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_get_reads_through_cache_and_backend() {
    let f = create_fixture().await;
    let location = f.store.put("hello").await.unwrap();

    assert_eq!(f.store.get(&location).await.unwrap(), "hello");

    f.cache.flush_all().await;
    assert_eq!(f.store.get(&location).await.unwrap(), "hello");
    assert_eq!(
        f.cache.get(&content_cache_key(&location)).await.as_deref(),
        Some("hello")
    );
}

#[tokio::test]
async fn test_get_missing_location_is_storage_error() {
    let f = create_fixture().await;

    let err = f.store.get("content/00/missing.txt").await.unwrap_err();
    assert!(matches!(err, PastelinkerError::Storage(_)), "{:?}", err);
}

#[tokio::test]
async fn test_get_rejects_non_utf8_blob() {
    let f = create_fixture().await;
    let bytes = Bytes::from_static(&[0xff, 0xfe, 0xfd]);
    f.blobs
        .put(BUCKET, "content/ff/bad.txt", bytes, 3, &BlobMetadata::default())
        .await
        .unwrap();

    let err = f.store.get("content/ff/bad.txt").await.unwrap_err();
    assert!(matches!(err, PastelinkerError::Storage(_)));
}

// =============================================================================
// Self-healing
// =============================================================================

#[tokio::test]
async fn test_missing_object_triggers_rewrite() {
    let f = create_fixture().await;
    let hash = digest("hello");

    let old = f.store.put("hello").await.unwrap();
    assert!(f.blobs.remove(BUCKET, &old));

    let new = f.store.put("hello").await.unwrap();

    assert_ne!(old, new);
    let blob = f.store.blob_info(&hash).await.unwrap().unwrap();
    assert_eq!(blob.location, new);
    assert_eq!(blob.access_count, 1);
    assert_eq!(f.store.get(&new).await.unwrap(), "hello");
    assert_eq!(
        f.cache.get(&hash_cache_key(hash.as_str())).await.as_deref(),
        Some(new.as_str())
    );
}

#[tokio::test]
async fn test_missing_object_with_cold_cache_heals_index() {
    let f = create_fixture().await;
    let hash = digest("hello");

    let old = f.store.put("hello").await.unwrap();
    f.blobs.remove(BUCKET, &old);
    f.cache.flush_all().await;

    let new = f.store.put("hello").await.unwrap();

    assert_ne!(old, new);
    assert!(f.index.find_blob_by_location(&old).await.unwrap().is_none());
    assert_eq!(f.store.blob_info(&hash).await.unwrap().unwrap().location, new);
}

#[tokio::test]
async fn test_cached_location_without_index_row_is_reindexed() {
    let f = create_fixture().await;
    let hash = digest("hello");

    let first = f.store.put("hello").await.unwrap();
    assert!(f.index.delete_blob_by_hash(hash.as_str()).await.unwrap());

    // 缓存仍指向旧位置，但索引行已丢失
    let second = f.store.put("hello").await.unwrap();
    let blob = f.store.blob_info(&hash).await.unwrap().unwrap();
    assert_eq!(blob.location, second);
    assert_eq!(blob.access_count, 1);
    assert_eq!(
        f.cache.get(&hash_cache_key(hash.as_str())).await.as_deref(),
        Some(second.as_str())
    );
    assert_eq!(f.store.get(&second).await.unwrap(), "hello");
    assert_ne!(first, second);

    // 之后的重复写入重新计数
    let third = f.store.put("hello").await.unwrap();
    assert_eq!(third, second);
    let blob = f.store.blob_info(&hash).await.unwrap().unwrap();
    assert_eq!(blob.access_count, 2);
}

// =============================================================================
// Late duplicate detection
// =============================================================================

/// 在 put 期间抢先登记同一摘要，模拟并发写入的胜者
struct RacingBackend {
    inner: MemoryBlobBackend,
    index: SeaOrmStorage,
    raced: AtomicBool,
}

const WINNER_LOCATION: &str = "content/winner.txt";

#[async_trait]
impl BlobBackend for RacingBackend {
    fn name(&self) -> &'static str {
        "racing"
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<()> {
        self.inner.ensure_bucket(bucket).await
    }

    async fn put(
        &self,
        bucket: &str,
        location: &str,
        bytes: Bytes,
        size: u64,
        metadata: &BlobMetadata,
    ) -> Result<()> {
        self.inner
            .put(bucket, location, bytes.clone(), size, metadata)
            .await?;

        if !self.raced.swap(true, Ordering::SeqCst) {
            self.inner
                .put(bucket, WINNER_LOCATION, bytes, size, metadata)
                .await?;
            self.index
                .insert_blob(NewBlob {
                    hash: metadata.content_hash.clone(),
                    location: WINNER_LOCATION.to_string(),
                    size,
                })
                .await?;
        }
        Ok(())
    }

    async fn get(&self, bucket: &str, location: &str) -> Result<Bytes> {
        self.inner.get(bucket, location).await
    }

    async fn stat(&self, bucket: &str, location: &str) -> Result<Option<BlobStat>> {
        self.inner.stat(bucket, location).await
    }
}

#[tokio::test]
async fn test_late_duplicate_adopts_winning_row() {
    let (index, _dir) = create_index().await;
    let backend = Arc::new(RacingBackend {
        inner: MemoryBlobBackend::new(),
        index: index.clone(),
        raced: AtomicBool::new(false),
    });
    backend.ensure_bucket(BUCKET).await.unwrap();
    let cache = CacheLayer::new(Arc::new(MokaCacheBackend::new(100)), 3600);
    let store = ContentStore::new(backend.clone(), index, cache.clone(), BUCKET);

    let location = store.put("hello").await.unwrap();

    assert_eq!(location, WINNER_LOCATION);
    let blob = store.blob_info(&digest("hello")).await.unwrap().unwrap();
    assert_eq!(blob.location, WINNER_LOCATION);
    assert_eq!(blob.access_count, 2);
    assert_eq!(
        cache.get(&hash_cache_key(digest("hello").as_str())).await.as_deref(),
        Some(WINNER_LOCATION)
    );
    assert_eq!(store.get(&location).await.unwrap(), "hello");
}

// =============================================================================
// Error propagation
// =============================================================================

/// stat 总是失败（后端不可达）
struct UnreachableStat {
    inner: MemoryBlobBackend,
}

#[async_trait]
impl BlobBackend for UnreachableStat {
    fn name(&self) -> &'static str {
        "unreachable-stat"
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<()> {
        self.inner.ensure_bucket(bucket).await
    }

    async fn put(
        &self,
        bucket: &str,
        location: &str,
        bytes: Bytes,
        size: u64,
        metadata: &BlobMetadata,
    ) -> Result<()> {
        self.inner.put(bucket, location, bytes, size, metadata).await
    }

    async fn get(&self, bucket: &str, location: &str) -> Result<Bytes> {
        self.inner.get(bucket, location).await
    }

    async fn stat(&self, _bucket: &str, _location: &str) -> Result<Option<BlobStat>> {
        Err(PastelinkerError::storage("connection reset by peer"))
    }
}

#[tokio::test]
async fn test_stat_error_propagates_without_healing() {
    let (index, _dir) = create_index().await;
    let backend = Arc::new(UnreachableStat {
        inner: MemoryBlobBackend::new(),
    });
    backend.ensure_bucket(BUCKET).await.unwrap();
    let cache = CacheLayer::new(Arc::new(MokaCacheBackend::new(100)), 3600);
    let store = ContentStore::new(backend, index.clone(), cache, BUCKET);

    let location = store.put("hello").await.unwrap();
    let err = store.put("hello").await.unwrap_err();

    assert!(matches!(err, PastelinkerError::Storage(_)), "{:?}", err);
    // 索引记录未被当作失效删除
    let blob = index.find_blob_by_hash(digest("hello").as_str()).await.unwrap().unwrap();
    assert_eq!(blob.location, location);
    assert_eq!(blob.access_count, 1);
}

#[tokio::test]
async fn test_put_error_leaves_no_index_entry() {
    let (index, _dir) = create_index().await;
    // bucket 未创建，put 失败
    let backend = Arc::new(MemoryBlobBackend::new());
    let cache = CacheLayer::new(Arc::new(MokaCacheBackend::new(100)), 3600);
    let store = ContentStore::new(backend, index.clone(), cache.clone(), BUCKET);

    let err = store.put("hello").await.unwrap_err();

    assert!(matches!(err, PastelinkerError::Storage(_)));
    assert!(index.find_blob_by_hash(digest("hello").as_str()).await.unwrap().is_none());
    assert_eq!(cache.get(&hash_cache_key(digest("hello").as_str())).await, None);
}

// =============================================================================
// Public URL
// =============================================================================

#[tokio::test]
async fn test_public_url() {
    let f = create_fixture().await;
    assert_eq!(f.store.public_url("content/ab/1.txt"), None);

    let store = f
        .store
        .clone()
        .with_public_base_url(Some("http://localhost:9000/".to_string()));
    assert_eq!(
        store.public_url("content/ab/1.txt").as_deref(),
        Some("http://localhost:9000/links-bucket/content/ab/1.txt")
    );
}
