use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use tracing::debug;

use crate::cache::CacheBackend;
use crate::errors::Result;

#[derive(Clone)]
struct CachedValue {
    value: String,
    ttl: Option<Duration>,
}

/// 按条目 TTL 过期，`None` 表示永不过期
struct PerEntryExpiry;

impl Expiry<String, CachedValue> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // 覆盖写入时以新值的 TTL 重新计时
        value.ttl
    }
}

/// 进程内缓存后端（单机部署与测试）
pub struct MokaCacheBackend {
    inner: Cache<String, CachedValue>,
}

impl MokaCacheBackend {
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .build();

        debug!(
            "MokaCacheBackend initialized with max capacity: {}",
            max_capacity
        );
        Self { inner }
    }
}

#[async_trait]
impl CacheBackend for MokaCacheBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<()> {
        let entry = CachedValue {
            value: value.to_string(),
            ttl: ttl_secs.map(Duration::from_secs),
        };
        self.inner.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.invalidate(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        // contains_key 可能返回已过期但尚未清理的条目，这里走 get 保证语义一致
        Ok(self.inner.get(key).await.is_some())
    }

    async fn flush_all(&self) -> Result<()> {
        self.inner.invalidate_all();
        Ok(())
    }
}
