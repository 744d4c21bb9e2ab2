//! Fail-open cache-aside wrapper
//!
//! Every backend failure is logged and degraded to a miss (`get`/`exists`)
//! or a no-op (`set`/`delete`/`flush_all`). Callers never see cache errors;
//! the blob backend and the persisted index remain the sources of truth.

use std::sync::Arc;

use tracing::{trace, warn};

use super::CacheBackend;

#[derive(Clone)]
pub struct CacheLayer {
    backend: Arc<dyn CacheBackend>,
    default_ttl: u64,
}

impl CacheLayer {
    /// `default_ttl` 以秒为单位，0 表示默认不过期
    pub fn new(backend: Arc<dyn CacheBackend>, default_ttl: u64) -> Self {
        Self {
            backend,
            default_ttl,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    /// 查询缓存；后端故障视为未命中
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.backend.get(key).await {
            Ok(Some(value)) => {
                trace!("Cache hit: {}", key);
                Some(value)
            }
            Ok(None) => {
                trace!("Cache miss: {}", key);
                None
            }
            Err(e) => {
                warn!(
                    "Cache get '{}' failed on {} backend, treating as miss: {}",
                    key,
                    self.backend.name(),
                    e
                );
                None
            }
        }
    }

    /// 写入缓存；`ttl` 为 `None` 时使用默认 TTL，`Some(0)` 表示不过期
    pub async fn set(&self, key: &str, value: &str, ttl: Option<u64>) {
        let ttl_secs = match ttl.unwrap_or(self.default_ttl) {
            0 => None,
            secs => Some(secs),
        };

        if let Err(e) = self.backend.set(key, value, ttl_secs).await {
            warn!(
                "Cache set '{}' failed on {} backend, ignored: {}",
                key,
                self.backend.name(),
                e
            );
        } else {
            trace!("Cache set: {} (ttl: {:?})", key, ttl_secs);
        }
    }

    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.backend.delete(key).await {
            warn!(
                "Cache delete '{}' failed on {} backend, ignored: {}",
                key,
                self.backend.name(),
                e
            );
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        self.backend.exists(key).await.unwrap_or_else(|e| {
            warn!(
                "Cache exists '{}' failed on {} backend, treating as absent: {}",
                key,
                self.backend.name(),
                e
            );
            false
        })
    }

    /// 清空缓存（管理/测试用途）
    pub async fn flush_all(&self) {
        if let Err(e) = self.backend.flush_all().await {
            warn!("Cache flush failed on {} backend: {}", self.backend.name(), e);
        }
    }
}
