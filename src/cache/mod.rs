//! Cache Layer
//!
//! A generic TTL key/value cache used cache-aside by the content store for
//! digest→location and location→content lookups. Backends: in-process moka
//! (`memory`) and `redis`.

pub mod backends;
pub mod layer;
pub mod traits;

use std::sync::Arc;

use crate::config::CacheConfig;
use crate::errors::{PastelinkerError, Result};

pub use backends::{MokaCacheBackend, RedisCacheBackend};
pub use layer::CacheLayer;
pub use traits::CacheBackend;

/// 根据配置创建缓存后端
pub fn create_cache_backend(config: &CacheConfig) -> Result<Arc<dyn CacheBackend>> {
    match config.cache_type.as_str() {
        "memory" => Ok(Arc::new(MokaCacheBackend::new(config.memory.max_capacity))),
        "redis" => Ok(Arc::new(RedisCacheBackend::new(
            &config.redis.url,
            &config.redis.key_prefix,
        )?)),
        other => Err(PastelinkerError::config(format!(
            "Unknown cache type '{}'. Supported: memory, redis",
            other
        ))),
    }
}
