use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::cache::CacheBackend;
use crate::errors::{PastelinkerError, Result};

/// Redis 缓存后端
///
/// 连接在首次使用时建立并复用；任何命令失败都会丢弃连接，下次调用重连。
pub struct RedisCacheBackend {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisCacheBackend {
    pub fn new(url: &str, key_prefix: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            PastelinkerError::cache_connection(format!("Invalid Redis URL '{}': {}", url, e))
        })?;

        debug!("RedisCacheBackend created with prefix: '{}'", key_prefix);

        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: key_prefix.to_string(),
        })
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免并发重复建连
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                PastelinkerError::cache_connection(format!("Failed to connect to Redis: {}", e))
            })?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在命令错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// 命令失败后先丢弃连接，再把错误交给上层
    async fn on_error<T>(&self, result: redis::RedisResult<T>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                self.reset_connection().await;
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = self.on_error(conn.get(self.make_key(key)).await).await?;
        trace!("Redis GET {} -> {}", key, if value.is_some() { "hit" } else { "miss" });
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let redis_key = self.make_key(key);
        let result = match ttl_secs {
            Some(ttl) => conn.set_ex::<_, _, ()>(redis_key, value, ttl).await,
            None => conn.set::<_, _, ()>(redis_key, value).await,
        };
        self.on_error(result).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let deleted: i64 = self.on_error(conn.del(self.make_key(key)).await).await?;
        if deleted == 0 {
            trace!("Key not found in Redis for removal: {}", key);
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        self.on_error(conn.exists(self.make_key(key)).await).await
    }

    async fn flush_all(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let result = redis::cmd("FLUSHDB").query_async::<()>(&mut conn).await;
        self.on_error(result).await
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let result = redis::cmd("PING").query_async::<String>(&mut conn).await;
        let response = self.on_error(result).await?;
        debug!("Redis connection test successful: {}", response);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_rejected() {
        let result = RedisCacheBackend::new("not-a-redis-url", "p:");
        assert!(matches!(result, Err(PastelinkerError::CacheConnection(_))));
    }

    #[test]
    fn test_key_prefix_is_applied() {
        let backend = RedisCacheBackend::new("redis://127.0.0.1:6379/", "pl:").unwrap();
        assert_eq!(backend.make_key("content:a"), "pl:content:a");
    }
}
