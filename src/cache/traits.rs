use async_trait::async_trait;

use crate::errors::Result;

/// 外部缓存后端的最小接口
///
/// 值对缓存是不透明的字符串，序列化由调用方负责。实现应当把后端的
/// 连接/超时错误以 `Err` 返回，由 [`CacheLayer`](super::CacheLayer)
/// 统一吞掉，不要在这里 panic。
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// 后端名称（用于日志）
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// `ttl_secs` 为 `None` 表示不过期
    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// 清空整个缓存（管理/测试用途）
    async fn flush_all(&self) -> Result<()>;

    /// 连通性检查，启动时调用
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
