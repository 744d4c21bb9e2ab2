use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// 随对象一起保存的元数据
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetadata {
    pub content_type: String,
    pub content_hash: String,
}

impl BlobMetadata {
    pub fn text_plain(content_hash: &str) -> Self {
        Self {
            content_type: "text/plain".to_string(),
            content_hash: content_hash.to_string(),
        }
    }
}

/// `stat` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobStat {
    pub size: u64,
    pub metadata: BlobMetadata,
}

/// 对象存储后端
///
/// 所有错误都以 `PastelinkerError::Storage` 返回，本层不做重试。
#[async_trait]
pub trait BlobBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// 确保 bucket 存在（启动时调用）
    async fn ensure_bucket(&self, bucket: &str) -> Result<()>;

    async fn put(
        &self,
        bucket: &str,
        location: &str,
        bytes: Bytes,
        size: u64,
        metadata: &BlobMetadata,
    ) -> Result<()>;

    /// 读取对象；对象不存在也是错误
    async fn get(&self, bucket: &str, location: &str) -> Result<Bytes>;

    /// `Ok(None)` 表示对象确定不存在，`Err` 表示后端不可用
    async fn stat(&self, bucket: &str, location: &str) -> Result<Option<BlobStat>>;
}
