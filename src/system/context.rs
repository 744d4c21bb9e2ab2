//! Backend lifecycle
//!
//! The database, cache and blob handles are built once here and handed to
//! the components that need them.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::blob::{self, BlobBackend};
use crate::cache::{self, CacheBackend, CacheLayer};
use crate::cas::ContentStore;
use crate::config::{StaticConfig, get_config};
use crate::errors::Result;
use crate::services::LinkService;
use crate::shortcode::{ShortCodeGenerator, ShortCodePolicy};
use crate::storage::SeaOrmStorage;

pub struct AppContext {
    pub storage: Arc<SeaOrmStorage>,
    pub cache: CacheLayer,
    pub blobs: Arc<dyn BlobBackend>,
    pub content: ContentStore,
    pub codes: ShortCodeGenerator,
    pub links: LinkService,
}

impl AppContext {
    /// 按全局配置初始化
    pub async fn from_global() -> Result<Self> {
        let config = get_config();
        Self::init(&config).await
    }

    /// 连接数据库、缓存和对象存储，并组装各组件
    pub async fn init(config: &StaticConfig) -> Result<Self> {
        let storage = SeaOrmStorage::from_config(&config.database).await?;

        let cache_backend = cache::create_cache_backend(&config.cache)?;
        // 缓存不可用不影响启动，后续按未命中处理
        if let Err(e) = cache_backend.ping().await {
            warn!(
                "Cache backend {} is unreachable, continuing without cache hits: {}",
                cache_backend.name(),
                e
            );
        }
        let cache = CacheLayer::new(cache_backend, config.cache.default_ttl);

        let blobs = blob::create_blob_backend(&config.blob)?;
        blobs.ensure_bucket(&config.blob.bucket).await?;

        Ok(Self::assemble(storage, cache, blobs, config))
    }

    /// 用已构建好的后端组装（测试中注入 mock 后端）
    pub fn with_backends(
        storage: SeaOrmStorage,
        cache_backend: Arc<dyn CacheBackend>,
        blobs: Arc<dyn BlobBackend>,
        config: &StaticConfig,
    ) -> Self {
        let cache = CacheLayer::new(cache_backend, config.cache.default_ttl);
        Self::assemble(storage, cache, blobs, config)
    }

    fn assemble(
        storage: SeaOrmStorage,
        cache: CacheLayer,
        blobs: Arc<dyn BlobBackend>,
        config: &StaticConfig,
    ) -> Self {
        let content = ContentStore::new(
            blobs.clone(),
            storage.clone(),
            cache.clone(),
            config.blob.bucket.clone(),
        )
        .with_public_base_url(config.blob.public_base_url.clone());

        let storage = Arc::new(storage);
        let codes = ShortCodeGenerator::new(
            storage.clone(),
            ShortCodePolicy::from(&config.short_code),
        );
        let links = LinkService::new(storage.clone(), content.clone(), codes.clone());

        info!(
            "Backends ready: index={}, cache={}, blob={} (bucket '{}')",
            storage.backend_name(),
            cache.backend_name(),
            blobs.name(),
            content.bucket()
        );

        Self {
            storage,
            cache,
            blobs,
            content,
            codes,
            links,
        }
    }

    /// 关闭数据库连接
    pub async fn shutdown(self) -> Result<()> {
        let Self {
            storage,
            content,
            codes,
            links,
            ..
        } = self;
        // 其余组件也持有连接，先释放
        drop(links);
        drop(codes);
        drop(content);

        match Arc::try_unwrap(storage) {
            Ok(storage) => storage.close().await?,
            Err(_) => debug!("Index storage still shared, leaving pool to drop"),
        }
        info!("Backends shut down");
        Ok(())
    }
}
