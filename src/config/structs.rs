use serde::{Deserialize, Serialize};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含三个外部后端以及短码生成、日志的配置：
/// - database: 持久化索引（blobs / links 表）
/// - cache: 缓存后端（memory / redis）
/// - blob: 内容存储后端（filesystem / memory）
/// - short_code: 短码长度与重试策略
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub blob: BlobConfig,
    #[serde(default)]
    pub short_code: ShortCodeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从默认路径加载
    pub fn load() -> Self {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：PL，分隔符：__
    /// 示例：PL__CACHE__DEFAULT_TTL=60
    pub fn load_from(path: &str) -> Self {
        use config::{Config, Environment, File};

        let _ = dotenvy::dotenv();

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix("PL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
}

/// 缓存系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(rename = "type")]
    #[serde(default = "default_cache_type")]
    pub cache_type: String,
    /// 秒；摘要->位置、位置->内容两类条目共用
    #[serde(default = "default_cache_ttl")]
    pub default_ttl: u64,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_key_prefix")]
    pub key_prefix: String,
}

/// 内存缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_memory_capacity")]
    pub max_capacity: u64,
}

/// 内容存储后端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    #[serde(rename = "type")]
    #[serde(default = "default_blob_type")]
    pub blob_type: String,
    /// filesystem 后端的根目录，bucket 为其子目录
    #[serde(default = "default_blob_root")]
    pub root: String,
    #[serde(default = "default_blob_bucket")]
    pub bucket: String,
    /// 例如 http://localhost:9000，设置后可生成 blob 的公开地址
    #[serde(default)]
    pub public_base_url: Option<String>,
}

/// 短码生成策略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortCodeConfig {
    #[serde(default = "default_initial_length")]
    pub initial_length: usize,
    /// 每失败这么多次，截断长度 +1
    #[serde(default = "default_grow_after")]
    pub grow_after: u32,
    /// 失败次数上限，超过后改用兜底方案
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_fallback_length")]
    pub fallback_length: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_database_url() -> String {
    "pastelinker.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_cache_type() -> String {
    "memory".to_string()
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_redis_key_prefix() -> String {
    "pastelinker:".to_string()
}

fn default_memory_capacity() -> u64 {
    10000
}

fn default_blob_type() -> String {
    "filesystem".to_string()
}

fn default_blob_root() -> String {
    "data/blobs".to_string()
}

fn default_blob_bucket() -> String {
    "links-bucket".to_string()
}

fn default_initial_length() -> usize {
    7
}

fn default_grow_after() -> u32 {
    5
}

fn default_max_attempts() -> u32 {
    10
}

fn default_fallback_length() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: default_cache_type(),
            default_ttl: default_cache_ttl(),
            redis: RedisConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_redis_key_prefix(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_memory_capacity(),
        }
    }
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            blob_type: default_blob_type(),
            root: default_blob_root(),
            bucket: default_blob_bucket(),
            public_base_url: None,
        }
    }
}

impl Default for ShortCodeConfig {
    fn default() -> Self {
        Self {
            initial_length: default_initial_length(),
            grow_after: default_grow_after(),
            max_attempts: default_max_attempts(),
            fallback_length: default_fallback_length(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
