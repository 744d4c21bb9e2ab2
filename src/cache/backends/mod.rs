pub mod moka;
pub mod redis;

pub use self::moka::MokaCacheBackend;
pub use self::redis::RedisCacheBackend;
