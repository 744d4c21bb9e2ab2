//! Short-Code Generator
//!
//! A candidate is the base-62 rendering of a SHA-256 digest over
//! `owner:timestamp:content` (plus a random salt on retries), truncated to
//! the policy length. Candidates are checked against the link index before
//! being returned. The check is read-then-write; the unique `short_code`
//! constraint on insert is what actually guarantees uniqueness.

mod base62;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::ShortCodeConfig;
use crate::errors::Result;
use crate::storage::SeaOrmStorage;

pub use base62::{BASE62_ALPHABET, encode_base62, is_base62, truncate_base62};

/// 短码是否已被占用
#[async_trait]
pub trait CodeRegistry: Send + Sync {
    async fn code_exists(&self, code: &str) -> Result<bool>;
}

#[async_trait]
impl CodeRegistry for SeaOrmStorage {
    async fn code_exists(&self, code: &str) -> Result<bool> {
        SeaOrmStorage::code_exists(self, code).await
    }
}

/// 长度与重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortCodePolicy {
    pub initial_length: usize,
    pub grow_after: u32,
    pub max_attempts: u32,
    pub fallback_length: usize,
}

impl Default for ShortCodePolicy {
    fn default() -> Self {
        Self::from(&ShortCodeConfig::default())
    }
}

impl From<&ShortCodeConfig> for ShortCodePolicy {
    fn from(config: &ShortCodeConfig) -> Self {
        Self {
            initial_length: config.initial_length.clamp(1, 21),
            grow_after: config.grow_after.max(1),
            max_attempts: config.max_attempts,
            fallback_length: config.fallback_length.clamp(1, 21),
        }
    }
}

impl ShortCodePolicy {
    /// 已失败 `failed` 次时下一个候选的长度
    pub fn length_for_attempt(&self, failed: u32) -> usize {
        (self.initial_length + (failed / self.grow_after) as usize).min(21)
    }
}

#[derive(Clone)]
pub struct ShortCodeGenerator {
    registry: Arc<dyn CodeRegistry>,
    policy: ShortCodePolicy,
}

impl ShortCodeGenerator {
    pub fn new(registry: Arc<dyn CodeRegistry>, policy: ShortCodePolicy) -> Self {
        Self { registry, policy }
    }

    pub fn policy(&self) -> &ShortCodePolicy {
        &self.policy
    }

    /// 生成一个在检查时尚未被占用的短码
    ///
    /// 失败 `max_attempts` 次后返回兜底短码，不再检查占用。
    pub async fn generate(&self, owner_id: &str, content: &str) -> Result<String> {
        let mut failed = 0;
        while failed < self.policy.max_attempts {
            let salt = (failed > 0).then(rand::random::<u64>);
            let length = self.policy.length_for_attempt(failed);
            let code = candidate(owner_id, content, salt, length);

            if !self.registry.code_exists(&code).await? {
                if failed > 0 {
                    debug!("Short code {} accepted after {} collisions", code, failed);
                }
                return Ok(code);
            }

            failed += 1;
            debug!(
                "Short code collision on {} (attempt {}/{})",
                code, failed, self.policy.max_attempts
            );
        }

        let code = fallback_code(owner_id, self.policy.fallback_length);
        warn!(
            "Short code generation exhausted {} attempts, using fallback {}",
            self.policy.max_attempts, code
        );
        Ok(code)
    }
}

fn candidate(owner_id: &str, content: &str, salt: Option<u64>, length: usize) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(owner_id.as_bytes());
    hasher.update(b":");
    hasher.update(nanos.to_be_bytes());
    hasher.update(b":");
    hasher.update(content.as_bytes());
    if let Some(salt) = salt {
        hasher.update(b":");
        hasher.update(salt.to_be_bytes());
    }
    truncate_base62(leading_u128(&hasher.finalize()), length)
}

fn fallback_code(owner_id: &str, length: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(owner_id.as_bytes());
    hasher.update(uuid::Uuid::new_v4().as_bytes());
    hasher.update(rand::random::<u64>().to_be_bytes());
    truncate_base62(leading_u128(&hasher.finalize()), length)
}

fn leading_u128(digest: &[u8]) -> u128 {
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&digest[..16]);
    u128::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_schedule_grows_every_five_failures() {
        let policy = ShortCodePolicy::default();
        let lengths: Vec<usize> = (0..10).map(|f| policy.length_for_attempt(f)).collect();
        assert_eq!(lengths, vec![7, 7, 7, 7, 7, 8, 8, 8, 8, 8]);
    }

    #[test]
    fn test_policy_from_config_sanitizes_zero_growth() {
        let config = ShortCodeConfig {
            grow_after: 0,
            ..Default::default()
        };
        let policy = ShortCodePolicy::from(&config);
        assert_eq!(policy.grow_after, 1);
        assert_eq!(policy.length_for_attempt(2), 9);
    }

    #[test]
    fn test_candidate_shape() {
        let code = candidate("u1", "hello", None, 7);
        assert_eq!(code.len(), 7);
        assert!(is_base62(&code));

        let salted = candidate("u1", "hello", Some(42), 8);
        assert_eq!(salted.len(), 8);
    }

    #[test]
    fn test_fallback_shape() {
        let a = fallback_code("u1", 10);
        let b = fallback_code("u1", 10);
        assert_eq!(a.len(), 10);
        assert!(is_base62(&a));
        assert_ne!(a, b);
    }
}
