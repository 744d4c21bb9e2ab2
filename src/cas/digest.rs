use std::fmt;

use sha2::{Digest, Sha256};

/// 内容的 SHA-256 摘要（小写十六进制）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest(String);

impl ContentDigest {
    pub fn of(content: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(content)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 前两个十六进制字符，用作存储目录分片
    pub fn prefix(&self) -> &str {
        &self.0[..2]
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
