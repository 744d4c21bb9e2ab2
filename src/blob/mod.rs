//! Blob backend boundary
//!
//! `put` / `get` / `stat` against a bucketed object store. The content
//! store treats locations as opaque paths assigned exactly once.

pub mod filesystem;
pub mod memory;
pub mod traits;

use std::sync::Arc;

use crate::config::BlobConfig;
use crate::errors::{PastelinkerError, Result};

pub use filesystem::FileBlobBackend;
pub use memory::MemoryBlobBackend;
pub use traits::{BlobBackend, BlobMetadata, BlobStat};

/// 根据配置创建对象存储后端
pub fn create_blob_backend(config: &BlobConfig) -> Result<Arc<dyn BlobBackend>> {
    match config.blob_type.as_str() {
        "filesystem" => Ok(Arc::new(FileBlobBackend::new(&config.root))),
        "memory" => Ok(Arc::new(MemoryBlobBackend::new())),
        other => Err(PastelinkerError::config(format!(
            "Unknown blob backend '{}'. Supported: filesystem, memory",
            other
        ))),
    }
}
