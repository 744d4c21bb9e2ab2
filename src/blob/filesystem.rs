//! Filesystem object store
//!
//! Layout:
//! ```text
//! {root}/
//! └── {bucket}/
//!     └── content/
//!         └── ab/
//!             ├── 1767225600000-<uuid>.txt            # object bytes
//!             └── 1767225600000-<uuid>.txt.meta.json  # BlobMetadata
//! ```

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, trace};

use super::{BlobBackend, BlobMetadata, BlobStat};
use crate::errors::{PastelinkerError, Result};

const META_SUFFIX: &str = ".meta.json";

#[derive(Debug, Clone)]
pub struct FileBlobBackend {
    root: PathBuf,
}

impl FileBlobBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 只允许普通路径分量，拒绝绝对路径和 `..`
    fn check_relative(kind: &str, value: &str) -> Result<()> {
        let path = Path::new(value);
        if value.is_empty() || !path.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(PastelinkerError::storage(format!(
                "Invalid {} '{}'",
                kind, value
            )));
        }
        Ok(())
    }

    fn bucket_path(&self, bucket: &str) -> Result<PathBuf> {
        Self::check_relative("bucket", bucket)?;
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, location: &str) -> Result<PathBuf> {
        Self::check_relative("location", location)?;
        Ok(self.bucket_path(bucket)?.join(location))
    }

    fn meta_path(path: &Path) -> PathBuf {
        let mut os = path.as_os_str().to_os_string();
        os.push(META_SUFFIX);
        PathBuf::from(os)
    }

    async fn discard(paths: &[&Path]) {
        for path in paths {
            match tokio::fs::remove_file(path).await {
                Err(e) if e.kind() != ErrorKind::NotFound => {
                    debug!("Failed to clean up {}: {}", path.display(), e);
                }
                _ => {}
            }
        }
    }

    fn io_error(action: &str, path: &Path, e: std::io::Error) -> PastelinkerError {
        PastelinkerError::storage(format!("Failed to {} {}: {}", action, path.display(), e))
    }
}

#[async_trait]
impl BlobBackend for FileBlobBackend {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    async fn ensure_bucket(&self, bucket: &str) -> Result<()> {
        let dir = self.bucket_path(bucket)?;
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Self::io_error("create bucket", &dir, e))?;
        debug!("Bucket ready at {}", dir.display());
        Ok(())
    }

    async fn put(
        &self,
        bucket: &str,
        location: &str,
        bytes: Bytes,
        size: u64,
        metadata: &BlobMetadata,
    ) -> Result<()> {
        if bytes.len() as u64 != size {
            return Err(PastelinkerError::storage(format!(
                "Size mismatch for '{}': declared {}, got {}",
                location,
                size,
                bytes.len()
            )));
        }

        let path = self.object_path(bucket, location)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::io_error("create directory", parent, e))?;
        }

        // 对象最后通过 rename 原子出现；任一步失败都清理已写出的文件
        let meta = serde_json::to_vec(metadata)?;
        let meta_path = Self::meta_path(&path);
        let tmp_path = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4()));

        if let Err(e) = tokio::fs::write(&tmp_path, &bytes).await {
            Self::discard(&[tmp_path.as_path()]).await;
            return Err(Self::io_error("write", &tmp_path, e));
        }
        if let Err(e) = tokio::fs::write(&meta_path, meta).await {
            Self::discard(&[tmp_path.as_path(), meta_path.as_path()]).await;
            return Err(Self::io_error("write metadata", &meta_path, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            Self::discard(&[tmp_path.as_path(), meta_path.as_path()]).await;
            return Err(Self::io_error("commit", &path, e));
        }

        trace!("Stored object {} ({} bytes)", path.display(), size);
        Ok(())
    }

    async fn get(&self, bucket: &str, location: &str) -> Result<Bytes> {
        let path = self.object_path(bucket, location)?;
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| Self::io_error("read", &path, e))?;
        Ok(Bytes::from(data))
    }

    async fn stat(&self, bucket: &str, location: &str) -> Result<Option<BlobStat>> {
        let path = self.object_path(bucket, location)?;
        let fs_meta = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error("stat", &path, e)),
        };

        // 元数据缺失不影响存在性判断
        let metadata = match tokio::fs::read(Self::meta_path(&path)).await {
            Ok(raw) => serde_json::from_slice(&raw).unwrap_or_default(),
            Err(_) => BlobMetadata::default(),
        };

        Ok(Some(BlobStat {
            size: fs_meta.len(),
            metadata,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend() -> (FileBlobBackend, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        (FileBlobBackend::new(dir.path()), dir)
    }

    #[tokio::test]
    async fn test_put_then_get_and_stat() {
        let (backend, _dir) = backend();
        backend.ensure_bucket("links").await.unwrap();

        let meta = BlobMetadata::text_plain("deadbeef");
        backend
            .put("links", "content/de/1-a.txt", Bytes::from_static(b"hello"), 5, &meta)
            .await
            .unwrap();

        let bytes = backend.get("links", "content/de/1-a.txt").await.unwrap();
        assert_eq!(&bytes[..], b"hello");

        let stat = backend.stat("links", "content/de/1-a.txt").await.unwrap().unwrap();
        assert_eq!(stat.size, 5);
        assert_eq!(stat.metadata, meta);
    }

    #[tokio::test]
    async fn test_stat_missing_object_is_none() {
        let (backend, _dir) = backend();
        backend.ensure_bucket("links").await.unwrap();

        assert!(backend.stat("links", "content/00/none.txt").await.unwrap().is_none());
        assert!(matches!(
            backend.get("links", "content/00/none.txt").await,
            Err(PastelinkerError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_no_sidecar() {
        let (backend, dir) = backend();
        backend.ensure_bucket("links").await.unwrap();

        // 目标位置被目录占用，rename 失败
        let object = dir.path().join("links/content/de/1-a.txt");
        tokio::fs::create_dir_all(object.join("occupied")).await.unwrap();

        let result = backend
            .put(
                "links",
                "content/de/1-a.txt",
                Bytes::from_static(b"hello"),
                5,
                &BlobMetadata::text_plain("deadbeef"),
            )
            .await;
        assert!(matches!(result, Err(PastelinkerError::Storage(_))));

        assert!(!FileBlobBackend::meta_path(&object).exists());
        let mut entries = tokio::fs::read_dir(object.parent().unwrap()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["1-a.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_path_traversal_is_rejected() {
        let (backend, _dir) = backend();

        for location in ["../escape.txt", "/etc/passwd", "content/../../x", ""] {
            let result = backend
                .put("links", location, Bytes::new(), 0, &BlobMetadata::default())
                .await;
            assert!(result.is_err(), "location {:?} should be rejected", location);
        }
    }
}
