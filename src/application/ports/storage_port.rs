use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Unique name on disk; doubles as the file's public identifier.
    pub stored_name: String,
    pub absolute_path: PathBuf,
    /// Path recorded in `ruta_archivo`.
    pub relative_path: String,
    pub size: i64,
}

#[async_trait]
pub trait StoragePort: Send + Sync {
    async fn store_upload(
        &self,
        original_filename: &str,
        bytes: &[u8],
    ) -> anyhow::Result<StoredUpload>;
    /// `None` when the name is not a plain file name or no blob exists under it.
    async fn resolve_stored_path(&self, stored_name: &str) -> anyhow::Result<Option<PathBuf>>;
    async fn read_bytes(&self, abs_path: &Path) -> anyhow::Result<Vec<u8>>;
    /// Returns `false` when there was nothing to delete.
    async fn delete_stored(&self, stored_name: &str) -> anyhow::Result<bool>;
}
