use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::ports::storage_port::{StoragePort, StoredUpload};
use super::core::{is_plain_file_name, storage_name};

/// Blobs live flat under `<uploads_dir>/<entity>/`.
pub struct FsStoragePort {
    pub uploads_root: PathBuf,
    pub public_prefix: String,
}

impl FsStoragePort {
    pub fn new(uploads_dir: &Path, entity_name: &str) -> Self {
        Self {
            uploads_root: uploads_dir.join(entity_name),
            public_prefix: format!("/uploads/{entity_name}"),
        }
    }

    pub async fn ensure_root(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.uploads_root).await?;
        Ok(())
    }

    fn path_for(&self, stored_name: &str) -> Option<PathBuf> {
        is_plain_file_name(stored_name).then(|| self.uploads_root.join(stored_name))
    }
}

#[async_trait::async_trait]
impl StoragePort for FsStoragePort {
    async fn store_upload(
        &self,
        original_filename: &str,
        bytes: &[u8],
    ) -> anyhow::Result<StoredUpload> {
        self.ensure_root().await?;

        let ts = chrono::Utc::now().timestamp_millis();
        let mut discriminator = 0u32;
        let (stored_name, path, mut file) = loop {
            let candidate = storage_name(ts, original_filename, discriminator);
            let path = self.uploads_root.join(&candidate);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => break (candidate, path, file),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => discriminator += 1,
                Err(err) => return Err(err.into()),
            }
        };

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;
        if let Err(err) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), error = ?cleanup, "partial_blob_cleanup_failed");
            }
            return Err(err.into());
        }

        tracing::debug!(path = %path.display(), size = bytes.len(), "blob_written");
        Ok(StoredUpload {
            relative_path: format!("{}/{}", self.public_prefix, stored_name),
            absolute_path: path,
            size: bytes.len() as i64,
            stored_name,
        })
    }

    async fn resolve_stored_path(&self, stored_name: &str) -> anyhow::Result<Option<PathBuf>> {
        let Some(path) = self.path_for(stored_name) else {
            return Ok(None);
        };
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn read_bytes(&self, abs_path: &Path) -> anyhow::Result<Vec<u8>> {
        let data = fs::read(abs_path).await?;
        Ok(data)
    }

    async fn delete_stored(&self, stored_name: &str) -> anyhow::Result<bool> {
        let Some(path) = self.path_for(stored_name) else {
            return Ok(false);
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
