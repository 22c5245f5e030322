use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::storage_port::StoragePort;
use crate::application::use_cases::files::{FileError, codes};

pub struct DeleteFile<'a, R, S>
where
    R: FilesRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub repo: &'a R,
    pub storage: &'a S,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub stored_name: String,
    /// `false` when the blob was already gone or could not be removed.
    pub blob_removed: bool,
}

impl<'a, R, S> DeleteFile<'a, R, S>
where
    R: FilesRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    /// Metadata row first, blob second. Once the row is gone the request
    /// succeeds; a blob that cannot be removed is left behind as an orphan.
    pub async fn execute(&self, stored_name: &str) -> Result<DeleteOutcome, FileError> {
        let metadata_failure = |err: anyhow::Error| {
            tracing::error!(error = ?err, %stored_name, "delete_file_metadata_failed");
            FileError::Metadata {
                code: codes::DELETE_METADATA,
                source: err,
            }
        };

        let locator = self
            .repo
            .find_by_stored_name(stored_name)
            .await
            .map_err(metadata_failure)?
            .ok_or(FileError::NotFound)?;

        self.repo
            .delete_by_id(&locator.id)
            .await
            .map_err(metadata_failure)?;

        let blob_removed = match self.storage.delete_stored(&locator.nombre_almacenado).await {
            Ok(removed) => removed,
            Err(err) => {
                tracing::warn!(
                    error = ?err,
                    stored_name = %locator.nombre_almacenado,
                    "orphaned_blob"
                );
                false
            }
        };

        Ok(DeleteOutcome {
            stored_name: stored_name.to_string(),
            blob_removed,
        })
    }
}
