use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::storage_port::StoragePort;
use crate::application::use_cases::files::{FileError, codes};
use crate::domain::files::admission;
use crate::domain::files::file_record::{FileRecord, RecordId, UploadedFile};

pub struct UploadFile<'a, R, S>
where
    R: FilesRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub repo: &'a R,
    pub storage: &'a S,
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub entity_name: Option<String>,
    pub entity_id: Option<String>,
    pub original_filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl<'a, R, S> UploadFile<'a, R, S>
where
    R: FilesRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub async fn execute(&self, req: UploadRequest) -> Result<UploadedFile, FileError> {
        admission::check_mime(Some(&req.mime_type))?;
        admission::check_size(req.bytes.len())?;

        let stored = self
            .storage
            .store_upload(&req.original_filename, &req.bytes)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, filename = %req.original_filename, "store_upload_failed");
                FileError::Storage(err)
            })?;

        let record = FileRecord {
            id: None,
            entidad_nombre: req.entity_name,
            entidad_id: req.entity_id,
            nombre_original: req.original_filename.clone(),
            nombre_almacenado: stored.stored_name.clone(),
            mime_type: req.mime_type,
            tamano: stored.size,
            ruta_archivo: stored.relative_path.clone(),
        };

        let id = match self.repo.insert_file(&record).await {
            Ok(id) => id,
            Err(err) => {
                tracing::error!(error = ?err, stored_name = %stored.stored_name, "insert_file_failed");
                if let Err(cleanup) = self.storage.delete_stored(&stored.stored_name).await {
                    tracing::warn!(
                        error = ?cleanup,
                        stored_name = %stored.stored_name,
                        "upload_cleanup_failed"
                    );
                }
                return Err(FileError::Metadata {
                    code: codes::UPLOAD_METADATA,
                    source: err,
                });
            }
        };

        tracing::info!(stored_name = %stored.stored_name, size = stored.size, "file_uploaded");
        Ok(UploadedFile {
            id: id.unwrap_or_else(|| RecordId::Text(stored.stored_name.clone())),
            original_name: req.original_filename,
            size: stored.size,
            server_id: stored.stored_name,
        })
    }
}
