use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::storage_port::StoragePort;
use crate::application::use_cases::files::FileError;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServedFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub filename: String,
    pub disposition: Disposition,
}

/// Backs the raw, view and download routes; they differ only in disposition.
pub struct ServeFile<'a, R, S>
where
    R: FilesRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub repo: &'a R,
    pub storage: &'a S,
}

impl<'a, R, S> ServeFile<'a, R, S>
where
    R: FilesRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub async fn execute(
        &self,
        stored_name: &str,
        disposition: Disposition,
    ) -> Result<ServedFile, FileError> {
        let path = self
            .storage
            .resolve_stored_path(stored_name)
            .await
            .map_err(FileError::Storage)?
            .ok_or(FileError::NotFound)?;

        // Header enrichment only; a failed lookup falls back to defaults.
        let info = match self.repo.find_display_info(stored_name).await {
            Ok(info) => info,
            Err(err) => {
                tracing::warn!(error = ?err, %stored_name, "file_display_info_failed");
                None
            }
        };

        let bytes = self.storage.read_bytes(&path).await.map_err(|err| {
            tracing::error!(error = ?err, %stored_name, "read_stored_file_failed");
            FileError::Storage(err)
        })?;

        let (filename, content_type) = match info {
            Some(info) => (
                info.nombre_original,
                info.mime_type.filter(|m| !m.trim().is_empty()),
            ),
            None => (stored_name.to_string(), None),
        };

        Ok(ServedFile {
            bytes,
            content_type: content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            filename,
            disposition,
        })
    }
}
