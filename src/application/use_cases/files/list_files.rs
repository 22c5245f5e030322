use crate::application::ports::files_repository::FilesRepository;
use crate::application::use_cases::files::{FileError, codes};
use crate::domain::files::file_record::FileListItem;

pub struct ListFiles<'a, R: FilesRepository + ?Sized> {
    pub repo: &'a R,
    pub entity_name: &'a str,
}

impl<'a, R: FilesRepository + ?Sized> ListFiles<'a, R> {
    /// An empty or missing `entity_id` lists every file of the entity type.
    pub async fn execute(&self, entity_id: Option<&str>) -> Result<Vec<FileListItem>, FileError> {
        let entity_id = entity_id.map(str::trim).filter(|s| !s.is_empty());
        let rows = self
            .repo
            .list_for_entity(self.entity_name, entity_id)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, entity_id = ?entity_id, "list_files_failed");
                FileError::Metadata {
                    code: codes::LIST_METADATA,
                    source: err,
                }
            })?;
        Ok(rows.into_iter().map(FileListItem::from).collect())
    }
}
