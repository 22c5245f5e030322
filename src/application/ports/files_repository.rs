use async_trait::async_trait;

use crate::domain::files::file_record::{
    FileDisplayInfo, FileLocator, FileRecord, FileSummary, RecordId,
};

/// File metadata kept in the remote tabular store. Every method treats a
/// non-success answer from the store as an error.
#[async_trait]
pub trait FilesRepository: Send + Sync {
    /// Inserts a row. Returns the store-assigned id when the store echoes the row back.
    async fn insert_file(&self, record: &FileRecord) -> anyhow::Result<Option<RecordId>>;
    /// Rows of `entity_name`, narrowed to `entity_id` when one is given.
    async fn list_for_entity(
        &self,
        entity_name: &str,
        entity_id: Option<&str>,
    ) -> anyhow::Result<Vec<FileSummary>>;
    async fn find_by_stored_name(&self, stored_name: &str) -> anyhow::Result<Option<FileLocator>>;
    async fn find_display_info(
        &self,
        stored_name: &str,
    ) -> anyhow::Result<Option<FileDisplayInfo>>;
    async fn delete_by_id(&self, id: &RecordId) -> anyhow::Result<()>;
    async fn ping(&self) -> anyhow::Result<()>;
}
