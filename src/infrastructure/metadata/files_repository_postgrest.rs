use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::postgrest::{PostgrestClient, eq};
use crate::application::ports::files_repository::FilesRepository;
use crate::domain::files::file_record::{
    FileDisplayInfo, FileLocator, FileRecord, FileSummary, RecordId,
};

const RELATION: &str = "archivo";
const LIST_COLUMNS: &str = "id,nombre_original,nombre_almacenado,tamano,mime_type";
const LOCATOR_COLUMNS: &str = "id,nombre_almacenado";
const DISPLAY_COLUMNS: &str = "nombre_original,mime_type";

pub struct PostgrestFilesRepository {
    client: PostgrestClient,
}

impl PostgrestFilesRepository {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> anyhow::Result<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(anyhow::Error::from))
        .collect()
}

#[async_trait]
impl FilesRepository for PostgrestFilesRepository {
    async fn insert_file(&self, record: &FileRecord) -> anyhow::Result<Option<RecordId>> {
        let body = serde_json::to_value(record)?;
        let rows = self
            .client
            .insert(RELATION, &body)
            .await?
            .into_rows("insert archivo")?;
        Ok(rows
            .first()
            .and_then(|row| row.get("id"))
            .and_then(|id| serde_json::from_value::<RecordId>(id.clone()).ok()))
    }

    async fn list_for_entity(
        &self,
        entity_name: &str,
        entity_id: Option<&str>,
    ) -> anyhow::Result<Vec<FileSummary>> {
        let mut filters = vec![("entidad_nombre", eq(entity_name))];
        if let Some(id) = entity_id {
            filters.push(("entidad_id", eq(id)));
        }
        let rows = self
            .client
            .select(RELATION, &filters, LIST_COLUMNS)
            .await?
            .into_rows("list archivo")?;
        decode_rows(rows)
    }

    async fn find_by_stored_name(&self, stored_name: &str) -> anyhow::Result<Option<FileLocator>> {
        let rows = self
            .client
            .select(
                RELATION,
                &[("nombre_almacenado", eq(stored_name))],
                LOCATOR_COLUMNS,
            )
            .await?
            .into_rows("locate archivo")?;
        Ok(decode_rows(rows)?.into_iter().next())
    }

    async fn find_display_info(
        &self,
        stored_name: &str,
    ) -> anyhow::Result<Option<FileDisplayInfo>> {
        let rows = self
            .client
            .select(
                RELATION,
                &[("nombre_almacenado", eq(stored_name))],
                DISPLAY_COLUMNS,
            )
            .await?
            .into_rows("describe archivo")?;
        Ok(decode_rows(rows)?.into_iter().next())
    }

    async fn delete_by_id(&self, id: &RecordId) -> anyhow::Result<()> {
        self.client
            .delete(RELATION, &[("id", eq(&id.to_string()))])
            .await?
            .into_rows("delete archivo")?;
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.client
            .select(RELATION, &[("limit", "1".to_string())], "id")
            .await?
            .into_rows("ping archivo")?;
        Ok(())
    }
}
