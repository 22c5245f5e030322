use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier assigned by the metadata store. PostgREST hands back whatever
/// the column type is, so both numeric and textual keys are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(v) => write!(f, "{v}"),
            RecordId::Text(v) => f.write_str(v),
        }
    }
}

/// Row of the `archivo` relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub entidad_nombre: Option<String>,
    pub entidad_id: Option<String>,
    pub nombre_original: String,
    pub nombre_almacenado: String,
    pub mime_type: String,
    pub tamano: i64,
    pub ruta_archivo: String,
}

/// Projection used by listings: `id,nombre_original,nombre_almacenado,tamano,mime_type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileSummary {
    pub id: RecordId,
    pub nombre_original: String,
    pub nombre_almacenado: String,
    pub tamano: i64,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Projection used to resolve a storage name into its row: `id,nombre_almacenado`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileLocator {
    pub id: RecordId,
    pub nombre_almacenado: String,
}

/// Projection used only to enrich response headers: `nombre_original,mime_type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileDisplayInfo {
    pub nombre_original: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Entry of the file list handed to the upload widget. `id` and `serverId`
/// both carry the storage name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileListItem {
    pub id: String,
    pub original_name: String,
    pub size: i64,
    pub server_id: String,
}

impl From<FileSummary> for FileListItem {
    fn from(row: FileSummary) -> Self {
        Self {
            id: row.nombre_almacenado.clone(),
            original_name: row.nombre_original,
            size: row.tamano,
            server_id: row.nombre_almacenado,
        }
    }
}

/// Result of a completed upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    #[schema(value_type = String)]
    pub id: RecordId,
    pub original_name: String,
    pub size: i64,
    pub server_id: String,
}
