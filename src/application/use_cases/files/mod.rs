pub mod delete_file;
pub mod list_files;
pub mod serve_file;
pub mod upload_file;

use crate::domain::files::admission::AdmissionError;

/// Numeric suffixes appended to the configured error message so a response
/// can be matched with its log line.
pub mod codes {
    pub const UPLOAD_METADATA: &str = "009";
    pub const LIST_METADATA: &str = "010";
    pub const DELETE_METADATA: &str = "011";
}

#[derive(thiserror::Error, Debug)]
pub enum FileError {
    #[error("{0}")]
    Validation(String),
    #[error("file not found")]
    NotFound,
    #[error("file storage failed")]
    Storage(#[source] anyhow::Error),
    #[error("metadata store request failed ({code})")]
    Metadata {
        code: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl From<AdmissionError> for FileError {
    fn from(err: AdmissionError) -> Self {
        FileError::Validation(err.to_string())
    }
}
