//! Widget-side admission, checked before a file is sent to the gateway.
//! The gateway applies its own rules again on upload.

use crate::domain::files::admission::{self, AdmissionError, MAX_UPLOAD_BYTES};

use super::client::PendingFile;

/// Smallest file the widget accepts.
pub const MIN_FILE_BYTES: usize = 1024;

/// Items one widget instance may hold at a time.
pub const MAX_FILES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FileRejection {
    #[error("File is too small")]
    TooSmall,
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error("Maximum number of files reached")]
    TooManyFiles,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetOptions {
    pub max_files: usize,
    pub min_file_size: usize,
    pub max_file_size: usize,
    /// Exact types or `type/*` wildcards.
    pub accepted_file_types: Vec<String>,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        let documents = admission::ALLOWED_MIME_TYPES
            .iter()
            .filter(|t| !t.starts_with("image/"))
            .map(|t| t.to_string());
        Self {
            max_files: MAX_FILES,
            min_file_size: MIN_FILE_BYTES,
            max_file_size: MAX_UPLOAD_BYTES,
            accepted_file_types: std::iter::once("image/*".to_string())
                .chain(documents)
                .collect(),
        }
    }
}

impl WidgetOptions {
    pub fn accepts_type(&self, mime_type: &str) -> bool {
        let essence = admission::mime_essence(Some(mime_type));
        if essence.is_empty() {
            return false;
        }
        self.accepted_file_types.iter().any(|accepted| {
            match accepted.strip_suffix("/*") {
                Some(major) => essence
                    .split_once('/')
                    .is_some_and(|(m, _)| m.eq_ignore_ascii_case(major)),
                None => accepted.eq_ignore_ascii_case(&essence),
            }
        })
    }

    /// Type first, then the size bounds, both inclusive.
    pub fn check(&self, file: &PendingFile) -> Result<(), FileRejection> {
        if !self.accepts_type(&file.mime_type) {
            return Err(AdmissionError::TypeNotAllowed.into());
        }
        let len = file.bytes.len();
        if len < self.min_file_size {
            return Err(FileRejection::TooSmall);
        }
        if len > self.max_file_size {
            return Err(AdmissionError::TooLarge.into());
        }
        Ok(())
    }
}
