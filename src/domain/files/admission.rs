//! Upload admission rules applied before anything touches the disk.

/// Largest accepted upload, inclusive.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("File too large")]
    TooLarge,
    #[error("File type not allowed")]
    TypeNotAllowed,
}

/// Lowercased `type/subtype` of a content type, without parameters.
pub fn mime_essence(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|s| s.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Checks the declared content type of a part. Parameters such as
/// `; charset=` are ignored and the comparison is case-insensitive.
pub fn check_mime(content_type: Option<&str>) -> Result<(), AdmissionError> {
    let essence = mime_essence(content_type);
    if ALLOWED_MIME_TYPES.contains(&essence.as_str()) {
        Ok(())
    } else {
        Err(AdmissionError::TypeNotAllowed)
    }
}

pub fn check_size(len: usize) -> Result<(), AdmissionError> {
    if len > MAX_UPLOAD_BYTES {
        Err(AdmissionError::TooLarge)
    } else {
        Ok(())
    }
}
