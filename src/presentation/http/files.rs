use axum::{
    Json, Router,
    extract::{
        Multipart, Path as AxumPath, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::use_cases::files::FileError;
use crate::application::use_cases::files::delete_file::DeleteFile;
use crate::application::use_cases::files::list_files::ListFiles;
use crate::application::use_cases::files::serve_file::{
    DEFAULT_CONTENT_TYPE, Disposition, ServeFile,
};
use crate::application::use_cases::files::upload_file::{UploadFile, UploadRequest};
use crate::bootstrap::app_context::AppContext;
use crate::domain::files::admission::{self, AdmissionError, MAX_UPLOAD_BYTES};
use crate::domain::files::file_record::{FileListItem, UploadedFile};
use crate::presentation::http::error::ApiError;

/// Multipart field carrying the file bytes, as the upload widget names it.
pub const FILE_FIELD: &str = "filepond";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub deleted: String,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadFileMultipart {
    /// File to upload
    #[schema(value_type = String, format = Binary)]
    filepond: String,
    /// Owning entity type, e.g. `permiso`
    entidad_nombre: Option<String>,
    /// Owning entity id (`permiso_id` is accepted as an alias)
    entidad_id: Option<String>,
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::bad_request(AdmissionError::TooLarge.to_string());
    }
    ApiError::from_file_error(FileError::Unknown(anyhow::Error::new(err)), "", "Upload error")
}

async fn drain(field: &mut Field<'_>) {
    while let Ok(Some(_)) = field.chunk().await {}
}

/// POST /upload (multipart/form-data)
/// Fields:
/// - filepond: binary file (required)
/// - entidad_nombre: owning entity type
/// - entidad_id | permiso_id: owning entity id
#[utoipa::path(
    post,
    path = "/filepond/upload",
    tag = "Files",
    request_body(
        content = UploadFileMultipart,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "File uploaded", body = UploadedFile),
        (status = 400, description = "Missing file, bad type or too large", body = crate::presentation::http::error::ErrorBody),
        (status = 500, description = "Storage or metadata failure", body = crate::presentation::http::error::ErrorBody)
    )
)]
pub async fn upload_file(
    State(ctx): State<AppContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadedFile>, ApiError> {
    let mut multipart = multipart.map_err(|rej| ApiError::bad_request(rej.body_text()))?;

    let mut entity_name: Option<String> = None;
    let mut entity_id: Option<String> = None;
    let mut permiso_id: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut rejection: Option<AdmissionError> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some(FILE_FIELD) if file.is_none() && rejection.is_none() => {
                let filename = field.file_name().unwrap_or("file").to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                // Type is decided from the part header, before any byte is read.
                if let Err(e) = admission::check_mime(content_type.as_deref()) {
                    rejection = Some(e);
                    drain(&mut field).await;
                    continue;
                }
                let mut buf: Vec<u8> = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    if rejection.is_some() {
                        continue;
                    }
                    if buf.len() + chunk.len() > MAX_UPLOAD_BYTES {
                        rejection = Some(AdmissionError::TooLarge);
                        buf = Vec::new();
                        continue;
                    }
                    buf.extend_from_slice(&chunk);
                }
                if rejection.is_none() {
                    file = Some((filename, content_type.unwrap_or_default(), buf));
                }
            }
            Some("entidad_nombre") => {
                entity_name = non_empty(field.text().await.map_err(multipart_error)?);
            }
            Some("entidad_id") => {
                entity_id = non_empty(field.text().await.map_err(multipart_error)?);
            }
            Some("permiso_id") => {
                permiso_id = non_empty(field.text().await.map_err(multipart_error)?);
            }
            _ => drain(&mut field).await,
        }
    }

    if let Some(reason) = rejection {
        tracing::debug!(%reason, "upload_rejected");
        return Err(ApiError::bad_request(reason.to_string()));
    }
    let (original_filename, mime_type, bytes) =
        file.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    let repo = ctx.files_repo();
    let storage = ctx.storage_port();
    let uc = UploadFile {
        repo: repo.as_ref(),
        storage: storage.as_ref(),
    };
    let out = uc
        .execute(UploadRequest {
            entity_name,
            entity_id: entity_id.or(permiso_id),
            original_filename,
            mime_type,
            bytes,
        })
        .await
        .map_err(|e| ApiError::from_file_error(e, &ctx.cfg.error_message, "Upload failed"))?;
    Ok(Json(out))
}

async fn list_for(
    ctx: &AppContext,
    entity_id: Option<&str>,
) -> Result<Json<Vec<FileListItem>>, ApiError> {
    let repo = ctx.files_repo();
    let uc = ListFiles {
        repo: repo.as_ref(),
        entity_name: &ctx.cfg.entity_name,
    };
    let items = uc
        .execute(entity_id)
        .await
        .map_err(|e| ApiError::from_file_error(e, &ctx.cfg.error_message, "Failed to load files"))?;
    Ok(Json(items))
}

/// GET /files/{permisoId}
#[utoipa::path(
    get,
    path = "/filepond/files/{permisoId}",
    tag = "Files",
    params(("permisoId" = String, Path, description = "Owning entity id")),
    responses(
        (status = 200, description = "Files of the entity", body = [FileListItem]),
        (status = 500, description = "Metadata store failure", body = crate::presentation::http::error::ErrorBody)
    )
)]
pub async fn list_files(
    State(ctx): State<AppContext>,
    AxumPath(permiso_id): AxumPath<String>,
) -> Result<Json<Vec<FileListItem>>, ApiError> {
    list_for(&ctx, Some(&permiso_id)).await
}

/// GET /files -> every file of the configured entity type
#[utoipa::path(
    get,
    path = "/filepond/files",
    tag = "Files",
    responses(
        (status = 200, description = "Files of the entity type", body = [FileListItem]),
        (status = 500, description = "Metadata store failure", body = crate::presentation::http::error::ErrorBody)
    )
)]
pub async fn list_all_files(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<FileListItem>>, ApiError> {
    list_for(&ctx, None).await
}

/// DELETE /upload/{fileId}
#[utoipa::path(
    delete,
    path = "/filepond/upload/{fileId}",
    tag = "Files",
    params(("fileId" = String, Path, description = "Storage name")),
    responses(
        (status = 200, description = "Deleted", body = DeletedResponse),
        (status = 404, description = "Unknown storage name", body = crate::presentation::http::error::ErrorBody),
        (status = 500, description = "Metadata store failure", body = crate::presentation::http::error::ErrorBody)
    )
)]
pub async fn delete_file(
    State(ctx): State<AppContext>,
    AxumPath(file_id): AxumPath<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let repo = ctx.files_repo();
    let storage = ctx.storage_port();
    let uc = DeleteFile {
        repo: repo.as_ref(),
        storage: storage.as_ref(),
    };
    let out = uc
        .execute(&file_id)
        .await
        .map_err(|e| ApiError::from_file_error(e, &ctx.cfg.error_message, "Delete failed"))?;
    Ok(Json(DeletedResponse {
        deleted: out.stored_name,
    }))
}

/// `<kind>; filename="<ascii>"; filename*=UTF-8''<percent-encoded>`
pub fn content_disposition(disposition: Disposition, filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition.as_str(),
        ascii,
        urlencoding::encode(filename)
    )
}

async fn send_file(
    ctx: &AppContext,
    filename: &str,
    disposition: Disposition,
    fallback: &str,
) -> Result<Response, ApiError> {
    let repo = ctx.files_repo();
    let storage = ctx.storage_port();
    let uc = ServeFile {
        repo: repo.as_ref(),
        storage: storage.as_ref(),
    };
    let served = uc
        .execute(filename, disposition)
        .await
        .map_err(|e| ApiError::from_file_error(e, &ctx.cfg.error_message, fallback))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&served.content_type)
            .unwrap_or(HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    if let Ok(v) = HeaderValue::from_str(&content_disposition(served.disposition, &served.filename))
    {
        headers.insert(header::CONTENT_DISPOSITION, v);
    }
    headers.insert(
        header::HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    Ok((headers, served.bytes).into_response())
}

/// GET /uploads/{filename} -> bytes, inline
#[utoipa::path(
    get,
    path = "/filepond/uploads/{filename}",
    tag = "Files",
    params(("filename" = String, Path, description = "Storage name")),
    responses(
        (status = 200, description = "OK", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "No such file", body = crate::presentation::http::error::ErrorBody)
    )
)]
pub async fn serve_upload(
    State(ctx): State<AppContext>,
    AxumPath(filename): AxumPath<String>,
) -> Result<Response, ApiError> {
    send_file(&ctx, &filename, Disposition::Inline, "Error serving file").await
}

/// GET /view/{filename} -> bytes, inline (browser preview)
#[utoipa::path(
    get,
    path = "/filepond/view/{filename}",
    tag = "Files",
    params(("filename" = String, Path, description = "Storage name")),
    responses(
        (status = 200, description = "OK", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "No such file", body = crate::presentation::http::error::ErrorBody)
    )
)]
pub async fn view_file(
    State(ctx): State<AppContext>,
    AxumPath(filename): AxumPath<String>,
) -> Result<Response, ApiError> {
    send_file(&ctx, &filename, Disposition::Inline, "Error viewing file").await
}

/// GET /download/{filename} -> bytes, attachment under the original name
#[utoipa::path(
    get,
    path = "/filepond/download/{filename}",
    tag = "Files",
    params(("filename" = String, Path, description = "Storage name")),
    responses(
        (status = 200, description = "OK", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "No such file", body = crate::presentation::http::error::ErrorBody)
    )
)]
pub async fn download_file(
    State(ctx): State<AppContext>,
    AxumPath(filename): AxumPath<String>,
) -> Result<Response, ApiError> {
    send_file(&ctx, &filename, Disposition::Attachment, "Error downloading file").await
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/upload", post(upload_file))
        .route("/upload/:file_id", delete(delete_file))
        .route("/files", get(list_all_files))
        .route("/files/:permiso_id", get(list_files))
        .route("/uploads/:filename", get(serve_upload))
        .route("/view/:filename", get(view_file))
        .route("/download/:filename", get(download_file))
        .with_state(ctx)
}
