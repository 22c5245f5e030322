use reqwest::multipart::{Form, Part};

use crate::domain::files::file_record::{FileListItem, UploadedFile};

use super::options::{FileRejection, WidgetOptions};

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("unexpected response body from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid file type {0}")]
    InvalidFileType(String),
    #[error("{0}")]
    Rejected(#[from] FileRejection),
}

/// File picked by the user, not yet sent.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// File restored from the server for display in the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Network callbacks the upload widget invokes, shaped to the gateway routes.
#[derive(Clone)]
pub struct WidgetServerClient {
    http: reqwest::Client,
    base_url: String,
    entity_name: String,
    options: WidgetOptions,
}

impl WidgetServerClient {
    /// `base_url` is the gateway origin plus its mount point, e.g. `http://host/filepond`.
    pub fn new(base_url: &str, entity_name: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            entity_name: entity_name.to_string(),
            options: WidgetOptions::default(),
        }
    }

    pub fn with_options(mut self, options: WidgetOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    fn url(&self, route: &str, name: &str) -> String {
        format!("{}/{}/{}", self.base_url, route, urlencoding::encode(name))
    }

    async fn send(
        &self,
        url: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, AdapterError> {
        let resp = req.send().await.map_err(|source| AdapterError::Transport {
            url: url.to_string(),
            source,
        })?;
        if !resp.status().is_success() {
            return Err(AdapterError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }
        Ok(resp)
    }

    /// Uploads one file for `entity_id` and returns the server id the widget
    /// keeps for later revert/load calls. The server id is the storage name,
    /// not the metadata record id.
    ///
    /// Files failing the widget options are rejected without a request.
    pub async fn process(&self, file: &PendingFile, entity_id: &str) -> Result<String, AdapterError> {
        self.options.check(file)?;
        let url = format!("{}/upload", self.base_url);
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|_| AdapterError::InvalidFileType(file.mime_type.clone()))?;
        let form = Form::new()
            .text("entidad_nombre", self.entity_name.clone())
            .text("entidad_id", entity_id.to_string())
            .part("filepond", part);

        let resp = self.send(&url, self.http.post(&url).multipart(form)).await?;
        let uploaded: UploadedFile = resp
            .json()
            .await
            .map_err(|source| AdapterError::Decode { url, source })?;
        tracing::debug!(server_id = %uploaded.server_id, "widget_file_processed");
        Ok(uploaded.server_id)
    }

    /// Undo of a just-processed file. Not retried.
    pub async fn revert(&self, server_id: &str) -> Result<(), AdapterError> {
        self.delete(server_id).await
    }

    /// Removal of a file that was loaded from the server. Not retried.
    pub async fn remove(&self, server_id: &str) -> Result<(), AdapterError> {
        self.delete(server_id).await
    }

    async fn delete(&self, server_id: &str) -> Result<(), AdapterError> {
        let url = self.url("upload", server_id);
        self.send(&url, self.http.delete(&url)).await?;
        Ok(())
    }

    /// Restores a stored file; the content type falls back to a guess from
    /// the name when the server sends none.
    pub async fn load(&self, server_id: &str) -> Result<LoadedFile, AdapterError> {
        let url = self.url("uploads", server_id);
        let resp = self.send(&url, self.http.get(&url)).await?;
        let mime_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| {
                mime_guess::from_path(server_id)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });
        let bytes = resp
            .bytes()
            .await
            .map_err(|source| AdapterError::Decode { url, source })?;
        Ok(LoadedFile {
            name: server_id.to_string(),
            mime_type,
            bytes: bytes.to_vec(),
        })
    }

    /// Files already attached to `entity_id`, to seed the widget when a modal opens.
    pub async fn load_existing(&self, entity_id: &str) -> Result<Vec<FileListItem>, AdapterError> {
        let url = self.url("files", entity_id);
        let resp = self.send(&url, self.http.get(&url)).await?;
        resp.json()
            .await
            .map_err(|source| AdapterError::Decode { url, source })
    }

    pub fn view_url(&self, name: &str) -> String {
        self.url("view", name)
    }
}
