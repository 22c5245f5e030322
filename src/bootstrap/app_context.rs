use std::path::Path;
use std::sync::Arc;

use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::storage_port::StoragePort;
use crate::bootstrap::config::Config;
use crate::infrastructure::metadata::{PostgrestClient, PostgrestFilesRepository};
use crate::infrastructure::storage::FsStoragePort;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    files_repo: Arc<dyn FilesRepository>,
    storage_port: Arc<dyn StoragePort>,
}

impl AppServices {
    pub fn new(files_repo: Arc<dyn FilesRepository>, storage_port: Arc<dyn StoragePort>) -> Self {
        Self {
            files_repo,
            storage_port,
        }
    }

    /// PostgREST metadata store plus local disk, as configured.
    pub async fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let client = PostgrestClient::new(&cfg.backend_url, cfg.backend_token.clone());
        let files_repo = Arc::new(PostgrestFilesRepository::new(client));

        let storage = FsStoragePort::new(Path::new(&cfg.uploads_dir), &cfg.entity_name);
        if let Err(e) = storage.ensure_root().await {
            tracing::warn!(error = ?e, dir = %storage.uploads_root.display(), "Failed to create uploads dir");
        }

        Ok(Self::new(files_repo, Arc::new(storage)))
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn files_repo(&self) -> Arc<dyn FilesRepository> {
        self.services.files_repo.clone()
    }

    pub fn storage_port(&self) -> Arc<dyn StoragePort> {
        self.services.storage_port.clone()
    }
}
