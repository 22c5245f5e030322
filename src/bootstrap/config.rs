use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_port: u16,
    pub frontend_url: Option<String>,
    /// Base URL of the PostgREST-style metadata store.
    pub backend_url: String,
    pub backend_token: Option<String>,
    pub uploads_dir: String,
    /// Owning entity type tag written to and filtered on `entidad_nombre`.
    pub entity_name: String,
    /// Mount point of the upload routes, e.g. `/filepond`. Empty mounts at the root.
    pub base_path: String,
    /// Prefix of generic 500 messages; a numeric code is appended.
    pub error_message: String,
    pub is_production: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let frontend_url = env::var("FRONTEND_URL").ok();
        let backend_url_var = env::var("BACKEND_URL").ok().filter(|v| !v.trim().is_empty());
        let backend_token = env::var("BACKEND_TOKEN").ok().filter(|v| !v.is_empty());
        let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "./uploads".into());
        let entity_name = env::var("ENTITY_NAME").unwrap_or_else(|_| "permiso".into());
        let base_path = normalize_base_path(
            &env::var("BASE_PATH").unwrap_or_else(|_| "/filepond".into()),
        );
        let error_message = env::var("ERROR_MESSAGE")
            .unwrap_or_else(|_| "Internal server error, code: ".into());
        let is_production = matches!(
            env::var("RUST_ENV").ok().as_deref(),
            Some("production") | Some("prod")
        );

        if entity_name.is_empty() || entity_name.contains(['/', '\\', '.']) {
            anyhow::bail!("ENTITY_NAME must be a plain identifier");
        }

        if is_production {
            if backend_url_var.is_none() {
                anyhow::bail!("BACKEND_URL must point at the metadata store in production");
            }
            if frontend_url
                .as_deref()
                .map(|u| u.starts_with("http"))
                .unwrap_or(false)
                == false
            {
                anyhow::bail!(
                    "FRONTEND_URL must be set to a full origin in production (e.g., https://app.example.com)"
                );
            }
        }
        let backend_url = backend_url_var.unwrap_or_else(|| "http://localhost:3000".into());

        Ok(Self {
            api_port,
            frontend_url,
            backend_url,
            backend_token,
            uploads_dir,
            entity_name,
            base_path,
            error_message,
            is_production,
        })
    }
}

/// Leading slash, no trailing slash; `/` and blank become empty.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
