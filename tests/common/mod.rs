#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Map, Value, json};
use tempfile::TempDir;

use upload_gateway::bootstrap::app::build_app;
use upload_gateway::bootstrap::app_context::{AppContext, AppServices};
use upload_gateway::bootstrap::config::Config;

/// In-process stand-in for the PostgREST `archivo` relation.
#[derive(Clone, Default)]
pub struct FakeStore {
    inner: Arc<FakeStoreInner>,
}

#[derive(Default)]
pub struct FakeStoreInner {
    rows: Mutex<Vec<Map<String, Value>>>,
    next_id: AtomicUsize,
    pub fail_all: AtomicBool,
    pub fail_inserts: AtomicBool,
    pub selects: AtomicUsize,
}

impl FakeStore {
    pub fn rows(&self) -> Vec<Map<String, Value>> {
        self.inner.rows.lock().unwrap().clone()
    }

    pub fn set_failing(&self, on: bool) {
        self.inner.fail_all.store(on, Ordering::SeqCst);
    }

    pub fn set_failing_inserts(&self, on: bool) {
        self.inner.fail_inserts.store(on, Ordering::SeqCst);
    }

    pub fn selects(&self) -> usize {
        self.inner.selects.load(Ordering::SeqCst)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(
                "/archivo",
                get(select_rows).post(insert_row).delete(delete_rows),
            )
            .with_state(self.clone())
    }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "null".into(),
        other => other.to_string(),
    }
}

fn matches_filters(row: &Map<String, Value>, params: &[(String, String)]) -> bool {
    params
        .iter()
        .filter(|(k, _)| !matches!(k.as_str(), "select" | "limit" | "order"))
        .all(|(k, v)| {
            let expected = v.strip_prefix("eq.").unwrap_or(v);
            row.get(k).map(cell_text).as_deref() == Some(expected)
        })
}

fn unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"message": "store unavailable"})),
    )
        .into_response()
}

async fn select_rows(
    State(store): State<FakeStore>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    store.inner.selects.fetch_add(1, Ordering::SeqCst);
    if store.inner.fail_all.load(Ordering::SeqCst) {
        return unavailable();
    }
    let columns: Option<Vec<String>> = params
        .iter()
        .find(|(k, _)| k == "select")
        .map(|(_, v)| v.split(',').map(|s| s.to_string()).collect());
    let limit = params
        .iter()
        .find(|(k, _)| k == "limit")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    let rows = store.inner.rows.lock().unwrap();
    let out: Vec<Value> = rows
        .iter()
        .filter(|row| matches_filters(row, &params))
        .take(limit)
        .map(|row| match &columns {
            Some(cols) => Value::Object(
                cols.iter()
                    .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                    .collect(),
            ),
            None => Value::Object(row.clone()),
        })
        .collect();
    Json(out).into_response()
}

async fn insert_row(
    State(store): State<FakeStore>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    if store.inner.fail_all.load(Ordering::SeqCst) {
        return unavailable();
    }
    if store.inner.fail_inserts.load(Ordering::SeqCst) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "duplicate key"})),
        )
            .into_response();
    }
    let id = store.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let mut row = body;
    row.insert("id".into(), json!(id));
    store.inner.rows.lock().unwrap().push(row.clone());

    let wants_row = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("return=representation"))
        .unwrap_or(false);
    if wants_row {
        (StatusCode::CREATED, Json(vec![Value::Object(row)])).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

async fn delete_rows(
    State(store): State<FakeStore>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    if store.inner.fail_all.load(Ordering::SeqCst) {
        return unavailable();
    }
    store
        .inner
        .rows
        .lock()
        .unwrap()
        .retain(|row| !matches_filters(row, &params));
    StatusCode::NO_CONTENT.into_response()
}

pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

pub struct TestGateway {
    pub addr: SocketAddr,
    /// Origin plus mount point, e.g. `http://127.0.0.1:1234/filepond`.
    pub base: String,
    pub store: FakeStore,
    pub blobs_dir: PathBuf,
    _uploads: TempDir,
}

impl TestGateway {
    pub async fn start() -> Self {
        let store = FakeStore::default();
        let store_addr = spawn(store.router()).await;
        let uploads = TempDir::new().unwrap();

        let cfg = Config {
            api_port: 0,
            frontend_url: None,
            backend_url: format!("http://{store_addr}"),
            backend_token: None,
            uploads_dir: uploads.path().to_string_lossy().to_string(),
            entity_name: "permiso".into(),
            base_path: "/filepond".into(),
            error_message: "Server error ".into(),
            is_production: false,
        };
        let services = AppServices::from_config(&cfg).await.unwrap();
        let app = build_app(AppContext::new(cfg, services));
        let addr = spawn(app).await;

        Self {
            addr,
            base: format!("http://{addr}/filepond"),
            store,
            blobs_dir: uploads.path().join("permiso"),
            _uploads: uploads,
        }
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.base, route)
    }

    pub fn blob_count(&self) -> usize {
        std::fs::read_dir(&self.blobs_dir)
            .map(|d| d.count())
            .unwrap_or(0)
    }

    pub async fn upload(
        &self,
        client: &reqwest::Client,
        filename: &str,
        mime: &str,
        bytes: Vec<u8>,
        entity_id: Option<&str>,
    ) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)
            .unwrap();
        let mut form = reqwest::multipart::Form::new().text("entidad_nombre", "permiso");
        if let Some(id) = entity_id {
            form = form.text("entidad_id", id.to_string());
        }
        let form = form.part("filepond", part);
        client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }
}
