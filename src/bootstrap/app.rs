use axum::Router;
use axum::extract::{DefaultBodyLimit, MatchedPath};
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::domain::files::admission::MAX_UPLOAD_BYTES;
use crate::presentation::http::{files, health};

/// Room for multipart boundaries and the small text fields next to the file.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::files::upload_file,
        crate::presentation::http::files::list_files,
        crate::presentation::http::files::list_all_files,
        crate::presentation::http::files::delete_file,
        crate::presentation::http::files::serve_upload,
        crate::presentation::http::files::view_file,
        crate::presentation::http::files::download_file,
        crate::presentation::http::health::health,
    ),
    components(schemas(
        crate::domain::files::file_record::UploadedFile,
        crate::domain::files::file_record::FileListItem,
        crate::presentation::http::files::DeletedResponse,
        crate::presentation::http::files::UploadFileMultipart,
        crate::presentation::http::error::ErrorBody,
        crate::presentation::http::health::HealthResp,
    )),
    tags(
        (name = "Files", description = "Upload widget storage endpoints"),
        (name = "Health", description = "System health checks")
    )
)]
pub struct ApiDoc;

fn build_cors(cfg: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::DELETE,
            http::Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]);
    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin).allow_credentials(true),
        // Production requires FRONTEND_URL; an unparsable one denies all origins
        Some(Err(_)) | None if cfg.is_production => base.allow_origin(AllowOrigin::exact(
            HeaderValue::from_static("http://invalid"),
        )),
        _ => base
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true),
    }
}

/// Full HTTP application: upload routes under the configured base path,
/// health, OpenAPI docs, CORS, body limit and request tracing.
pub fn build_app(ctx: AppContext) -> Router {
    let upload_routes = files::routes(ctx.clone());
    let router = if ctx.cfg.base_path.is_empty() {
        upload_routes
    } else {
        Router::new().nest(&ctx.cfg.base_path, upload_routes)
    };

    router
        .merge(health::routes(ctx.clone()))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(build_cors(&ctx.cfg))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        )
}
