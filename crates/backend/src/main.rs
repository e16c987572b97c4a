mod assets;
mod graphql;
mod render;
mod settings;
mod storage;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::Path as UrlPath;
use axum::http::{HeaderValue, StatusCode};
use axum::{extract::State, response::Html, routing::get, Router};
use mapblock_shared::models::MapboxDefaults;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

use graphql::Schema;
use settings::Settings;
use storage::Storage;

#[derive(Clone)]
struct AppState {
    schema: Schema,
    storage: Arc<Storage>,
    defaults: Arc<MapboxDefaults>,
    dist_dir: PathBuf,
}

async fn graphql_handler(State(state): State<AppState>, req: GraphQLRequest) -> GraphQLResponse {
    state.schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// Build a cache-controlled static file router.
///
/// Separated so tests can exercise the caching layer with arbitrary directories.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Build the full application router.
fn build_app(state: AppState, assets_dir: &Path) -> Router {
    let dist_dir = state.dist_dir.clone();
    // Static file routers are stateless, merge them before adding app state
    let static_files = Router::new()
        .nest("/static", cached_static_router(assets_dir, CACHE_1DAY))
        .nest("/dist", cached_static_router(&dist_dir, CACHE_IMMUTABLE))
        .nest(
            "/assets",
            cached_static_router(&dist_dir.join("assets"), CACHE_IMMUTABLE),
        );

    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/", get(serve_index))
        .route("/edit/{id}", get(serve_index))
        .route("/block/{id}", get(serve_block))
        .with_state(state)
        .merge(static_files)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env();

    let loaded_assets = Arc::new(assets::Assets::load(&settings.assets_dir).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Falling back to the built-in icon library");
        assets::Assets::builtin()
    }));

    let storage = match Storage::open(&settings.db_path) {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!(path = %settings.db_path.display(), error = %e, "Failed to open database");
            std::process::exit(1);
        }
    };

    let defaults = Arc::new(settings.defaults.clone());
    let schema = graphql::build_schema(loaded_assets, storage.clone(), defaults.clone());
    let state = AppState {
        schema,
        storage,
        defaults,
        dist_dir: settings.dist_dir.clone(),
    };
    let app = build_app(state, &settings.assets_dir);

    let addr = format!("0.0.0.0:{}", settings.port);
    tracing::info!("Server running at http://localhost:{}", settings.port);
    tracing::info!("GraphiQL playground at http://localhost:{}/graphql", settings.port);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server stopped");
    }
}

fn read_index(dist_dir: &Path) -> Option<String> {
    std::fs::read_to_string(dist_dir.join("index.html")).ok()
}

async fn serve_index(State(state): State<AppState>) -> Html<String> {
    // Try to serve the built frontend, fall back to a simple message
    match read_index(&state.dist_dir) {
        Some(html) => Html(html),
        None => Html(
            r#"<!DOCTYPE html>
<html>
<head><title>Map Block</title></head>
<body>
<h1>Map Block</h1>
<p>Frontend not built yet. Visit <a href="/graphql">GraphiQL</a> to explore the API.</p>
</body>
</html>"#
                .to_string(),
        ),
    }
}

/// The public rendering of one stored block.
async fn serve_block(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Html<String>, (StatusCode, String)> {
    let block = state
        .storage
        .get_block(&id)
        .map_err(|e| {
            tracing::error!(%id, error = %e, "Failed to load block");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load block".to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "Block not found".to_string()))?;
    let index = read_index(&state.dist_dir);
    Ok(Html(render::render_block_page(
        index.as_deref(),
        &block,
        &state.defaults,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    /// Build a test app that serves files from the given temp directories.
    fn test_app(assets_dir: &Path, dist_dir: &Path, dist_assets_dir: &Path) -> Router {
        Router::new()
            .nest("/static", cached_static_router(assets_dir, CACHE_1DAY))
            .nest("/dist", cached_static_router(dist_dir, CACHE_IMMUTABLE))
            .nest(
                "/assets",
                cached_static_router(dist_assets_dir, CACHE_IMMUTABLE),
            )
    }

    /// Create a temp dir with a test file and return the dir path.
    fn temp_dir_with_file(file_name: &str, content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(file_name), content).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_static_assets_have_1day_cache() {
        let assets_dir = temp_dir_with_file("icons.json", "[]");
        let dist_dir = temp_dir_with_file("index.html", "<html></html>");
        let dist_assets_dir = temp_dir_with_file("app.js", "console.log()");

        let app = test_app(assets_dir.path(), dist_dir.path(), dist_assets_dir.path());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/static/icons.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=86400, must-revalidate"
        );
    }

    #[tokio::test]
    async fn test_dist_bundles_have_immutable_cache() {
        let assets_dir = temp_dir_with_file("icons.json", "[]");
        let dist_dir = temp_dir_with_file("app-abc123.js", "bundle()");
        let dist_assets_dir = temp_dir_with_file("style.css", "body{}");

        let app = test_app(assets_dir.path(), dist_dir.path(), dist_assets_dir.path());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/dist/app-abc123.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=31536000, immutable"
        );
    }

    #[tokio::test]
    async fn test_dist_assets_have_immutable_cache() {
        let assets_dir = temp_dir_with_file("icons.json", "[]");
        let dist_dir = temp_dir_with_file("index.html", "<html></html>");
        let dist_assets_dir = temp_dir_with_file("style-xyz.css", "body{}");

        let app = test_app(assets_dir.path(), dist_dir.path(), dist_assets_dir.path());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/assets/style-xyz.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=31536000, immutable"
        );
    }

    #[tokio::test]
    async fn test_missing_static_file_returns_404() {
        let assets_dir = temp_dir_with_file("icons.json", "[]");
        let dist_dir = temp_dir_with_file("index.html", "<html></html>");
        let dist_assets_dir = temp_dir_with_file("app.js", "");

        let app = test_app(assets_dir.path(), dist_dir.path(), dist_assets_dir.path());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/static/nonexistent.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_and_dist_have_different_cache_policies() {
        let assets_dir = temp_dir_with_file("data.json", "{}");
        let dist_dir = temp_dir_with_file("bundle.js", "x");
        let dist_assets_dir = temp_dir_with_file("a.css", "");

        let app = test_app(assets_dir.path(), dist_dir.path(), dist_assets_dir.path());

        let static_resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/static/data.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let dist_resp = app
            .oneshot(
                Request::builder()
                    .uri("/dist/bundle.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let static_cc = static_resp
            .headers()
            .get("cache-control")
            .unwrap()
            .to_str()
            .unwrap();
        let dist_cc = dist_resp
            .headers()
            .get("cache-control")
            .unwrap()
            .to_str()
            .unwrap();

        assert_ne!(static_cc, dist_cc);
        assert!(static_cc.contains("max-age=86400"));
        assert!(dist_cc.contains("max-age=31536000"));
    }

    fn block_app(dir: &Path) -> (Router, Arc<Storage>) {
        let storage = Storage::open(&dir.join("blocks.redb")).unwrap();
        let defaults = Arc::new(MapboxDefaults::default());
        let schema = graphql::build_schema(
            Arc::new(assets::Assets::builtin()),
            storage.clone(),
            defaults.clone(),
        );
        let state = AppState {
            schema,
            storage: storage.clone(),
            defaults,
            dist_dir: dir.join("dist"),
        };
        (build_app(state, dir), storage)
    }

    #[tokio::test]
    async fn test_block_page_renders_stored_block() {
        let dir = tempfile::tempdir().unwrap();
        let (app, storage) = block_app(dir.path());
        let block = mapblock_shared::models::BlockRecord {
            id: uuid::Uuid::new_v4(),
            name: "Shops".to_string(),
            attributes: mapblock_shared::config::BlockAttributes::default(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        storage.save_block(&block).unwrap();

        let resp = app
            .oneshot(
                Request::builder()
                    .uri(format!("/block/{}", block.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("data-mapbox-options"));
        assert!(html.contains("<title>Shops</title>"));
    }

    #[tokio::test]
    async fn test_unknown_block_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _storage) = block_app(dir.path());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/block/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
