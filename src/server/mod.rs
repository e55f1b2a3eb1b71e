use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use crate::storage::Database;

pub mod routes;

/// Page the bundled frontend is served from at `/`
pub const INDEX_PAGE: &str = "index.html";

/// Server state
pub struct AppState {
    pub database: Database,
}

impl AppState {
    pub fn new(database: Database) -> Arc<Self> {
        Arc::new(Self { database })
    }
}

/// Everything `start_server` needs, resolved from flags and config
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
    pub database: Database,
}

/// Gateway routes; unmatched paths are served from `static_dir`
pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/query", post(routes::handle_query))
        .route("/schema", get(routes::handle_schema))
        .route("/reset", post(routes::handle_reset))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let ServerConfig { port, static_dir, database } = config;
    tracing::info!("Serving database {} with static files from {}", database.path().display(), static_dir.display());

    if !static_dir.join(INDEX_PAGE).is_file() {
        tracing::warn!(
            "No {} in {}; / will return 404. Point --static-dir at the bundled static/ directory",
            INDEX_PAGE,
            static_dir.display()
        );
    }

    let app = router(AppState::new(database), &static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreOptions;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn bundled_static_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("static")
    }

    async fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n", path);
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_bundled_frontend_is_served_at_root() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::open(dir.path().join("gateway.db"), StoreOptions::default()).unwrap();
        let app = router(AppState::new(database), &bundled_static_dir());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let index = get(addr, "/").await;
        assert!(index.starts_with("HTTP/1.1 200"), "{index}");
        assert!(index.contains("<title>sqlgate</title>"));

        for asset in ["/app.js", "/style.css"] {
            assert!(get(addr, asset).await.starts_with("HTTP/1.1 200"), "{asset}");
        }
        assert!(get(addr, "/missing.txt").await.starts_with("HTTP/1.1 404"));
    }
}
