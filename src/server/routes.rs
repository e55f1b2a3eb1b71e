use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use crate::server::AppState;
use crate::storage::Database;
use crate::query::{QueryEngine, QueryResult};
use crate::introspect::{Schema, SchemaInspector};
use crate::Error;
use std::sync::Arc;

pub const RESET_SUCCESS_MESSAGE: &str = "Database reset successfully";

#[derive(Deserialize)]
pub struct QueryRequest {
    pub sql: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: String) -> ApiError {
    if status.is_server_error() {
        tracing::error!("{}", message);
    }
    (status, Json(ErrorResponse { error: message }))
}

fn status_for(err: &Error) -> StatusCode {
    if err.is_retryable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Run store work on the blocking pool, where the handle guard may be taken
async fn run_blocking<T, F>(state: Arc<AppState>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Database) -> crate::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state.database))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Worker task failed: {}", e)))?
        .map_err(|e| api_error(status_for(&e), e.to_string()))
}

pub async fn handle_query(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<QueryResult>, ApiError> {
    let request: QueryRequest = serde_json::from_slice(&body)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Bad request: invalid JSON: {}", e)))?;

    let result = run_blocking(state, move |db| {
        db.with_store(|store| QueryEngine::new(store).execute(&request.sql))
    })
    .await?;

    Ok(Json(result))
}

pub async fn handle_schema(State(state): State<Arc<AppState>>) -> Result<Json<Schema>, ApiError> {
    let schema = run_blocking(state, |db| {
        db.with_store(|store| SchemaInspector::new(store).schema())
    })
    .await?;

    Ok(Json(schema))
}

pub async fn handle_reset(State(state): State<Arc<AppState>>) -> Result<Json<MessageResponse>, ApiError> {
    run_blocking(state, |db| db.reset()).await?;

    Ok(Json(MessageResponse { message: RESET_SUCCESS_MESSAGE.to_string() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreOptions;
    use axum::response::{IntoResponse, Response};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn test_state() -> (TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::open(dir.path().join("gateway.db"), StoreOptions::default()).unwrap();
        (dir, AppState::new(database))
    }

    async fn read(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn query(state: &Arc<AppState>, sql: &str) -> (StatusCode, Value) {
        let body = Bytes::from(json!({ "sql": sql }).to_string());
        read(handle_query(State(state.clone()), body).await.into_response()).await
    }

    #[tokio::test]
    async fn test_query_read_and_write() {
        let (_dir, state) = test_state();

        let (status, body) = query(&state, "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT)").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Query executed successfully", "rowsAffected": 0}));

        let (_, body) = query(&state, "INSERT INTO notes (body) VALUES ('a'), (NULL)").await;
        assert_eq!(body["rowsAffected"], 2);

        let (status, body) = query(&state, "select id, body from notes order by id").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"id": 1, "body": "a"}, {"id": 2, "body": null}]));
    }

    #[tokio::test]
    async fn test_query_runs_whole_script() {
        let (_dir, state) = test_state();

        let script = "CREATE TABLE a (id INTEGER PRIMARY KEY);\n\
                      CREATE TABLE b (id INTEGER PRIMARY KEY, a_id INTEGER REFERENCES a(id));\n\
                      INSERT INTO a VALUES (1);\n";
        let (status, body) = query(&state, script).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Query executed successfully", "rowsAffected": 1}));

        let (_, body) = read(handle_schema(State(state.clone())).await.into_response()).await;
        assert_eq!(body["tables"][1]["name"], "b");
        assert_eq!(body["tables"][1]["columns"][1]["references"], "a.id");

        let (status, body) = query(&state, "   ;  ").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rowsAffected"], 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (_dir, state) = test_state();

        let bodies: [&'static [u8]; 4] = [b"{not json", b"", br#"{"query": "SELECT 1"}"#, br#"{"sql": 5}"#];
        for raw in bodies {
            let response = handle_query(State(state.clone()), Bytes::from_static(raw)).await.into_response();
            let (status, body) = read(response).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(!body["error"].as_str().unwrap().is_empty());
        }

        let (_, body) = query(&state, "SELECT COUNT(*) AS n FROM sqlite_master").await;
        assert_eq!(body, json!([{"n": 0}]));
    }

    #[tokio::test]
    async fn test_engine_failure_is_server_error() {
        let (_dir, state) = test_state();

        let (status, body) = query(&state, "SELECT * FROM nowhere").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("no such table: nowhere"));
    }

    #[tokio::test]
    async fn test_schema_and_reset() {
        let (_dir, state) = test_state();
        query(&state, "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)").await;
        query(&state, "CREATE TABLE posts (id INTEGER PRIMARY KEY, user_id INTEGER REFERENCES users(id))").await;

        let (status, body) = read(handle_schema(State(state.clone())).await.into_response()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tables"][0]["name"], "users");
        assert_eq!(body["tables"][0]["columns"][0]["pk"], true);
        assert_eq!(body["tables"][1]["columns"][1]["references"], "users.id");
        assert!(body["tables"][1]["columns"][0].get("references").is_none());

        for _ in 0..2 {
            let (status, body) = read(handle_reset(State(state.clone())).await.into_response()).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({"message": "Database reset successfully"}));

            let (_, body) = read(handle_schema(State(state.clone())).await.into_response()).await;
            assert_eq!(body, json!({"tables": []}));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_during_reset_never_see_a_closed_handle() {
        let (_dir, state) = test_state();
        query(&state, "CREATE TABLE t (v INTEGER)").await;
        query(&state, "INSERT INTO t VALUES (1)").await;

        let mut tasks = Vec::new();
        for i in 0..16 {
            let state = state.clone();
            tasks.push(tokio::spawn(async move {
                if i == 8 {
                    read(handle_reset(State(state)).await.into_response()).await
                } else {
                    query(&state, "SELECT v FROM t").await
                }
            }));
        }

        for task in tasks {
            let (status, body) = task.await.unwrap();
            match status {
                StatusCode::OK => assert!(body.is_array() || body["message"].is_string()),
                StatusCode::INTERNAL_SERVER_ERROR => {
                    assert!(body["error"].as_str().unwrap().contains("no such table"))
                }
                other => panic!("unexpected status {other}"),
            }
        }
    }
}
