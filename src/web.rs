// 🌐 Web Surface - static pages plus a JSON API
// Handlers lock the shared connection for the duration of one request

use crate::catalog::{insert_entry, list_entries, EntryForm};
use crate::error::{FieldError, PokedleError};
use crate::evaluate::GuessResult;
use crate::game::play_guess;
use crate::outcomes::{
    list_recent_outcomes, outcome_summary, GuessOutcome, OutcomeSummary, STATS_PAGE_SIZE,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::internal("database lock poisoned"))
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    fields: Vec<FieldError>,
}

impl ApiError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            fields: Vec::new(),
        }
    }
}

// Malformed bodies and query strings get the same JSON error shape as everything else
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
            fields: Vec::new(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
            fields: Vec::new(),
        }
    }
}

impl From<PokedleError> for ApiError {
    fn from(err: PokedleError) -> Self {
        match err {
            PokedleError::NotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                message: format!("{}. You can add it to the catalog.", err),
                fields: Vec::new(),
            },
            PokedleError::DuplicateName(_) => Self {
                status: StatusCode::CONFLICT,
                message: err.to_string(),
                fields: Vec::new(),
            },
            PokedleError::InvalidField(fields) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: fields
                    .iter()
                    .map(|f| f.message.clone())
                    .collect::<Vec<_>>()
                    .join(" "),
                fields,
            },
            // Storage details stay in the log, the player gets a generic message
            PokedleError::EmptyCatalog => {
                tracing::error!("daily pick failed: catalog is empty");
                Self::internal("Could not pick today's secret")
            }
            PokedleError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                Self::internal("Server error")
            }
            PokedleError::Catalog(e) => {
                tracing::error!(error = %e, "catalog failure");
                Self::internal("Server error")
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            fields: self.fields,
        };
        (self.status, Json(body)).into_response()
    }
}

// ============================================================================
// API types
// ============================================================================

#[derive(Deserialize)]
pub struct GuessRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize)]
pub struct StatsQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub summary: OutcomeSummary,
    pub recent: Vec<GuessOutcome>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "version": crate::VERSION }))
}

/// POST /api/guess - Evaluate a guess against today's secret
async fn submit_guess(
    State(state): State<AppState>,
    request: Result<Json<GuessRequest>, JsonRejection>,
) -> Result<Json<GuessResult>, ApiError> {
    let Json(request) = request?;
    let conn = state.conn()?;
    let now = Utc::now();
    let result = play_guess(&conn, &request.name, now.date_naive(), now)?;
    Ok(Json(result))
}

/// GET /api/entries - Catalog names for autocomplete
async fn get_entry_names(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let conn = state.conn()?;
    let names = list_entries(&conn)?.into_iter().map(|e| e.name).collect();
    Ok(Json(names))
}

/// POST /api/entries - Admin add
async fn add_entry(
    State(state): State<AppState>,
    form: Result<Json<EntryForm>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(form) = form?;
    let entry = form.validate()?;
    let conn = state.conn()?;
    let stored = insert_entry(&conn, &entry)?;
    tracing::info!(id = stored.id, name = %stored.name, "entry added to catalog");
    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

/// GET /api/stats - Summary plus the most recent guesses
async fn get_stats(
    State(state): State<AppState>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<StatsResponse>, ApiError> {
    let Query(query) = query?;
    let conn = state.conn()?;
    let limit = query.limit.unwrap_or(STATS_PAGE_SIZE);
    Ok(Json(StatsResponse {
        summary: outcome_summary(&conn)?,
        recent: list_recent_outcomes(&conn, limit)?,
    }))
}

/// GET / - Guess page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

/// GET /add - Admin add page
async fn serve_add() -> impl IntoResponse {
    Html(include_str!("../web/add.html"))
}

/// GET /stats - Stats page
async fn serve_stats() -> impl IntoResponse {
    Html(include_str!("../web/stats.html"))
}

// ============================================================================
// Router
// ============================================================================

pub fn build_router(state: AppState, web_dir: &Path) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/guess", post(submit_guess))
        .route("/entries", get(get_entry_names).post(add_entry))
        .route("/stats", get(get_stats))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .route("/add", get(serve_add))
        .route("/stats", get(serve_stats))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new(web_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NewEntry;
    use crate::db::setup_database;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        insert_entry(
            &conn,
            &NewEntry {
                name: "Bulbasaur".to_string(),
                type1: "Grass".to_string(),
                type2: Some("Poison".to_string()),
                evolution_stage: 1,
                total_evolutions: 3,
                color: "Green".to_string(),
            },
        )
        .unwrap();
        build_router(AppState::new(conn), Path::new("web"))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_guess_known_name() {
        let app = test_app();

        let response = app
            .oneshot(post_json("/api/guess", serde_json::json!({ "name": "bulbasaur" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: GuessResult = serde_json::from_value(json_body(response).await).unwrap();
        assert!(body.matched);
        assert_eq!(body.rows.len(), 5);
        assert!(body.rows.iter().all(|r| r.ok));
        assert_eq!(body.rows[0].secret, "Grass");
    }

    #[tokio::test]
    async fn test_guess_page_shows_secret_column() {
        let app = test_app();

        let response = app.oneshot(get_request("/")).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(page.contains("cell(row.secret)"));
        assert!(page.contains("body.secret_name]"));
    }

    #[tokio::test]
    async fn test_guess_unknown_name_is_404() {
        let app = test_app();

        let response = app
            .oneshot(post_json("/api/guess", serde_json::json!({ "name": "Missingno" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("Missingno"));
    }

    #[tokio::test]
    async fn test_add_then_duplicate() {
        let app = test_app();
        let form = serde_json::json!({
            "name": "Charmander",
            "type1": "Fire",
            "type2": "",
            "evolution_stage": "1",
            "total_evolutions": "3",
            "color": "Red"
        });

        let created = app.clone().oneshot(post_json("/api/entries", form.clone())).await.unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let body = json_body(created).await;
        assert_eq!(body["name"], "Charmander");
        assert!(body["type2"].is_null());

        let duplicate = app.oneshot(post_json("/api/entries", form)).await.unwrap();
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_add_invalid_fields_is_422() {
        let app = test_app();

        let response = app
            .oneshot(post_json(
                "/api/entries",
                serde_json::json!({ "name": "Ghost", "evolution_stage": "0" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert!(body["fields"].as_array().unwrap().len() >= 3);
    }

    #[tokio::test]
    async fn test_add_with_numeric_fields() {
        let app = test_app();

        let response = app
            .oneshot(post_json(
                "/api/entries",
                serde_json::json!({
                    "name": "Squirtle",
                    "type1": "Water",
                    "type2": null,
                    "evolution_stage": 1,
                    "total_evolutions": 3,
                    "color": "Blue"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["evolution_stage"], 1);
    }

    #[tokio::test]
    async fn test_malformed_bodies_get_json_errors() {
        let app = test_app();

        let broken = Request::builder()
            .method("POST")
            .uri("/api/guess")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(broken).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
        assert!(json_body(response).await["error"].is_string());

        let wrong_type = post_json("/api/entries", serde_json::json!({ "name": ["Mew"] }));
        let response = app.clone().oneshot(wrong_type).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json_body(response).await["error"].is_string());

        let bad_query = app.oneshot(get_request("/api/stats?limit=lots")).await.unwrap();
        assert_eq!(bad_query.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(bad_query).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_stats_lists_logged_guesses() {
        let app = test_app();

        app.clone()
            .oneshot(post_json("/api/guess", serde_json::json!({ "name": "Bulbasaur" })))
            .await
            .unwrap();
        let response = app.oneshot(get_request("/api/stats?limit=10")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let stats: StatsResponse = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(stats.summary.total, 1);
        assert_eq!(stats.summary.matched, 1);
        assert_eq!(stats.recent[0].secret_name, "Bulbasaur");
    }

    #[tokio::test]
    async fn test_entry_names_and_pages() {
        let app = test_app();

        let names = app.clone().oneshot(get_request("/api/entries")).await.unwrap();
        assert_eq!(json_body(names).await, serde_json::json!(["Bulbasaur"]));

        for page in ["/", "/add", "/stats"] {
            let response = app.clone().oneshot(get_request(page)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "page {}", page);
        }
    }
}
