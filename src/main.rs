use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod config;
mod database;
mod error;
mod handlers;
mod services;

use handlers::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = crate::config::config();
    tracing::info!("Starting Conservation Life API in {:?} mode", config.environment);

    let pool = database::manager::connect()
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));
    database::manager::run_migrations(&pool)
        .await
        .unwrap_or_else(|e| panic!("failed to run migrations: {}", e));

    let app = app(AppState { pool });

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Conservation Life API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    Router::new()
        // Service banner and liveness
        .route("/", get(root))
        .route("/health", get(health))
        // API
        .merge(asset_routes())
        .merge(definition_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn asset_routes() -> Router<AppState> {
    use handlers::assets;

    Router::new()
        .route("/api/v1/assets", get(assets::list))
        .route("/api/v1/assets/bbox", get(assets::bbox))
}

fn definition_routes() -> Router<AppState> {
    use handlers::{asset_definitions, data_types};

    Router::new()
        .route(
            "/api/v1/asset-definitions",
            get(asset_definitions::list_definitions).post(asset_definitions::create_definition),
        )
        .route("/api/v1/asset-types", get(asset_definitions::list_asset_types))
        .route(
            "/api/v1/asset-types/:id/properties",
            get(asset_definitions::list_properties),
        )
        .route(
            "/api/v1/asset-types/:id/asset-properties",
            get(asset_definitions::list_asset_properties),
        )
        .route("/api/v1/asset-types/:id/import", post(asset_definitions::import))
        .route("/api/v1/data-types", get(data_types::list))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Conservation Life API",
            "version": version,
            "description": "CRUD backend for conservation asset tracking",
            "endpoints": {
                "home": "/",
                "health": "/health",
                "assets": "/api/v1/assets[?project_id=], /api/v1/assets/bbox[?project_id=]",
                "asset_definitions": "/api/v1/asset-definitions, /api/v1/asset-types",
                "properties": "/api/v1/asset-types/:id/properties[?include_private=]",
                "import": "/api/v1/asset-types/:id/import",
                "data_types": "/api/v1/data-types",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match database::manager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
