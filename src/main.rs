use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use designhub_api::database::{bootstrap, DatabaseManager};
use designhub_api::handlers::{admin, protected, public};
use designhub_api::middleware::{jwt_auth_middleware, require_admin};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, HUB_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = designhub_api::config::config();
    tracing::info!("Starting Design Hub API in {:?} mode", config.environment);

    tracing_subscriber::fmt::init();

    // Apply the schema if the database is reachable; a portal booted without
    // a database still serves /health as degraded
    match DatabaseManager::pool().await {
        Ok(pool) => {
            if let Err(e) = bootstrap::ensure_schema(&pool).await {
                tracing::warn!("Schema bootstrap failed: {}", e);
            }
        }
        Err(e) => tracing::warn!("Database unavailable at startup: {}", e),
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("HUB_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("Design Hub API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API (JWT), with the admin tier nested inside
        .merge(protected_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use axum::routing::post;

    Router::new().route("/auth/login", post(public::auth::login))
}

fn protected_routes() -> Router {
    use axum::routing::{get, post, put};

    Router::new()
        // Session
        .route("/api/auth/whoami", get(protected::auth::whoami))
        // Own profile
        .route(
            "/api/profile",
            get(protected::profile::show).put(protected::profile::update),
        )
        // Request briefs
        .route(
            "/api/requests",
            get(protected::requests::list).post(protected::requests::submit),
        )
        .route("/api/requests/:id", get(protected::requests::show))
        // Asset library
        .route("/api/assets", get(protected::assets::library))
        .route("/api/assets/:id/download", get(protected::assets::download))
        // Admin tier
        .merge(
            Router::new()
                .route(
                    "/api/admin/clients",
                    get(admin::clients::list).post(admin::clients::create),
                )
                .route("/api/admin/clients/:id", get(admin::clients::show))
                .route(
                    "/api/admin/clients/:id/notes",
                    get(admin::notes::list).post(admin::notes::create),
                )
                .route(
                    "/api/admin/notes/:id",
                    axum::routing::delete(admin::notes::remove),
                )
                .route("/api/admin/requests/board", get(admin::requests::board))
                .route(
                    "/api/admin/requests/:id/status",
                    put(admin::requests::set_status),
                )
                .route("/api/admin/assets", post(admin::assets::upload))
                .route(
                    "/api/admin/assets/:id",
                    axum::routing::patch(admin::assets::update).delete(admin::assets::remove),
                )
                .layer(axum::middleware::from_fn(require_admin)),
        )
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Design Hub API",
            "version": version,
            "description": "Client portal backend: creative-request briefs, asset library, admin tools",
            "endpoints": {
                "home": "/ (public)",
                "login": "/auth/login (public)",
                "session": "/api/auth/whoami (protected)",
                "profile": "/api/profile (protected)",
                "requests": "/api/requests[/:id] (protected)",
                "assets": "/api/assets[/:id/download] (protected)",
                "admin": "/api/admin/* (admin role required)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
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
