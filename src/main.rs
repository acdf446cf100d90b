use axum::{middleware as axum_middleware, routing::get, routing::post, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod filter;
mod handlers;
mod mailer;
mod middleware;
mod transfer;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = crate::config::config();
    tracing::info!("Starting Realty API in {:?} mode", config.environment);

    let app = app();

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Realty API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        .merge(protected_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use handlers::auth;

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
}

fn protected_routes() -> Router {
    use handlers::auth;

    Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .merge(entity_routes())
        .merge(transfer_routes())
        .layer(axum_middleware::from_fn(middleware::jwt_auth_middleware))
}

fn entity_routes() -> Router {
    use handlers::{
        appointments, client_documents, clients, communication_logs, properties,
        property_interests, user_settings, users,
    };

    macro_rules! crud {
        ($router:expr, $path:literal, $module:ident) => {
            $router
                .route($path, get($module::list).post($module::create))
                .route(
                    concat!($path, "/:id"),
                    get($module::get).put($module::update).delete($module::delete),
                )
        };
    }

    let mut router = Router::new();
    router = crud!(router, "/api/users", users);
    router = crud!(router, "/api/clients", clients);
    router = crud!(router, "/api/property-interests", property_interests);
    router = crud!(router, "/api/properties", properties);
    router = crud!(router, "/api/appointments", appointments);
    router = crud!(router, "/api/communication-logs", communication_logs);
    router = crud!(router, "/api/client-documents", client_documents);
    router = crud!(router, "/api/user-settings", user_settings);
    router
}

fn transfer_routes() -> Router {
    use handlers::transfer;

    Router::new()
        .route("/api/clients/import", post(transfer::import))
        .route("/api/clients/export", get(transfer::export))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Realty API",
        "version": version,
        "description": "CRM backend for real-estate agencies",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "auth": "/api/auth/login, /api/auth/forgot-password, /api/auth/reset-password (public), /api/auth/logout (protected)",
            "users": "/api/users[/:id] (protected, admin/manager)",
            "clients": "/api/clients[/:id] (protected)",
            "property_interests": "/api/property-interests[/:id] (protected)",
            "properties": "/api/properties[/:id] (protected)",
            "appointments": "/api/appointments[/:id] (protected)",
            "communication_logs": "/api/communication-logs[/:id] (protected)",
            "client_documents": "/api/client-documents[/:id] (protected)",
            "user_settings": "/api/user-settings[/:id] (protected)",
            "bulk": "/api/clients/import, /api/clients/export (protected, admin/support)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
