mod auth;
mod config;
mod db;

use axum::{
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    change_password_handler, login_handler, logout_handler, me_handler, refresh_handler,
    register_handler, update_profile_handler, AuthService, InMemoryUserStore, PostgresUserStore,
    TokenService, UserStore,
};
use config::AppConfig;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::refresh_handler,
        auth::handlers::me_handler,
        auth::handlers::change_password_handler,
        auth::handlers::update_profile_handler,
        auth::handlers::logout_handler,
    ),
    components(
        schemas(
            auth::models::RegisterRequest,
            auth::models::LoginRequest,
            auth::models::RefreshRequest,
            auth::models::ChangePasswordRequest,
            auth::models::UpdateProfileRequest,
            auth::models::UserResponse,
            auth::models::TokenPair,
            auth::models::MessageResponse,
        )
    ),
    tags(
        (name = "auth", description = "User login, registration, and token management")
    ),
    info(
        title = "Swappo Authentication Service",
        version = "1.0.0",
        description = "Authentication and user management API: registration, login, \
JWT access/refresh tokens, profile management, and password changes",
        contact(
            name = "Swappo API Support",
            email = "api@swappo.art"
        )
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub tokens: TokenService,
}

/// Handler for GET /
/// Lists the service endpoints
async fn read_root() -> Json<Value> {
    Json(json!({
        "message": "Authentication Microservice API",
        "version": "1.0.0",
        "endpoints": {
            "health": "/health",
            "register": "/api/v1/auth/register",
            "login": "/api/v1/auth/login",
            "refresh": "/api/v1/auth/refresh",
            "me": "/api/v1/auth/me",
            "change-password": "/api/v1/auth/change-password",
            "profile": "/api/v1/auth/profile",
        },
    }))
}

/// Handler for GET /health
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Service routes
        .route("/", get(read_root))
        .route("/health", get(health_check))
        // Auth routes
        .route("/api/v1/auth/register", post(register_handler))
        .route("/api/v1/auth/login", post(login_handler))
        .route("/api/v1/auth/refresh", post(refresh_handler))
        .route("/api/v1/auth/me", get(me_handler))
        .route("/api/v1/auth/change-password", post(change_password_handler))
        .route("/api/v1/auth/profile", put(update_profile_handler))
        .route("/api/v1/auth/logout", post(logout_handler))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Swappo Auth Service - Starting...");

    let config = AppConfig::from_env().expect("Failed to load configuration");

    // The store backend is selected exactly once, at startup
    let store: Arc<dyn UserStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url)
                .await
                .expect("Failed to create database pool");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Migrations completed successfully");

            Arc::new(PostgresUserStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory user store");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let tokens = TokenService::new(config.auth.clone());
    let state = AppState {
        auth: Arc::new(AuthService::new(store, tokens.clone())),
        tokens,
    };

    // Create the application router
    let app = create_router(state);

    // Start the Axum server
    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Swappo Auth Service is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
