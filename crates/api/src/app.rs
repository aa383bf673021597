use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use shared::jwt::JwtConfig;

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{atividades, auth, health, modalidades, users};
use crate::services::GeocodingClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: JwtConfig,
    pub geocoding: GeocodingClient,
}

pub fn create_app(config: Config, pool: PgPool, jwt: JwtConfig) -> Router {
    let config = Arc::new(config);

    let geocoding = GeocodingClient::new(&config.geocoding)
        .expect("Failed to build the geocoding HTTP client");

    let state = AppState {
        pool,
        config: config.clone(),
        jwt,
        geocoding,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Public routes: login, registration and infrastructure endpoints.
    let public_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/users/register", post(users::register))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Everything else requires a valid Bearer token; the AuthUser extractor
    // in each handler rejects unauthenticated requests with 401.
    let protected_routes = Router::new()
        .route("/me", get(auth::me))
        .route("/users", get(users::find_all))
        .route("/users", put(users::update_me))
        .route("/users/me", delete(users::delete_me))
        .route("/users/:username", get(users::find_by_username))
        .route("/modalidades", get(modalidades::find_all))
        .route("/atividades", post(atividades::create))
        .route("/atividades", get(atividades::find_all))
        .route("/atividades/proximas", get(atividades::find_nearby))
        .route("/atividades/:id", get(atividades::find_by_id))
        .route("/atividades/:id", put(atividades::update))
        .route("/atividades/:id", delete(atividades::delete))
        .route("/atividades/:id/inscrever", post(atividades::inscrever));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(trace_id))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
