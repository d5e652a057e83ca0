use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::SharedStore;
use crate::handlers;
use crate::middleware::require_admin;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: SharedStore, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Full application router. The student routes are mounted under `/api`
/// (the prefix the CLI uses) and again at the root.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let mut app = Router::new()
        // Public
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .merge(auth_routes())
        .nest("/api", student_routes(&state))
        .merge(student_routes(&state))
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        app = app.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        app = app.layer(
            TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO)),
        );
    }

    app.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/whoami", get(auth::whoami))
}

fn student_routes(state: &AppState) -> Router<AppState> {
    use handlers::students;

    let admin = middleware::from_fn_with_state(state.clone(), require_admin);

    Router::new()
        // route_layer only wraps the methods registered before it, so the
        // public submission (POST) stays ungated
        .route(
            "/students",
            get(students::list).route_layer(admin.clone()).post(students::create),
        )
        .route(
            "/students/:id",
            get(students::get)
                .patch(students::update)
                .delete(students::delete)
                .route_layer(admin),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if security.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}
