use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers;
use crate::relay::{http_client, Dispatcher, RelayError};

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Banking/customer API, behind `/api/proxy/*path`
    pub banking: Dispatcher,
    /// Car inventory API, behind `/api/crud/*`
    pub cars: Dispatcher,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Result<Self, RelayError> {
        let http = http_client(config.relay.request_timeout_secs)?;
        let banking = Dispatcher::new(&config.relay.banking_base_url, http.clone())?;
        let cars = Dispatcher::new(&config.relay.car_base_url, http.clone())?;

        Ok(Self {
            config: Arc::new(config),
            banking,
            cars,
            http,
        })
    }
}

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        // Public
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        // Session renewal
        .route(
            "/api/refresh",
            get(handlers::session::refresh).post(handlers::session::refresh),
        )
        .route("/api/logout", post(handlers::session::logout))
        // Relayed APIs
        .merge(proxy_routes())
        .merge(crud_routes())
        .fallback(handlers::system::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

fn proxy_routes() -> Router<AppState> {
    use handlers::proxy;

    Router::new().route(
        "/api/proxy/*path",
        get(proxy::relay)
            .post(proxy::relay)
            .put(proxy::relay)
            .patch(proxy::relay)
            .delete(proxy::relay),
    )
}

fn crud_routes() -> Router<AppState> {
    use handlers::crud;

    Router::new()
        .route("/api/crud/create", post(crud::create_car))
        .route("/api/crud/update-car/:car_id", put(crud::update_car))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
