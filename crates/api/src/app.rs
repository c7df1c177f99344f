use axum::{http::HeaderValue, middleware, routing::get, Router};
use domain::services::ChangeAuditLog;
use persistence::repositories::{AuditRecordRepository, CatalogItemRepository};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{Config, SecurityConfig};
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{health, media};

/// Audit log backed by the Postgres repositories.
pub type CatalogAuditLog = ChangeAuditLog<AuditRecordRepository, CatalogItemRepository>;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub catalog: CatalogItemRepository,
    pub audit_log: CatalogAuditLog,
}

impl AppState {
    pub fn new(config: Arc<Config>, pool: PgPool) -> Self {
        let catalog = CatalogItemRepository::new(pool.clone());
        let audit_log = ChangeAuditLog::new(
            Arc::new(AuditRecordRepository::new(pool.clone())),
            Arc::new(catalog.clone()),
        )
        .with_history_limit(config.audit.history_limit);

        Self {
            pool,
            config,
            catalog,
            audit_log,
        }
    }
}

/// CORS policy: any origin when none are configured, otherwise the listed
/// origins only. Unparseable entries are skipped with a warning.
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if security.cors_origins.is_empty() {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);
    let state = AppState::new(config.clone(), pool);

    let cors = cors_layer(&config.security);

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1/media", media::router())
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
