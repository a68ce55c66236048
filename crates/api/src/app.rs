use axum::{
    middleware,
    routing::{get, post},
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

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_user_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{dashboard, health, passes, pre_approvals, visitors};
use crate::services::{EmailService, PassMailer};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub pass_mailer: PassMailer,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    // Rate limiting is enabled when rate_limit_per_minute > 0
    let rate_limiter = if config.security.rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.rate_limit_per_minute,
        )))
    } else {
        None
    };

    let pass_mailer = PassMailer::new(
        EmailService::new(config.email.clone()),
        config.qr.signing_secret.as_bytes().to_vec(),
        config.email.company_name.clone(),
    );

    let state = AppState {
        pool,
        config: config.clone(),
        rate_limiter,
        pass_mailer,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
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

    // Protected routes (require staff JWT authentication)
    // Middleware order: auth runs first, then rate limiting (which needs
    // the staff identity)
    let protected_routes = Router::new()
        // Pre-approval routes (v1)
        .route(
            "/api/v1/pre-approvals",
            post(pre_approvals::create_pre_approval).get(pre_approvals::list_pre_approvals),
        )
        .route(
            "/api/v1/pre-approvals/stats",
            get(pre_approvals::pre_approval_stats),
        )
        .route(
            "/api/v1/pre-approvals/:id/send",
            post(pre_approvals::send_pass),
        )
        // Gate verification (v1)
        .route("/api/v1/passes/verify", post(passes::verify_pass))
        // Walk-in visitor routes (v1)
        .route(
            "/api/v1/visitors",
            post(visitors::register_visitor).get(visitors::list_visitors),
        )
        .route(
            "/api/v1/visitors/pending",
            get(visitors::list_pending_visitors),
        )
        .route(
            "/api/v1/visitors/:id/approve",
            post(visitors::approve_visitor),
        )
        .route(
            "/api/v1/visitors/:id/reject",
            post(visitors::reject_visitor),
        )
        .route(
            "/api/v1/visitors/:id/check-in",
            post(visitors::check_in_visitor),
        )
        .route(
            "/api/v1/visitors/:id/check-out",
            post(visitors::check_out_visitor),
        )
        // Dashboard (v1)
        .route("/api/v1/dashboard", get(dashboard::dashboard_summary))
        // Rate limiting runs after auth (needs the staff identity)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        // Auth runs first (outermost layer = runs first)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
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
