//! PaperSkill HTTP server.
//!
//! Wiring only: configuration, tracing, database pool, adapters, router.

use std::sync::Arc;

use anyhow::Context;
use http::{header, HeaderValue, Method};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use paperskill::adapters::auth::{Argon2PasswordHasher, JwtSessionValidator, JwtTokenIssuer};
use paperskill::adapters::http::middleware::AuthState;
use paperskill::adapters::http::{api_router, AppState};
use paperskill::adapters::postgres::{
    PostgresCatalogReader, PostgresCatalogRepository, PostgresPaymentRepository,
    PostgresUserRepository,
};
use paperskill::adapters::stripe::StripeGateway;
use paperskill::application::handlers::payment::CheckoutUrls;
use paperskill::config::{AppConfig, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Configuration ---
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    // --- 2. Logging ---
    init_tracing(&config.server);
    tracing::info!(
        environment = ?config.server.environment,
        stripe_test_mode = config.payment.is_test_mode(),
        "configuration loaded"
    );

    // --- 3. Database ---
    let db = &config.database;
    tracing::info!(endpoint = db.endpoint(), "connecting to database");
    let pool = db
        .pool_options()
        .connect(db.url())
        .await
        .context("failed to connect to database")?;

    if db.run_migrations {
        tracing::info!("running database migrations");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;
    }

    // --- 4. Adapters ---
    let gateway = StripeGateway::new(config.payment.stripe_config())
        .map_err(|e| anyhow::anyhow!("failed to build Stripe client: {}", e.message))?;
    let jwt = config.auth.jwt_config();
    let validator: AuthState = Arc::new(JwtSessionValidator::new(jwt.clone()));

    let state = AppState::new(
        Arc::new(PostgresCatalogReader::new(pool.clone())),
        Arc::new(PostgresCatalogRepository::new(pool.clone())),
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresPaymentRepository::new(pool.clone())),
        Arc::new(gateway),
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(JwtTokenIssuer::new(jwt)),
        CheckoutUrls::new(config.payment.public_base_url.clone()),
    );

    // --- 5. Router ---
    let origins = config.server.allowed_origins()?;
    let request_id = header::HeaderName::from_static("x-request-id");
    let app = api_router(state, validator).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(cors_layer(origins))
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::new(config.server.request_timeout())),
    );

    // --- 6. Serve ---
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "paperskill listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("shutdown complete");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_filter));

    let registry = tracing_subscriber::registry().with(filter);
    if server.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
