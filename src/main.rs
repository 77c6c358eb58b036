//! Process entry point.
//!
//! Startup is fail-fast: configuration is loaded and validated before
//! anything binds a socket, so a process with a missing provider
//! credential or database URL exits non-zero instead of serving requests
//! with a silently broken payment integration.

use std::process;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use idea_vault::adapters::http::{api_routes, AppState};
use idea_vault::adapters::mercadopago::{MercadoPagoConfig, MercadoPagoGateway};
use idea_vault::adapters::postgres::PostgresAccountStore;
use idea_vault::application::{CredentialService, EntitlementConfig, EntitlementCoordinator};
use idea_vault::config::AppConfig;

#[tokio::main]
async fn main() {
    // Tracing is not up yet; configuration failures go to stderr.
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("invalid configuration: {e}");
        process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.log_level))
        .init();

    let pool = match PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to database");
            process::exit(1);
        }
    };

    if config.database.run_migrations {
        if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
            tracing::error!(error = %e, "failed to run migrations");
            process::exit(1);
        }
        tracing::info!("migrations applied");
    }

    let store = Arc::new(PostgresAccountStore::new(pool));
    let gateway = Arc::new(MercadoPagoGateway::new(MercadoPagoConfig::from_payment(
        &config.payment,
    )));

    let state = AppState {
        credentials: Arc::new(CredentialService::new(store.clone())),
        entitlement: Arc::new(EntitlementCoordinator::new(
            store,
            gateway,
            EntitlementConfig::from_payment(&config.payment),
        )),
        operator_token: config.payment.operator_token.clone(),
    };

    let cors = {
        let origins: Vec<HeaderValue> = config
            .server
            .cors_origins_list()
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        if origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    let app = api_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors);

    let addr = config.server.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind");
            process::exit(1);
        }
    };

    tracing::info!(%addr, frontend = %config.payment.frontend_url, "server listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        process::exit(1);
    }
}
