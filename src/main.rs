mod codec;
mod config;
mod error;
mod handlers;
mod models;
mod repos;
mod risk;
mod state;
mod stores;
#[cfg(test)]
mod test_utils;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{Router, http};
use sqlx::mysql::MySqlPoolOptions;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::Config,
    repos::{MySqlCustomerRepo, MySqlScoreRepo, MySqlStatusRepo, MySqlStudentRepo, Repos},
    risk::RiskService,
    state::AppState,
    stores::{CacheStore, RISK_EVENTS_NAMESPACE, RedisCacheStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = envy::prefixed("BEACON_").from_env::<Config>()?;

    // Initialize Sentry for error tracking (must be done early, guard must stay alive)
    let _sentry_guard = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(config.env.clone().into()),
                ..Default::default()
            },
        ))
    });

    // Set up tracing: JSON in production, human-readable otherwise
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }

    let atrisk_db = MySqlPoolOptions::new()
        .max_connections(25)
        .connect(&config.atrisk_database_url)
        .await?;
    let schools_db = MySqlPoolOptions::new()
        .max_connections(25)
        .connect(&config.schools_database_url)
        .await?;

    let redis = redis::Client::open(config.redis_url.as_str())?;

    // Build repositories
    let repos = Repos {
        scores: Arc::new(MySqlScoreRepo::new(atrisk_db.clone())),
        students: Arc::new(MySqlStudentRepo::new(schools_db.clone())),
        customers: Arc::new(MySqlCustomerRepo::new(schools_db.clone())),
        status: Arc::new(MySqlStatusRepo::new(atrisk_db, schools_db)),
    };

    // Build the risk event store and aggregation engine
    let events: Arc<dyn CacheStore> =
        Arc::new(RedisCacheStore::new(&redis, RISK_EVENTS_NAMESPACE)?);
    let risk = RiskService::new(events.clone(), config.default_event_ttl_secs);

    let state = AppState {
        config: config.clone(),
        repos,
        events,
        risk,
    };

    // Request ID header name
    let x_request_id = http::HeaderName::from_static("x-request-id");

    let app = Router::new()
        .nest("/health", handlers::health::router())
        .nest("/at-risk", handlers::risk::router())
        .nest("/customer", handlers::customer::router())
        .nest("/user", handlers::student::router())
        .with_state(state)
        // Request ID: generate UUID, include in logs, return in response
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &http::Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            },
        ))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(64 * 1024)); // 64KB limit

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
