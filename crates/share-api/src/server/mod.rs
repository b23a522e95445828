//! Server setup and initialization
//!
//! Wires PostgreSQL, Redis, and the discovery cache into a service context,
//! starts the background reconciler, and serves until a shutdown signal.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use share_cache::{
    create_shared_pool, MemoryDiscoveryCache, RedisDiscoveryCache, RedisPoolConfig,
};
use share_common::{AppConfig, AppError, CacheBackend, JwtService};
use share_core::{DiscoveryCache, SnowflakeGenerator};
use share_db::{create_pool, run_migrations, PoolConfig};
use share_service::services::spawn_reconciler;
use share_service::ServiceContext;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the Axum application: rate-limited API routes plus health probes
pub fn create_app(state: AppState) -> Router {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );
    let health = apply_middleware(health_routes());

    api.merge(health).with_state(state)
}

/// Connect to every dependency and build the application state
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(format!("migration failed: {e}")))?;
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis_pool = create_shared_pool(RedisPoolConfig::from(&config.redis))
        .map_err(|e| AppError::Cache(e.to_string()))?;

    let discovery_cache: Arc<dyn DiscoveryCache> = match config.engagement.discovery_cache_backend
    {
        CacheBackend::Redis => Arc::new(RedisDiscoveryCache::new(redis_pool.as_ref().clone())),
        CacheBackend::Memory => Arc::new(MemoryDiscoveryCache::new()),
    };
    info!(
        backend = ?config.engagement.discovery_cache_backend,
        policy = ?config.engagement.dedup_policy(),
        "Engagement layer configured"
    );

    let service_context = ServiceContext::builder()
        .postgres(pool)
        .redis_pool(redis_pool)
        .discovery_cache(discovery_cache)
        .jwt_service(Arc::new(JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry,
        )))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .engagement(config.engagement.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config))
}

/// Serve `app` on `addr` until ctrl-c or SIGTERM
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    // Peer addresses feed the IP fallback of viewer identity
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let address = config.api.address();
    let addr = tokio::net::lookup_host(&address)
        .await
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| AppError::Config(format!("Invalid listen address: {address}")))?;

    let state = create_app_state(config).await?;
    let reconciler = spawn_reconciler(state.shared_context());

    let result = run_server(create_app(state), addr).await;

    if let Some(handle) = reconciler {
        handle.abort();
    }
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received ctrl-c, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
