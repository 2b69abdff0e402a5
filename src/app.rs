/*
 * Responsibility
 * - tracing / panic hook setup
 * - Config -> dependencies (pool, store adapter, limiter, admin gate) -> AppState
 * - Router assembly + middleware (security headers / CORS / http)
 * - axum::serve() with connect info (peer address feeds ClientIp and the quota key)
 */
use std::{net::SocketAddr, panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::{Config, StoreBackend},
    middleware,
    repos::{MemoryPostRepo, PgPostRepo, PostStore},
    services::{
        admin::AdminGate,
        rate_limit::{FixedWindow, MemoryRateLimiter, RateLimiter, ValkeyRateLimiter},
    },
    state::AppState,
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,board_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched.
        tracing::error!(?info, "panic");

        // Development: crash the whole process. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting board API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

async fn build_state(config: &Config) -> Result<AppState> {
    // Process-level resources are created once here and injected through AppState.
    let posts: Arc<dyn PostStore> = match &config.store {
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await?;
            let repo = PgPostRepo::new(pool);
            repo.ensure_schema().await?;
            Arc::new(repo)
        }
        StoreBackend::Memory => {
            tracing::warn!("STORE_BACKEND=memory: posts are lost on restart");
            Arc::new(MemoryPostRepo::new())
        }
    };
    tracing::info!(backend = posts.backend_name(), "post store ready");

    let policy = FixedWindow {
        max_requests: config.rate_limit_max_requests,
        window: config.rate_limit_window,
    };
    let limiter: Arc<dyn RateLimiter> = match &config.valkey_url {
        Some(url) => Arc::new(ValkeyRateLimiter::new(url, policy).await?),
        None => Arc::new(MemoryRateLimiter::new(policy)),
    };

    let admin = AdminGate::new(config.admin_password.as_deref());
    if !admin.is_configured() {
        tracing::warn!("ADMIN_PASSWORD is not set; admin deletion is disabled");
    }

    if config.trusted_proxy_hops == 0 {
        tracing::info!("quotas are keyed on the TCP peer address");
    } else {
        tracing::info!(
            hops = config.trusted_proxy_hops,
            "quotas are keyed on X-Forwarded-For behind trusted proxies"
        );
    }

    Ok(AppState::new(
        posts,
        limiter,
        admin,
        config.trusted_proxy_hops,
    ))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api", api::routes(state.clone()))
        .fallback(api::handlers::not_found)
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}
