/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (storage, id codec, auth) → Router 組み立て
 * - Middleware の適用 (security headers / CORS / request-id / trace / limit / timeout)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, StorageBackend};
use crate::repos::{
    account_repo::AccountRepo, game_repo::GameRepo, memory::MemoryStore, postgres::PgStore,
};
use crate::services::{auth::build_auth_service, id_codec::IdCodec};
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,gamer_profile_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched
        tracing::error!(?info, "panic");

        // development: crash the whole process so we notice immediately
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
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );
    tracing::info!(
        issuer = %config.auth_issuer,
        jwks_url = %config.auth_jwks_url,
        profile_sync = ?config.profile_sync,
        "auth configured"
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let (accounts, games): (Arc<dyn AccountRepo>, Arc<dyn GameRepo>) = match &config.storage {
        StorageBackend::Postgres {
            database_url,
            max_connections,
            run_migrations,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .acquire_timeout(Duration::from_secs(5))
                .connect(database_url)
                .await
                .context("failed to connect to PostgreSQL")?;

            if *run_migrations {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("failed to run migrations")?;
            }

            let store = Arc::new(PgStore::new(pool));
            (store.clone(), store)
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            let store = Arc::new(
                MemoryStore::with_default_games()
                    .await
                    .context("failed to seed in-memory game catalog")?,
            );
            (store.clone(), store)
        }
    };

    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)?;
    let auth = build_auth_service(config, accounts.clone())?;

    Ok(AppState {
        accounts,
        games,
        id_codec,
        auth,
    })
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}
