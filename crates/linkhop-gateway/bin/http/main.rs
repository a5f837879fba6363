mod cli;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use linkhop_cache::{
    MokaCacheConfig, MokaUrlCache, NoopUrlCache, RedisCacheConfig, RedisUrlCache, UrlCache,
};
use linkhop_core::{ClickRepository, Repository};
use linkhop_gateway::{App, AppState};
use linkhop_generator::{RandomGenerator, RandomGeneratorSettings};
use linkhop_shortener::{AnalyticsService, ShortenerService, ShortenerSettings};
use linkhop_storage::{InMemoryRepository, SqliteRepository, SqliteSettings};
use tokio::signal;
use tracing::{error, info, warn};

use crate::cli::{CacheBackendArg, StorageBackendArg, CLI};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = CLI::parse();

    linkhop_telemetry::init(cli.log_format.into())
        .context("failed to install the log subscriber")?;

    let cache = build_cache(&cli).await;

    let mut sqlite = None;
    let state = match cli.storage {
        StorageBackendArg::Sqlite => {
            let settings = SqliteSettings::builder()
                .database_url(cli.database_url.as_str())
                .max_connections(cli.database_max_connections)
                .build();
            let repository = Arc::new(
                SqliteRepository::connect(&settings)
                    .await
                    .with_context(|| format!("failed to open {}", cli.database_url))?,
            );
            sqlite = Some(repository.clone());
            build_state(repository, cache.clone(), &cli)?
        }
        StorageBackendArg::InMemory => {
            build_state(Arc::new(InMemoryRepository::default()), cache.clone(), &cli)?
        }
    };

    let listener = tokio::net::TcpListener::bind(cli.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen_addr))?;
    info!(
        listen_addr = %listener.local_addr()?,
        base_url = %cli.base_url(),
        storage = %cli.storage,
        cache = %cli.cache,
        "starting linkhop gateway"
    );

    axum::serve(
        listener,
        App::router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    if let Some(cache) = cache {
        if let Err(e) = cache.close().await {
            warn!(error = %e, "failed to close cache");
        }
    }
    if let Some(repository) = sqlite {
        repository.close().await;
    }
    info!("linkhop gateway stopped");

    Ok(())
}

fn build_state<R>(
    repository: Arc<R>,
    cache: Option<Arc<dyn UrlCache>>,
    cli: &CLI,
) -> anyhow::Result<AppState>
where
    R: Repository + ClickRepository,
{
    let generator = RandomGenerator::new(
        RandomGeneratorSettings::builder()
            .length(usize::from(cli.code_length))
            .build(),
    )?;
    let settings = ShortenerSettings::builder().base_url(cli.base_url()).build();

    let mut shortener = ShortenerService::new(repository.clone(), generator, settings);
    if let Some(cache) = cache {
        shortener = shortener.with_cache(cache);
    }
    let analytics = AnalyticsService::new(repository);

    Ok(AppState::new(Arc::new(shortener), Arc::new(analytics))
        .with_click_timeout(Duration::from_secs(cli.click_timeout_secs))
        .with_request_timeout(Duration::from_secs(cli.request_timeout_secs)))
}

/// An unreachable Redis degrades to [`NoopUrlCache`] rather than aborting.
async fn build_cache(cli: &CLI) -> Option<Arc<dyn UrlCache>> {
    let ttl = Duration::from_secs(cli.cache_ttl_secs);

    match cli.cache {
        CacheBackendArg::Redis => {
            let config = RedisCacheConfig::builder()
                .url(cli.redis_url.as_str())
                .ttl(ttl)
                .build();
            match RedisUrlCache::connect(config).await {
                Ok(cache) => Some(Arc::new(cache)),
                Err(e) => {
                    warn!(
                        redis_url = %cli.redis_url,
                        error = %e,
                        "redis unavailable, continuing without a cache"
                    );
                    Some(Arc::new(NoopUrlCache))
                }
            }
        }
        CacheBackendArg::Moka => {
            let config = MokaCacheConfig::builder()
                .max_capacity(cli.cache_capacity)
                .ttl(ttl)
                .build();
            Some(Arc::new(MokaUrlCache::from(config)))
        }
        CacheBackendArg::None => None,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining connections");
}
