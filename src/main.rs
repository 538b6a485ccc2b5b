use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reel_journal::{
    api::{create_router, AppState},
    config::Config,
    db::{self, Cache, InMemoryRecordStore, PgRecordStore, RecordStore},
    services::providers::{GeminiGenerator, SupabaseAuth, TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reel_journal=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let records: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("Connected to PostgreSQL");
            Arc::new(PgRecordStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, watch records are kept in memory only");
            Arc::new(InMemoryRecordStore::new())
        }
    };

    let (cache, cache_handle) = Cache::new(db::create_redis_client(&config.redis_url)?);

    let state = AppState::new(
        records,
        Arc::new(TmdbProvider::new(
            cache,
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
        )),
        Arc::new(GeminiGenerator::new(
            config.gemini_api_key.clone(),
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
        )),
        Arc::new(SupabaseAuth::new(
            config.supabase_url.clone(),
            config.supabase_anon_key.clone(),
            config.auth_redirect_url.clone(),
        )),
    );

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_handle.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
