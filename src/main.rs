use std::sync::Arc;

use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use couple_movie_api::{
    config::Config,
    create_router,
    db::{create_pool, create_redis_client, Cache, Repositories},
    services::{
        ElasticsearchIndex, EmotionService, GoogleOAuthClient, IdentityProvider, JwtKeys,
        LogMailer, Mailer, OmdbClient, SmtpMailer,
    },
    AppState, Backends,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "couple_movie_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let repositories = Repositories::postgres(pool);

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_handle) = Cache::new(redis_client).await;

    let index = ElasticsearchIndex::new(&config.elasticsearch_url);
    if let Err(e) = index.ensure_index().await {
        tracing::error!(error = %e, "Search index unavailable, fuzzy and genre search will fail");
    }

    let catalog = OmdbClient::new(
        cache,
        config.omdb_api_key.clone(),
        config.omdb_api_url.clone(),
    );

    let mailer: Arc<dyn Mailer> = match config.smtp() {
        Some(smtp) => Arc::new(SmtpMailer::new(&smtp)?),
        None => {
            tracing::warn!("SMTP_HOST not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let identity: Option<Arc<dyn IdentityProvider>> = match config.google_oauth() {
        Some(google) => Some(Arc::new(GoogleOAuthClient::new(google))),
        None => {
            tracing::warn!("Google OAuth2 not configured, Google sign-in disabled");
            None
        }
    };

    EmotionService::new(repositories.emotions.clone())
        .seed_if_empty()
        .await;

    let state = Arc::new(AppState::new(
        Backends {
            repositories,
            index: Arc::new(index),
            catalog: Arc::new(catalog),
            mailer,
            identity,
        },
        JwtKeys::new(&config.jwt_secret, config.jwt_expiration_hours),
        &config.frontend_url,
    ));
    let app = create_router(state);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Server running on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_handle.shutdown().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received");
}
