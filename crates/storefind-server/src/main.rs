mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use storefind_classifier::CategoryClassifier;
use storefind_core::AppConfig;
use storefind_places::{PlacesClient, RetryPolicy};
use storefind_search::{LiveSearch, SearchConfig};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
};

fn build_search(config: &AppConfig) -> anyhow::Result<LiveSearch> {
    let places = PlacesClient::with_base_url(
        &config.google_api_key,
        config.http_timeout_secs,
        &config.user_agent,
        RetryPolicy::new(config.max_retries, config.retry_backoff_base_ms),
        &config.places_base_url,
    )?;
    let classifier = CategoryClassifier::from_config(config)?;
    if !classifier.is_enabled() {
        tracing::warn!("DEEPSEEK_API_KEY not set; product text is used as the search category");
    }
    Ok(LiveSearch::new(
        classifier,
        places.clone(),
        places,
        SearchConfig::from(config),
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = storefind_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let search = build_search(&config)?;
    let state = AppState {
        search: Arc::new(search),
        api_key_configured: !config.google_api_key.trim().is_empty(),
    };
    let rate_limit = RateLimitState::new(config.rate_limit_per_minute, Duration::from_secs(60));
    let app = build_app(state, rate_limit);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "storefind server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
