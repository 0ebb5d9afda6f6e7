use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use profile_be::{app, config::Settings, seeded_store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv().is_ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if env_loaded {
        info!("loaded .env file");
    }

    let settings = Settings::from_env().context("failed to load configuration")?;
    info!(
        strict_validation = settings.strict_validation,
        latency = ?settings.simulated_latency,
        static_dir = ?settings.static_dir,
        "configuration loaded"
    );

    let store = seeded_store(&settings);
    let addr = settings.bind_addr;
    let router = app(store, Arc::new(settings));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
