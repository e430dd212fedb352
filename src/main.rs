use std::{net::SocketAddr, process::ExitCode, sync::Arc};

use tokio::{net::TcpListener, sync::broadcast};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod content_loader;
mod error;
mod hot_reload;
mod images;
mod listing;
mod markdown;
mod models;
mod pages;
mod repository;
mod routes;
mod session;
mod source;
mod state;

use config::Config;
use content_loader::{load_content, LocalMarkdownSource};
use hot_reload::start_content_watcher;
use source::ContentSource;
use state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    // logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        is_development = config.is_development,
        content_dir = %config.content_dir.display(),
        "starting"
    );

    let content = match load_content(&config.content_dir).await {
        Ok(content) => content,
        Err(e) => {
            error!("Failed to load initial content files: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let content_dir = config.content_dir.clone();
    let state = Arc::new(AppState::new(
        content,
        |site| -> Arc<dyn ContentSource> { Arc::new(LocalMarkdownSource::new(&content_dir, site)) },
        config.content_dir.clone(),
        config.is_development,
    ));

    // Hot-reload setup
    let (tx, _rx) = broadcast::channel(1);
    if config.is_development {
        info!("Hot reload enabled. Check logs for file change events.");
        start_content_watcher(tx.clone(), state.clone());
    }

    let app = routes::build_router(state, tx, &config.content_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, "Failed to bind: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(%addr, "listening");
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
