mod api;
mod client;
mod config;
mod dto;
mod poller;
mod state;

use std::sync::Arc;

use axum::routing::get;
use halte::directory::{DirectoryBuilder, DirectoryCache};
use tracing::{error, info};

use crate::{client::OvClient, config::Config, state::AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };

    let mut builder = DirectoryBuilder::new(config.gtfs_zip.clone());
    if let Some(path) = &config.overrides_file {
        builder = builder.with_overrides(path.clone());
    }
    let cache = DirectoryCache::new(builder, config.cache_file.clone());
    let client = OvClient::new(config.feed_base_url.clone());
    let state = Arc::new(AppState::new(cache, client));

    info!("Warming stop directory...");
    if let Err(err) = state.cache.ensure_fresh().await {
        error!("Could not build the stop directory: {err}");
        std::process::exit(1);
    }

    if let Some(watch) = config.watch.clone() {
        info!(
            "Polling {:?} every {}s",
            watch.stop_codes, watch.poll_interval_secs
        );
        tokio::spawn(poller::run(state.clone(), watch));
    }

    let app = axum::Router::new()
        .route("/search", get(api::search))
        .route("/departures", get(api::departures))
        .route("/board", get(api::board))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .unwrap();
    info!("Listening to port {}", config.port);
    axum::serve(listener, app).await.unwrap();
}
