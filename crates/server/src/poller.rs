use std::{sync::Arc, time::Duration};

use halte::realtime::{self, PassFilter};
use tracing::{debug, warn};

use crate::{config::WatchConfig, state::AppState};

/// Polls the watched stop set on a fixed interval and swaps the results
/// into shared state wholesale. The upstream drives its own retry rhythm:
/// a failed cycle just leaves an error on the board until the next tick.
pub async fn run(state: Arc<AppState>, watch: WatchConfig) {
    let filter = PassFilter::new(watch.line.clone(), watch.destination.clone());
    let mut interval = tokio::time::interval(Duration::from_secs(watch.poll_interval_secs));

    loop {
        interval.tick().await;
        let board =
            match realtime::fetch_and_combine(&state.client, &watch.stop_codes, &filter).await {
                Ok(passes) => {
                    debug!("Board refreshed with {} passes", passes.len());
                    Ok(passes)
                }
                Err(err) => {
                    warn!("Board refresh failed: {err}");
                    Err(err.to_string())
                }
            };
        *state.board.write().await = Some(board);
    }
}
