use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::realtime::{self, Pass, PassFilter, ShapeError};

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("request for stop {code} failed: {message}")]
    Fetch { code: String, message: String },
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Boundary to the live-data endpoint. The engine only needs the raw JSON
/// body per stop code; transport mechanics (timeouts, retries) live behind
/// the implementation.
pub trait StopFeed {
    fn fetch_stop(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<Value, FeedError>> + Send;
}

/// Fetches every stop code, flattens each payload with the filter and merges
/// the results into one globally time-ordered list. A bidirectional query
/// must come back as a single timetable, not two concatenated ones.
///
/// Any single fetch or shape failure fails the whole call: a partial list
/// silently presented as "no buses" would mislead the rider.
pub async fn fetch_and_combine<F: StopFeed>(
    feed: &F,
    codes: &[String],
    filter: &PassFilter,
) -> Result<Vec<Pass>, FeedError> {
    let mut combined = Vec::new();
    for code in codes {
        let payload = feed.fetch_stop(code).await?;
        let passes = realtime::extract_passes(&payload, filter)?;
        debug!("Stop {code} returned {} passes", passes.len());
        combined.extend(passes);
    }
    combined.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
    Ok(combined)
}

/// Best-effort validation path: returns the subset of codes that currently
/// serve live data. Per-code failures are skipped, not propagated.
pub async fn probe_stops<F: StopFeed>(feed: &F, codes: &[String]) -> Vec<String> {
    let filter = PassFilter::default();
    let mut live = Vec::new();
    for code in codes {
        match feed.fetch_stop(code).await {
            Ok(payload) => match realtime::extract_passes(&payload, &filter) {
                Ok(passes) if !passes.is_empty() => live.push(code.clone()),
                Ok(_) => debug!("Stop {code} has no upcoming passes"),
                Err(err) => debug!("Stop {code} returned an unusable payload: {err}"),
            },
            Err(err) => debug!("Stop {code} validation failed: {err}"),
        }
    }
    live
}
