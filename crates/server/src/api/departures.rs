use std::{collections::HashMap, sync::Arc};

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use halte::realtime::{self, PassFilter};
use tracing::warn;

use crate::{dto::PassDto, state::AppState};

/// On-demand departure query for one or more stop codes (comma separated).
/// Either the complete combined list comes back or an error does; a missing
/// direction is never silently dropped.
pub async fn departures(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let Some(codes) = params.get("codes") else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let codes: Vec<String> = codes
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect();
    if codes.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let filter = PassFilter::new(
        params.get("line").cloned(),
        params.get("destination").cloned(),
    );

    match realtime::fetch_and_combine(&state.client, &codes, &filter).await {
        Ok(passes) => {
            let result: Vec<PassDto> = passes.into_iter().map(PassDto::from).collect();
            Ok(Json(result).into_response())
        }
        Err(err) => {
            warn!("Departure query failed: {err}");
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}
