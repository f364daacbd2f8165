use std::{collections::HashMap, sync::Arc};

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use halte::directory::{self, DEFAULT_SEARCH_LIMIT};
use tracing::error;

use crate::{
    dto::{StopDto, StopGroupDto},
    state::AppState,
};

pub async fn search(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let Some(query) = params.get("q") else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let limit: usize = match params.get("limit") {
        Some(value) => match value.parse() {
            Ok(value) => value,
            Err(_) => return Err(StatusCode::BAD_REQUEST),
        },
        None => DEFAULT_SEARCH_LIMIT,
    };
    let grouped = params.get("grouped").map(String::as_str) != Some("false");

    let stops = state.cache.ensure_fresh().await.map_err(|err| {
        error!("Stop directory unavailable: {err}");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    if grouped {
        let result: Vec<StopGroupDto> = directory::search(&stops, query, limit)
            .into_iter()
            .map(StopGroupDto::from)
            .collect();
        Ok(Json(result).into_response())
    } else {
        let result: Vec<StopDto> = directory::search_flat(&stops, query, limit)
            .into_iter()
            .map(StopDto::from)
            .collect();
        Ok(Json(result).into_response())
    }
}
