use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{dto::PassDto, state::AppState};

/// Latest result of the background poller. 404 until the first cycle ran,
/// 503 with the error when the last cycle failed.
pub async fn board(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    let board = state.board.read().await;
    match board.as_ref() {
        Some(Ok(passes)) => {
            let result: Vec<PassDto> = passes.iter().cloned().map(PassDto::from).collect();
            Ok(Json(result).into_response())
        }
        Some(Err(message)) => {
            Ok((StatusCode::SERVICE_UNAVAILABLE, message.clone()).into_response())
        }
        None => Err(StatusCode::NOT_FOUND),
    }
}
