use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use scoreline_db::{LedgerError, NewMatch};
use scoreline_types::api::{AssignWinnerRequest, RecordMatchRequest};

use crate::ApiError;
use crate::extract::{Json, Path};
use crate::state::{AppState, blocking};

pub async fn record_match(
    State(state): State<AppState>,
    Json(req): Json<RecordMatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new = NewMatch {
        player1: req.player1,
        player2: req.player2,
        score1: req.score1,
        score2: req.score2,
        tournament: req.tournament,
        winner: req.winner,
    };
    let m = blocking(&state, move |db| db.record_match_result(&new)).await?;
    Ok((StatusCode::CREATED, Json(m)))
}

pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let m = blocking(&state, move |db| {
        db.get_match(match_id)?
            .ok_or_else(|| LedgerError::not_found("match", match_id))
    })
    .await?;
    Ok(Json(m))
}

/// PUT /matches/{id}/winner: tie-break for a drawn match.
pub async fn assign_winner(
    State(state): State<AppState>,
    Path(match_id): Path<Uuid>,
    Json(req): Json<AssignWinnerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let m = blocking(&state, move |db| db.assign_match_winner(match_id, req.winner)).await?;
    Ok(Json(m))
}
