use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use scoreline_db::LedgerError;
use scoreline_types::api::{ListQuery, MAX_LIMIT, SettleTournamentRequest};

use crate::ApiError;
use crate::extract::{Json, Path, Query};
use crate::state::{AppState, blocking};

/// POST /tournaments: settles the tournament, then offers it to the external
/// ledger. The mirror runs detached; its failures are only logged.
pub async fn settle_tournament(
    State(state): State<AppState>,
    Json(req): Json<SettleTournamentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tournament =
        blocking(&state, move |db| db.settle_tournament(&req.match_ids, req.winner)).await?;

    state.mirror.spawn_notify(tournament.id, tournament.winner);

    Ok((StatusCode::CREATED, Json(tournament)))
}

pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tournament = blocking(&state, move |db| {
        db.get_tournament(tournament_id)?
            .ok_or_else(|| LedgerError::not_found("tournament", tournament_id))
    })
    .await?;
    Ok(Json(tournament))
}

pub async fn list_tournaments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.min(MAX_LIMIT);
    let tournaments = blocking(&state, move |db| db.list_tournaments(limit)).await?;
    Ok(Json(tournaments))
}
