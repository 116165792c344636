use axum::{
    extract::State,
    response::IntoResponse,
};
use uuid::Uuid;

use scoreline_types::api::{FriendPairRequest, FriendshipResponse, OkResponse};

use crate::ApiError;
use crate::extract::{Json, Path};
use crate::state::{AppState, blocking};

pub async fn add_friend(
    State(state): State<AppState>,
    Json(req): Json<FriendPairRequest>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |db| db.add_friend(req.a, req.b)).await?;
    Ok(Json(OkResponse { ok: true }))
}

pub async fn remove_friend(
    State(state): State<AppState>,
    Json(req): Json<FriendPairRequest>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |db| db.remove_friend(req.a, req.b)).await?;
    Ok(Json(OkResponse { ok: true }))
}

pub async fn check_friendship(
    State(state): State<AppState>,
    Path((a, b)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let friends = blocking(&state, move |db| db.are_friends(a, b)).await?;
    Ok(Json(FriendshipResponse { friends }))
}
