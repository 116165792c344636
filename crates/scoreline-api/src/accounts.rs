use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use scoreline_db::LedgerError;
use scoreline_types::api::{CreateAccountRequest, ListQuery, MAX_LIMIT};

use crate::ApiError;
use crate::extract::{Json, Path, Query};
use crate::state::{AppState, blocking};

/// POST /accounts: creates the account and, with it, the profile.
pub async fn create_account(
    State(state): State<AppState>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = blocking(&state, move |db| db.create_account(&req.username, &req.email)).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |db| db.delete_account(profile_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_profiles(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let profiles = blocking(&state, |db| db.list_profiles()).await?;
    Ok(Json(profiles))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = blocking(&state, move |db| {
        db.get_profile_detail(profile_id)?
            .ok_or_else(|| LedgerError::not_found("profile", profile_id))
    })
    .await?;
    Ok(Json(detail))
}

pub async fn list_profile_matches(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.min(MAX_LIMIT);
    let matches = blocking(&state, move |db| {
        require_profile(db, profile_id)?;
        db.list_matches_for_profile(profile_id, limit)
    })
    .await?;
    Ok(Json(matches))
}

pub async fn list_profile_friends(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let friends = blocking(&state, move |db| {
        require_profile(db, profile_id)?;
        db.list_friends(profile_id)
    })
    .await?;
    Ok(Json(friends))
}

pub async fn list_profile_chats(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let chats = blocking(&state, move |db| {
        require_profile(db, profile_id)?;
        db.list_chats_for_profile(profile_id)
    })
    .await?;
    Ok(Json(chats))
}

fn require_profile(db: &scoreline_db::Database, profile_id: Uuid) -> scoreline_db::Result<()> {
    match db.get_profile(profile_id)? {
        Some(_) => Ok(()),
        None => Err(LedgerError::not_found("profile", profile_id)),
    }
}
