use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use scoreline_db::{LedgerError, MessageCursor};
use scoreline_types::api::{CreateChatRequest, MAX_LIMIT, MessageQuery, PostMessageRequest};

use crate::ApiError;
use crate::extract::{Json, Path, Query};
use crate::state::{AppState, blocking};

pub async fn create_chat(
    State(state): State<AppState>,
    Json(req): Json<CreateChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let chat = blocking(&state, move |db| db.create_chat(&req.participants)).await?;
    Ok((StatusCode::CREATED, Json(chat)))
}

pub async fn get_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let chat = blocking(&state, move |db| {
        db.get_chat(chat_id)?
            .ok_or_else(|| LedgerError::not_found("chat", chat_id))
    })
    .await?;
    Ok(Json(chat))
}

pub async fn leave_chat(
    State(state): State<AppState>,
    Path((chat_id, profile_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |db| db.leave_chat(chat_id, profile_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn post_message(
    State(state): State<AppState>,
    Json(req): Json<PostMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message =
        blocking(&state, move |db| db.post_message(req.chat, req.sender, &req.content)).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.min(MAX_LIMIT);
    let cursor = query.before.map(|created_at| MessageCursor {
        created_at,
        id: query.before_id,
    });

    let messages = blocking(&state, move |db| {
        if db.get_chat(chat_id)?.is_none() {
            return Err(LedgerError::not_found("chat", chat_id));
        }
        db.list_messages(chat_id, limit, cursor)
    })
    .await?;
    Ok(Json(messages))
}
