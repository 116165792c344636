use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Accounts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAccountRequest {
    pub username: String,
    pub email: String,
}

// -- Matches --

/// Scores are signed on the wire so that a negative score reaches the ledger
/// and is rejected there instead of failing deserialization.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordMatchRequest {
    pub player1: Uuid,
    pub player2: Uuid,
    pub score1: i64,
    pub score2: i64,
    #[serde(default)]
    pub tournament: Option<Uuid>,
    /// Explicit tie-break decided upstream; overrides the score-derived winner.
    #[serde(default)]
    pub winner: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssignWinnerRequest {
    pub winner: Uuid,
}

// -- Tournaments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettleTournamentRequest {
    pub match_ids: Vec<Uuid>,
    pub winner: Uuid,
}

// -- Friends --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FriendPairRequest {
    pub a: Uuid,
    pub b: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FriendshipResponse {
    pub friends: bool,
}

// -- Chats --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateChatRequest {
    pub participants: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostMessageRequest {
    pub chat: Uuid,
    pub sender: Uuid,
    pub content: String,
}

// -- Listing --

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Cursor: pass the `created_at` of the oldest message from the previous
    /// page to fetch older messages.
    pub before: Option<DateTime<Utc>>,
    /// The `id` of that same message, so messages sharing its timestamp are
    /// not skipped. Ignored without `before`.
    pub before_id: Option<Uuid>,
}

pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 200;

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
