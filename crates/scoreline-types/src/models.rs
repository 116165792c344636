use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub wins: u32,
    pub losses: u32,
    pub created_at: DateTime<Utc>,
}

/// A profile together with the fields derived from its matches and friendships.
/// Nothing here is stored on the profile row; it is all computed at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDetail {
    #[serde(flatten)]
    pub profile: Profile,
    pub friends: Vec<Friend>,
    pub matches_played: u64,
    pub matches_won: u64,
    pub tournaments_won: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub player1: Uuid,
    pub player2: Uuid,
    pub player1_score: u32,
    pub player2_score: u32,
    pub winner: Option<Uuid>,
    pub tournament: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn has_player(&self, profile_id: Uuid) -> bool {
        self.player1 == profile_id || self.player2 == profile_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: Uuid,
    pub winner: Uuid,
    pub matches: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: Uuid,
    pub participants: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub sender_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
