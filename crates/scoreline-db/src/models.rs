//! Database row types. These map directly to SQLite rows and are kept
//! distinct from the scoreline-types models so the schema can evolve on its own.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::Row;
use uuid::Uuid;

use scoreline_types::models::{Chat, Match, Message, Profile, Tournament};

use crate::{LedgerError, Result};

pub struct ProfileRow {
    pub id: String,
    pub username: String,
    pub wins: i64,
    pub losses: i64,
    pub created_at: String,
}

impl ProfileRow {
    pub(crate) const SELECT: &'static str = "SELECT p.id, a.username, p.wins, p.losses, p.created_at
         FROM profiles p
         JOIN accounts a ON a.id = p.account_id";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            wins: row.get(2)?,
            losses: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl TryFrom<ProfileRow> for Profile {
    type Error = LedgerError;

    fn try_from(row: ProfileRow) -> Result<Self> {
        Ok(Profile {
            id: parse_id(&row.id)?,
            username: row.username,
            wins: counter(row.wins, &row.id)?,
            losses: counter(row.losses, &row.id)?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

pub struct MatchRow {
    pub id: String,
    pub player1_id: String,
    pub player2_id: String,
    pub player1_score: i64,
    pub player2_score: i64,
    pub winner_id: Option<String>,
    pub tournament_id: Option<String>,
    pub created_at: String,
}

impl MatchRow {
    pub(crate) const SELECT: &'static str = "SELECT m.id, m.player1_id, m.player2_id, m.player1_score, m.player2_score,
                m.winner_id, m.tournament_id, m.created_at
         FROM matches m";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            player1_id: row.get(1)?,
            player2_id: row.get(2)?,
            player1_score: row.get(3)?,
            player2_score: row.get(4)?,
            winner_id: row.get(5)?,
            tournament_id: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

impl TryFrom<MatchRow> for Match {
    type Error = LedgerError;

    fn try_from(row: MatchRow) -> Result<Self> {
        Ok(Match {
            id: parse_id(&row.id)?,
            player1: parse_id(&row.player1_id)?,
            player2: parse_id(&row.player2_id)?,
            player1_score: counter(row.player1_score, &row.id)?,
            player2_score: counter(row.player2_score, &row.id)?,
            winner: row.winner_id.as_deref().map(parse_id).transpose()?,
            tournament: row.tournament_id.as_deref().map(parse_id).transpose()?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

pub struct TournamentRow {
    pub id: String,
    pub winner_id: String,
    pub created_at: String,
}

impl TournamentRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            winner_id: row.get(1)?,
            created_at: row.get(2)?,
        })
    }

    pub(crate) fn into_model(self, match_ids: Vec<String>) -> Result<Tournament> {
        Ok(Tournament {
            id: parse_id(&self.id)?,
            winner: parse_id(&self.winner_id)?,
            matches: match_ids
                .iter()
                .map(|id| parse_id(id))
                .collect::<Result<Vec<_>>>()?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

pub struct ChatRow {
    pub id: String,
    pub created_at: String,
}

impl ChatRow {
    pub(crate) fn into_model(self, participant_ids: Vec<String>) -> Result<Chat> {
        Ok(Chat {
            id: parse_id(&self.id)?,
            participants: participant_ids
                .iter()
                .map(|id| parse_id(id))
                .collect::<Result<Vec<_>>>()?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

pub struct MessageRow {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub sender_username: String,
    pub content: String,
    pub created_at: String,
}

impl MessageRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            chat_id: row.get(1)?,
            sender_id: row.get(2)?,
            sender_username: row
                .get::<_, Option<String>>(3)?
                .unwrap_or_else(|| "unknown".to_string()),
            content: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl TryFrom<MessageRow> for Message {
    type Error = LedgerError;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(Message {
            id: parse_id(&row.id)?,
            chat_id: parse_id(&row.chat_id)?,
            sender_id: parse_id(&row.sender_id)?,
            sender_username: row.sender_username,
            content: row.content,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

/// Current time at the precision timestamps are stored with, so a model
/// returned from a write equals the same model read back.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Timestamps are stored with fixed microsecond precision so that string
/// order equals chronological order.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| LedgerError::CorruptRow(format!("timestamp '{}': {}", raw, e)))
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid> {
    raw.parse()
        .map_err(|e| LedgerError::CorruptRow(format!("id '{}': {}", raw, e)))
}

fn counter(value: i64, row_id: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| LedgerError::CorruptRow(format!("counter {} on row '{}'", value, row_id)))
}
