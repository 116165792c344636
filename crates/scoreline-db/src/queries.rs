use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use scoreline_types::models::{Chat, Friend, Match, Message, Profile, ProfileDetail, Tournament};

use crate::models::{
    ChatRow, MatchRow, MessageRow, ProfileRow, TournamentRow, format_timestamp, parse_id,
};
use crate::{Database, Result};

impl Database {
    // -- Profiles --

    pub fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        self.with_conn(|conn| query_profile(conn, id))
    }

    /// Profile plus friends, match and tournament counts, all computed here
    /// rather than stored.
    pub fn get_profile_detail(&self, id: Uuid) -> Result<Option<ProfileDetail>> {
        self.with_conn(|conn| {
            let Some(profile) = query_profile(conn, id)? else {
                return Ok(None);
            };

            let key = id.to_string();
            let (matches_played, matches_won): (i64, i64) = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(winner_id = ?1), 0)
                 FROM matches
                 WHERE player1_id = ?1 OR player2_id = ?1",
                [&key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            let tournaments_won: i64 = conn.query_row(
                "SELECT COUNT(*) FROM tournaments WHERE winner_id = ?1",
                [&key],
                |row| row.get(0),
            )?;

            Ok(Some(ProfileDetail {
                profile,
                friends: query_friends(conn, id)?,
                matches_played: matches_played as u64,
                matches_won: matches_won as u64,
                tournaments_won: tournaments_won as u64,
            }))
        })
    }

    /// All profiles, newest first.
    pub fn list_profiles(&self) -> Result<Vec<Profile>> {
        self.with_conn(|conn| {
            let sql = format!("{} ORDER BY p.created_at DESC, p.rowid DESC", ProfileRow::SELECT);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], ProfileRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(Profile::try_from).collect()
        })
    }

    // -- Matches --

    pub fn get_match(&self, id: Uuid) -> Result<Option<Match>> {
        self.with_conn(|conn| query_match(conn, id))
    }

    /// Matches the profile played in either seat, newest first.
    pub fn list_matches_for_profile(&self, profile_id: Uuid, limit: u32) -> Result<Vec<Match>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{} WHERE m.player1_id = ?1 OR m.player2_id = ?1
                 ORDER BY m.created_at DESC, m.rowid DESC
                 LIMIT ?2",
                MatchRow::SELECT
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![profile_id.to_string(), limit], MatchRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(Match::try_from).collect()
        })
    }

    // -- Tournaments --

    pub fn get_tournament(&self, id: Uuid) -> Result<Option<Tournament>> {
        self.with_conn(|conn| query_tournament(conn, id))
    }

    /// Tournaments, newest first.
    pub fn list_tournaments(&self, limit: u32) -> Result<Vec<Tournament>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, winner_id, created_at FROM tournaments
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit], TournamentRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|row| {
                    let match_ids = query_tournament_match_ids(conn, &row.id)?;
                    row.into_model(match_ids)
                })
                .collect()
        })
    }

    // -- Friends --

    pub fn list_friends(&self, profile_id: Uuid) -> Result<Vec<Friend>> {
        self.with_conn(|conn| query_friends(conn, profile_id))
    }

    pub fn are_friends(&self, a: Uuid, b: Uuid) -> Result<bool> {
        let (low, high) = canonical_pair(a, b);
        self.with_conn(|conn| {
            let found: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM friendships WHERE profile_low = ?1 AND profile_high = ?2)",
                (low, high),
                |row| row.get(0),
            )?;
            Ok(found)
        })
    }

    // -- Chats --

    pub fn get_chat(&self, id: Uuid) -> Result<Option<Chat>> {
        self.with_conn(|conn| query_chat(conn, id))
    }

    /// Chats the profile currently participates in, newest first.
    pub fn list_chats_for_profile(&self, profile_id: Uuid) -> Result<Vec<Chat>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.created_at
                 FROM chats c
                 JOIN chat_participants cp ON cp.chat_id = c.id
                 WHERE cp.profile_id = ?1
                 ORDER BY c.created_at DESC, c.rowid DESC",
            )?;
            let rows = stmt
                .query_map([profile_id.to_string()], |row| {
                    Ok(ChatRow {
                        id: row.get(0)?,
                        created_at: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|row| {
                    let participants = query_participant_ids(conn, &row.id)?;
                    row.into_model(participants)
                })
                .collect()
        })
    }

    /// Messages of a chat, newest first. A cursor pages backwards from the
    /// oldest message of the previous page.
    pub fn list_messages(
        &self,
        chat_id: Uuid,
        limit: u32,
        cursor: Option<MessageCursor>,
    ) -> Result<Vec<Message>> {
        let before = cursor.map(|c| format_timestamp(c.created_at));
        let before_id = cursor.and_then(|c| c.id).map(|id| id.to_string());

        self.with_conn(|conn| {
            // JOIN profiles/accounts to fetch sender_username in a single query
            let mut stmt = conn.prepare(
                "SELECT m.id, m.chat_id, m.sender_id, a.username, m.content, m.created_at
                 FROM messages m
                 LEFT JOIN profiles p ON p.id = m.sender_id
                 LEFT JOIN accounts a ON a.id = p.account_id
                 WHERE m.chat_id = ?1
                   AND (?2 IS NULL
                        OR m.created_at < ?2
                        OR (m.created_at = ?2 AND ?3 IS NOT NULL AND m.id < ?3))
                 ORDER BY m.created_at DESC, m.id DESC
                 LIMIT ?4",
            )?;
            let rows = stmt
                .query_map(
                    params![chat_id.to_string(), before, before_id, limit],
                    MessageRow::from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(Message::try_from).collect()
        })
    }
}

/// Position in a chat's history. Pages continue strictly older than it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCursor {
    pub created_at: DateTime<Utc>,
    /// Orders messages that share `created_at`. Without it, every message at
    /// exactly `created_at` is skipped.
    pub id: Option<Uuid>,
}

impl MessageCursor {
    /// Everything strictly before `created_at`.
    pub fn before(created_at: DateTime<Utc>) -> Self {
        Self { created_at, id: None }
    }

    /// Everything older than `message`, including same-instant messages that
    /// sort after it.
    pub fn after(message: &Message) -> Self {
        Self {
            created_at: message.created_at,
            id: Some(message.id),
        }
    }
}

// -- Connection-level helpers, shared with the write paths --

pub(crate) fn query_profile(conn: &Connection, id: Uuid) -> Result<Option<Profile>> {
    let sql = format!("{} WHERE p.id = ?1", ProfileRow::SELECT);
    let row = conn
        .query_row(&sql, [id.to_string()], ProfileRow::from_row)
        .optional()?;
    row.map(Profile::try_from).transpose()
}

pub(crate) fn profile_exists(conn: &Connection, id: Uuid) -> Result<bool> {
    exists(conn, "SELECT EXISTS(SELECT 1 FROM profiles WHERE id = ?1)", id)
}

pub(crate) fn tournament_exists(conn: &Connection, id: Uuid) -> Result<bool> {
    exists(conn, "SELECT EXISTS(SELECT 1 FROM tournaments WHERE id = ?1)", id)
}

pub(crate) fn chat_exists(conn: &Connection, id: Uuid) -> Result<bool> {
    exists(conn, "SELECT EXISTS(SELECT 1 FROM chats WHERE id = ?1)", id)
}

pub(crate) fn is_participant(conn: &Connection, chat_id: Uuid, profile_id: Uuid) -> Result<bool> {
    let found: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM chat_participants WHERE chat_id = ?1 AND profile_id = ?2)",
        (chat_id.to_string(), profile_id.to_string()),
        |row| row.get(0),
    )?;
    Ok(found)
}

pub(crate) fn query_match(conn: &Connection, id: Uuid) -> Result<Option<Match>> {
    let sql = format!("{} WHERE m.id = ?1", MatchRow::SELECT);
    let row = conn
        .query_row(&sql, [id.to_string()], MatchRow::from_row)
        .optional()?;
    row.map(Match::try_from).transpose()
}

pub(crate) fn query_tournament(conn: &Connection, id: Uuid) -> Result<Option<Tournament>> {
    let row = conn
        .query_row(
            "SELECT id, winner_id, created_at FROM tournaments WHERE id = ?1",
            [id.to_string()],
            TournamentRow::from_row,
        )
        .optional()?;

    match row {
        Some(row) => {
            let match_ids = query_tournament_match_ids(conn, &row.id)?;
            row.into_model(match_ids).map(Some)
        }
        None => Ok(None),
    }
}

pub(crate) fn query_chat(conn: &Connection, id: Uuid) -> Result<Option<Chat>> {
    let row = conn
        .query_row(
            "SELECT id, created_at FROM chats WHERE id = ?1",
            [id.to_string()],
            |row| {
                Ok(ChatRow {
                    id: row.get(0)?,
                    created_at: row.get(1)?,
                })
            },
        )
        .optional()?;

    match row {
        Some(row) => {
            let participants = query_participant_ids(conn, &row.id)?;
            row.into_model(participants).map(Some)
        }
        None => Ok(None),
    }
}

/// Both ends of a friendship in the order they are stored.
pub(crate) fn canonical_pair(a: Uuid, b: Uuid) -> (String, String) {
    let (a, b) = (a.to_string(), b.to_string());
    if a < b { (a, b) } else { (b, a) }
}

fn query_friends(conn: &Connection, profile_id: Uuid) -> Result<Vec<Friend>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, a.username
         FROM friendships f
         JOIN profiles p
           ON p.id = CASE WHEN f.profile_low = ?1 THEN f.profile_high ELSE f.profile_low END
         JOIN accounts a ON a.id = p.account_id
         WHERE f.profile_low = ?1 OR f.profile_high = ?1
         ORDER BY a.username",
    )?;

    let rows = stmt
        .query_map([profile_id.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, username)| {
            Ok(Friend {
                id: parse_id(&id)?,
                username,
            })
        })
        .collect()
}

fn query_tournament_match_ids(conn: &Connection, tournament_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT id FROM matches WHERE tournament_id = ?1 ORDER BY created_at, rowid",
    )?;
    let ids = stmt
        .query_map([tournament_id], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

fn query_participant_ids(conn: &Connection, chat_id: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT profile_id FROM chat_participants WHERE chat_id = ?1 ORDER BY rowid")?;
    let ids = stmt
        .query_map([chat_id], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

fn exists(conn: &Connection, sql: &str, id: Uuid) -> Result<bool> {
    let found: bool = conn.query_row(sql, [id.to_string()], |row| row.get(0))?;
    Ok(found)
}
