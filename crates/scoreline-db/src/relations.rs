//! Friendships, chats and messages.

use tracing::debug;
use uuid::Uuid;

use scoreline_types::models::{Chat, Message};

use crate::ledger::dedup;
use crate::models::{format_timestamp, now};
use crate::queries::{
    canonical_pair, chat_exists, is_participant, profile_exists, query_chat, query_profile,
};
use crate::{Database, LedgerError, Result};

impl Database {
    // -- Friends --

    /// Link `a` and `b` as friends. Repeating the call, in either order, has
    /// no further effect.
    pub fn add_friend(&self, a: Uuid, b: Uuid) -> Result<()> {
        if a == b {
            return Err(LedgerError::SelfFriend);
        }
        let (low, high) = canonical_pair(a, b);
        let created_at = format_timestamp(now());

        let inserted = self.transact(|tx| {
            ensure_profiles(tx, &[a, b])?;
            let n = tx.execute(
                "INSERT OR IGNORE INTO friendships (profile_low, profile_high, created_at)
                 VALUES (?1, ?2, ?3)",
                (&low, &high, &created_at),
            )?;
            Ok(n > 0)
        })?;

        if inserted {
            debug!("Profiles {} and {} are now friends", a, b);
        }
        Ok(())
    }

    /// Unlink `a` and `b`. Removing a missing friendship is not an error.
    pub fn remove_friend(&self, a: Uuid, b: Uuid) -> Result<()> {
        if a == b {
            return Err(LedgerError::SelfFriend);
        }
        let (low, high) = canonical_pair(a, b);

        self.transact(|tx| {
            ensure_profiles(tx, &[a, b])?;
            tx.execute(
                "DELETE FROM friendships WHERE profile_low = ?1 AND profile_high = ?2",
                (&low, &high),
            )?;
            Ok(())
        })?;

        debug!("Profiles {} and {} are no longer friends", a, b);
        Ok(())
    }

    // -- Chats --

    /// Open a chat among at least two distinct existing profiles.
    pub fn create_chat(&self, participants: &[Uuid]) -> Result<Chat> {
        let participants = dedup(participants);
        if participants.len() < 2 {
            return Err(LedgerError::TooFewParticipants);
        }

        let chat = Chat {
            id: Uuid::new_v4(),
            participants,
            created_at: now(),
        };

        self.transact(|tx| {
            ensure_profiles(tx, &chat.participants)?;

            tx.execute(
                "INSERT INTO chats (id, created_at) VALUES (?1, ?2)",
                (chat.id.to_string(), format_timestamp(chat.created_at)),
            )?;
            let mut stmt =
                tx.prepare("INSERT INTO chat_participants (chat_id, profile_id) VALUES (?1, ?2)")?;
            for p in &chat.participants {
                stmt.execute((chat.id.to_string(), p.to_string()))?;
            }
            Ok(())
        })?;

        debug!("Created chat {} with {} participants", chat.id, chat.participants.len());
        Ok(chat)
    }

    /// Remove `profile_id` from the chat. Messages it already sent stay.
    pub fn leave_chat(&self, chat_id: Uuid, profile_id: Uuid) -> Result<Chat> {
        let chat = self.transact(|tx| {
            if !chat_exists(tx, chat_id)? {
                return Err(LedgerError::not_found("chat", chat_id));
            }
            let removed = tx.execute(
                "DELETE FROM chat_participants WHERE chat_id = ?1 AND profile_id = ?2",
                (chat_id.to_string(), profile_id.to_string()),
            )?;
            if removed == 0 {
                return Err(LedgerError::NotAParticipant {
                    chat: chat_id,
                    profile: profile_id,
                });
            }
            query_chat(tx, chat_id)?.ok_or_else(|| LedgerError::not_found("chat", chat_id))
        })?;

        debug!("Profile {} left chat {}", profile_id, chat_id);
        Ok(chat)
    }

    /// Post a message. The sender must be a participant at this moment.
    pub fn post_message(&self, chat_id: Uuid, sender_id: Uuid, content: &str) -> Result<Message> {
        if content.trim().is_empty() {
            return Err(LedgerError::EmptyContent);
        }

        let id = Uuid::new_v4();
        let created_at = now();

        let message = self.transact(|tx| {
            if !chat_exists(tx, chat_id)? {
                return Err(LedgerError::not_found("chat", chat_id));
            }
            if !is_participant(tx, chat_id, sender_id)? {
                return Err(LedgerError::NotAParticipant {
                    chat: chat_id,
                    profile: sender_id,
                });
            }
            let sender = query_profile(tx, sender_id)?
                .ok_or_else(|| LedgerError::not_found("profile", sender_id))?;

            tx.execute(
                "INSERT INTO messages (id, chat_id, sender_id, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (
                    id.to_string(),
                    chat_id.to_string(),
                    sender_id.to_string(),
                    content,
                    format_timestamp(created_at),
                ),
            )?;

            Ok(Message {
                id,
                chat_id,
                sender_id,
                sender_username: sender.username,
                content: content.to_string(),
                created_at,
            })
        })?;

        debug!("Message {} posted to chat {}", message.id, chat_id);
        Ok(message)
    }
}

fn ensure_profiles(conn: &rusqlite::Connection, ids: &[Uuid]) -> Result<()> {
    for &id in ids {
        if !profile_exists(conn, id)? {
            return Err(LedgerError::not_found("profile", id));
        }
    }
    Ok(())
}
