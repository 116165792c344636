//! Account hooks. Account identity belongs to the account-management side;
//! the ledger only needs the create and delete events, and receives them as
//! plain calls so the profile lifecycle is visible in the call graph.

use rusqlite::{OptionalExtension, params};
use tracing::{debug, info};
use uuid::Uuid;

use scoreline_types::models::Profile;

use crate::ledger::create_profile;
use crate::models::{format_timestamp, now};
use crate::{Database, LedgerError, Result};

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=32;

impl Database {
    /// Create an account and its profile in one transaction.
    pub fn create_account(&self, username: &str, email: &str) -> Result<Profile> {
        let username = username.trim();
        if !USERNAME_LEN.contains(&username.chars().count()) {
            return Err(LedgerError::InvalidUsername);
        }
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(LedgerError::InvalidEmail);
        }

        let account_id = Uuid::new_v4();
        let created_at = now();

        let profile = self.transact(|tx| {
            let taken: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM accounts WHERE username = ?1)",
                [username],
                |row| row.get(0),
            )?;
            if taken {
                return Err(LedgerError::DuplicateUsername(username.to_string()));
            }

            tx.execute(
                "INSERT INTO accounts (id, username, email, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![account_id.to_string(), username, email, format_timestamp(created_at)],
            )
            .map_err(|e| {
                let err = LedgerError::from(e);
                if err.is_unique_violation() {
                    LedgerError::DuplicateUsername(username.to_string())
                } else {
                    err
                }
            })?;

            create_profile(tx, account_id, username, created_at)
        })?;

        info!("Created account '{}' with profile {}", profile.username, profile.id);
        Ok(profile)
    }

    /// Delete the account that owns `profile_id`.
    ///
    /// The profile goes with it, and with the profile every match it played
    /// in, every tournament it won, its friendships, chat memberships and
    /// messages.
    pub fn delete_account(&self, profile_id: Uuid) -> Result<()> {
        self.transact(|tx| {
            let account_id: Option<String> = tx
                .query_row(
                    "SELECT account_id FROM profiles WHERE id = ?1",
                    [profile_id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            let account_id =
                account_id.ok_or_else(|| LedgerError::not_found("profile", profile_id))?;

            tx.execute("DELETE FROM accounts WHERE id = ?1", [account_id])?;
            Ok(())
        })?;

        debug!("Deleted account of profile {}", profile_id);
        Ok(())
    }
}
