//! Accounting operations: profile creation, match results and tournament
//! settlement. Every public operation is a single write transaction.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction, params};
use tracing::{debug, info};
use uuid::Uuid;

use scoreline_types::models::{Match, Profile, Tournament};

use crate::models::{format_timestamp, now};
use crate::queries::{profile_exists, query_match, query_tournament, tournament_exists};
use crate::{Database, LedgerError, Result};

/// A reported head-to-head result, before validation.
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub player1: Uuid,
    pub player2: Uuid,
    pub score1: i64,
    pub score2: i64,
    pub tournament: Option<Uuid>,
    /// Explicit tie-break; when unset the higher score wins.
    pub winner: Option<Uuid>,
}

impl NewMatch {
    pub fn new(player1: Uuid, player2: Uuid, score1: i64, score2: i64) -> Self {
        Self {
            player1,
            player2,
            score1,
            score2,
            tournament: None,
            winner: None,
        }
    }

    pub fn in_tournament(mut self, tournament: Uuid) -> Self {
        self.tournament = Some(tournament);
        self
    }

    pub fn with_winner(mut self, winner: Uuid) -> Self {
        self.winner = Some(winner);
        self
    }

    /// Checks everything that does not need the store and returns the winner,
    /// if any.
    fn resolve_winner(&self) -> Result<Option<Uuid>> {
        for score in [self.score1, self.score2] {
            if !(0..=i64::from(u32::MAX)).contains(&score) {
                return Err(LedgerError::InvalidScore(score));
            }
        }
        if self.player1 == self.player2 {
            return Err(LedgerError::InvalidPlayers);
        }

        match self.winner {
            Some(w) if w == self.player1 || w == self.player2 => Ok(Some(w)),
            Some(_) => Err(LedgerError::InvalidPlayers),
            None => Ok(match self.score1.cmp(&self.score2) {
                Ordering::Greater => Some(self.player1),
                Ordering::Less => Some(self.player2),
                Ordering::Equal => None,
            }),
        }
    }
}

impl Database {
    /// Record a match and, when it has a winner, bump the winner's wins and
    /// the loser's losses in the same transaction.
    pub fn record_match_result(&self, new: &NewMatch) -> Result<Match> {
        let winner = new.resolve_winner()?;

        let m = Match {
            id: Uuid::new_v4(),
            player1: new.player1,
            player2: new.player2,
            player1_score: new.score1 as u32,
            player2_score: new.score2 as u32,
            winner,
            tournament: new.tournament,
            created_at: now(),
        };

        self.transact(|tx| {
            for player in [m.player1, m.player2] {
                if !profile_exists(tx, player)? {
                    return Err(LedgerError::InvalidPlayers);
                }
            }
            if let Some(tournament) = m.tournament {
                if !tournament_exists(tx, tournament)? {
                    return Err(LedgerError::not_found("tournament", tournament));
                }
            }

            tx.execute(
                "INSERT INTO matches (id, player1_id, player2_id, player1_score, player2_score,
                                      winner_id, tournament_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    m.id.to_string(),
                    m.player1.to_string(),
                    m.player2.to_string(),
                    m.player1_score,
                    m.player2_score,
                    m.winner.map(|w| w.to_string()),
                    m.tournament.map(|t| t.to_string()),
                    format_timestamp(m.created_at),
                ],
            )?;

            if let Some(w) = m.winner {
                apply_result(tx, w, opponent(&m, w))?;
            }
            Ok(())
        })?;

        debug!(
            "Recorded match {} ({} {} - {} {}), winner {:?}",
            m.id, m.player1, m.player1_score, m.player2_score, m.player2, m.winner
        );
        Ok(m)
    }

    /// Back-assign the winner of a drawn match, applying the accounting that
    /// [`Database::record_match_result`] skipped.
    pub fn assign_match_winner(&self, match_id: Uuid, winner: Uuid) -> Result<Match> {
        let m = self.transact(|tx| {
            let mut m = query_match(tx, match_id)?
                .ok_or_else(|| LedgerError::not_found("match", match_id))?;
            if !m.has_player(winner) {
                return Err(LedgerError::InvalidPlayers);
            }
            if m.winner.is_some() {
                return Err(LedgerError::WinnerAlreadyAssigned(match_id));
            }

            tx.execute(
                "UPDATE matches SET winner_id = ?1 WHERE id = ?2",
                (winner.to_string(), match_id.to_string()),
            )?;
            apply_result(tx, winner, opponent(&m, winner))?;

            m.winner = Some(winner);
            Ok(m)
        })?;

        debug!("Assigned winner {} to match {}", winner, match_id);
        Ok(m)
    }

    /// Create a tournament over `match_ids` won by `winner`.
    ///
    /// Duplicate ids collapse. The winner must be an existing profile that
    /// played in at least one of the matches, and none of them may already
    /// belong to a tournament.
    pub fn settle_tournament(&self, match_ids: &[Uuid], winner: Uuid) -> Result<Tournament> {
        let ids = dedup(match_ids);
        if ids.is_empty() {
            return Err(LedgerError::EmptyMatchSet);
        }

        let tournament_id = Uuid::new_v4();
        let created_at = format_timestamp(now());

        let tournament = self.transact(|tx| {
            let mut participated = false;
            for &id in &ids {
                let m = query_match(tx, id)?.ok_or_else(|| LedgerError::not_found("match", id))?;
                if m.tournament.is_some() {
                    return Err(LedgerError::MatchAlreadySettled(id));
                }
                participated |= m.has_player(winner);
            }
            if !profile_exists(tx, winner)? {
                return Err(LedgerError::not_found("profile", winner));
            }
            if !participated {
                return Err(LedgerError::WinnerNotParticipant(winner));
            }

            tx.execute(
                "INSERT INTO tournaments (id, winner_id, created_at) VALUES (?1, ?2, ?3)",
                (tournament_id.to_string(), winner.to_string(), &created_at),
            )?;

            let mut stmt = tx.prepare("UPDATE matches SET tournament_id = ?1 WHERE id = ?2")?;
            for id in &ids {
                stmt.execute((tournament_id.to_string(), id.to_string()))?;
            }

            query_tournament(tx, tournament_id)?.ok_or_else(|| {
                LedgerError::CorruptRow(format!("tournament {} vanished mid-transaction", tournament_id))
            })
        })?;

        info!(
            "Settled tournament {} over {} matches, winner {}",
            tournament.id,
            tournament.matches.len(),
            tournament.winner
        );
        Ok(tournament)
    }
}

/// Profile-creation entry point. Called by account creation inside its own
/// transaction so that an account never exists without its profile.
pub fn create_profile(
    tx: &Transaction<'_>,
    account_id: Uuid,
    username: &str,
    created_at: DateTime<Utc>,
) -> Result<Profile> {
    let profile = Profile {
        id: Uuid::new_v4(),
        username: username.to_string(),
        wins: 0,
        losses: 0,
        created_at,
    };

    tx.execute(
        "INSERT INTO profiles (id, account_id, created_at) VALUES (?1, ?2, ?3)",
        (
            profile.id.to_string(),
            account_id.to_string(),
            format_timestamp(created_at),
        ),
    )?;

    Ok(profile)
}

/// Counter increments are done in SQL so that concurrent writers never lose
/// an update.
fn apply_result(conn: &Connection, winner: Uuid, loser: Uuid) -> Result<()> {
    conn.execute(
        "UPDATE profiles SET wins = wins + 1 WHERE id = ?1",
        [winner.to_string()],
    )?;
    conn.execute(
        "UPDATE profiles SET losses = losses + 1 WHERE id = ?1",
        [loser.to_string()],
    )?;
    Ok(())
}

fn opponent(m: &Match, player: Uuid) -> Uuid {
    if m.player1 == player { m.player2 } else { m.player1 }
}

/// Drop repeated ids, keeping first occurrence order.
pub(crate) fn dedup(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
