use rusqlite::{Connection, TransactionBehavior};
use tracing::info;

use crate::Result;

/// Bring the schema up to date. The version is read and bumped under the
/// write lock, so concurrent openers of a fresh file apply each step once.
pub fn run(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = tx.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial ledger schema)");
        tx.execute_batch(
            "
            CREATE TABLE accounts (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                email       TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE profiles (
                id          TEXT PRIMARY KEY,
                account_id  TEXT NOT NULL UNIQUE REFERENCES accounts(id) ON DELETE CASCADE,
                wins        INTEGER NOT NULL DEFAULT 0 CHECK (wins >= 0),
                losses      INTEGER NOT NULL DEFAULT 0 CHECK (losses >= 0),
                created_at  TEXT NOT NULL
            );

            -- One row per unordered pair, stored as (low, high).
            CREATE TABLE friendships (
                profile_low   TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                profile_high  TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                created_at    TEXT NOT NULL,
                PRIMARY KEY (profile_low, profile_high),
                CHECK (profile_low < profile_high)
            );

            CREATE INDEX idx_friendships_high ON friendships(profile_high);

            CREATE TABLE tournaments (
                id          TEXT PRIMARY KEY,
                winner_id   TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_tournaments_created ON tournaments(created_at);

            CREATE TABLE matches (
                id              TEXT PRIMARY KEY,
                player1_id      TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                player2_id      TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                player1_score   INTEGER NOT NULL CHECK (player1_score >= 0),
                player2_score   INTEGER NOT NULL CHECK (player2_score >= 0),
                winner_id       TEXT REFERENCES profiles(id) ON DELETE SET NULL,
                tournament_id   TEXT REFERENCES tournaments(id) ON DELETE SET NULL,
                created_at      TEXT NOT NULL,
                CHECK (player1_id <> player2_id),
                CHECK (winner_id IS NULL OR winner_id = player1_id OR winner_id = player2_id)
            );

            CREATE INDEX idx_matches_player1 ON matches(player1_id, created_at);
            CREATE INDEX idx_matches_player2 ON matches(player2_id, created_at);
            CREATE INDEX idx_matches_tournament ON matches(tournament_id);

            CREATE TABLE chats (
                id          TEXT PRIMARY KEY,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE chat_participants (
                chat_id     TEXT NOT NULL REFERENCES chats(id) ON DELETE CASCADE,
                profile_id  TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                PRIMARY KEY (chat_id, profile_id)
            );

            CREATE INDEX idx_chat_participants_profile ON chat_participants(profile_id);

            CREATE TABLE messages (
                id          TEXT PRIMARY KEY,
                chat_id     TEXT NOT NULL REFERENCES chats(id) ON DELETE CASCADE,
                sender_id   TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                content     TEXT NOT NULL CHECK (length(content) > 0),
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_messages_chat ON messages(chat_id, created_at, id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }
    tx.commit()?;

    info!("Database migrations complete");
    Ok(())
}
