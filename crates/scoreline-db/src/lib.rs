pub mod accounts;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod relations;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{ErrorKind, LedgerError, Result};
pub use ledger::NewMatch;
pub use queries::MessageCursor;

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, Transaction, TransactionBehavior};
use tracing::{info, warn};

const READER_POOL_SIZE: usize = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Ledger store: one writer connection plus a round-robin pool of readers.
/// Every write goes through [`Database::transact`].
pub struct Database {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    reader_idx: AtomicUsize,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_busy_timeout(path, BUSY_TIMEOUT)
    }

    /// Like [`Database::open`], with a custom wait for locks held by other
    /// connections to the same file.
    pub fn open_with_busy_timeout(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let mut writer = Connection::open(path)?;
        writer.busy_timeout(busy_timeout)?;

        // WAL mode for concurrent reads
        writer.pragma_update(None, "journal_mode", "WAL")?;
        writer.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&mut writer)?;

        let mut readers = Vec::with_capacity(READER_POOL_SIZE);
        for _ in 0..READER_POOL_SIZE {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            conn.busy_timeout(busy_timeout)?;
            readers.push(Mutex::new(conn));
        }

        info!(
            "Database opened at {} (1 writer + {} readers)",
            path.display(),
            READER_POOL_SIZE
        );
        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            reader_idx: AtomicUsize::new(0),
        })
    }

    /// Run a read-only closure on the next reader connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let idx = self.reader_idx.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[idx]
            .lock()
            .map_err(|_| LedgerError::LockPoisoned)?;
        f(&conn)
    }

    /// Run `f` inside one `BEGIN IMMEDIATE` transaction on the writer.
    ///
    /// Either every write made by `f` commits or none does. If SQLite is
    /// still busy after its own timeout (another process holds the write
    /// lock), the whole transaction is retried once before giving up with
    /// [`LedgerError::StorageConflict`].
    pub fn transact<F, T>(&self, mut f: F) -> Result<T>
    where
        F: FnMut(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.writer.lock().map_err(|_| LedgerError::LockPoisoned)?;

        let mut retried = false;
        loop {
            match run_once(&mut conn, &mut f) {
                Err(e) if e.is_busy() && !retried => {
                    warn!("Write transaction hit a busy database, retrying once");
                    retried = true;
                }
                Err(e) if e.is_busy() => return Err(LedgerError::StorageConflict),
                other => return other,
            }
        }
    }
}

fn run_once<F, T>(conn: &mut Connection, f: &mut F) -> Result<T>
where
    F: FnMut(&Transaction<'_>) -> Result<T>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}
