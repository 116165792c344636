use std::ops::Deref;
use std::path::PathBuf;

use uuid::Uuid;

use scoreline_types::models::Profile;

use crate::Database;

/// A database in a throwaway file, removed (with its WAL files) on drop.
pub struct TestDb {
    db: Database,
    path: PathBuf,
}

impl TestDb {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("scoreline_test_{}.db", Uuid::new_v4()));
        let db = Database::open(&path).expect("open test database");
        Self { db, path }
    }

    pub fn profile(&self, username: &str) -> Profile {
        self.db
            .create_account(username, &format!("{}@example.com", username))
            .expect("create test account")
    }
}

impl Deref for TestDb {
    type Target = Database;

    fn deref(&self) -> &Database {
        &self.db
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut p = self.path.clone().into_os_string();
            p.push(suffix);
            let _ = std::fs::remove_file(p);
        }
    }
}
