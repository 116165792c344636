use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Path for a throwaway database file; the file and its WAL companions are
/// removed when the guard drops.
pub struct TempDbPath(PathBuf);

impl TempDbPath {
    pub fn new(label: &str) -> Self {
        Self(std::env::temp_dir().join(format!("scoreline_{}_{}.db", label, Uuid::new_v4())))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempDbPath {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut p = self.0.clone().into_os_string();
            p.push(suffix);
            let _ = std::fs::remove_file(p);
        }
    }
}
