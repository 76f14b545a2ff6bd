//! Persistent banlist of client identities
//!
//! A concurrency-safe set of banned identities backed by a flat file,
//! one identity per line. The file is read once at startup and rewritten
//! in full after each mutation. A single lock serializes membership
//! checks, inserts and persistence, so a save never observes a
//! half-applied mutation and concurrent inserts are all retained.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::error::{DefenderError, Result};

pub struct BanList {
    path: PathBuf,
    entries: Mutex<HashSet<String>>,
}

impl BanList {
    /// Loads the banlist from `path`.
    ///
    /// A missing file yields an empty banlist. Blank lines are skipped.
    /// Any other read failure is fatal.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(DefenderError::BanlistStorage { path, source: e }),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub async fn contains(&self, identity: &str) -> bool {
        self.entries.lock().await.contains(identity)
    }

    /// Idempotent insert; returns whether the identity was newly added.
    pub async fn add(&self, identity: &str) -> bool {
        self.entries.lock().await.insert(identity.to_string())
    }

    /// Writes the complete current set, one identity per line.
    ///
    /// The lock is held for the duration of the write so concurrent
    /// saves cannot interleave their file contents.
    pub async fn save(&self) -> Result<()> {
        let entries = self.entries.lock().await;

        let mut content = entries
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        if !content.is_empty() {
            content.push('\n');
        }

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| DefenderError::BanlistStorage {
                path: self.path.clone(),
                source: e,
            })
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
