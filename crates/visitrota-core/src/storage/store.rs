//! JSON snapshot store for the rotation ledger.
//!
//! The whole application state loads and saves as one consistent unit. A
//! mutation runs against a draft copy and is committed to memory only after
//! the snapshot hits disk via temp-file + rename, so a validation error or a
//! failed write leaves both memory and disk exactly as they were.

use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::Result;
use crate::model::{Group, Rotation, SkipWeek, User};

/// Full application state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub skip_weeks: Vec<SkipWeek>,
    #[serde(default)]
    pub rotations: Vec<Rotation>,
}

impl AppState {
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    pub fn rotation(&self, id: &str) -> Option<&Rotation> {
        self.rotations.iter().find(|r| r.id == id)
    }

    pub fn rotation_mut(&mut self, id: &str) -> Option<&mut Rotation> {
        self.rotations.iter_mut().find(|r| r.id == id)
    }
}

/// Snapshot store backed by a single JSON file.
pub struct Store {
    path: PathBuf,
    state: RwLock<AppState>,
}

impl Store {
    /// Open the store at `<data_dir>/visitrota.json`.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("visitrota.json"))
    }

    /// Open the store at a specific path (tests).
    pub fn open_at(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            AppState::default()
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Run a read-only closure against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let guard = self.state.read().unwrap();
        f(&guard)
    }

    /// Apply a mutation and persist the new snapshot.
    ///
    /// The closure works on a draft; if it errors, or the snapshot cannot be
    /// written, nothing changes in memory either.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut AppState) -> Result<R>) -> Result<R> {
        let mut guard = self.state.write().unwrap();
        let mut draft = guard.clone();
        let out = f(&mut draft)?;
        self.persist(&draft)?;
        *guard = draft;
        Ok(out)
    }

    fn persist(&self, state: &AppState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RotaError;
    use chrono::Utc;

    fn test_user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            name: id.to_string(),
            calendar_tokens: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = Store::open_at(path.clone()).unwrap();
        store
            .mutate(|state| {
                state.users.push(test_user("u1"));
                Ok(())
            })
            .unwrap();
        drop(store);

        let reopened = Store::open_at(path).unwrap();
        assert!(reopened.read(|s| s.user("u1").is_some()));
    }

    #[test]
    fn failed_mutation_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_at(dir.path().join("state.json")).unwrap();
        store
            .mutate(|state| {
                state.users.push(test_user("u1"));
                Ok(())
            })
            .unwrap();

        let result: Result<()> = store.mutate(|state| {
            state.users.push(test_user("u2"));
            Err(RotaError::invalid("test", "forced failure"))
        });
        assert!(result.is_err());
        assert_eq!(store.read(|s| s.users.len()), 1);
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_at(dir.path().join("absent.json")).unwrap();
        assert_eq!(store.read(|s| s.users.len()), 0);
        assert_eq!(store.read(|s| s.rotations.len()), 0);
    }
}
