// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Persistent key-value store and the wallet snapshot codec.
//!
//! Balance and withdrawal history are written together as one versioned
//! [`Snapshot`] under a single key, so a crash can never leave them out of
//! step. The older two-key layout (`balance` and `withdrawals`) is still
//! readable and is migrated on first open.

use crate::StoreError;
use crate::withdrawal::Withdrawal;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const SNAPSHOT_KEY: &str = "snapshot";
pub const LEGACY_BALANCE_KEY: &str = "balance";
pub const LEGACY_WITHDRAWALS_KEY: &str = "withdrawals";

/// String-keyed storage that survives restarts.
///
/// A single `set` must be atomic; there is no guarantee across keys.
/// The wallet calls `set` with its state lock held, including from
/// completion timer tasks, so writes should be short and bounded.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// Every `set` rewrites the whole file through a temporary sibling and a
/// rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = fs::File::create(&tmp)?;
        file.write_all(&json)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock();
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush(&entries) {
            // Keep memory in step with disk.
            match previous {
                Some(previous) => entries.insert(key.to_string(), previous),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

/// Persisted wallet state: balance plus withdrawal history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub balance: u64,
    pub withdrawals: Vec<Withdrawal>,
}

impl Snapshot {
    pub const VERSION: u32 = 1;

    pub fn new(balance: u64, withdrawals: Vec<Withdrawal>) -> Self {
        Self {
            version: Self::VERSION,
            balance,
            withdrawals,
        }
    }

    /// Reads the snapshot key. Returns `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Malformed content or an unknown version is an error; nothing is
    /// repaired here.
    pub fn load(store: &dyn Store) -> Result<Option<Self>, StoreError> {
        let Some(raw) = store.get(SNAPSHOT_KEY)? else {
            return Ok(None);
        };
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        if snapshot.version != Self::VERSION {
            return Err(StoreError::UnsupportedVersion(snapshot.version));
        }
        Ok(Some(snapshot))
    }

    /// Writes the snapshot in one `set`.
    pub fn save(&self, store: &dyn Store) -> Result<(), StoreError> {
        let json = serde_json::to_string(self)?;
        store.set(SNAPSHOT_KEY, &json)
    }
}

/// State found under the two-key layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LegacyState {
    pub(crate) balance: Option<u64>,
    pub(crate) withdrawals: Vec<Withdrawal>,
}

/// Reads the two-key layout. Returns `None` if neither key exists.
pub(crate) fn load_legacy(store: &dyn Store) -> Result<Option<LegacyState>, StoreError> {
    let balance = store.get(LEGACY_BALANCE_KEY)?;
    let withdrawals = store.get(LEGACY_WITHDRAWALS_KEY)?;
    if balance.is_none() && withdrawals.is_none() {
        return Ok(None);
    }

    let balance = balance
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| StoreError::MalformedBalance(raw.clone()))
        })
        .transpose()?;
    let withdrawals = match withdrawals {
        Some(raw) => serde_json::from_str(&raw)?,
        None => Vec::new(),
    };

    Ok(Some(LegacyState {
        balance,
        withdrawals,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::WithdrawalId;
    use crate::withdrawal::WithdrawalStatus;

    fn withdrawal(id: u64, status: WithdrawalStatus) -> Withdrawal {
        Withdrawal {
            id: WithdrawalId(id),
            amount: 50,
            username: "alice".into(),
            status,
            date: "15.10.2026".into(),
        }
    }

    #[test]
    fn memory_store_get_set() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn snapshot_round_trip() {
        let store = MemoryStore::new();
        let snapshot = Snapshot::new(
            75,
            vec![
                withdrawal(2, WithdrawalStatus::Pending),
                withdrawal(1, WithdrawalStatus::Failed),
            ],
        );
        snapshot.save(&store).unwrap();

        assert_eq!(Snapshot::load(&store).unwrap(), Some(snapshot));
    }

    #[test]
    fn missing_snapshot_is_none() {
        let store = MemoryStore::new();
        assert_eq!(Snapshot::load(&store).unwrap(), None);
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        let store = MemoryStore::new();
        store.set(SNAPSHOT_KEY, "{not json").unwrap();
        assert!(matches!(
            Snapshot::load(&store),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let store = MemoryStore::new();
        store
            .set(SNAPSHOT_KEY, r#"{"version":7,"balance":1,"withdrawals":[]}"#)
            .unwrap();
        assert!(matches!(
            Snapshot::load(&store),
            Err(StoreError::UnsupportedVersion(7))
        ));
    }

    #[test]
    fn legacy_layout_is_read() {
        let store = MemoryStore::new();
        store.set(LEGACY_BALANCE_KEY, "120").unwrap();
        store
            .set(
                LEGACY_WITHDRAWALS_KEY,
                r#"[{"id":5,"amount":60,"username":"bob","status":"completed","date":"01.10.2026"}]"#,
            )
            .unwrap();

        let legacy = load_legacy(&store).unwrap().unwrap();
        assert_eq!(legacy.balance, Some(120));
        assert_eq!(legacy.withdrawals.len(), 1);
        assert_eq!(legacy.withdrawals[0].status, WithdrawalStatus::Completed);
    }

    #[test]
    fn legacy_without_withdrawals_is_empty_history() {
        let store = MemoryStore::new();
        store.set(LEGACY_BALANCE_KEY, "80").unwrap();

        let legacy = load_legacy(&store).unwrap().unwrap();
        assert_eq!(legacy.balance, Some(80));
        assert!(legacy.withdrawals.is_empty());
    }

    #[test]
    fn legacy_malformed_balance_is_an_error() {
        let store = MemoryStore::new();
        store.set(LEGACY_BALANCE_KEY, "12.5").unwrap();
        assert!(matches!(
            load_legacy(&store),
            Err(StoreError::MalformedBalance(raw)) if raw == "12.5"
        ));
    }

    #[test]
    fn empty_store_has_no_legacy_state() {
        let store = MemoryStore::new();
        assert_eq!(load_legacy(&store).unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wallet.json");

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get(SNAPSHOT_KEY).unwrap(), None);
        Snapshot::new(90, vec![withdrawal(3, WithdrawalStatus::Pending)])
            .save(&store)
            .unwrap();

        let reopened = FileStore::open(&path).unwrap();
        let snapshot = Snapshot::load(&reopened).unwrap().unwrap();
        assert_eq!(snapshot.balance, 90);
        assert_eq!(snapshot.withdrawals[0].id, WithdrawalId(3));
    }

    #[test]
    fn file_store_rejects_garbage_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wallet.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn failed_flush_keeps_previous_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wallet.json");
        let store = FileStore::open(&path).unwrap();
        store.set(SNAPSHOT_KEY, "first").unwrap();

        fs::remove_dir_all(dir.path()).unwrap();

        assert!(matches!(
            store.set(SNAPSHOT_KEY, "second"),
            Err(StoreError::Io(_))
        ));
        assert_eq!(store.get(SNAPSHOT_KEY).unwrap().as_deref(), Some("first"));
    }

    #[test]
    fn failed_flush_of_new_key_leaves_it_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(dir.path().join("missing").join("wallet.json")).unwrap();

        assert!(store.set(SNAPSHOT_KEY, "value").is_err());
        assert_eq!(store.get(SNAPSHOT_KEY).unwrap(), None);
    }
}
