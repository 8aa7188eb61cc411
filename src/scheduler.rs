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

//! Delayed completion timers keyed by withdrawal ID.
//!
//! Each pending withdrawal owns one independent timer. Timers do not order
//! against each other, and each fires at most once.

use crate::base::WithdrawalId;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Set of outstanding completion timers.
///
/// A timer unregisters itself after firing. [`cancel_all`](Self::cancel_all)
/// aborts whatever is still outstanding.
#[derive(Debug, Default)]
pub struct CompletionScheduler {
    timers: Arc<DashMap<WithdrawalId, JoinHandle<()>>>,
}

impl CompletionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `on_fire` once, `delay` from now, on the current Tokio runtime.
    ///
    /// Returns `false` without scheduling anything if `id` already has an
    /// outstanding timer.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn schedule<F>(&self, id: WithdrawalId, delay: Duration, on_fire: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        // The entry guard is held until the handle is stored, so a timer
        // that fires immediately cannot unregister before it is registered.
        match self.timers.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                let timers = Arc::clone(&self.timers);
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    on_fire();
                    timers.remove(&id);
                });
                entry.insert(handle);
                true
            }
        }
    }

    /// Aborts the timer for `id`. Returns `true` if one was outstanding.
    pub fn cancel(&self, id: WithdrawalId) -> bool {
        match self.timers.remove(&id) {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Aborts every outstanding timer and returns how many there were.
    pub fn cancel_all(&self) -> usize {
        let ids: Vec<WithdrawalId> = self.timers.iter().map(|entry| *entry.key()).collect();
        ids.into_iter().filter(|id| self.cancel(*id)).count()
    }

    pub fn is_scheduled(&self, id: WithdrawalId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Number of timers that have not fired yet.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl Drop for CompletionScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
