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

//! Newest-first log of credit events.
//!
//! The log lives only for the session and is never persisted.

use crate::base::NotificationId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A record of one credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    /// Reason for the credit.
    pub title: String,
    pub amount: u64,
    /// Display timestamp, `HH:MM`.
    pub time: String,
}

/// Append-only notification list, newest first.
///
/// Holds at most `capacity` entries; pushing past it drops the oldest.
#[derive(Debug, Clone)]
pub struct NotificationLog {
    entries: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Prepends a notification.
    pub fn push(&mut self, notification: Notification) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(notification);
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<Notification> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(id: u64, amount: u64) -> Notification {
        Notification {
            id: NotificationId(id),
            title: format!("reward {id}"),
            amount,
            time: "12:00".to_string(),
        }
    }

    #[test]
    fn newest_first() {
        let mut log = NotificationLog::with_capacity(10);
        log.push(notification(1, 50));
        log.push(notification(2, 25));

        let ids: Vec<_> = log.iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut log = NotificationLog::with_capacity(2);
        log.push(notification(1, 50));
        log.push(notification(2, 25));
        log.push(notification(3, 100));

        assert_eq!(log.len(), 2);
        let ids: Vec<_> = log.iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut log = NotificationLog::with_capacity(0);
        log.push(notification(1, 50));
        assert!(log.is_empty());
    }
}
