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

//! Withdrawal records.
//!
//! Withdrawals follow a state machine:
//! - [`Pending`] → [`Completed`] (after the completion delay)
//!
//! [`Failed`] is part of the model and survives persistence, but nothing
//! produces it yet. Completed and failed withdrawals are terminal.
//!
//! [`Pending`]: WithdrawalStatus::Pending
//! [`Completed`]: WithdrawalStatus::Completed
//! [`Failed`]: WithdrawalStatus::Failed

use crate::base::WithdrawalId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Completed,
    Failed,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payout request to an external account.
///
/// Every field except `status` is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Withdrawal {
    pub id: WithdrawalId,
    pub amount: u64,
    /// Receiving account identifier, trimmed and non-empty.
    pub username: String,
    pub status: WithdrawalStatus,
    /// Creation date, `DD.MM.YYYY`.
    pub date: String,
}

impl Withdrawal {
    pub(crate) fn pending(id: WithdrawalId, amount: u64, username: String, date: String) -> Self {
        Self {
            id,
            amount,
            username,
            status: WithdrawalStatus::Pending,
            date,
        }
    }

    /// Moves a pending withdrawal to completed.
    ///
    /// Returns `false` and leaves the record untouched if it was already
    /// terminal.
    pub(crate) fn complete(&mut self) -> bool {
        if self.status != WithdrawalStatus::Pending {
            return false;
        }
        self.status = WithdrawalStatus::Completed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Withdrawal {
        Withdrawal::pending(WithdrawalId(1), 50, "alice".into(), "15.10.2026".into())
    }

    #[test]
    fn pending_completes_once() {
        let mut withdrawal = sample();
        assert!(withdrawal.complete());
        assert_eq!(withdrawal.status, WithdrawalStatus::Completed);
        assert!(!withdrawal.complete());
        assert_eq!(withdrawal.status, WithdrawalStatus::Completed);
    }

    #[test]
    fn failed_is_terminal() {
        let mut withdrawal = sample();
        withdrawal.status = WithdrawalStatus::Failed;
        assert!(!withdrawal.complete());
        assert_eq!(withdrawal.status, WithdrawalStatus::Failed);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"id":1,"amount":50,"username":"alice","status":"pending","date":"15.10.2026"}"#
        );

        let failed: WithdrawalStatus = serde_json::from_str(r#""failed""#).unwrap();
        assert_eq!(failed, WithdrawalStatus::Failed);
        assert!(failed.is_terminal());
        assert!(!WithdrawalStatus::Pending.is_terminal());
    }

    #[test]
    fn status_display() {
        assert_eq!(WithdrawalStatus::Pending.to_string(), "pending");
        assert_eq!(WithdrawalStatus::Completed.to_string(), "completed");
        assert_eq!(WithdrawalStatus::Failed.to_string(), "failed");
    }
}
