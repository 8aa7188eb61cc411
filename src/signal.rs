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

//! User-visible signals (toast-style messages).

use crate::WithdrawalError;
use crate::base::WithdrawalId;

/// An event the presentation layer shows to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Credited { amount: u64, reason: String },
    Rejected(WithdrawalError),
    WithdrawalAccepted { id: WithdrawalId, amount: u64 },
    WithdrawalCompleted {
        id: WithdrawalId,
        amount: u64,
        username: String,
    },
}

impl Signal {
    pub fn title(&self) -> String {
        match self {
            Self::Credited { amount, .. } => format!("+{amount} coins"),
            Self::Rejected(WithdrawalError::InsufficientFunds { .. }) => {
                "Insufficient funds".to_string()
            }
            Self::Rejected(_) => "Error".to_string(),
            Self::WithdrawalAccepted { .. } => "Request accepted".to_string(),
            Self::WithdrawalCompleted { .. } => "Withdrawal completed".to_string(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Credited { reason, .. } => reason.clone(),
            Self::Rejected(error) => error.to_string(),
            Self::WithdrawalAccepted { amount, .. } => {
                format!("withdrawal of {amount} coins is processing")
            }
            Self::WithdrawalCompleted {
                amount, username, ..
            } => format!("{amount} coins sent to @{username}"),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}
