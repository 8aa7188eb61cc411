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

//! Error types for withdrawal validation and persistence.

use thiserror::Error;

/// Reasons a withdrawal request is rejected.
///
/// All variants are user-correctable. A rejected request never mutates the
/// balance or the withdrawal history.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalError {
    /// Username is empty or whitespace-only
    #[error("enter the username of the receiving account")]
    InvalidUsername,

    /// Amount is unparseable or below the minimum withdrawal
    #[error("minimum withdrawal amount is {minimum}")]
    BelowMinimum { minimum: u64 },

    /// Amount exceeds the current balance
    #[error("insufficient funds: balance is {balance}")]
    InsufficientFunds { balance: u64 },
}

/// Persistent store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store content is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The legacy `balance` key is not a decimal integer
    #[error("stored balance is not an integer: {0:?}")]
    MalformedBalance(String),

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}
