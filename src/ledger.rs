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

//! Balance ledger.
//!
//! Holds the single non-negative balance. Persistence is driven by the
//! [`Wallet`](crate::Wallet), which snapshots after every mutation.
//!
//! # Example
//!
//! ```
//! use reward_ledger_rs::BalanceLedger;
//!
//! let mut ledger = BalanceLedger::new(50);
//! assert_eq!(ledger.credit(25), 75);
//! assert_eq!(ledger.debit(50), 25);
//! ```

/// The user's virtual currency balance.
///
/// Stored as `u64`, so the non-negative invariant holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceLedger {
    balance: u64,
}

impl BalanceLedger {
    pub fn new(balance: u64) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Increases the balance and returns the new value.
    ///
    /// Amounts come from fixed reward values, so there is no error path.
    pub fn credit(&mut self, amount: u64) -> u64 {
        self.balance = self.balance.saturating_add(amount);
        self.balance
    }

    /// Decreases the balance and returns the new value.
    ///
    /// Sufficiency is checked by the caller before debiting; this method
    /// does not re-validate.
    pub fn debit(&mut self, amount: u64) -> u64 {
        debug_assert!(
            amount <= self.balance,
            "Invariant violated: debit of {} exceeds balance {}",
            amount,
            self.balance
        );
        self.balance = self.balance.saturating_sub(amount);
        self.balance
    }
}
