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

//! # Reward Ledger
//!
//! This library keeps a virtual currency balance that grows through
//! predefined earn actions and shrinks through withdrawal requests, which
//! complete asynchronously after a fixed delay.
//!
//! ## Core Components
//!
//! - [`Wallet`]: Handle tying the ledger, notifications and withdrawals together
//! - [`BalanceLedger`]: The non-negative balance
//! - [`NotificationLog`]: Newest-first record of credits
//! - [`Withdrawal`]: Payout request with a pending → completed lifecycle
//! - [`Store`]: Key-value persistence, written as one atomic [`Snapshot`]
//! - [`WithdrawalError`]: Reasons a withdrawal request is rejected
//!
//! ## Example
//!
//! ```
//! use reward_ledger_rs::{EarnAction, MemoryStore, Wallet, WalletConfig, WithdrawalStatus};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = WalletConfig::default().with_completion_delay(Duration::from_millis(10));
//! let wallet = Wallet::open(Arc::new(MemoryStore::new()), config).unwrap();
//! assert_eq!(wallet.balance(), 50);
//!
//! wallet.earn(EarnAction::DailyLogin);
//! assert_eq!(wallet.balance(), 75);
//!
//! let withdrawal = wallet.submit("alice", "50").unwrap();
//! assert_eq!(wallet.balance(), 25);
//! assert_eq!(withdrawal.status, WithdrawalStatus::Pending);
//!
//! tokio::time::sleep(Duration::from_millis(50)).await;
//! assert_eq!(
//!     wallet.withdrawal(withdrawal.id).unwrap().status,
//!     WithdrawalStatus::Completed
//! );
//! # }
//! ```
//!
//! ## Concurrency
//!
//! All state sits behind one lock and every mutation rewrites the snapshot
//! while holding it, so the submitting caller and completion timers never
//! interleave their writes.

mod base;
pub mod config;
pub mod error;
pub mod ledger;
pub mod notification;
pub mod reward;
pub mod scheduler;
pub mod signal;
pub mod store;
mod wallet;
pub mod withdrawal;

pub use base::{NotificationId, WithdrawalId};
pub use config::WalletConfig;
pub use error::{StoreError, WithdrawalError};
pub use ledger::BalanceLedger;
pub use notification::{Notification, NotificationLog};
pub use reward::EarnAction;
pub use scheduler::CompletionScheduler;
pub use signal::Signal;
pub use store::{FileStore, MemoryStore, Snapshot, Store};
pub use wallet::Wallet;
pub use withdrawal::{Withdrawal, WithdrawalStatus};
