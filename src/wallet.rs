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

//! The wallet: balance ledger, notification log and withdrawal manager
//! behind one handle.
//!
//! # Operations
//!
//! - **Credit**: Adds a reward to the balance and logs a notification.
//! - **Submit**: Validates a withdrawal request, debits the balance at once
//!   and schedules the pending → completed transition.
//! - **Complete**: Fired by the completion timer; flips exactly one
//!   withdrawal to completed.
//!
//! Every mutation rewrites the full [`Snapshot`] while the state lock is
//! held, so writes from the caller and from timer tasks are serialized.
//!
//! # Runtime
//!
//! Completion timers run on Tokio. Without a current runtime, accepted
//! withdrawals stay pending until [`Wallet::resume_pending`] is called from
//! inside one.
//!
//! Store writes happen while the state lock is held, including from timer
//! tasks, so a [`Store`] must return quickly.

use crate::base::{IdGenerator, NotificationId, WithdrawalId};
use crate::config::WalletConfig;
use crate::ledger::BalanceLedger;
use crate::notification::{Notification, NotificationLog};
use crate::reward::EarnAction;
use crate::scheduler::CompletionScheduler;
use crate::signal::Signal;
use crate::store::{self, Snapshot, Store};
use crate::withdrawal::Withdrawal;
use crate::{StoreError, WithdrawalError};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[day].[month].[year]");
const TIME_FORMAT: &[BorrowedFormatItem] = format_description!("[hour]:[minute]");
const SIGNAL_CAPACITY: usize = 64;

#[derive(Debug)]
struct WalletState {
    ledger: BalanceLedger,
    notifications: NotificationLog,
    /// Newest first.
    withdrawals: Vec<Withdrawal>,
}

struct WalletInner {
    config: WalletConfig,
    store: Arc<dyn Store>,
    state: Mutex<WalletState>,
    scheduler: CompletionScheduler,
    signals: broadcast::Sender<Signal>,
    ids: IdGenerator,
}

/// Handle to a single user's wallet.
///
/// Cloning is cheap; all clones share the same state.
#[derive(Clone)]
pub struct Wallet {
    inner: Arc<WalletInner>,
}

impl Wallet {
    /// Loads the wallet from `store`.
    ///
    /// - No prior state: the balance starts at the configured grant and is
    ///   persisted immediately.
    /// - Two-key layout: loaded and rewritten as a single snapshot.
    /// - Snapshot: loaded as-is.
    ///
    /// Withdrawals restored as pending get a fresh completion timer when a
    /// Tokio runtime is available; otherwise call
    /// [`resume_pending`](Self::resume_pending) later.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read or its content is
    /// malformed.
    pub fn open(store: Arc<dyn Store>, config: WalletConfig) -> Result<Self, StoreError> {
        let (snapshot, needs_write) = match Snapshot::load(store.as_ref())? {
            Some(snapshot) => (snapshot, false),
            None => match store::load_legacy(store.as_ref())? {
                Some(legacy) => {
                    warn!("migrating two-key wallet layout to a single snapshot");
                    let balance = legacy.balance.unwrap_or(config.starting_grant);
                    (Snapshot::new(balance, legacy.withdrawals), true)
                }
                None => {
                    info!(grant = config.starting_grant, "no saved wallet, granting starting balance");
                    (Snapshot::new(config.starting_grant, Vec::new()), true)
                }
            },
        };

        if needs_write {
            snapshot.save(store.as_ref())?;
        }

        let highest_id = snapshot
            .withdrawals
            .iter()
            .map(|withdrawal| withdrawal.id.0)
            .max()
            .unwrap_or(0);
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);

        let wallet = Wallet {
            inner: Arc::new(WalletInner {
                state: Mutex::new(WalletState {
                    ledger: BalanceLedger::new(snapshot.balance),
                    notifications: NotificationLog::with_capacity(config.notification_capacity),
                    withdrawals: snapshot.withdrawals,
                }),
                config,
                store,
                scheduler: CompletionScheduler::new(),
                signals,
                ids: IdGenerator::starting_after(highest_id),
            }),
        };

        if tokio::runtime::Handle::try_current().is_ok() {
            wallet.resume_pending();
        } else if !wallet.pending_ids().is_empty() {
            warn!("no async runtime, restored pending withdrawals are not scheduled");
        }

        Ok(wallet)
    }

    /// Credits `amount` and logs a notification titled `reason`.
    ///
    /// Amounts come from fixed rewards, so this cannot fail. A failed
    /// persistence write is logged and the in-memory balance stays
    /// authoritative.
    pub fn credit(&self, amount: u64, reason: &str) -> (u64, Notification) {
        debug_assert!(amount > 0, "credit amount must be positive");

        let mut state = self.inner.state.lock();
        let balance = state.ledger.credit(amount);
        let notification = Notification {
            id: NotificationId(self.inner.ids.next()),
            title: reason.to_string(),
            amount,
            time: now_label(TIME_FORMAT),
        };
        state.notifications.push(notification.clone());
        self.inner.persist(&state);
        drop(state);

        info!(amount, reason, balance, "credited");
        self.inner.emit(Signal::Credited {
            amount,
            reason: reason.to_string(),
        });

        (balance, notification)
    }

    /// Credits one of the predefined earn actions.
    pub fn earn(&self, action: EarnAction) -> (u64, Notification) {
        self.credit(action.amount(), action.reason())
    }

    /// Submits a withdrawal request.
    ///
    /// Checks run in order and the first failure wins:
    /// 1. `username` is not blank.
    /// 2. `amount_text` is an integer of at least the minimum withdrawal.
    /// 3. The amount does not exceed the balance.
    ///
    /// On success the balance is debited at once, the withdrawal is stored
    /// as pending, and completion is scheduled after the configured delay.
    /// Identical requests are not deduplicated.
    ///
    /// # Errors
    ///
    /// Returns a [`WithdrawalError`] without touching the balance, the
    /// history or the store. The same error is also broadcast as
    /// [`Signal::Rejected`].
    pub fn submit(&self, username: &str, amount_text: &str) -> Result<Withdrawal, WithdrawalError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(self.reject(WithdrawalError::InvalidUsername));
        }

        // Withdrawals are always positive, whatever the configured minimum.
        let minimum = self.inner.config.minimum_withdrawal.max(1);
        let amount = match amount_text.trim().parse::<u64>() {
            Ok(amount) if amount >= minimum => amount,
            _ => return Err(self.reject(WithdrawalError::BelowMinimum { minimum })),
        };

        let mut state = self.inner.state.lock();
        let balance = state.ledger.balance();
        if amount > balance {
            drop(state);
            return Err(self.reject(WithdrawalError::InsufficientFunds { balance }));
        }

        let balance = state.ledger.debit(amount);
        let withdrawal = Withdrawal::pending(
            WithdrawalId(self.inner.ids.next()),
            amount,
            username.to_string(),
            now_label(DATE_FORMAT),
        );
        state.withdrawals.insert(0, withdrawal.clone());
        self.inner.persist(&state);
        drop(state);

        info!(id = %withdrawal.id, amount, username, balance, "withdrawal accepted");
        self.inner.emit(Signal::WithdrawalAccepted {
            id: withdrawal.id,
            amount,
        });
        self.schedule_completion(withdrawal.id);

        Ok(withdrawal)
    }

    /// Schedules completion for every restored pending withdrawal that has
    /// no timer yet. Returns how many were scheduled, which is zero outside
    /// a Tokio runtime.
    pub fn resume_pending(&self) -> usize {
        let pending = self.pending_ids();
        let scheduled = pending
            .into_iter()
            .filter(|id| self.schedule_completion(*id))
            .count();
        if scheduled > 0 {
            info!(scheduled, "resumed pending withdrawals");
        }
        scheduled
    }

    /// Cancels all outstanding completion timers.
    ///
    /// Affected withdrawals stay pending in the store and are resumed on the
    /// next [`open`](Self::open).
    pub fn shutdown(&self) -> usize {
        let cancelled = self.inner.scheduler.cancel_all();
        info!(cancelled, "wallet shut down");
        cancelled
    }

    pub fn balance(&self) -> u64 {
        self.inner.state.lock().ledger.balance()
    }

    /// Notifications, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.state.lock().notifications.to_vec()
    }

    /// Withdrawal history, newest first.
    pub fn withdrawals(&self) -> Vec<Withdrawal> {
        self.inner.state.lock().withdrawals.clone()
    }

    pub fn withdrawal(&self, id: WithdrawalId) -> Option<Withdrawal> {
        self.inner
            .state
            .lock()
            .withdrawals
            .iter()
            .find(|withdrawal| withdrawal.id == id)
            .cloned()
    }

    /// Number of completion timers that have not fired.
    pub fn pending_completions(&self) -> usize {
        self.inner.scheduler.len()
    }

    /// Receives every signal emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.inner.signals.subscribe()
    }

    fn pending_ids(&self) -> Vec<WithdrawalId> {
        self.inner
            .state
            .lock()
            .withdrawals
            .iter()
            .filter(|withdrawal| !withdrawal.status.is_terminal())
            .map(|withdrawal| withdrawal.id)
            .collect()
    }

    fn schedule_completion(&self, id: WithdrawalId) -> bool {
        if tokio::runtime::Handle::try_current().is_err() {
            warn!(%id, "no async runtime, withdrawal left pending");
            return false;
        }
        // Weak, so outstanding timers do not keep a dropped wallet alive.
        let inner: Weak<WalletInner> = Arc::downgrade(&self.inner);
        self.inner
            .scheduler
            .schedule(id, self.inner.config.completion_delay, move || {
                if let Some(inner) = inner.upgrade() {
                    inner.complete(id);
                }
            })
    }

    fn reject(&self, error: WithdrawalError) -> WithdrawalError {
        debug!(%error, "withdrawal rejected");
        self.inner.emit(Signal::Rejected(error.clone()));
        error
    }
}

impl WalletInner {
    fn complete(&self, id: WithdrawalId) {
        let mut state = self.state.lock();
        let Some(withdrawal) = state.withdrawals.iter_mut().find(|w| w.id == id) else {
            warn!(%id, "completion fired for unknown withdrawal");
            return;
        };
        if !withdrawal.complete() {
            debug!(%id, status = %withdrawal.status, "withdrawal already terminal");
            return;
        }
        let signal = Signal::WithdrawalCompleted {
            id,
            amount: withdrawal.amount,
            username: withdrawal.username.clone(),
        };
        self.persist(&state);
        drop(state);

        info!(%id, "withdrawal completed");
        self.emit(signal);
    }

    fn persist(&self, state: &WalletState) {
        let snapshot = Snapshot::new(state.ledger.balance(), state.withdrawals.clone());
        match snapshot.save(self.store.as_ref()) {
            Ok(()) => debug!(balance = snapshot.balance, "snapshot written"),
            Err(e) => error!(error = %e, "failed to persist wallet snapshot"),
        }
    }

    fn emit(&self, signal: Signal) {
        // No subscribers is fine.
        let _ = self.signals.send(signal);
    }
}

fn now_label(format: &[BorrowedFormatItem<'_>]) -> String {
    OffsetDateTime::now_utc().format(format).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::withdrawal::WithdrawalStatus;
    use std::time::Duration;

    fn wallet() -> Wallet {
        Wallet::open(Arc::new(MemoryStore::new()), WalletConfig::default()).unwrap()
    }

    #[test]
    fn labels_have_expected_shape() {
        let date = now_label(DATE_FORMAT);
        assert_eq!(date.len(), 10);
        assert_eq!(&date[2..3], ".");
        assert_eq!(&date[5..6], ".");

        let time = now_label(TIME_FORMAT);
        assert_eq!(time.len(), 5);
        assert_eq!(&time[2..3], ":");
    }

    #[test]
    fn credit_works_without_runtime() {
        let wallet = wallet();
        let (balance, notification) = wallet.credit(25, "Daily login");
        assert_eq!(balance, 75);
        assert_eq!(notification.amount, 25);
        assert_eq!(wallet.notifications().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_withdrawal_is_not_completed() {
        let wallet = wallet();
        let withdrawal = wallet.submit("alice", "50").unwrap();

        // No code path produces `Failed`; inject it to check it is terminal.
        wallet
            .inner
            .state
            .lock()
            .withdrawals
            .iter_mut()
            .for_each(|w| w.status = WithdrawalStatus::Failed);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(
            wallet.withdrawal(withdrawal.id).unwrap().status,
            WithdrawalStatus::Failed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn completion_for_unknown_id_is_ignored() {
        let wallet = wallet();
        wallet.inner.complete(WithdrawalId(12345));
        assert_eq!(wallet.balance(), 50);
        assert!(wallet.withdrawals().is_empty());
    }
}
