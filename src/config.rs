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

//! Wallet tunables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for a [`Wallet`](crate::Wallet).
///
/// The defaults match the stock reward rules: a 50 coin starting grant,
/// a 50 coin minimum withdrawal and a 3 second completion delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Balance granted when the store holds no prior state.
    pub starting_grant: u64,
    pub minimum_withdrawal: u64,
    /// Delay between accepting a withdrawal and completing it.
    pub completion_delay: Duration,
    /// Number of notifications retained in memory.
    pub notification_capacity: usize,
}

impl WalletConfig {
    pub const DEFAULT_STARTING_GRANT: u64 = 50;
    pub const DEFAULT_MINIMUM_WITHDRAWAL: u64 = 50;
    pub const DEFAULT_COMPLETION_DELAY: Duration = Duration::from_secs(3);
    pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 100;

    pub fn with_starting_grant(mut self, starting_grant: u64) -> Self {
        self.starting_grant = starting_grant;
        self
    }

    pub fn with_minimum_withdrawal(mut self, minimum_withdrawal: u64) -> Self {
        self.minimum_withdrawal = minimum_withdrawal;
        self
    }

    pub fn with_completion_delay(mut self, completion_delay: Duration) -> Self {
        self.completion_delay = completion_delay;
        self
    }

    pub fn with_notification_capacity(mut self, notification_capacity: usize) -> Self {
        self.notification_capacity = notification_capacity;
        self
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            starting_grant: Self::DEFAULT_STARTING_GRANT,
            minimum_withdrawal: Self::DEFAULT_MINIMUM_WITHDRAWAL,
            completion_delay: Self::DEFAULT_COMPLETION_DELAY,
            notification_capacity: Self::DEFAULT_NOTIFICATION_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WalletConfig::default();
        assert_eq!(config.starting_grant, 50);
        assert_eq!(config.minimum_withdrawal, 50);
        assert_eq!(config.completion_delay, Duration::from_secs(3));
        assert_eq!(config.notification_capacity, 100);
    }

    #[test]
    fn builder_overrides() {
        let config = WalletConfig::default()
            .with_starting_grant(0)
            .with_completion_delay(Duration::from_millis(10));
        assert_eq!(config.starting_grant, 0);
        assert_eq!(config.completion_delay, Duration::from_millis(10));
        assert_eq!(config.minimum_withdrawal, 50);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: WalletConfig = serde_json::from_str(r#"{"starting_grant":10}"#).unwrap();
        assert_eq!(config.starting_grant, 10);
        assert_eq!(config.completion_delay, Duration::from_secs(3));
    }
}
