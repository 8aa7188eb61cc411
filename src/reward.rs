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

//! Predefined earn actions and their fixed rewards.

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum EarnAction {
    #[value(name = "welcome")]
    WelcomeBonus,
    #[value(name = "registration")]
    RegistrationComplete,
    #[value(name = "daily")]
    DailyLogin,
    #[value(name = "survey")]
    SurveyCompleted,
    #[value(name = "video")]
    VideoWatched,
}

impl EarnAction {
    pub const ALL: [EarnAction; 5] = [
        Self::WelcomeBonus,
        Self::RegistrationComplete,
        Self::DailyLogin,
        Self::SurveyCompleted,
        Self::VideoWatched,
    ];

    pub fn amount(&self) -> u64 {
        match self {
            Self::WelcomeBonus => 50,
            Self::RegistrationComplete => 50,
            Self::DailyLogin => 25,
            Self::SurveyCompleted => 100,
            Self::VideoWatched => 50,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::WelcomeBonus => "Welcome bonus",
            Self::RegistrationComplete => "Registration complete",
            Self::DailyLogin => "Daily login",
            Self::SurveyCompleted => "Survey completed",
            Self::VideoWatched => "Video watched",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewards_are_positive() {
        for action in EarnAction::ALL {
            assert!(action.amount() > 0);
            assert!(!action.reason().is_empty());
        }
    }

    #[test]
    fn reward_table() {
        assert_eq!(EarnAction::DailyLogin.amount(), 25);
        assert_eq!(EarnAction::SurveyCompleted.amount(), 100);
        assert_eq!(EarnAction::WelcomeBonus.reason(), "Welcome bonus");
    }
}
