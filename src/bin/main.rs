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


use clap::{Parser, Subcommand};
use csv::Writer;
use reward_ledger_rs::{EarnAction, FileStore, Signal, Wallet, WalletConfig, Withdrawal};
use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Reward Ledger - Earn coins and withdraw them
///
/// Keeps the wallet in a JSON file. Logs go to stderr; command output goes
/// to stdout.
#[derive(Parser, Debug)]
#[command(name = "reward-ledger")]
#[command(about = "A reward balance ledger with delayed withdrawals", long_about = None)]
struct Args {
    /// Path to the wallet store
    #[arg(long, value_name = "PATH", default_value = "reward-ledger.json")]
    store: PathBuf,

    /// Withdrawal completion delay in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 3_000)]
    delay_ms: u64,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, value_name = "FILTER", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current balance
    Balance,
    /// Credit a predefined reward
    Earn {
        #[arg(value_enum)]
        action: EarnAction,
    },
    /// Request a withdrawal and wait for it to complete
    Withdraw { username: String, amount: String },
    /// Write withdrawal history as CSV
    History,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let store = match FileStore::open(&args.store) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening store '{}': {}", args.store.display(), e);
            process::exit(1);
        }
    };

    let config = WalletConfig::default().with_completion_delay(Duration::from_millis(args.delay_ms));
    let wallet = match Wallet::open(Arc::new(store), config) {
        Ok(wallet) => wallet,
        Err(e) => {
            eprintln!("Error loading wallet: {}", e);
            process::exit(1);
        }
    };

    let code = run(&wallet, args.command).await;
    wallet.shutdown();
    process::exit(code);
}

async fn run(wallet: &Wallet, command: Command) -> i32 {
    match command {
        Command::Balance => {
            println!("{}", wallet.balance());
            0
        }
        Command::Earn { action } => {
            let (balance, _) = wallet.earn(action);
            println!("+{} ({}), balance {}", action.amount(), action.reason(), balance);
            0
        }
        Command::Withdraw { username, amount } => withdraw(wallet, &username, &amount).await,
        Command::History => match write_history(&wallet.withdrawals(), std::io::stdout()) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error writing output: {}", e);
                1
            }
        },
    }
}

/// Submits a withdrawal and blocks until its completion signal arrives.
///
/// Returns the process exit code.
async fn withdraw(wallet: &Wallet, username: &str, amount: &str) -> i32 {
    let mut signals = wallet.subscribe();

    let withdrawal = match wallet.submit(username, amount) {
        Ok(withdrawal) => withdrawal,
        Err(e) => {
            eprintln!("Withdrawal rejected: {}", e);
            return 1;
        }
    };

    loop {
        match signals.recv().await {
            Ok(signal @ Signal::WithdrawalAccepted { .. }) => {
                println!("{}: {}", signal.title(), signal.description());
            }
            Ok(signal @ Signal::WithdrawalCompleted { id, .. }) if id == withdrawal.id => {
                println!("{}: {}", signal.title(), signal.description());
                return 0;
            }
            Ok(_) => continue,
            Err(e) => {
                eprintln!("Lost track of withdrawal {}: {}", withdrawal.id, e);
                return 1;
            }
        }
    }
}

/// Write withdrawal history to a CSV writer, newest first.
///
/// # CSV Format
///
/// Columns: `id, amount, username, status, date`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
fn write_history<W: Write>(withdrawals: &[Withdrawal], writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for withdrawal in withdrawals {
        wtr.serialize(withdrawal)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reward_ledger_rs::{WithdrawalId, WithdrawalStatus};

    fn withdrawal(id: u64, status: WithdrawalStatus) -> Withdrawal {
        Withdrawal {
            id: WithdrawalId(id),
            amount: 60,
            username: "alice".into(),
            status,
            date: "15.10.2026".into(),
        }
    }

    #[test]
    fn write_history_to_csv() {
        let mut output = Vec::new();
        write_history(
            &[
                withdrawal(2, WithdrawalStatus::Pending),
                withdrawal(1, WithdrawalStatus::Completed),
            ],
            &mut output,
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            "id,amount,username,status,date\n\
             2,60,alice,pending,15.10.2026\n\
             1,60,alice,completed,15.10.2026\n"
        );
    }

    #[test]
    fn empty_history_writes_nothing() {
        let mut output = Vec::new();
        write_history(&[], &mut output).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn args_parse_withdraw() {
        let args = Args::parse_from(["reward-ledger", "--delay-ms", "10", "withdraw", "alice", "50"]);
        assert_eq!(args.delay_ms, 10);
        assert!(matches!(
            args.command,
            Command::Withdraw { ref username, ref amount } if username == "alice" && amount == "50"
        ));
    }

    #[test]
    fn args_parse_earn_action() {
        let args = Args::parse_from(["reward-ledger", "earn", "survey"]);
        assert!(matches!(
            args.command,
            Command::Earn {
                action: EarnAction::SurveyCompleted
            }
        ));
    }
}
