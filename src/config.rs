use clap::Parser;
use std::path::{Path, PathBuf};
use transfer_processor::LedgerConfig;

/// Trait for reading configuration parameters
pub trait Config {
    fn accounts_path(&self) -> &Path;
    fn transfers_path(&self) -> &Path;
    fn max_batch_size(&self) -> usize;
    fn dry_run(&self) -> bool;

    fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            max_batch_size: self.max_batch_size(),
        }
    }
}

/// CLI configuration
#[derive(Parser, Debug)]
#[command(
    name = "transfer-ledger",
    about = "Applies a batch of account transfers atomically, rolling back on any failure",
    version
)]
pub struct CliConfig {
    /// Path to the CSV file with opening balances (id,balance)
    #[arg(value_name = "ACCOUNTS_FILE")]
    accounts_file: PathBuf,

    /// Path to the CSV file with the batch of transfers (id,amount,senderId,recipientId[,status,createdAt])
    #[arg(value_name = "TRANSFERS_FILE")]
    transfers_file: PathBuf,

    /// Reject batches holding more transfers than this
    #[arg(long, default_value_t = LedgerConfig::DEFAULT_MAX_BATCH_SIZE)]
    max_batch_size: usize,

    /// Only validate the batch and print the errors, leaving balances untouched
    #[arg(long)]
    dry_run: bool,
}

impl Config for CliConfig {
    fn accounts_path(&self) -> &Path {
        &self.accounts_file
    }

    fn transfers_path(&self) -> &Path {
        &self.transfers_file
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::try_parse_from(["transfer-ledger", "accounts.csv", "transfers.csv"]).unwrap();

        assert_eq!(config.accounts_path(), Path::new("accounts.csv"));
        assert_eq!(config.transfers_path(), Path::new("transfers.csv"));
        assert_eq!(config.ledger_config(), LedgerConfig::default());
        assert!(!config.dry_run());
    }

    #[test]
    fn test_flags() {
        let config = CliConfig::try_parse_from([
            "transfer-ledger",
            "a.csv",
            "t.csv",
            "--max-batch-size",
            "5",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(config.max_batch_size(), 5);
        assert!(config.dry_run());
    }
}
