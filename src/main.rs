mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::{CliConfig, Config};
use rust_decimal::Decimal;
use std::{
    fs::File,
    io::{self, Read, Write},
};
use tracing::{info, warn};
use transfer_processor::{
    Account, AccountStore, InMemoryAccountStore, Ledger, LedgerConfig, TransferRequest,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = CliConfig::parse();

    run(&config)?;

    info!("Run completed successfully");

    Ok(())
}

fn run<C: Config>(config: &C) -> Result<()> {
    let accounts = File::open(config.accounts_path()).context("Failed to open accounts file")?;
    let transfers = File::open(config.transfers_path()).context("Failed to open transfers file")?;

    let mut ledger = load_ledger(accounts, config.ledger_config())?;
    let transfers = read_transfers(transfers)?;

    let stdout = io::stdout();
    let handle = stdout.lock();

    if config.dry_run() {
        validate_batch(&ledger, &transfers, handle)
    } else {
        process_batch(&mut ledger, &transfers, handle)
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn load_ledger<R: Read>(reader: R, config: LedgerConfig) -> Result<Ledger> {
    let mut ledger = Ledger::with_config(InMemoryAccountStore::new(), config);

    for (index, result) in csv_reader(reader).deserialize().enumerate() {
        let account: Account =
            result.with_context(|| format!("Failed to parse account record {}", index + 1))?;

        ledger
            .open_account(&account.id, account.balance)
            .with_context(|| format!("Failed to open account {}", account.id))?;
    }

    info!("Loaded {} accounts", ledger.accounts().len());

    Ok(ledger)
}

/// Read the whole batch; any malformed record aborts, since the batch is applied as a unit
fn read_transfers<R: Read>(reader: R) -> Result<Vec<TransferRequest>> {
    let mut reader = csv_reader(reader);

    let transfers = reader
        .deserialize::<TransferRequest>()
        .enumerate()
        .map(|(index, result)| {
            result.with_context(|| format!("Failed to parse transfer record {}", index + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    info!("Read batch of {} transfers", transfers.len());

    Ok(transfers)
}

fn total_balance<S: AccountStore>(ledger: &Ledger<S>) -> Decimal {
    ledger.accounts().iter().map(|account| account.balance).sum()
}

fn process_batch<S: AccountStore, W: Write>(
    ledger: &mut Ledger<S>,
    transfers: &[TransferRequest],
    output: W,
) -> Result<()> {
    let total_before = total_balance(ledger);

    let result = ledger
        .process_batch(transfers)
        .context("Account store left in an indeterminate state")?;

    info!(
        "Batch {:?}: {} successful, {} failed, total balance {} -> {}",
        result.outcome,
        result.successful,
        result.failed.len(),
        total_before,
        total_balance(ledger)
    );

    for failure in &result.failed {
        warn!(transaction = %failure.transaction_id, kind = ?failure.kind, "{}", failure.error);
    }

    let mut writer = csv::WriterBuilder::new().from_writer(output);

    for account in ledger.accounts() {
        writer
            .serialize(&account)
            .context("Failed to serialize account")?;
    }

    writer.flush().context("Failed to flush output")?;

    Ok(())
}

fn validate_batch<S: AccountStore, W: Write>(
    ledger: &Ledger<S>,
    transfers: &[TransferRequest],
    output: W,
) -> Result<()> {
    let validation = ledger.validate_transfers(transfers);

    info!(
        "Validated {} transfers: {} errors",
        transfers.len(),
        validation.errors.len()
    );

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);

    writer
        .write_record(["transactionId", "kind", "error"])
        .context("Failed to write header")?;

    for error in &validation.errors {
        writer
            .serialize(error)
            .context("Failed to serialize validation error")?;
    }

    writer.flush().context("Failed to flush output")?;

    Ok(())
}
