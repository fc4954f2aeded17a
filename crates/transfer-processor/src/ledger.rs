use crate::error::{ErrorKind, LedgerError, StoreError};
use crate::executor::{self, Settlement};
use crate::outcome::{BatchPhase, BatchProcessResult, TransactionOutcome, ValidationResult};
use crate::store::{AccountStore, InMemoryAccountStore};
use crate::transfer::{Account, TransferRequest};
use crate::validation;
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Ledger settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Batches with more transfers are rejected before validation
    pub max_batch_size: usize,
}

impl LedgerConfig {
    pub const DEFAULT_MAX_BATCH_SIZE: usize = 10_000;
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Self::DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

/// Entry point for processing transfer batches against an account store
///
/// Mutating calls take `&mut self`; share a ledger between threads only
/// behind a lock.
#[derive(Debug, Default)]
pub struct Ledger<S = InMemoryAccountStore> {
    store: S,
    config: LedgerConfig,
}

impl<S: AccountStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, LedgerConfig::default())
    }

    pub const fn with_config(store: S, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    pub fn open_account(&mut self, id: &str, initial_balance: Decimal) -> Result<Account, StoreError> {
        let account = self.store.create(id, initial_balance)?;
        debug!("Opened account {id} with balance {initial_balance}");

        Ok(account)
    }

    pub fn account(&self, id: &str) -> Option<Account> {
        self.store.get(id)
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.store.all()
    }

    pub fn get_balance(&self, id: &str) -> Result<Decimal, LedgerError> {
        self.store
            .get(id)
            .map(|account| account.balance)
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_owned()))
    }

    /// Dry run: report what `process_batch` would reject, without touching balances
    pub fn validate_transfers(&self, transfers: &[TransferRequest]) -> ValidationResult {
        if let Err(e) = self.check_batch_size(transfers) {
            return ValidationResult::from_errors(vec![TransactionOutcome::batch(e)]);
        }

        validation::validate(&self.store, transfers)
    }

    /// Apply the batch atomically: either every transfer settles or none does
    ///
    /// Rejections and rollbacks are reported in the result. A batch the store
    /// could not snapshot ends `Rejected` with one batch-level entry. `Err` only
    /// when the store failed to roll back or commit its snapshot.
    pub fn process_batch(
        &mut self,
        transfers: &[TransferRequest],
    ) -> Result<BatchProcessResult, StoreError> {
        let mut phase = advance(BatchPhase::Idle, BatchPhase::Validating);
        info!("Processing batch of {} transfers", transfers.len());

        let validation = self.validate_transfers(transfers);
        if !validation.valid {
            phase = advance(phase, BatchPhase::Rejected);
            warn!("Batch rejected: {} transfers failed validation", validation.errors.len());

            return Ok(BatchProcessResult {
                successful: 0,
                failed: rejection(transfers, validation.errors),
                outcome: phase,
            });
        }

        phase = advance(phase, BatchPhase::Executing);
        let execution = executor::execute(&mut self.store, transfers)?;

        phase = match execution.settlement {
            Settlement::Committed => {
                info!("Batch committed: {} transfers settled", execution.succeeded);
                advance(phase, BatchPhase::Committed)
            }
            Settlement::RolledBack => advance(phase, BatchPhase::RolledBack),
            Settlement::NotStarted => advance(phase, BatchPhase::Rejected),
        };

        Ok(BatchProcessResult {
            successful: execution.succeeded,
            failed: execution.failures,
            outcome: phase,
        })
    }

    fn check_batch_size(&self, transfers: &[TransferRequest]) -> Result<(), LedgerError> {
        if transfers.len() > self.config.max_batch_size {
            return Err(LedgerError::BatchTooLarge {
                size: transfers.len(),
                max: self.config.max_batch_size,
            });
        }

        Ok(())
    }
}

/// Validation errors first, then every transfer without an error of its own
///
/// Batch-level errors (empty or oversized batch) are reported on their own.
fn rejection(transfers: &[TransferRequest], errors: Vec<TransactionOutcome>) -> Vec<TransactionOutcome> {
    if errors.iter().any(|e| e.kind == ErrorKind::MalformedRequest) {
        return errors;
    }

    let rejected: HashSet<String> = errors.iter().map(|e| e.transaction_id.clone()).collect();
    let mut failed = errors;

    failed.extend(
        transfers
            .iter()
            .filter(|transfer| !rejected.contains(&transfer.id))
            .map(|transfer| {
                TransactionOutcome::new(
                    transfer.id.as_str(),
                    ErrorKind::ValidationFailure,
                    LedgerError::BatchAborted,
                )
            }),
    );

    failed
}

fn advance(from: BatchPhase, to: BatchPhase) -> BatchPhase {
    debug_assert!(from.can_advance_to(to), "illegal batch transition {from:?} -> {to:?}");
    debug!("Batch {from:?} -> {to:?}");

    to
}
