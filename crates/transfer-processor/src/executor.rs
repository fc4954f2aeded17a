use crate::error::{LedgerError, StoreError};
use crate::outcome::TransactionOutcome;
use crate::store::AccountStore;
use crate::transfer::TransferRequest;
use crate::validation;
use tracing::{debug, warn};

/// How a batch left the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Committed,
    RolledBack,
    /// The snapshot could not be taken, so nothing was applied
    NotStarted,
}

/// Result of applying a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub settlement: Settlement,
    pub succeeded: usize,
    /// Empty when the batch committed; one entry per transfer after a rollback
    pub failures: Vec<TransactionOutcome>,
}

impl ExecutionResult {
    const fn committed(succeeded: usize) -> Self {
        Self {
            settlement: Settlement::Committed,
            succeeded,
            failures: Vec::new(),
        }
    }

    fn not_started(error: StoreError) -> Self {
        Self {
            settlement: Settlement::NotStarted,
            succeeded: 0,
            failures: vec![TransactionOutcome::batch(error.into())],
        }
    }

    /// Every transfer failed; the one at `failed_at` carries the actual reason and is listed first
    fn aborted(transfers: &[TransferRequest], failed_at: usize, error: LedgerError) -> Self {
        let mut failures = Vec::with_capacity(transfers.len());

        if let Some(trigger) = transfers.get(failed_at) {
            failures.push(TransactionOutcome::aborted(trigger.id.as_str(), error));
        }

        failures.extend(
            transfers
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != failed_at)
                .map(|(_, transfer)| {
                    TransactionOutcome::aborted(transfer.id.as_str(), LedgerError::BatchAborted)
                }),
        );

        Self {
            settlement: Settlement::RolledBack,
            succeeded: 0,
            failures,
        }
    }
}

/// Apply all transfers or none of them
///
/// Each transfer is checked against the live balance, which includes the
/// effect of earlier transfers in the same batch. The snapshot is a deep copy
/// of the whole store, so this is only sound with a single writer: changes
/// made by anyone else while it is outstanding are lost on rollback.
///
/// Business failures come back as an [`ExecutionResult`] with failures. `Err`
/// means the store could not restore or release its snapshot, leaving its
/// state indeterminate.
pub fn execute<S: AccountStore>(
    store: &mut S,
    transfers: &[TransferRequest],
) -> Result<ExecutionResult, StoreError> {
    let snapshot = match store.snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Could not snapshot account store: {e}");

            return Ok(ExecutionResult::not_started(e));
        }
    };

    for (index, transfer) in transfers.iter().enumerate() {
        if let Err(e) = apply(store, transfer) {
            warn!(transaction = %transfer.id, "Rolling back batch: {e}");

            store.restore(snapshot)?;

            return Ok(ExecutionResult::aborted(transfers, index, e));
        }

        debug!(
            transaction = %transfer.id,
            "Moved {} from {} to {}",
            transfer.amount,
            transfer.sender_id,
            transfer.recipient_id
        );
    }

    store.discard(snapshot)?;

    Ok(ExecutionResult::committed(transfers.len()))
}

fn apply<S: AccountStore>(store: &mut S, transfer: &TransferRequest) -> Result<(), LedgerError> {
    validation::check_well_formed(transfer)?;

    let mut sender = store
        .get(&transfer.sender_id)
        .ok_or_else(|| LedgerError::AccountNotFound(transfer.sender_id.clone()))?;

    let mut recipient = store
        .get(&transfer.recipient_id)
        .ok_or_else(|| LedgerError::AccountNotFound(transfer.recipient_id.clone()))?;

    // Live balance, including earlier transfers of this batch
    sender.debit(transfer.amount)?;
    recipient.credit(transfer.amount)?;

    store.put(sender)?;
    store.put(recipient)?;

    Ok(())
}
