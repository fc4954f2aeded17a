use crate::error::{ErrorKind, LedgerError};
use serde::{Serialize, Serializer};
use std::fmt::Display;

/// Failure of a single transfer, or of the whole batch when `transaction_id` is empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutcome {
    pub transaction_id: String,
    pub kind: ErrorKind,
    #[serde(serialize_with = "serialize_display")]
    pub error: LedgerError,
}

impl TransactionOutcome {
    pub fn new(transaction_id: impl Into<String>, kind: ErrorKind, error: LedgerError) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            kind,
            error,
        }
    }

    /// Outcome classified by the error's own kind
    pub fn rejected(transaction_id: impl Into<String>, error: LedgerError) -> Self {
        let kind = error.kind();

        Self::new(transaction_id, kind, error)
    }

    /// Outcome not tied to any single transfer
    pub fn batch(error: LedgerError) -> Self {
        Self::rejected(String::new(), error)
    }

    /// Outcome of a transfer in a batch that was rolled back
    pub fn aborted(transaction_id: impl Into<String>, error: LedgerError) -> Self {
        Self::new(transaction_id, ErrorKind::ExecutionFailure, error)
    }
}

/// Result of a dry-run validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<TransactionOutcome>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<TransactionOutcome>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Lifecycle of a single `process_batch` call
///
/// `Executing -> Rejected` covers a store that could not take its snapshot:
/// nothing was applied, so there is nothing to roll back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchPhase {
    Idle,
    Validating,
    Rejected,
    Executing,
    Committed,
    RolledBack,
}

impl BatchPhase {
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Validating)
                | (Self::Validating, Self::Rejected | Self::Executing)
                | (Self::Executing, Self::Committed | Self::RolledBack | Self::Rejected)
        )
    }
}

/// Summary of a `process_batch` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchProcessResult {
    pub successful: usize,
    pub failed: Vec<TransactionOutcome>,
    /// Terminal phase the batch ended in
    pub outcome: BatchPhase,
}

fn serialize_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
