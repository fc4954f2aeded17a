use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Classification of a failure reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// The batch as a whole is unacceptable (empty or oversized)
    MalformedRequest,
    /// A transfer failed one of the pre-execution checks
    ValidationFailure,
    /// A balance query named an unknown account
    AccountNotFound,
    /// A fault while applying the batch; the batch was rolled back
    ExecutionFailure,
}

/// Reason a transfer, a batch or a balance query failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("No transactions to process")]
    EmptyBatch,

    #[error("Too many transactions. Maximum allowed is {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("Invalid transaction amount: {0}. Amount must be greater than 0")]
    NonPositiveAmount(Decimal),

    #[error("Sender and recipient cannot be the same account")]
    SameAccount,

    #[error("One or more accounts do not exist: {}", .0.join(", "))]
    MissingAccounts(Vec<String>),

    #[error("Insufficient funds in account {0}")]
    InsufficientFunds(String),

    #[error("Account {0} not found")]
    AccountNotFound(String),

    #[error("Balance overflow in account {0}")]
    Overflow(String),

    #[error("Balance of account {0} cannot hold the result exactly")]
    Precision(String),

    #[error("Transaction failed due to the failure of another transaction in the batch")]
    BatchAborted,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Kind this error is reported under when it is not raised during execution
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyBatch | Self::BatchTooLarge { .. } => ErrorKind::MalformedRequest,
            Self::NonPositiveAmount(_)
            | Self::SameAccount
            | Self::MissingAccounts(_)
            | Self::InsufficientFunds(_) => ErrorKind::ValidationFailure,
            Self::AccountNotFound(_) => ErrorKind::AccountNotFound,
            Self::Overflow(_) | Self::Precision(_) | Self::BatchAborted | Self::Store(_) => {
                ErrorKind::ExecutionFailure
            }
        }
    }
}

/// Account store fault
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Account {0} already exists")]
    AccountAlreadyExists(String),

    #[error("Account id must not be empty")]
    EmptyAccountId,

    #[error("Account {id} cannot hold a negative balance: {balance}")]
    NegativeBalance { id: String, balance: Decimal },

    #[error("Another snapshot is still outstanding")]
    SnapshotOutstanding,

    #[error("Snapshot {0} is not the outstanding snapshot")]
    UnknownSnapshot(u64),

    #[error("Account store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_messages() {
        assert_eq!(
            LedgerError::NonPositiveAmount(dec!(-5)).to_string(),
            "Invalid transaction amount: -5. Amount must be greater than 0"
        );
        assert_eq!(
            LedgerError::MissingAccounts(vec!["ghost".into(), "phantom".into()]).to_string(),
            "One or more accounts do not exist: ghost, phantom"
        );
        assert_eq!(
            LedgerError::BatchTooLarge { size: 3, max: 2 }.to_string(),
            "Too many transactions. Maximum allowed is 2"
        );
        assert_eq!(
            LedgerError::from(StoreError::Unavailable("disk".into())).to_string(),
            "Account store unavailable: disk"
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(LedgerError::EmptyBatch.kind(), ErrorKind::MalformedRequest);
        assert_eq!(LedgerError::SameAccount.kind(), ErrorKind::ValidationFailure);
        assert_eq!(
            LedgerError::AccountNotFound("a".into()).kind(),
            ErrorKind::AccountNotFound
        );
        assert_eq!(LedgerError::BatchAborted.kind(), ErrorKind::ExecutionFailure);
        assert_eq!(
            LedgerError::Precision("a".into()).kind(),
            ErrorKind::ExecutionFailure
        );
    }
}
