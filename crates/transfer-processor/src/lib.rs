pub mod error;
pub mod executor;
pub mod ledger;
pub mod outcome;
pub mod store;
pub mod transfer;
pub mod validation;

pub use error::{ErrorKind, LedgerError, StoreError};
pub use ledger::{Ledger, LedgerConfig};
pub use outcome::{BatchPhase, BatchProcessResult, TransactionOutcome, ValidationResult};
pub use store::{AccountStore, InMemoryAccountStore};
pub use transfer::{Account, TransferRequest, TransferStatus};

/// Process one batch against the given accounts and return the result with the final account states
pub fn settle(
    accounts: impl IntoIterator<Item = Account>,
    transfers: &[TransferRequest],
) -> Result<(BatchProcessResult, Vec<Account>), StoreError> {
    let mut ledger = Ledger::new(InMemoryAccountStore::with_accounts(accounts)?);

    let result = ledger.process_batch(transfers)?;

    Ok((result, ledger.accounts()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_settle() {
        let (result, accounts) = settle(
            [Account::new("a", dec!(10)), Account::new("b", dec!(0))],
            &[TransferRequest::new("1", "a", "b", dec!(4))],
        )
        .unwrap();

        assert_eq!(result.successful, 1);
        assert_eq!(
            accounts,
            [Account::new("a", dec!(6)), Account::new("b", dec!(4))]
        );
    }

    #[test]
    fn test_settle_rejects_duplicate_accounts() {
        let result = settle(
            [Account::new("a", dec!(10)), Account::new("a", dec!(0))],
            &[TransferRequest::new("1", "a", "b", dec!(4))],
        );

        assert_eq!(result.unwrap_err(), StoreError::AccountAlreadyExists("a".into()));
    }
}
