use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Informational status supplied by the caller; never consulted by the ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

/// Transfer request as submitted in a batch
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub id: String,
    pub amount: Decimal,
    pub sender_id: String,
    pub recipient_id: String,
    #[serde(default)]
    pub status: TransferStatus,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub created_at: u64,
}

impl TransferRequest {
    pub fn new(
        id: impl Into<String>,
        sender_id: impl Into<String>,
        recipient_id: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            amount,
            sender_id: sender_id.into(),
            recipient_id: recipient_id.into(),
            status: TransferStatus::default(),
            created_at: 0,
        }
    }
}

/// Account state
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Account {
    pub id: String,
    pub balance: Decimal,
}

impl Account {
    pub fn new(id: impl Into<String>, balance: Decimal) -> Self {
        Self {
            id: id.into(),
            balance,
        }
    }

    /// Fails rather than round when the new balance is not exactly `balance - amount`
    pub(crate) fn debit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if self.balance < amount {
            return Err(LedgerError::InsufficientFunds(self.id.clone()));
        }

        let balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::Overflow(self.id.clone()))?;

        if self.balance.checked_sub(balance) != Some(amount) {
            return Err(LedgerError::Precision(self.id.clone()));
        }

        self.balance = balance;

        Ok(())
    }

    /// Fails rather than round when the new balance is not exactly `balance + amount`
    pub(crate) fn credit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(self.id.clone()))?;

        if balance.checked_sub(self.balance) != Some(amount) {
            return Err(LedgerError::Precision(self.id.clone()));
        }

        self.balance = balance;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_debit_and_credit() {
        let mut account = Account::new("a", dec!(10.50));

        account.debit(dec!(0.50)).unwrap();
        account.credit(dec!(2)).unwrap();

        assert_eq!(account.balance, dec!(12.00));
    }

    #[test]
    fn test_debit_exact_balance() {
        let mut account = Account::new("a", dec!(100));

        account.debit(dec!(100)).unwrap();

        assert_eq!(account.balance, Decimal::ZERO);
    }

    #[test]
    fn test_debit_insufficient_funds_leaves_balance() {
        let mut account = Account::new("a", dec!(5));

        let result = account.debit(dec!(5.01));

        assert_eq!(result, Err(LedgerError::InsufficientFunds("a".into())));
        assert_eq!(account.balance, dec!(5));
    }

    fn whale() -> Decimal {
        Decimal::from_i128_with_scale(10_i128.pow(28), 0)
    }

    #[test]
    fn test_credit_refuses_to_round() {
        let mut account = Account::new("whale", whale());

        let result = account.credit(dec!(0.5));

        assert_eq!(result, Err(LedgerError::Precision("whale".into())));
        assert_eq!(account.balance, whale());
    }

    #[test]
    fn test_debit_refuses_to_round() {
        let mut account = Account::new("whale", whale());

        let result = account.debit(dec!(0.5));

        assert_eq!(result, Err(LedgerError::Precision("whale".into())));
        assert_eq!(account.balance, whale());
    }

    #[test]
    fn test_large_balances_move_exactly_when_representable() {
        let mut account = Account::new("whale", whale());

        account.debit(dec!(1)).unwrap();
        account.credit(dec!(2)).unwrap();

        assert_eq!(account.balance, whale() + dec!(1));
    }

    #[test]
    fn test_credit_overflow() {
        let mut account = Account::new("a", Decimal::MAX);

        let result = account.credit(dec!(1));

        assert_eq!(result, Err(LedgerError::Overflow("a".into())));
        assert_eq!(account.balance, Decimal::MAX);
    }
}
