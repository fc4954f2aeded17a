use crate::error::LedgerError;
use crate::outcome::{TransactionOutcome, ValidationResult};
use crate::store::AccountStore;
use crate::transfer::{Account, TransferRequest};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Accounts touched by a batch, looked up once each; `None` when absent from the store
type AccountView<'a> = HashMap<&'a str, Option<Account>>;

type Check = fn(&TransferRequest, &AccountView<'_>) -> Result<(), LedgerError>;

/// Checks run per transfer, in order, stopping at the first failure
const CHECKS: [Check; 4] = [
    |transfer, _| check_amount(transfer),
    |transfer, _| check_distinct_accounts(transfer),
    check_accounts_exist,
    check_funds,
];

/// Validate every transfer of the batch, collecting one error per failing transfer
///
/// Read-only. Affordability is checked against stored balances and ignores
/// earlier transfers in the same batch; the executor repeats that check
/// against live balances and has the final say.
pub fn validate<S: AccountStore>(store: &S, transfers: &[TransferRequest]) -> ValidationResult {
    if transfers.is_empty() {
        return ValidationResult::from_errors(vec![TransactionOutcome::batch(
            LedgerError::EmptyBatch,
        )]);
    }

    let accounts = affected_accounts(store, transfers);

    let errors = transfers
        .iter()
        .filter_map(|transfer| {
            CHECKS
                .iter()
                .try_for_each(|check| check(transfer, &accounts))
                .err()
                .map(|error| TransactionOutcome::rejected(transfer.id.as_str(), error))
        })
        .collect();

    ValidationResult::from_errors(errors)
}

/// Checks that need no account state; the executor re-applies these before mutating anything
pub(crate) fn check_well_formed(transfer: &TransferRequest) -> Result<(), LedgerError> {
    check_amount(transfer)?;
    check_distinct_accounts(transfer)
}

fn affected_accounts<'a, S: AccountStore>(
    store: &S,
    transfers: &'a [TransferRequest],
) -> AccountView<'a> {
    let mut accounts = AccountView::new();

    for transfer in transfers {
        for id in [transfer.sender_id.as_str(), transfer.recipient_id.as_str()] {
            accounts.entry(id).or_insert_with(|| store.get(id));
        }
    }

    accounts
}

fn check_amount(transfer: &TransferRequest) -> Result<(), LedgerError> {
    if transfer.amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount(transfer.amount));
    }

    Ok(())
}

fn check_distinct_accounts(transfer: &TransferRequest) -> Result<(), LedgerError> {
    if transfer.sender_id == transfer.recipient_id {
        return Err(LedgerError::SameAccount);
    }

    Ok(())
}

fn lookup<'v>(accounts: &'v AccountView<'_>, id: &str) -> Option<&'v Account> {
    accounts.get(id).and_then(Option::as_ref)
}

fn check_accounts_exist(
    transfer: &TransferRequest,
    accounts: &AccountView<'_>,
) -> Result<(), LedgerError> {
    let missing: Vec<String> = [&transfer.sender_id, &transfer.recipient_id]
        .into_iter()
        .filter(|id| lookup(accounts, id).is_none())
        .cloned()
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(LedgerError::MissingAccounts(missing))
}

fn check_funds(transfer: &TransferRequest, accounts: &AccountView<'_>) -> Result<(), LedgerError> {
    let sufficient = lookup(accounts, &transfer.sender_id)
        .is_some_and(|sender| sender.balance >= transfer.amount);

    if !sufficient {
        return Err(LedgerError::InsufficientFunds(transfer.sender_id.clone()));
    }

    Ok(())
}
