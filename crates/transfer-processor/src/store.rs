use crate::error::StoreError;
use crate::transfer::Account;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Read/write and snapshot primitives the ledger needs from account storage
///
/// At most one snapshot may be outstanding at a time. Reads hand out
/// independent copies, so mutating a returned account never touches
/// stored state.
pub trait AccountStore {
    /// Owned, point-in-time copy of every account
    type Snapshot;

    fn get(&self, id: &str) -> Option<Account>;

    /// Replace the stored account, creating it if absent
    fn put(&mut self, account: Account) -> Result<(), StoreError>;

    fn create(&mut self, id: &str, initial_balance: Decimal) -> Result<Account, StoreError>;

    /// All accounts, ordered by id
    fn all(&self) -> Vec<Account>;

    fn snapshot(&mut self) -> Result<Self::Snapshot, StoreError>;

    /// Replace current state wholesale with the snapshot contents
    fn restore(&mut self, snapshot: Self::Snapshot) -> Result<(), StoreError>;

    /// Release the snapshot without applying it
    fn discard(&mut self, snapshot: Self::Snapshot) -> Result<(), StoreError>;
}

/// Deep copy of an [`InMemoryAccountStore`], tagged with the store and generation it was taken at
#[derive(Debug)]
pub struct AccountSnapshot {
    store: u64,
    generation: u64,
    accounts: HashMap<String, Account>,
}

/// Account store backed by a `HashMap` keyed by account id
#[derive(Debug)]
pub struct InMemoryAccountStore {
    /// Unique per store in this process, so snapshots cannot cross stores
    id: u64,
    accounts: HashMap<String, Account>,
    generation: u64,
    outstanding: Option<u64>,
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            accounts: HashMap::new(),
            generation: 0,
            outstanding: None,
        }
    }

    /// Seed a store, rejecting duplicate ids and negative balances
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Result<Self, StoreError> {
        let mut store = Self::new();

        for account in accounts {
            store.create(&account.id, account.balance)?;
        }

        Ok(store)
    }

    fn check(account: &Account) -> Result<(), StoreError> {
        if account.id.is_empty() {
            return Err(StoreError::EmptyAccountId);
        }

        if account.balance < Decimal::ZERO {
            return Err(StoreError::NegativeBalance {
                id: account.id.clone(),
                balance: account.balance,
            });
        }

        Ok(())
    }

    fn release(&mut self, snapshot: &AccountSnapshot) -> Result<(), StoreError> {
        if snapshot.store != self.id || self.outstanding != Some(snapshot.generation) {
            return Err(StoreError::UnknownSnapshot(snapshot.generation));
        }

        self.outstanding = None;

        Ok(())
    }
}

impl AccountStore for InMemoryAccountStore {
    type Snapshot = AccountSnapshot;

    fn get(&self, id: &str) -> Option<Account> {
        self.accounts.get(id).cloned()
    }

    fn put(&mut self, account: Account) -> Result<(), StoreError> {
        Self::check(&account)?;

        self.accounts.insert(account.id.clone(), account);

        Ok(())
    }

    fn create(&mut self, id: &str, initial_balance: Decimal) -> Result<Account, StoreError> {
        if self.accounts.contains_key(id) {
            return Err(StoreError::AccountAlreadyExists(id.to_owned()));
        }

        let account = Account::new(id, initial_balance);
        self.put(account.clone())?;

        Ok(account)
    }

    fn all(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.id.cmp(&b.id));

        accounts
    }

    fn snapshot(&mut self) -> Result<AccountSnapshot, StoreError> {
        if self.outstanding.is_some() {
            return Err(StoreError::SnapshotOutstanding);
        }

        self.generation += 1;
        self.outstanding = Some(self.generation);

        Ok(AccountSnapshot {
            store: self.id,
            generation: self.generation,
            accounts: self.accounts.clone(),
        })
    }

    fn restore(&mut self, snapshot: AccountSnapshot) -> Result<(), StoreError> {
        self.release(&snapshot)?;
        self.accounts = snapshot.accounts;

        Ok(())
    }

    fn discard(&mut self, snapshot: AccountSnapshot) -> Result<(), StoreError> {
        self.release(&snapshot)
    }
}
