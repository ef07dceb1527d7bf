//! Account registry the login check cross-references decoded cards against.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Registry-side view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub city: String,
    pub dob: String,
    pub zodiac_sign: String,
    pub account_id: String,
}

/// Lookup of accounts by email.
pub trait AccountRegistry: Send + Sync {
    fn find_by_email(&self, email: &str) -> Option<AccountRecord>;
}

/// Registry held in memory, keyed by normalized email.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    accounts: RwLock<HashMap<String, AccountRecord>>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_accounts(accounts: impl IntoIterator<Item = AccountRecord>) -> Self {
        let registry = Self::new();
        for account in accounts {
            registry.insert(account);
        }
        registry
    }

    /// Insert or replace the account registered under the same email.
    pub fn insert(&self, account: AccountRecord) {
        let key = normalize_email(&account.email);
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, account);
    }

    pub fn len(&self) -> usize {
        self.accounts.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AccountRegistry for InMemoryRegistry {
    fn find_by_email(&self, email: &str) -> Option<AccountRecord> {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&normalize_email(email))
            .cloned()
    }
}
