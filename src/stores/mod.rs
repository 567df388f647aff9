use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::Account;

#[derive(Debug, Default)]
pub struct CredentialStore {
    // maps user id to password
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, password: &str) {
        self.credentials.insert(id.to_string(), password.to_string());
        log::info!("registered user {}", id);
    }

    pub fn contains_user(&self, id: &str) -> bool {
        self.credentials.contains_key(id)
    }

    pub fn matches(&self, id: &str, password: &str) -> bool {
        self.credentials
            .get(id)
            .map(|stored| stored == password)
            .unwrap_or(false)
    }
}

#[derive(Debug, Default)]
pub struct AccountStore {
    // maps user id to accounts, in server order
    accounts: HashMap<String, Vec<Account>>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_by_user(&self, user_id: &str) -> Vec<Account> {
        self.accounts.get(user_id).cloned().unwrap_or_default()
    }

    pub fn add_account(&mut self, user_id: &str, account: Account) {
        log::info!("saved account (user: {}, data: {:?})", user_id, account);
        self.accounts
            .entry(user_id.to_string())
            .or_default()
            .push(account);
    }

    pub fn primary_balance(&self, user_id: &str) -> Option<Decimal> {
        self.accounts
            .get(user_id)?
            .iter()
            .find(|account| account.is_primary)
            .map(|account| account.balance)
    }

    pub fn adjust_primary(&mut self, user_id: &str, delta: Decimal) -> Result<Decimal, DataError> {
        let account = self
            .accounts
            .get_mut(user_id)
            .and_then(|accounts| accounts.iter_mut().find(|account| account.is_primary))
            .ok_or(DataError::NotFound)?;
        account.balance += delta;
        log::info!(
            "adjusted primary account {} of user {} by {} (balance: {})",
            account.id,
            user_id,
            delta,
            account.balance
        );
        Ok(account.balance)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum DataError {
    NotFound,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::{AccountStore, CredentialStore, DataError};
    use crate::models::Account;

    fn account(id: &str, is_primary: bool, balance: rust_decimal::Decimal) -> Account {
        Account {
            id: id.to_string(),
            is_primary,
            balance,
        }
    }

    #[test]
    fn should_match_only_stored_password() {
        let mut store = CredentialStore::new();
        store.insert("1234", "p@sswOrd");
        assert!(store.matches("1234", "p@sswOrd"));
        assert!(!store.matches("1234", "wrong"));
        assert!(!store.matches("9999", "p@sswOrd"));
    }

    #[test]
    fn should_keep_accounts_in_insertion_order() {
        let mut store = AccountStore::new();
        store.add_account("1234", account("1", true, dec!(523.23)));
        store.add_account("1234", account("2", false, dec!(235.22)));
        let ids: Vec<_> = store
            .find_by_user("1234")
            .into_iter()
            .map(|account| account.id)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(store.find_by_user("0000").is_empty());
    }

    #[test]
    fn should_adjust_primary_account_only() {
        let mut store = AccountStore::new();
        store.add_account("1234", account("1", true, dec!(523.23)));
        store.add_account("1234", account("2", false, dec!(235.22)));
        assert_eq!(store.adjust_primary("1234", dec!(-23.23)).unwrap(), dec!(500.00));
        assert_eq!(store.primary_balance("1234"), Some(dec!(500.00)));
        assert_eq!(store.find_by_user("1234")[1].balance, dec!(235.22));
    }

    #[test]
    fn should_not_adjust_missing_user() {
        let mut store = AccountStore::new();
        assert_eq!(store.adjust_primary("1234", dec!(1)), Err(DataError::NotFound));
    }
}
