use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Mutex;

use crate::{
    client::{ClientError, NetworkClient},
    models::{Account, AccountRecord, Credentials, LoginReply, TransferReply, TransferRequest},
    stores::{AccountStore, CredentialStore, DataError},
};

/// In-memory stand-in for the Aura API, answering the way the real server does.
#[derive(Debug)]
pub struct FixtureApi {
    credentials: CredentialStore,
    account_store: Mutex<AccountStore>,
    offline: AtomicBool,
}

impl FixtureApi {
    /// Users `1234` and `5678` with two accounts each.
    pub fn seeded() -> Self {
        let mut credentials = CredentialStore::new();
        credentials.insert("1234", "p@sswOrd");
        credentials.insert("5678", "T0pSecr3t");

        let mut accounts = AccountStore::new();
        for (user_id, id, is_primary, balance) in [
            ("1234", "1", true, dec!(523.23)),
            ("1234", "2", false, dec!(235.22)),
            ("5678", "3", false, dec!(24.53)),
            ("5678", "4", true, dec!(10032.21)),
        ] {
            accounts.add_account(
                user_id,
                Account {
                    id: id.to_string(),
                    is_primary,
                    balance,
                },
            );
        }

        Self {
            credentials,
            account_store: Mutex::new(accounts),
            offline: AtomicBool::new(false),
        }
    }

    /// While offline every call fails the way a dropped connection does.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
        log::info!("fixture api offline: {}", offline);
    }

    fn check_link(&self) -> Result<(), ClientError> {
        match self.offline.load(Ordering::SeqCst) {
            true => Err(ClientError::Transport("connection refused".to_string())),
            false => Ok(()),
        }
    }

    async fn process_transfer(&self, request: &TransferRequest) -> Result<bool, ProcessingError> {
        if !self.credentials.contains_user(&request.sender_id) {
            return Err(ProcessingError::UnknownUser(request.sender_id.clone()));
        }
        if !self.credentials.contains_user(&request.recipient_id) {
            return Err(ProcessingError::UnknownUser(request.recipient_id.clone()));
        }
        if request.amount <= Decimal::ZERO {
            return Ok(false);
        }

        let mut accounts = self.account_store.lock().await;
        if accounts.primary_balance(&request.recipient_id).is_none() {
            return Err(ProcessingError::NoPrimaryAccount(request.recipient_id.clone()));
        }
        match accounts.primary_balance(&request.sender_id) {
            None => Err(ProcessingError::NoPrimaryAccount(request.sender_id.clone())),
            Some(balance) if balance < request.amount => Ok(false),
            Some(_) => {
                accounts
                    .adjust_primary(&request.sender_id, -request.amount)
                    .and_then(|_| accounts.adjust_primary(&request.recipient_id, request.amount))
                    .map_err(|e| match e {
                        DataError::NotFound => {
                            ProcessingError::NoPrimaryAccount(request.sender_id.clone())
                        }
                    })?;
                Ok(true)
            }
        }
    }
}

#[async_trait]
impl NetworkClient for FixtureApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginReply, ClientError> {
        self.check_link()?;
        let granted = self
            .credentials
            .matches(&credentials.identifier, &credentials.secret);
        Ok(LoginReply { granted })
    }

    async fn fetch_accounts(&self, user_id: &str) -> Result<Vec<AccountRecord>, ClientError> {
        self.check_link()?;
        let accounts = self.account_store.lock().await.find_by_user(user_id);
        Ok(accounts
            .into_iter()
            .map(|account| AccountRecord {
                id: account.id,
                main: account.is_primary,
                balance: account.balance,
            })
            .collect())
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReply, ClientError> {
        self.check_link()?;
        match self.process_transfer(request).await {
            Ok(result) => Ok(TransferReply { result }),
            Err(e) => {
                log::error!("{}", e);
                Err(ClientError::Status(500))
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ProcessingError {
    UnknownUser(String),
    NoPrimaryAccount(String),
}

impl std::fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
