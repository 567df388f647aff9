use std::sync::Arc;

use crate::{
    classifier::{ErrorClassifier, Operation},
    client::{ClientError, NetworkClient},
    models::{Account, Credentials, ErrorKind, TransferRequest},
};

/// Single entry point of the screens into the remote API.
///
/// Every failure is classified here; callers only ever see an [`ErrorKind`].
#[derive(Clone)]
pub struct Repository {
    client: Arc<dyn NetworkClient>,
    classifier: ErrorClassifier,
}

impl Repository {
    pub fn new(client: Arc<dyn NetworkClient>, classifier: ErrorClassifier) -> Self {
        Self { client, classifier }
    }

    /// `Ok(false)` means the server rejected the credentials.
    pub async fn login(&self, credentials: &Credentials) -> Result<bool, ErrorKind> {
        log::debug!("login request (id: {})", credentials.identifier);
        match self.client.login(credentials).await {
            Ok(reply) => Ok(reply.granted),
            Err(e) => Err(self.fail(Operation::Login, e).await),
        }
    }

    pub async fn fetch_accounts(&self, user_id: &str) -> Result<Vec<Account>, ErrorKind> {
        log::debug!("accounts request (id: {})", user_id);
        match self.client.fetch_accounts(user_id).await {
            Ok(records) => Ok(records.into_iter().map(Account::from).collect()),
            Err(e) => Err(self.fail(Operation::FetchAccounts, e).await),
        }
    }

    /// `Ok(false)` means the server refused the transfer, e.g. for lack of funds.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<bool, ErrorKind> {
        log::debug!(
            "transfer request (sender: {}, recipient: {}, amount: {})",
            request.sender_id,
            request.recipient_id,
            request.amount
        );
        match self.client.transfer(request).await {
            Ok(reply) => Ok(reply.result),
            Err(e) => Err(self.fail(Operation::Transfer, e).await),
        }
    }

    async fn fail(&self, operation: Operation, error: ClientError) -> ErrorKind {
        let kind = self.classifier.classify(operation, &error).await;
        log::error!("{:?} failed: {} (classified as {})", operation, error, kind);
        kind
    }
}
