use tokio::sync::{mpsc, watch};

use super::StateHolder;
use crate::{
    models::{Credentials, ErrorKind, OperationResult, Toast},
    repository::Repository,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginState {
    /// Carries the granted user id on success.
    pub result: OperationResult<String>,
    pub is_login_enabled: bool,
}

pub struct LoginScreen {
    holder: StateHolder<LoginState>,
    repository: Repository,
}

impl LoginScreen {
    pub fn new(repository: Repository, events_capacity: usize) -> Self {
        Self {
            holder: StateHolder::new(LoginState::default(), events_capacity),
            repository,
        }
    }

    pub fn state(&self) -> LoginState {
        self.holder.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoginState> {
        self.holder.subscribe()
    }

    pub fn take_events(&mut self) -> Option<mpsc::Receiver<Toast>> {
        self.holder.take_events()
    }

    pub fn fields_changed(&self, id: &str, password: &str) {
        let enabled = !id.trim().is_empty() && !password.trim().is_empty();
        self.holder.modify(|state| state.is_login_enabled = enabled);
    }

    pub fn login(&mut self, id: &str, password: &str) {
        let publisher = self.holder.begin();
        publisher.update(|state| state.result = OperationResult::Loading);

        let repository = self.repository.clone();
        let credentials = Credentials::new(id, password);
        self.holder.launch(async move {
            let (result, toast) = match repository.login(&credentials).await {
                Ok(true) => (
                    OperationResult::Success(credentials.identifier),
                    Toast::LoginSuccess,
                ),
                Ok(false) => (
                    OperationResult::Error(ErrorKind::LoginRejected),
                    Toast::LoginFailed,
                ),
                Err(kind) => (OperationResult::Error(kind), Toast::from(kind)),
            };
            log::info!("login finished: {}", result.label());
            publisher.publish(|state| state.result = result, Some(toast));
        });
    }

    pub async fn settle(&mut self) {
        self.holder.settle().await
    }
}
