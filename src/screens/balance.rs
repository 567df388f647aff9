use rust_decimal::Decimal;
use tokio::sync::{mpsc, watch};

use super::StateHolder;
use crate::{
    models::{Account, OperationResult, Toast},
    repository::Repository,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceState {
    pub result: OperationResult<Vec<Account>>,
}

impl BalanceState {
    pub fn primary_balance(&self) -> Option<Decimal> {
        match &self.result {
            OperationResult::Success(accounts) => accounts
                .iter()
                .find(|account| account.is_primary)
                .map(|account| account.balance),
            _ => None,
        }
    }
}

pub struct BalanceScreen {
    holder: StateHolder<BalanceState>,
    repository: Repository,
}

impl BalanceScreen {
    pub fn new(repository: Repository, events_capacity: usize) -> Self {
        Self {
            holder: StateHolder::new(BalanceState::default(), events_capacity),
            repository,
        }
    }

    pub fn state(&self) -> BalanceState {
        self.holder.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<BalanceState> {
        self.holder.subscribe()
    }

    pub fn take_events(&mut self) -> Option<mpsc::Receiver<Toast>> {
        self.holder.take_events()
    }

    pub fn fetch_accounts(&mut self, user_id: &str) {
        let publisher = self.holder.begin();
        publisher.update(|state| state.result = OperationResult::Loading);

        let repository = self.repository.clone();
        let user_id = user_id.to_string();
        self.holder.launch(async move {
            match repository.fetch_accounts(&user_id).await {
                Ok(accounts) => {
                    log::info!("loaded {} accounts for user {}", accounts.len(), user_id);
                    publisher.update(|state| state.result = OperationResult::Success(accounts));
                }
                Err(kind) => {
                    publisher.publish(
                        |state| state.result = OperationResult::Error(kind),
                        Some(Toast::from(kind)),
                    );
                }
            }
        });
    }

    pub async fn settle(&mut self) {
        self.holder.settle().await
    }
}
