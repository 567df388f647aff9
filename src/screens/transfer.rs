use std::str::FromStr;

use rust_decimal::Decimal;
use tokio::sync::{mpsc, watch};

use super::StateHolder;
use crate::{
    models::{ErrorKind, OperationResult, Toast, TransferRequest},
    repository::Repository,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferState {
    pub result: OperationResult<()>,
    pub is_transfer_enabled: bool,
}

pub struct TransferScreen {
    holder: StateHolder<TransferState>,
    repository: Repository,
}

impl TransferScreen {
    pub fn new(repository: Repository, events_capacity: usize) -> Self {
        Self {
            holder: StateHolder::new(TransferState::default(), events_capacity),
            repository,
        }
    }

    pub fn state(&self) -> TransferState {
        self.holder.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<TransferState> {
        self.holder.subscribe()
    }

    pub fn take_events(&mut self) -> Option<mpsc::Receiver<Toast>> {
        self.holder.take_events()
    }

    pub fn fields_changed(&self, recipient: &str, amount: &str) {
        let enabled = !recipient.trim().is_empty() && !amount.trim().is_empty();
        self.holder.modify(|state| state.is_transfer_enabled = enabled);
    }

    /// Invalid input supersedes any pending transfer, resets the screen to
    /// idle and never reaches the repository.
    pub fn transfer(&mut self, sender: &str, recipient: &str, amount: &str) {
        let validated = validate(sender, recipient, amount);
        let publisher = self.holder.begin();
        let request = match validated {
            Ok(request) => request,
            Err(toast) => {
                log::warn!("rejected transfer input: {:?}", toast);
                publisher.publish(|state| state.result = OperationResult::Idle, Some(toast));
                return;
            }
        };
        publisher.update(|state| state.result = OperationResult::Loading);

        let repository = self.repository.clone();
        self.holder.launch(async move {
            let (result, toast) = match repository.transfer(&request).await {
                Ok(true) => (OperationResult::Success(()), Toast::TransferSuccess),
                Ok(false) => (
                    OperationResult::Error(ErrorKind::InsufficientBalance),
                    Toast::TransferFailed,
                ),
                Err(kind) => (OperationResult::Error(kind), Toast::from(kind)),
            };
            log::info!("transfer finished: {}", result.label());
            publisher.publish(|state| state.result = result, Some(toast));
        });
    }

    pub async fn settle(&mut self) {
        self.holder.settle().await
    }
}

fn validate(sender: &str, recipient: &str, amount: &str) -> Result<TransferRequest, Toast> {
    let sender = sender.trim();
    let recipient = recipient.trim();
    if sender == recipient {
        return Err(Toast::SameUserId);
    }
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(Toast::InvalidAmount);
    }
    match Decimal::from_str(amount) {
        Ok(amount) if amount > Decimal::ZERO => Ok(TransferRequest {
            sender_id: sender.to_string(),
            recipient_id: recipient.to_string(),
            amount,
        }),
        _ => Err(Toast::InvalidAmount),
    }
}
