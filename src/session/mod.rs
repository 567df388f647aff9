use std::io;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::{
    models::{ActionRow, ActionType, OperationResult, Toast},
    repository::Repository,
    screens::{BalanceScreen, LoginScreen, TransferScreen},
};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to write report: {0}")]
    Report(#[from] csv::Error),
    #[error("failed to flush report: {0}")]
    Flush(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub action: String,
    pub user: String,
    pub state: String,
    pub detail: String,
    pub message: String,
}

pub struct Session {
    login: LoginScreen,
    balance: BalanceScreen,
    transfer: TransferScreen,
    login_events: Option<mpsc::Receiver<Toast>>,
    balance_events: Option<mpsc::Receiver<Toast>>,
    transfer_events: Option<mpsc::Receiver<Toast>>,
}

impl Session {
    pub fn new(repository: Repository, events_capacity: usize) -> Self {
        let mut login = LoginScreen::new(repository.clone(), events_capacity);
        let mut balance = BalanceScreen::new(repository.clone(), events_capacity);
        let mut transfer = TransferScreen::new(repository, events_capacity);
        Self {
            login_events: login.take_events(),
            balance_events: balance.take_events(),
            transfer_events: transfer.take_events(),
            login,
            balance,
            transfer,
        }
    }

    pub async fn run_action(&mut self, row: &ActionRow) -> ReportRow {
        let (action, state, detail, events) = match row.action {
            ActionType::Login => {
                self.login.login(&row.user, &row.arg);
                self.login.settle().await;
                let result = self.login.state().result;
                let detail = match &result {
                    OperationResult::Success(user_id) => user_id.clone(),
                    OperationResult::Error(kind) => kind.to_string(),
                    _ => String::new(),
                };
                ("login", result.label(), detail, &mut self.login_events)
            }
            ActionType::LoginFields => {
                self.login.fields_changed(&row.user, &row.arg);
                let state = self.login.state();
                (
                    "login_fields",
                    state.result.label(),
                    format!("enabled={}", state.is_login_enabled),
                    &mut self.login_events,
                )
            }
            ActionType::Accounts => {
                self.balance.fetch_accounts(&row.user);
                self.balance.settle().await;
                let state = self.balance.state();
                let detail = match &state.result {
                    OperationResult::Success(accounts) => format!(
                        "accounts={};primary={}",
                        accounts.len(),
                        state
                            .primary_balance()
                            .map(|balance| balance.to_string())
                            .unwrap_or_else(|| "none".to_string())
                    ),
                    OperationResult::Error(kind) => kind.to_string(),
                    _ => String::new(),
                };
                ("accounts", state.result.label(), detail, &mut self.balance_events)
            }
            ActionType::Transfer => {
                self.transfer.transfer(&row.user, &row.arg, &row.amount);
                self.transfer.settle().await;
                let result = self.transfer.state().result;
                let detail = match &result {
                    OperationResult::Success(()) => format!("{}->{}", row.user, row.arg),
                    OperationResult::Error(kind) => kind.to_string(),
                    _ => String::new(),
                };
                ("transfer", result.label(), detail, &mut self.transfer_events)
            }
            ActionType::TransferFields => {
                self.transfer.fields_changed(&row.arg, &row.amount);
                let state = self.transfer.state();
                (
                    "transfer_fields",
                    state.result.label(),
                    format!("enabled={}", state.is_transfer_enabled),
                    &mut self.transfer_events,
                )
            }
        };

        ReportRow {
            action: action.to_string(),
            user: row.user.clone(),
            state: state.to_string(),
            detail,
            message: drain(events),
        }
    }

    // unreadable rows are logged and skipped
    pub async fn replay<R, W>(
        &mut self,
        reader: &mut csv::Reader<R>,
        writer: &mut csv::Writer<W>,
    ) -> Result<usize, SessionError>
    where
        R: io::Read,
        W: io::Write,
    {
        let mut count = 0;
        for row in reader.deserialize::<ActionRow>() {
            match row {
                Ok(row) => {
                    let report = self.run_action(&row).await;
                    log::info!("{:?} -> {} {}", row.action, report.state, report.detail);
                    writer.serialize(&report)?;
                    count += 1;
                }
                Err(e) => log::error!("skipping script row: {}", e),
            }
        }
        writer.flush()?;
        Ok(count)
    }
}

fn drain(events: &mut Option<mpsc::Receiver<Toast>>) -> String {
    let Some(events) = events else {
        return String::new();
    };
    let mut messages = Vec::new();
    while let Ok(toast) = events.try_recv() {
        messages.push(toast.message());
    }
    messages.join(" | ")
}
