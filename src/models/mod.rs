use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identifier: &str, secret: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            secret: secret.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub is_primary: bool,
    pub balance: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    pub sender_id: String,
    pub recipient_id: String,
    pub amount: Decimal,
}

/// Outcome of the last action triggered on a screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationResult<T> {
    Idle,
    Loading,
    Success(T),
    Error(ErrorKind),
}

impl<T> Default for OperationResult<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> OperationResult<T> {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success(_) => "success",
            Self::Error(_) => "error",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoConnection,
    ServerUnavailable,
    UnknownRecipient,
    InsufficientBalance,
    SameUserId,
    LoginRejected,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One-shot notification shown to the user once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toast {
    LoginSuccess,
    LoginFailed,
    TransferSuccess,
    TransferFailed,
    NoInternet,
    ServerError,
    UnknownUser,
    SameUserId,
    InvalidAmount,
    UnknownError,
}

impl Toast {
    pub fn message(&self) -> &'static str {
        match self {
            Toast::LoginSuccess => "Login successful",
            Toast::LoginFailed => "Wrong identifier or password",
            Toast::TransferSuccess => "Transfer completed",
            Toast::TransferFailed => "Transfer failed: insufficient balance",
            Toast::NoInternet => "No internet connection",
            Toast::ServerError => "The server is unavailable, try again later",
            Toast::UnknownUser => "Unknown recipient",
            Toast::SameUserId => "You cannot send money to yourself",
            Toast::InvalidAmount => "Enter a valid amount",
            Toast::UnknownError => "An unknown error occurred",
        }
    }
}

impl From<ErrorKind> for Toast {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoConnection => Toast::NoInternet,
            ErrorKind::ServerUnavailable => Toast::ServerError,
            ErrorKind::UnknownRecipient => Toast::UnknownUser,
            ErrorKind::InsufficientBalance => Toast::TransferFailed,
            ErrorKind::SameUserId => Toast::SameUserId,
            ErrorKind::LoginRejected => Toast::LoginFailed,
            ErrorKind::Unknown => Toast::UnknownError,
        }
    }
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// wire records

#[derive(Clone, Debug, Serialize)]
pub struct LoginBody<'a> {
    pub id: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct LoginReply {
    pub granted: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AccountRecord {
    pub id: String,
    pub main: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

impl From<AccountRecord> for Account {
    fn from(record: AccountRecord) -> Self {
        Self {
            id: record.id,
            is_primary: record.main,
            balance: record.balance,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TransferBody<'a> {
    pub sender: &'a str,
    pub recipient: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl<'a> From<&'a TransferRequest> for TransferBody<'a> {
    fn from(request: &'a TransferRequest) -> Self {
        Self {
            sender: &request.sender_id,
            recipient: &request.recipient_id,
            amount: request.amount,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct TransferReply {
    pub result: bool,
}

// session script rows

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Login,
    Accounts,
    Transfer,
    LoginFields,
    TransferFields,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ActionRow {
    pub action: ActionType,
    pub user: String,
    #[serde(default)]
    pub arg: String,
    #[serde(default)]
    pub amount: String,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::{Account, AccountRecord, ErrorKind, OperationResult, Toast, TransferBody, TransferRequest};

    #[test]
    fn should_decode_account_with_numeric_balance() {
        let record: AccountRecord =
            serde_json::from_str(r#"{"id":"1","main":true,"balance":523.23}"#).unwrap();
        let account = Account::from(record);
        assert_eq!(account.id, "1");
        assert!(account.is_primary);
        assert_eq!(account.balance, dec!(523.23));
    }

    #[test]
    fn should_encode_transfer_amount_as_number() {
        let request = TransferRequest {
            sender_id: "1234".to_string(),
            recipient_id: "5678".to_string(),
            amount: dec!(100.5),
        };
        let json = serde_json::to_value(TransferBody::from(&request)).unwrap();
        assert_eq!(json["sender"], "1234");
        assert_eq!(json["recipient"], "5678");
        assert_eq!(json["amount"], 100.5);
    }

    #[test]
    fn should_start_idle() {
        let idle: OperationResult<()> = OperationResult::default();
        assert_eq!(idle, OperationResult::Idle);
        assert_eq!(idle.label(), "idle");
        assert_eq!(OperationResult::<()>::Loading.label(), "loading");
        assert_eq!(OperationResult::Success(()).label(), "success");
        assert_eq!(OperationResult::<()>::Error(ErrorKind::Unknown).label(), "error");
    }

    #[test]
    fn should_map_every_error_kind_to_a_toast() {
        assert_eq!(Toast::from(ErrorKind::NoConnection), Toast::NoInternet);
        assert_eq!(Toast::from(ErrorKind::ServerUnavailable), Toast::ServerError);
        assert_eq!(Toast::from(ErrorKind::UnknownRecipient), Toast::UnknownUser);
        assert_eq!(Toast::from(ErrorKind::LoginRejected), Toast::LoginFailed);
        assert_eq!(Toast::from(ErrorKind::Unknown), Toast::UnknownError);
    }
}
