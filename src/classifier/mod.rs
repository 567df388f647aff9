use std::{net::SocketAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::net::TcpStream;

use crate::{client::ClientError, models::ErrorKind};

/// Answers whether the host currently has network access.
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Considers the host online when a TCP handshake with `addr` succeeds in time.
#[derive(Debug, Clone)]
pub struct TcpConnectivity {
    addr: SocketAddr,
    timeout: Duration,
}

impl TcpConnectivity {
    pub fn new(addr: SocketAddr, timeout: Duration) -> Self {
        Self { addr, timeout }
    }
}

#[async_trait]
impl Connectivity for TcpConnectivity {
    async fn is_online(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(self.addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                log::debug!("connectivity check against {} failed: {}", self.addr, e);
                false
            }
            Err(_) => {
                log::debug!("connectivity check against {} timed out", self.addr);
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StaticConnectivity(pub bool);

#[async_trait]
impl Connectivity for StaticConnectivity {
    async fn is_online(&self) -> bool {
        self.0
    }
}

/// Remote operation a failure came from; status codes mean different things per endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Login,
    FetchAccounts,
    Transfer,
}

#[derive(Clone)]
pub struct ErrorClassifier {
    connectivity: Arc<dyn Connectivity>,
}

impl ErrorClassifier {
    pub fn new(connectivity: Arc<dyn Connectivity>) -> Self {
        Self { connectivity }
    }

    pub async fn classify(&self, operation: Operation, failure: &ClientError) -> ErrorKind {
        match (operation, failure) {
            (_, ClientError::Transport(_)) => match self.connectivity.is_online().await {
                true => ErrorKind::ServerUnavailable,
                false => ErrorKind::NoConnection,
            },
            (Operation::Transfer, ClientError::Status(500)) => ErrorKind::UnknownRecipient,
            (_, ClientError::Status(503)) => ErrorKind::ServerUnavailable,
            _ => ErrorKind::Unknown,
        }
    }
}
