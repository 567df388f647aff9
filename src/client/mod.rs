use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::models::{
    AccountRecord, Credentials, LoginBody, LoginReply, TransferBody, TransferReply,
    TransferRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("invalid payload: {0}")]
    Decode(String),
}

#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginReply, ClientError>;

    async fn fetch_accounts(&self, user_id: &str) -> Result<Vec<AccountRecord>, ClientError>;

    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReply, ClientError>;
}

pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    pub fn new(mut base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        // endpoints are joined relative to the base, which needs a trailing slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Decode(format!("invalid endpoint {}: {}", path, e)))
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl NetworkClient for HttpClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginReply, ClientError> {
        let body = LoginBody {
            id: &credentials.identifier,
            password: &credentials.secret,
        };
        let response = self
            .client
            .post(self.endpoint("login")?)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_json(response).await
    }

    async fn fetch_accounts(&self, user_id: &str) -> Result<Vec<AccountRecord>, ClientError> {
        let mut url = self.endpoint("accounts/")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Decode("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(user_id);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_json(response).await
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<TransferReply, ClientError> {
        let response = self
            .client
            .post(self.endpoint("transfer")?)
            .json(&TransferBody::from(request))
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_json(response).await
    }
}

fn map_transport_error(error: reqwest::Error) -> ClientError {
    if error.is_decode() {
        ClientError::Decode(error.to_string())
    } else {
        ClientError::Transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode) -> ClientError {
    ClientError::Status(status.as_u16())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        extract::Path,
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use reqwest::Url;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    use super::{ClientError, HttpClient, NetworkClient};
    use crate::models::{Credentials, TransferRequest};

    async fn login(Json(body): Json<Value>) -> Json<Value> {
        if body["id"] == "garbled" {
            return Json(json!({ "unexpected": 1 }));
        }
        let granted = body["id"] == "1234" && body["password"] == "p@sswOrd";
        Json(json!({ "granted": granted }))
    }

    async fn accounts(Path(user_id): Path<String>) -> Json<Value> {
        match user_id.as_str() {
            "1234" => Json(json!([
                { "id": "1", "main": true, "balance": 523.23 },
                { "id": "2", "main": false, "balance": 235.22 }
            ])),
            _ => Json(json!([])),
        }
    }

    async fn transfer(Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
        match body["recipient"].as_str() {
            Some("8888") => Err(StatusCode::INTERNAL_SERVER_ERROR),
            Some("down") => Err(StatusCode::SERVICE_UNAVAILABLE),
            _ => Ok(Json(json!({ "result": body["amount"] == 100.5 }))),
        }
    }

    fn api() -> Router {
        Router::new()
            .route("/login", post(login))
            .route("/accounts/{id}", get(accounts))
            .route("/transfer", post(transfer))
    }

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base: &str) -> HttpClient {
        HttpClient::new(Url::parse(base).unwrap(), Duration::from_secs(2)).unwrap()
    }

    fn request(recipient: &str) -> TransferRequest {
        TransferRequest {
            sender_id: "1234".to_string(),
            recipient_id: recipient.to_string(),
            amount: dec!(100.50),
        }
    }

    mod endpoints {
        use super::*;

        #[test]
        fn should_keep_base_path_prefix() {
            let client = client_for("http://bank.test/api");
            assert_eq!(
                client.endpoint("login").unwrap().as_str(),
                "http://bank.test/api/login"
            );
            let client = client_for("http://bank.test/api/");
            assert_eq!(
                client.endpoint("transfer").unwrap().as_str(),
                "http://bank.test/api/transfer"
            );
        }

        #[test]
        fn should_join_from_root_without_prefix() {
            let client = client_for("http://bank.test");
            assert_eq!(
                client.endpoint("accounts/").unwrap().as_str(),
                "http://bank.test/accounts/"
            );
        }
    }

    #[tokio::test]
    async fn should_post_credentials_and_read_grant() {
        let client = client_for(&serve(api()).await);
        let granted = client
            .login(&Credentials::new("1234", "p@sswOrd"))
            .await
            .unwrap();
        assert!(granted.granted);
        let refused = client
            .login(&Credentials::new("1234", "wrong"))
            .await
            .unwrap();
        assert!(!refused.granted);
    }

    #[tokio::test]
    async fn should_get_accounts_by_user_id() {
        let client = client_for(&serve(api()).await);
        let records = client.fetch_accounts("1234").await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].main);
        assert_eq!(records[0].balance, dec!(523.23));
        assert!(client.fetch_accounts("0000").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_send_amount_as_number() {
        let client = client_for(&serve(api()).await);
        assert!(client.transfer(&request("5678")).await.unwrap().result);
    }

    #[tokio::test]
    async fn should_report_server_status_on_transfer() {
        let client = client_for(&serve(api()).await);
        assert_eq!(
            client.transfer(&request("8888")).await.unwrap_err(),
            ClientError::Status(500)
        );
        assert_eq!(
            client.transfer(&request("down")).await.unwrap_err(),
            ClientError::Status(503)
        );
    }

    #[tokio::test]
    async fn should_reach_api_mounted_under_prefix() {
        let base = serve(Router::new().nest("/api", api())).await;
        let client = client_for(&format!("{}/api", base));
        assert!(
            client
                .login(&Credentials::new("1234", "p@sswOrd"))
                .await
                .unwrap()
                .granted
        );
        assert_eq!(client.fetch_accounts("1234").await.unwrap().len(), 2);
        assert!(client.transfer(&request("5678")).await.unwrap().result);
    }

    #[tokio::test]
    async fn should_report_malformed_payload_as_decode_error() {
        let client = client_for(&serve(api()).await);
        let error = client
            .login(&Credentials::new("garbled", "x"))
            .await
            .unwrap_err();
        assert!(matches!(error, ClientError::Decode(_)), "{:?}", error);
    }

    #[tokio::test]
    async fn should_report_refused_connection_as_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(&format!("http://{}", addr));
        let error = client.fetch_accounts("1234").await.unwrap_err();
        assert!(matches!(error, ClientError::Transport(_)), "{:?}", error);
    }
}
