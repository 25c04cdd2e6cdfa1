use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::RemoteError;
use super::tap::{Direction, PayloadTap};
use super::types::{GetDataRequest, GetHistoryRequest, RetrieveRequest, Retrieval, Submission};

pub const DEFAULT_ENDPOINT: &str = "https://dlws.bloomberg.com/dlps";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const SUBMIT_HISTORY: &str = "submitGetHistoryRequest";
const SUBMIT_DATA: &str = "submitGetDataRequest";
const RETRIEVE_HISTORY: &str = "retrieveGetHistoryResponse";
const RETRIEVE_DATA: &str = "retrieveGetDataResponse";

/// The four remote operations the job controller depends on.
#[allow(async_fn_in_trait)]
pub trait RemoteJobClient {
    async fn submit_history(&self, request: &GetHistoryRequest) -> Result<Submission, RemoteError>;

    async fn submit_data(&self, request: &GetDataRequest) -> Result<Submission, RemoteError>;

    async fn retrieve_history(&self, response_id: &str) -> Result<Retrieval, RemoteError>;

    async fn retrieve_data(&self, response_id: &str) -> Result<Retrieval, RemoteError>;
}

/// HTTP client for the data-license job endpoints.
pub struct DlwsClient {
    client: Client,
    base_url: String,
    tap: Option<Box<dyn PayloadTap>>,
}

impl DlwsClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            tap: None,
        })
    }

    /// Installs a hook that sees every outbound and inbound body.
    pub fn with_tap(mut self, tap: impl PayloadTap + 'static) -> Self {
        self.tap = Some(Box::new(tap));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<Req, Resp>(&self, operation: &str, request: &Req) -> Result<Resp, RemoteError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{operation}", self.base_url.trim_end_matches('/'));
        if let Some(tap) = &self.tap {
            tap.observe(Direction::Outbound, operation, &serde_json::to_vec(request)?);
        }

        debug!(%url, "POST");
        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        self.observe(Direction::Inbound, operation, &bytes);

        if !status.is_success() {
            return Err(RemoteError::Http {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    fn observe(&self, direction: Direction, operation: &str, body: &[u8]) {
        if let Some(tap) = &self.tap {
            tap.observe(direction, operation, body);
        }
    }
}

impl RemoteJobClient for DlwsClient {
    async fn submit_history(&self, request: &GetHistoryRequest) -> Result<Submission, RemoteError> {
        self.call(SUBMIT_HISTORY, request).await
    }

    async fn submit_data(&self, request: &GetDataRequest) -> Result<Submission, RemoteError> {
        self.call(SUBMIT_DATA, request).await
    }

    async fn retrieve_history(&self, response_id: &str) -> Result<Retrieval, RemoteError> {
        let request = RetrieveRequest {
            response_id: response_id.to_string(),
        };
        self.call(RETRIEVE_HISTORY, &request).await
    }

    async fn retrieve_data(&self, response_id: &str) -> Result<Retrieval, RemoteError> {
        let request = RetrieveRequest {
            response_id: response_id.to_string(),
        };
        self.call(RETRIEVE_DATA, &request).await
    }
}
