use std::future::Future;

use bytes::Bytes;
use reqwest::Client;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::config::Config;
use crate::partition::Batch;
use crate::wire::{self, EncodeError};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const REMOTE_WRITE_VERSION_HEADER: &str = "X-Prometheus-Remote-Write-Version";
const REMOTE_WRITE_VERSION: &str = "0.1.0";
/// Longest slice of a rejection body kept in the error.
const MAX_ERROR_BODY_CHARS: usize = 1024;
/// Stands in for a rejection body that could not be read.
const UNREADABLE_BODY: &str = "<unreadable body>";

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to encode batch: {0}")]
    Encode(#[from] EncodeError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote write endpoint rejected batch: HTTP {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Encodes batches and delivers them to a remote-write endpoint.
///
/// Encoding and delivery are separate so callers can stop before any network
/// work when a batch cannot be encoded.
pub trait RemoteWrite {
    fn encode(&self, batch: &Batch<'_>) -> Result<Bytes, WriteError>;

    fn store(&self, payload: Bytes) -> impl Future<Output = Result<(), WriteError>> + Send + '_;
}

/// HTTP remote-write client: snappy-compressed protobuf over `POST`.
#[derive(Debug, Clone)]
pub struct RemoteWriteClient {
    client: Client,
    endpoint: Url,
    headers: Vec<(String, String)>,
}

impl RemoteWriteClient {
    pub fn new(config: &Config) -> Result<Self, WriteError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            headers: config.headers.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl RemoteWrite for RemoteWriteClient {
    fn encode(&self, batch: &Batch<'_>) -> Result<Bytes, WriteError> {
        Ok(wire::encode(batch)?)
    }

    async fn store(&self, payload: Bytes) -> Result<(), WriteError> {
        let mut req = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/x-protobuf")
            .header(CONTENT_ENCODING, "snappy")
            .header(REMOTE_WRITE_VERSION_HEADER, REMOTE_WRITE_VERSION);

        for (k, v) in &self.headers {
            req = req.header(k, v);
        }

        let resp = req.body(payload).send().await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body: String = match resp.text().await {
            Ok(text) => text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            Err(e) => {
                warn!(%status, error = %e, "failed to read rejection body");
                UNREADABLE_BODY.to_owned()
            }
        };
        warn!(%status, body, "remote write endpoint rejected batch");
        Err(WriteError::Rejected { status, body })
    }
}
