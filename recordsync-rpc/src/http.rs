//! HTTP implementation of [`RemoteProcedureClient`].
//!
//! Wire format:
//! - query: `GET {base_url}/{resource}.{action}`
//! - mutation: `POST {base_url}/{resource}.{action}` with the payload as JSON
//! - success: `{ "data": ... }`
//! - failure: `{ "error": { "kind": "validation" | "conflict" | "server",
//!   "message": "...", "fields": { "<path>": "<message>" } } }`

use crate::client::{MutationResult, RemoteProcedureClient};
use crate::error::{RpcError, RpcResult, TransportError};
use crate::procedure::Procedure;
use async_trait::async_trait;
use recordsync_model::{Record, ValidRecord, ValidationError};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Base URL procedures are resolved against (e.g. `http://localhost:3000/api/trpc`).
    pub base_url: String,
    /// Per-request timeout (ms). Expiry surfaces as [`TransportError::Timeout`].
    pub timeout_ms: u64,
    /// Sent as `Authorization: Bearer <token>` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api/trpc".to_string(),
            timeout_ms: 30_000,
            bearer_token: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SuccessEnvelope {
    data: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    fields: BTreeMap<String, String>,
}

/// Calls procedures over HTTP with JSON bodies.
pub struct HttpProcedureClient {
    config: HttpClientConfig,
    client: Client,
}

impl HttpProcedureClient {
    /// Creates a client. Fails only if the HTTP stack cannot be initialized.
    pub fn new(config: HttpClientConfig) -> RpcResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| TransportError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn url(&self, procedure: &Procedure) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            procedure.path()
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, procedure: &Procedure, request: RequestBuilder) -> RpcResult<Value> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if status.is_success() {
            let envelope: SuccessEnvelope = serde_json::from_slice(&body)
                .map_err(|e| TransportError::Decode(format!("{procedure}: {e}")))?;
            return Ok(envelope.data);
        }

        let err = error_from_body(status, &body);
        match &err {
            RpcError::Validation { fields } => {
                debug!("{} rejected {} field(s)", procedure, fields.len());
            }
            RpcError::Transport(e) => warn!("{} failed: {}", procedure, e),
        }
        Err(err)
    }
}

#[async_trait]
impl RemoteProcedureClient for HttpProcedureClient {
    async fn query(&self, procedure: &Procedure) -> RpcResult<Value> {
        let url = self.url(procedure);
        debug!("Querying {} at {}", procedure, url);
        self.send(procedure, self.client.get(url)).await
    }

    async fn mutate(&self, procedure: &Procedure, payload: &ValidRecord) -> MutationResult {
        let url = self.url(procedure);
        debug!("Mutating {} at {}", procedure, url);
        let data = self
            .send(procedure, self.client.post(url).json(payload))
            .await?;
        Record::from_value(data)
            .map_err(|e| TransportError::Decode(format!("{procedure}: {e}")).into())
    }
}

fn transport_error(e: reqwest::Error) -> RpcError {
    if e.is_timeout() {
        TransportError::Timeout.into()
    } else {
        TransportError::Network(e.to_string()).into()
    }
}

/// Maps a non-success response onto the error taxonomy. Anything that is
/// not a recognizable field-level rejection becomes a transport error.
fn error_from_body(status: StatusCode, body: &[u8]) -> RpcError {
    let Ok(ErrorEnvelope { error }) = serde_json::from_slice::<ErrorEnvelope>(body) else {
        let text = String::from_utf8_lossy(body).trim().to_string();
        let message = if text.is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            text
        };
        if status == StatusCode::CONFLICT {
            return TransportError::Conflict(message).into();
        }
        return TransportError::Server {
            status: status.as_u16(),
            message,
        }
        .into();
    };

    match error.kind.as_str() {
        "validation" if !error.fields.is_empty() => RpcError::Validation {
            fields: error
                .fields
                .into_iter()
                .map(|(path, message)| ValidationError::new(path, message))
                .collect(),
        },
        "conflict" => TransportError::Conflict(error.message).into(),
        _ if status == StatusCode::CONFLICT => TransportError::Conflict(error.message).into(),
        _ => TransportError::Server {
            status: status.as_u16(),
            message: error.message,
        }
        .into(),
    }
}
