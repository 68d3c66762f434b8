use qstate_types::{SynthesisRequest, SynthesisResponse};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_SYNTHESIS_URL: &str = "https://state-to-circuit.onrender.com/prepare_state";

/// Failures talking to the state-preparation service.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode service response: {0}")]
    Decode(String),
}

/// Something that turns an amplitude vector into a gate sequence.
pub trait SynthesisClient: Send + Sync + 'static {
    fn prepare_state(
        &self,
        request: &SynthesisRequest,
    ) -> impl Future<Output = Result<SynthesisResponse, SynthesisError>> + Send;
}

/// Calls the remote service over HTTP with a JSON body.
#[derive(Clone, Debug)]
pub struct HttpSynthesisClient {
    client: reqwest::Client,
    url: String,
}

impl HttpSynthesisClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SynthesisError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SynthesisError::Client(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SynthesisClient for HttpSynthesisClient {
    async fn prepare_state(
        &self,
        request: &SynthesisRequest,
    ) -> Result<SynthesisResponse, SynthesisError> {
        debug!(url = %self.url, qubits = request.num_qubits, "requesting state preparation");

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!(%status, "state preparation failed");
            return Err(SynthesisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| SynthesisError::Decode(e.to_string()))
    }
}
