//! REST client for the Black Forest Labs job API.
//!
//! Submission is a `POST` to a model endpoint returning a polling URL;
//! results are read by `GET`ting that URL until the job settles. Both
//! calls authenticate with the `x-key` header.

use std::time::Duration;

use serde::Deserialize;

use crate::config::{BflConfig, API_KEY_ENV};
use crate::provider::{ImageProvider, JobHandle, JobStatus, ProviderError};

/// Per-request transport timeout for every BFL call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Poll status reported once an image is available.
pub const STATUS_READY: &str = "Ready";

/// Poll statuses after which the job will never produce an image.
pub const TERMINAL_FAILURE_STATUSES: &[&str] = &[
    "Error",
    "Failed",
    "Request Moderated",
    "Content Moderated",
    "Task not found",
];

/// HTTP client for one BFL model endpoint.
pub struct BflApi {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

/// Response returned by the model endpoint after queuing a job.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub polling_url: Option<String>,
}

/// Response returned by the polling URL.
#[derive(Debug, Deserialize)]
pub struct PollResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<PollResult>,
}

/// Payload of a finished job.
#[derive(Debug, Deserialize)]
pub struct PollResult {
    /// Signed URL of the generated image.
    #[serde(default)]
    pub sample: Option<String>,
}

impl SubmitResponse {
    /// Turn the submission response into a handle, rejecting responses
    /// without a polling URL.
    pub fn into_handle(self) -> Result<JobHandle, ProviderError> {
        match self.polling_url.filter(|url| !url.is_empty()) {
            Some(polling_url) => Ok(JobHandle {
                id: self.id.unwrap_or_default(),
                polling_url,
            }),
            None => Err(ProviderError::MalformedResponse(format!(
                "submit response for job {:?} has no polling_url",
                self.id
            ))),
        }
    }
}

impl PollResponse {
    /// Map the provider's status string onto a [`JobStatus`].
    ///
    /// A `Ready` response without a sample URL counts as a failure.
    pub fn into_status(self) -> JobStatus {
        if self.status == STATUS_READY {
            return match self.result.and_then(|r| r.sample) {
                Some(sample) => JobStatus::Ready(sample),
                None => JobStatus::Failed("Ready response carried no sample".to_string()),
            };
        }
        if TERMINAL_FAILURE_STATUSES.contains(&self.status.as_str()) {
            return JobStatus::Failed(self.status);
        }
        JobStatus::Pending
    }
}

impl BflApi {
    /// Create a client from loaded configuration.
    pub fn new(config: &BflConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(
            client,
            config.api_url.clone(),
            config.api_key.clone(),
        ))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            api_url,
            api_key,
        }
    }

    /// Queue a generation job for `prompt`.
    pub async fn submit_prompt(&self, prompt: &str) -> Result<SubmitResponse, ProviderError> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .post(&self.api_url)
            .header("accept", "application/json")
            .header("x-key", api_key)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the current state of a job.
    pub async fn get_result(&self, polling_url: &str) -> Result<PollResponse, ProviderError> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .get(polling_url)
            .header("accept", "application/json")
            .header("x-key", api_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured(API_KEY_ENV))
    }

    /// Ensure the response has a success status code, otherwise return an
    /// [`ProviderError::ApiError`] with the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl ImageProvider for BflApi {
    fn name(&self) -> &'static str {
        "bfl"
    }

    fn missing_credential(&self) -> Option<&'static str> {
        match self.api_key {
            Some(_) => None,
            None => Some(API_KEY_ENV),
        }
    }

    async fn submit(&self, prompt: &str) -> Result<JobHandle, ProviderError> {
        self.submit_prompt(prompt).await?.into_handle()
    }

    async fn poll(&self, handle: &JobHandle) -> Result<JobStatus, ProviderError> {
        Ok(self.get_result(&handle.polling_url).await?.into_status())
    }
}
