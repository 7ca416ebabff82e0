//! The seam between the batch adapter and a concrete image provider.
//!
//! A provider accepts a prompt and hands back a [`JobHandle`]; the job
//! then runs remotely and is observed through [`ImageProvider::poll`].

/// Opaque reference to a submitted generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    /// Provider-assigned job id (used for logging only).
    pub id: String,
    /// URL to poll for the job's status.
    pub polling_url: String,
}

/// Status of a remote job as reported by one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Still queued or running.
    Pending,
    /// Finished; carries the result reference (an image URL).
    Ready(String),
    /// The provider gave up on the job.
    Failed(String),
}

/// Errors from a single provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response parsed but lacked a required field.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// No credential is configured for this provider.
    #[error("Missing {0}")]
    NotConfigured(&'static str),
}

/// An asynchronous text-to-image service.
#[async_trait::async_trait]
pub trait ImageProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Name of the credential that must be configured before any job can
    /// be submitted, or `None` when the provider is ready.
    fn missing_credential(&self) -> Option<&'static str>;

    /// Submit a prompt as a new generation job.
    async fn submit(&self, prompt: &str) -> Result<JobHandle, ProviderError>;

    /// Check the status of a previously submitted job.
    async fn poll(&self, handle: &JobHandle) -> Result<JobStatus, ProviderError>;
}
