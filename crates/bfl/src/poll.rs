//! Deadline-bounded polling of a submitted job.
//!
//! [`wait_for_result`] polls at a fixed interval inside a
//! [`tokio::time::timeout`], so an abandoned job costs a timer rather
//! than a blocked thread. The remote job is not cancelled when the
//! deadline passes.

use std::time::Duration;

use crate::provider::{ImageProvider, JobHandle, JobStatus, ProviderError};

/// Timing parameters for polling one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before each poll, including the first.
    pub interval: Duration,
    /// Give up once this much time has passed since the job was submitted.
    pub deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            deadline: Duration::from_secs(90),
        }
    }
}

/// Why a single job produced no result.
#[derive(Debug, thiserror::Error)]
pub enum JobFailure {
    /// The provider refused or never received the job.
    #[error("submission failed: {0}")]
    Submit(ProviderError),

    /// A status request failed.
    #[error("polling failed: {0}")]
    Poll(ProviderError),

    /// The provider reported a terminal failure status.
    #[error("provider reported failure: {0}")]
    Failed(String),

    /// The job was still pending when the deadline passed.
    #[error("no result within {0:?}")]
    TimedOut(Duration),
}

/// Poll `handle` until it is ready, fails, or the deadline passes.
///
/// Returns the result reference on success.
pub async fn wait_for_result(
    provider: &dyn ImageProvider,
    handle: &JobHandle,
    config: &PollConfig,
) -> Result<String, JobFailure> {
    match tokio::time::timeout(config.deadline, poll_until_settled(provider, handle, config.interval))
        .await
    {
        Ok(outcome) => outcome,
        Err(_) => Err(JobFailure::TimedOut(config.deadline)),
    }
}

async fn poll_until_settled(
    provider: &dyn ImageProvider,
    handle: &JobHandle,
    interval: Duration,
) -> Result<String, JobFailure> {
    let mut attempt = 0u32;

    loop {
        tokio::time::sleep(interval).await;
        attempt += 1;

        match provider.poll(handle).await.map_err(JobFailure::Poll)? {
            JobStatus::Pending => {
                tracing::trace!(job_id = %handle.id, attempt, "Job still pending");
            }
            JobStatus::Ready(reference) => {
                tracing::debug!(job_id = %handle.id, attempt, "Job ready");
                return Ok(reference);
            }
            JobStatus::Failed(reason) => return Err(JobFailure::Failed(reason)),
        }
    }
}
