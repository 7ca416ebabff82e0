//! Batch image generation across timepoints.
//!
//! [`BatchImageGenerator`] submits one job per timepoint, drives all of
//! them concurrently, and collects a [`BatchResult`] with exactly one
//! entry per requested timepoint. A job that fails in any way becomes
//! [`JobResult::Absent`]; only a missing provider credential fails the
//! whole call, and it does so before anything is submitted.

use std::collections::BTreeMap;
use std::sync::Arc;

use brainview_core::prompt::PromptSet;
use brainview_core::timepoint::{resolve_timepoints, Timepoint};
use futures::future::join_all;
use serde::{Serialize, Serializer};

use crate::poll::{wait_for_result, JobFailure, PollConfig};
use crate::provider::ImageProvider;

/// Outcome for a single timepoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    /// Reference to the generated image.
    ResultReference(String),
    /// No image for this timepoint.
    Absent,
}

impl JobResult {
    /// The image reference, or `None` when absent.
    pub fn reference(&self) -> Option<&str> {
        match self {
            JobResult::ResultReference(reference) => Some(reference),
            JobResult::Absent => None,
        }
    }

    /// Whether this timepoint produced no image.
    pub fn is_absent(&self) -> bool {
        matches!(self, JobResult::Absent)
    }
}

/// Serialized as the reference string, or `null` when absent.
impl Serialize for JobResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.reference().serialize(serializer)
    }
}

/// One [`JobResult`] per requested timepoint, in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BatchResult(BTreeMap<Timepoint, JobResult>);

impl BatchResult {
    /// Outcome for `timepoint`, or `None` if it was not requested.
    pub fn get(&self, timepoint: Timepoint) -> Option<&JobResult> {
        self.0.get(&timepoint)
    }

    /// Number of requested timepoints.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no timepoints were requested.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Requested timepoints in canonical order.
    pub fn timepoints(&self) -> impl Iterator<Item = Timepoint> + '_ {
        self.0.keys().copied()
    }

    /// `(timepoint, outcome)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Timepoint, &JobResult)> {
        self.0.iter().map(|(tp, result)| (*tp, result))
    }

    /// Number of timepoints that produced an image.
    pub fn ready_count(&self) -> usize {
        self.0.values().filter(|r| !r.is_absent()).count()
    }
}

impl IntoIterator for BatchResult {
    type Item = (Timepoint, JobResult);
    type IntoIter = std::collections::btree_map::IntoIter<Timepoint, JobResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Errors that fail an entire batch.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The provider's credential is not configured.
    #[error("Missing {credential}")]
    NotConfigured {
        /// Name of the missing credential (its environment variable).
        credential: &'static str,
    },
}

/// Fans a prompt set out into one provider job per timepoint.
///
/// Cloning shares the underlying provider.
#[derive(Clone)]
pub struct BatchImageGenerator {
    provider: Arc<dyn ImageProvider>,
    poll: PollConfig,
}

impl BatchImageGenerator {
    /// Create a generator over `provider` with the given polling timing.
    pub fn new(provider: Arc<dyn ImageProvider>, poll: PollConfig) -> Self {
        Self { provider, poll }
    }

    /// Whether the provider has the credential it needs.
    pub fn is_configured(&self) -> bool {
        self.provider.missing_credential().is_none()
    }

    /// Generate images for `timepoints` (all four when `None` or empty).
    pub async fn generate(
        &self,
        prompts: &PromptSet,
        timepoints: Option<&[Timepoint]>,
    ) -> Result<BatchResult, GenerateError> {
        let timepoints = resolve_timepoints(timepoints);
        self.generate_composed(&prompts.compose_all(&timepoints))
            .await
    }

    /// Generate images for already-composed `(timepoint, prompt)` pairs.
    pub async fn generate_composed(
        &self,
        jobs: &[(Timepoint, String)],
    ) -> Result<BatchResult, GenerateError> {
        if let Some(credential) = self.provider.missing_credential() {
            tracing::error!(
                provider = self.provider.name(),
                credential,
                "Image provider credential not configured"
            );
            return Err(GenerateError::NotConfigured { credential });
        }

        tracing::info!(
            provider = self.provider.name(),
            jobs = jobs.len(),
            "Starting image batch"
        );

        let outcomes = join_all(
            jobs.iter()
                .map(|(timepoint, prompt)| self.run_job(*timepoint, prompt)),
        )
        .await;

        let result = BatchResult(jobs.iter().map(|(tp, _)| *tp).zip(outcomes).collect());

        tracing::info!(
            provider = self.provider.name(),
            ready = result.ready_count(),
            absent = result.len() - result.ready_count(),
            "Image batch finished"
        );

        Ok(result)
    }

    // ---- private helpers ----

    async fn run_job(&self, timepoint: Timepoint, prompt: &str) -> JobResult {
        match self.submit_and_wait(prompt).await {
            Ok(reference) => {
                tracing::info!(%timepoint, "Image generated");
                JobResult::ResultReference(reference)
            }
            Err(e) => {
                tracing::warn!(%timepoint, error = %e, "Image generation failed");
                JobResult::Absent
            }
        }
    }

    async fn submit_and_wait(&self, prompt: &str) -> Result<String, JobFailure> {
        let handle = self
            .provider
            .submit(prompt)
            .await
            .map_err(JobFailure::Submit)?;

        tracing::debug!(job_id = %handle.id, polling_url = %handle.polling_url, "Job submitted");

        wait_for_result(self.provider.as_ref(), &handle, &self.poll).await
    }
}
