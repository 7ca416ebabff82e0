//! Batch adapter behaviour against a scripted in-memory provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use brainview_bfl::batch::{BatchImageGenerator, GenerateError, JobResult};
use brainview_bfl::poll::PollConfig;
use brainview_bfl::provider::{ImageProvider, JobHandle, JobStatus, ProviderError};
use brainview_core::prompt::PromptSet;
use brainview_core::timepoint::Timepoint;

/// Behaviour is chosen by keywords in the submitted prompt:
///
/// - `fail-submit`: submission errors
/// - `never-ready`: every poll reports pending
/// - `provider-fails`: the first poll reports failure
/// - `poll-error`: the first poll errors
/// - anything else: ready on the second poll
struct ScriptedProvider {
    configured: bool,
    submissions: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            configured: true,
            submissions: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    fn submitted_prompts(&self) -> Vec<String> {
        let mut prompts = self.prompts.lock().unwrap().clone();
        prompts.sort();
        prompts
    }
}

#[async_trait::async_trait]
impl ImageProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn missing_credential(&self) -> Option<&'static str> {
        if self.configured {
            None
        } else {
            Some("BFL_API_KEY")
        }
    }

    async fn submit(&self, prompt: &str) -> Result<JobHandle, ProviderError> {
        let n = self.submissions.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        if prompt.contains("fail-submit") {
            return Err(ProviderError::ApiError {
                status: 422,
                body: "rejected".into(),
            });
        }
        Ok(JobHandle {
            id: format!("job-{n}"),
            polling_url: prompt.to_string(),
        })
    }

    async fn poll(&self, handle: &JobHandle) -> Result<JobStatus, ProviderError> {
        let script = &handle.polling_url;
        if script.contains("never-ready") {
            Ok(JobStatus::Pending)
        } else if script.contains("provider-fails") {
            Ok(JobStatus::Failed("Error".into()))
        } else if script.contains("poll-error") {
            Err(ProviderError::MalformedResponse("garbled".into()))
        } else {
            Ok(JobStatus::Ready(format!("https://img.example/{}.png", handle.id)))
        }
    }
}

fn generator(provider: Arc<ScriptedProvider>) -> BatchImageGenerator {
    BatchImageGenerator::new(provider, PollConfig::default())
}

fn per_timepoint(entries: &[(Timepoint, &str)]) -> PromptSet {
    entries
        .iter()
        .map(|(tp, p)| (*tp, p.to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// Key set
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn defaults_to_all_timepoints() {
    let provider = Arc::new(ScriptedProvider::new());
    let result = generator(provider.clone())
        .generate(&PromptSet::from("Axial CT"), None)
        .await
        .unwrap();

    assert_eq!(result.timepoints().collect::<Vec<_>>(), Timepoint::ALL.to_vec());
    assert_eq!(result.ready_count(), 4);
    assert_eq!(provider.submissions.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn key_set_matches_request_for_any_mix_of_outcomes() {
    let provider = Arc::new(ScriptedProvider::new());
    let prompts = per_timepoint(&[
        (Timepoint::Now, "ok"),
        (Timepoint::ThreeMonths, "fail-submit"),
        (Timepoint::SixMonths, "provider-fails"),
        (Timepoint::TwelveMonths, "poll-error"),
    ]);

    let result = generator(provider)
        .generate(&prompts, Some(&Timepoint::ALL))
        .await
        .unwrap();

    assert_eq!(result.len(), 4);
    assert_matches!(result.get(Timepoint::Now), Some(JobResult::ResultReference(_)));
    assert_eq!(result.get(Timepoint::ThreeMonths), Some(&JobResult::Absent));
    assert_eq!(result.get(Timepoint::SixMonths), Some(&JobResult::Absent));
    assert_eq!(result.get(Timepoint::TwelveMonths), Some(&JobResult::Absent));
}

#[tokio::test(start_paused = true)]
async fn subset_request_returns_only_that_subset() {
    let provider = Arc::new(ScriptedProvider::new());
    let requested = [Timepoint::TwelveMonths, Timepoint::Now];

    let result = generator(provider)
        .generate(&PromptSet::from("Axial CT"), Some(&requested))
        .await
        .unwrap();

    assert_eq!(
        result.timepoints().collect::<Vec<_>>(),
        vec![Timepoint::Now, Timepoint::TwelveMonths]
    );
}

// ---------------------------------------------------------------------------
// Credential precondition
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_credential_fails_whole_batch_without_submitting() {
    let provider = Arc::new(ScriptedProvider::unconfigured());
    let generator = generator(provider.clone());

    assert!(!generator.is_configured());
    let result = generator.generate(&PromptSet::from("Axial CT"), None).await;

    assert_matches!(
        result,
        Err(GenerateError::NotConfigured { credential: "BFL_API_KEY" })
    );
    assert_eq!(provider.submissions.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Prompt composition reaches the provider unchanged
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn uniform_prompt_is_suffixed_per_timepoint() {
    let provider = Arc::new(ScriptedProvider::new());

    generator(provider.clone())
        .generate(
            &PromptSet::from("Example scan"),
            Some(&[Timepoint::Now, Timepoint::ThreeMonths]),
        )
        .await
        .unwrap();

    assert_eq!(
        provider.submitted_prompts(),
        vec![
            "Example scan. Please depict the brain state in approximately 3 months.".to_string(),
            "Example scan. Please depict the current brain state.".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn missing_mapping_entry_is_submitted_as_empty_prompt() {
    let provider = Arc::new(ScriptedProvider::new());
    let prompts = per_timepoint(&[(Timepoint::Now, "A"), (Timepoint::ThreeMonths, "B")]);

    let result = generator(provider.clone())
        .generate(
            &prompts,
            Some(&[Timepoint::Now, Timepoint::ThreeMonths, Timepoint::SixMonths]),
        )
        .await
        .unwrap();

    assert_eq!(
        provider.submitted_prompts(),
        vec![String::new(), "A".to_string(), "B".to_string()]
    );
    assert_eq!(result.len(), 3);
}

// ---------------------------------------------------------------------------
// Isolation and deadlines
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn one_failed_submission_does_not_affect_siblings() {
    let provider = Arc::new(ScriptedProvider::new());
    let prompts = per_timepoint(&[
        (Timepoint::Now, "first"),
        (Timepoint::ThreeMonths, "fail-submit"),
        (Timepoint::SixMonths, "third"),
    ]);

    let result = generator(provider)
        .generate(
            &prompts,
            Some(&[Timepoint::Now, Timepoint::ThreeMonths, Timepoint::SixMonths]),
        )
        .await
        .unwrap();

    assert!(result.get(Timepoint::Now).unwrap().reference().is_some());
    assert!(result.get(Timepoint::ThreeMonths).unwrap().is_absent());
    assert!(result.get(Timepoint::SixMonths).unwrap().reference().is_some());
}

#[tokio::test(start_paused = true)]
async fn never_ready_job_is_absent_after_deadline() {
    let provider = Arc::new(ScriptedProvider::new());
    let prompts = per_timepoint(&[(Timepoint::Now, "never-ready"), (Timepoint::ThreeMonths, "ok")]);
    let started = tokio::time::Instant::now();

    let result = generator(provider)
        .generate(&prompts, Some(&[Timepoint::Now, Timepoint::ThreeMonths]))
        .await
        .unwrap();

    let elapsed = started.elapsed();
    assert!(result.get(Timepoint::Now).unwrap().is_absent());
    assert!(result.get(Timepoint::ThreeMonths).unwrap().reference().is_some());
    assert!(elapsed >= Duration::from_secs(90));
    assert!(elapsed < Duration::from_secs(91));
}

#[tokio::test(start_paused = true)]
async fn jobs_run_concurrently_not_back_to_back() {
    let provider = Arc::new(ScriptedProvider::new());
    let prompts = per_timepoint(&[
        (Timepoint::Now, "never-ready a"),
        (Timepoint::ThreeMonths, "never-ready b"),
        (Timepoint::SixMonths, "never-ready c"),
        (Timepoint::TwelveMonths, "never-ready d"),
    ]);
    let started = tokio::time::Instant::now();

    let result = generator(provider).generate(&prompts, None).await.unwrap();

    assert_eq!(result.ready_count(), 0);
    assert_eq!(result.len(), 4);
    // Four sequential deadlines would take 360 s.
    assert!(started.elapsed() < Duration::from_secs(91));
}
