//! Handlers for the `/cases` resource.
//!
//! A case holds patient metadata and a base prompt; generating images for
//! it runs the batch adapter with the base prompt (plus any additional
//! prompt) and records every image that came back.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use brainview_bfl::batch::BatchResult;
use brainview_core::case::{Case, CreateCase, GenerateRequest, ImageResult};
use brainview_core::error::CoreError;
use brainview_core::prompt::PromptSet;
use brainview_core::timepoint::{resolve_timepoints, Timepoint};
use validator::Validate;

use crate::error::AppResult;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_case(state: &AppState, id: &str) -> AppResult<Case> {
    state.cases.get(id).await?.ok_or_else(|| {
        CoreError::NotFound {
            entity: "Case",
            id: id.to_string(),
        }
        .into()
    })
}

/// One [`ImageResult`] for every timepoint that produced an image.
///
/// Absent timepoints are skipped so the case keeps its previous image.
fn collect_images(prompts: &[(Timepoint, String)], batch: BatchResult) -> Vec<ImageResult> {
    batch
        .into_iter()
        .filter_map(|(timepoint, result)| {
            let url = result.reference()?.to_string();
            let prompt_used = prompts
                .iter()
                .find(|(tp, _)| *tp == timepoint)
                .map(|(_, p)| p.clone())
                .unwrap_or_default();
            Some(ImageResult {
                url,
                timepoint,
                prompt_used,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /cases
pub async fn create_case(
    State(state): State<AppState>,
    payload: Result<Json<CreateCase>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Case>)> {
    let Json(input) = payload?;
    input.validate().map_err(CoreError::from)?;

    let case = state.cases.create(Case::new(input)).await?;
    tracing::info!(case_id = %case.id, "Case created");

    Ok((StatusCode::CREATED, Json(case)))
}

/// GET /cases/{id}
pub async fn get_case(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Case>> {
    Ok(Json(find_case(&state, &id).await?))
}

/// POST /cases/{id}/generate
pub async fn generate_case_images(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Json<Case>> {
    let Json(input) = payload?;
    let case = find_case(&state, &id).await?;

    let timepoints = resolve_timepoints(input.timepoints.as_deref());
    let prompts = PromptSet::Uniform(case.generation_prompt(input.additional_prompt.as_deref()))
        .compose_all(&timepoints);

    let batch = state.generator.generate_composed(&prompts).await?;
    tracing::info!(
        case_id = %case.id,
        requested = batch.len(),
        ready = batch.ready_count(),
        "Case images generated"
    );

    // Merged in the store: the case may have changed while the batch ran.
    let case = state
        .cases
        .record_images(&case.id, collect_images(&prompts, batch))
        .await?;

    Ok(Json(case))
}

/// POST /cases/{id}/reprompt
///
/// Same as generate; used by clients after editing the additional prompt
/// or the timepoint selection.
pub async fn reprompt_case_images(
    state: State<AppState>,
    id: Path<String>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Json<Case>> {
    generate_case_images(state, id, payload).await
}
