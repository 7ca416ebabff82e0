//! Handler for ad-hoc batch image generation.
//!
//! Accepts a prompt (string or per-timepoint mapping) and an optional
//! timepoint list, and answers with a timepoint -> URL map where `null`
//! marks a timepoint that produced no image.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use brainview_bfl::batch::BatchResult;
use brainview_core::prompt::PromptSet;
use brainview_core::timepoint::Timepoint;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateImagesRequest {
    /// Missing or `null` means an empty uniform prompt.
    #[serde(default)]
    pub prompt: Option<PromptSet>,
    #[serde(default)]
    pub timepoints: Option<Vec<Timepoint>>,
}

#[derive(Debug, Serialize)]
pub struct GenerateImagesResponse {
    pub images: BatchResult,
}

/// POST /model/generate_images
///
/// An empty or non-JSON body is treated as `{}`: empty prompt, all four
/// timepoints. A JSON body with the wrong shape (e.g. an unknown timepoint)
/// is rejected.
pub async fn generate_images(
    State(state): State<AppState>,
    payload: Result<Json<GenerateImagesRequest>, JsonRejection>,
) -> AppResult<Json<GenerateImagesResponse>> {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(JsonRejection::MissingJsonContentType(_) | JsonRejection::JsonSyntaxError(_)) => {
            tracing::debug!("Unparseable generate_images body, using defaults");
            GenerateImagesRequest::default()
        }
        Err(rejection) => return Err(rejection.into()),
    };
    let prompts = input.prompt.unwrap_or_default();

    let images = state
        .generator
        .generate(&prompts, input.timepoints.as_deref())
        .await?;

    Ok(Json(GenerateImagesResponse { images }))
}
