//! Imaging cases: patient metadata plus the images generated for it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::timepoint::Timepoint;
use crate::types::{CaseId, Timestamp};

/// Prefix for generated case identifiers.
pub const CASE_ID_PREFIX: &str = "case";

/// Number of hex characters after the prefix.
const CASE_ID_SUFFIX_LEN: usize = 8;

/// Basic patient demographics. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(range(min = 0, max = 150))]
    pub age: Option<i32>,
    pub mrn: Option<String>,
    pub notes: Option<String>,
}

/// Metadata for an attached EHR document or scan. File contents are not
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub size: Option<u64>,
}

/// A generated image for one timepoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    pub url: String,
    pub timepoint: Timepoint,
    /// Exact prompt submitted to the provider.
    pub prompt_used: String,
}

/// An imaging case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: CaseId,
    pub created_at: Timestamp,
    pub patient: Patient,
    pub base_prompt: String,
    pub ehr_files: Vec<FileMeta>,
    pub ct_scans: Vec<FileMeta>,
    pub images: BTreeMap<Timepoint, ImageResult>,
}

/// Input for creating a case.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCase {
    #[validate(length(min = 1, message = "basePrompt must not be empty"))]
    pub base_prompt: String,
    #[validate(nested)]
    #[serde(default)]
    pub patient: Patient,
    #[serde(default)]
    pub ehr_files: Vec<FileMeta>,
    #[serde(default)]
    pub ct_scans: Vec<FileMeta>,
}

/// Input for generating (or regenerating) a case's images.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub timepoints: Option<Vec<Timepoint>>,
    pub additional_prompt: Option<String>,
}

impl Case {
    /// Build a new case with a fresh id and no images.
    pub fn new(input: CreateCase) -> Self {
        Self {
            id: new_case_id(),
            created_at: chrono::Utc::now(),
            patient: input.patient,
            base_prompt: input.base_prompt,
            ehr_files: input.ehr_files,
            ct_scans: input.ct_scans,
            images: BTreeMap::new(),
        }
    }

    /// The uniform prompt for a generation request: the base prompt with
    /// any additional prompt appended, trimmed.
    pub fn generation_prompt(&self, additional: Option<&str>) -> String {
        format!("{} {}", self.base_prompt, additional.unwrap_or_default())
            .trim()
            .to_string()
    }
}

/// Generate an id of the form `case_<8 hex chars>`.
pub fn new_case_id() -> CaseId {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{CASE_ID_PREFIX}_{}", &hex[..CASE_ID_SUFFIX_LEN])
}
