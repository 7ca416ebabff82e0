//! Prompt input normalization.
//!
//! Callers either send one prompt for every timepoint or an explicit
//! prompt per timepoint. [`PromptSet`] captures both shapes and
//! [`PromptSet::compose`] turns either into the exact text submitted to
//! the image provider.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::timepoint::Timepoint;

/// Prompt input in one of its two accepted shapes.
///
/// On the wire this is either a JSON string or a JSON object keyed by
/// timepoint identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptSet {
    /// One prompt applied to every timepoint, with a per-timepoint suffix.
    Uniform(String),
    /// Explicit prompt per timepoint, used verbatim. `null` values count
    /// as missing.
    PerTimepoint(BTreeMap<Timepoint, Option<String>>),
}

impl Default for PromptSet {
    fn default() -> Self {
        PromptSet::Uniform(String::new())
    }
}

impl PromptSet {
    /// The prompt to submit for `timepoint`.
    ///
    /// A timepoint missing from a per-timepoint mapping yields the empty
    /// string; it is passed on unchanged rather than rejected here.
    pub fn compose(&self, timepoint: Timepoint) -> String {
        match self {
            PromptSet::Uniform(base) => {
                format!("{base}. Please depict the {}.", timepoint.phrase())
            }
            PromptSet::PerTimepoint(prompts) => prompts
                .get(&timepoint)
                .and_then(|p| p.clone())
                .unwrap_or_default(),
        }
    }

    /// Compose prompts for each of `timepoints`, preserving their order.
    pub fn compose_all(&self, timepoints: &[Timepoint]) -> Vec<(Timepoint, String)> {
        timepoints
            .iter()
            .map(|&tp| (tp, self.compose(tp)))
            .collect()
    }
}

impl From<String> for PromptSet {
    fn from(prompt: String) -> Self {
        PromptSet::Uniform(prompt)
    }
}

impl From<&str> for PromptSet {
    fn from(prompt: &str) -> Self {
        PromptSet::Uniform(prompt.to_string())
    }
}

impl FromIterator<(Timepoint, String)> for PromptSet {
    fn from_iter<I: IntoIterator<Item = (Timepoint, String)>>(iter: I) -> Self {
        PromptSet::PerTimepoint(iter.into_iter().map(|(tp, p)| (tp, Some(p))).collect())
    }
}
