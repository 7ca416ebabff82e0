//! Case storage interface.
//!
//! Handlers receive an `Arc<dyn CaseStore>` rather than touching a
//! process-wide map, so a persistent backend can be swapped in without
//! changing them. [`InMemoryCaseStore`] is the only implementation and
//! loses everything on restart.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::case::{Case, ImageResult};
use crate::error::CoreError;

/// Create / read / update access to cases.
#[async_trait::async_trait]
pub trait CaseStore: Send + Sync {
    /// Insert a new case. Fails if the id is already taken.
    async fn create(&self, case: Case) -> Result<Case, CoreError>;

    /// Look up a case by id.
    async fn get(&self, id: &str) -> Result<Option<Case>, CoreError>;

    /// Replace an existing case. Fails with `NotFound` if it does not exist.
    async fn update(&self, case: Case) -> Result<Case, CoreError>;

    /// Merge `images` into the stored case, one per timepoint, and return
    /// the case as stored afterwards. Timepoints not in `images` keep their
    /// current image. The read and write happen as one step, so concurrent
    /// calls for different timepoints do not overwrite each other.
    async fn record_images(&self, id: &str, images: Vec<ImageResult>) -> Result<Case, CoreError>;
}

/// Volatile, single-process [`CaseStore`].
#[derive(Debug, Default)]
pub struct InMemoryCaseStore {
    cases: RwLock<HashMap<String, Case>>,
}

impl InMemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CaseStore for InMemoryCaseStore {
    async fn create(&self, case: Case) -> Result<Case, CoreError> {
        let mut cases = self.cases.write().await;
        if cases.contains_key(&case.id) {
            return Err(CoreError::Internal(format!(
                "Case id {} already exists",
                case.id
            )));
        }
        cases.insert(case.id.clone(), case.clone());
        Ok(case)
    }

    async fn get(&self, id: &str) -> Result<Option<Case>, CoreError> {
        Ok(self.cases.read().await.get(id).cloned())
    }

    async fn update(&self, case: Case) -> Result<Case, CoreError> {
        let mut cases = self.cases.write().await;
        match cases.get_mut(&case.id) {
            Some(existing) => {
                *existing = case.clone();
                Ok(case)
            }
            None => Err(CoreError::NotFound {
                entity: "Case",
                id: case.id,
            }),
        }
    }

    async fn record_images(&self, id: &str, images: Vec<ImageResult>) -> Result<Case, CoreError> {
        let mut cases = self.cases.write().await;
        let case = cases.get_mut(id).ok_or_else(|| CoreError::NotFound {
            entity: "Case",
            id: id.to_string(),
        })?;

        for image in images {
            case.images.insert(image.timepoint, image);
        }
        Ok(case.clone())
    }
}
