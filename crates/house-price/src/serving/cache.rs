//! Process-wide model cache.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use crate::io::ArtifactError;
use crate::model::HousePriceModel;

/// Loads the artifact on first use and keeps it for the life of the process.
///
/// Only successful loads are cached. A missing or broken artifact is
/// retried on the next request, so the app recovers once the trainer has run.
#[derive(Debug)]
pub struct ArtifactCache {
    path: PathBuf,
    model: OnceLock<Arc<HousePriceModel>>,
}

impl ArtifactCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            model: OnceLock::new(),
        }
    }

    /// Cache that already holds a model.
    pub fn preloaded(path: impl Into<PathBuf>, model: HousePriceModel) -> Self {
        let cache = Self::new(path);
        let _ = cache.model.set(Arc::new(model));
        cache
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// The cached model, loading it from disk if needed.
    pub fn get_or_load(&self) -> Result<Arc<HousePriceModel>, ArtifactError> {
        if let Some(model) = self.model.get() {
            return Ok(Arc::clone(model));
        }

        match HousePriceModel::load(&self.path) {
            Ok(model) => {
                info!(path = %self.path.display(), "model cached");
                // A concurrent loader may have won; keep whichever landed first.
                Ok(Arc::clone(self.model.get_or_init(|| Arc::new(model))))
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "model unavailable");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForestConfig;
    use crate::testing::synthetic_table;

    fn small_model() -> HousePriceModel {
        let config = ForestConfig::builder().n_trees(3).build().unwrap();
        HousePriceModel::train(&synthetic_table(40, 11), config).unwrap()
    }

    #[test]
    fn missing_artifact_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house_model.pkl");
        let cache = ArtifactCache::new(&path);

        assert!(matches!(cache.get_or_load(), Err(ArtifactError::NotFound { .. })));
        assert!(!cache.is_loaded());

        let model = small_model();
        model.save(&path).unwrap();

        let loaded = cache.get_or_load().unwrap();
        assert_eq!(*loaded, model);
        assert!(cache.is_loaded());
    }

    #[test]
    fn loaded_model_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house_model.pkl");
        small_model().save(&path).unwrap();

        let cache = ArtifactCache::new(&path);
        let first = cache.get_or_load().unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = cache.get_or_load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }
}
