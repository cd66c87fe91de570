mod teachable;

pub use teachable::{ModelMetadata, SimulatedClassifier, TeachableMachineLoader};

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::info;

use crate::{camera::Frame, prediction::PredictionSet};

/// A loaded pose classifier.
#[async_trait]
pub trait PoseModel: Send + Sync {
    async fn predict(&self, frame: &Frame) -> Result<PredictionSet>;

    fn total_classes(&self) -> usize;

    /// Releases backing resources. Called exactly once by [`ModelGuard`].
    fn dispose(&self);
}

#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self, model_url: &str, metadata_url: &str) -> Result<Box<dyn PoseModel>>;
}

/// Owns a model for the lifetime of a screen and disposes it on release or drop.
///
/// The poller borrows the model through cloned `Arc`s; it must be stopped before release.
pub struct ModelGuard {
    model: Option<Arc<dyn PoseModel>>,
}

impl ModelGuard {
    pub fn new(model: Box<dyn PoseModel>) -> Self {
        Self {
            model: Some(Arc::from(model)),
        }
    }

    pub fn get(&self) -> Result<Arc<dyn PoseModel>> {
        self.model
            .clone()
            .ok_or_else(|| anyhow!("model already released"))
    }

    pub fn is_released(&self) -> bool {
        self.model.is_none()
    }

    pub fn release(&mut self) {
        if let Some(model) = self.model.take() {
            model.dispose();
            info!("pose model released");
        }
    }
}

impl Drop for ModelGuard {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    struct CountingModel {
        disposed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PoseModel for CountingModel {
        async fn predict(&self, _frame: &Frame) -> Result<PredictionSet> {
            Ok(PredictionSet::default())
        }

        fn total_classes(&self) -> usize {
            0
        }

        fn dispose(&self) {
            self.disposed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn guard_disposes_once() {
        let disposed = Arc::new(AtomicUsize::new(0));
        let mut guard = ModelGuard::new(Box::new(CountingModel {
            disposed: disposed.clone(),
        }));
        assert!(guard.get().is_ok());

        guard.release();
        guard.release();
        assert!(guard.is_released());
        assert!(guard.get().is_err());
        drop(guard);

        assert_eq!(disposed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn guard_disposes_on_drop() {
        let disposed = Arc::new(AtomicUsize::new(0));
        {
            let _guard = ModelGuard::new(Box::new(CountingModel {
                disposed: disposed.clone(),
            }));
        }
        assert_eq!(disposed.load(Ordering::SeqCst), 1);
    }
}
