use std::sync::Arc;

use anyhow::Result;
use log::{error, info};

use crate::{
    camera::Camera,
    model::{ModelGuard, ModelLoader},
    reporter::StatusReporter,
    session::{ControllerConfig, SessionController},
    settings::ScreenSettings,
};

/// Everything one mounted yoga screen owns: the session controller, the loaded model
/// and the camera feed. Unmounting (or dropping) tears all of it down.
pub struct YogaScreen {
    controller: SessionController,
    model: Option<ModelGuard>,
    settings: ScreenSettings,
    unmounted: bool,
}

impl YogaScreen {
    /// Loads the model and builds the session controller.
    ///
    /// A model that fails to load is logged and the screen mounts without predictions;
    /// the countdown still works.
    pub async fn mount(
        settings: ScreenSettings,
        pose_name: impl Into<String>,
        loader: &dyn ModelLoader,
        camera: Arc<dyn Camera>,
        reporter: Arc<dyn StatusReporter>,
    ) -> Self {
        let pose_name = pose_name.into();

        let model = match loader
            .load(&settings.model_url(), &settings.metadata_url())
            .await
        {
            Ok(model) => {
                info!("model ready with {} classes", model.total_classes());
                Some(ModelGuard::new(model))
            }
            Err(err) => {
                error!("Error initializing model: {err:#}");
                None
            }
        };

        let model_handle = model.as_ref().and_then(|guard| guard.get().ok());
        let controller = SessionController::new(
            ControllerConfig::from_settings(pose_name, &settings),
            model_handle,
            camera,
            reporter,
        );

        info!("yoga screen mounted for {}", controller.pose_name());

        Self {
            controller,
            model,
            settings,
            unmounted: false,
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn settings(&self) -> &ScreenSettings {
        &self.settings
    }

    pub fn model_loaded(&self) -> bool {
        self.model.as_ref().is_some_and(|guard| !guard.is_released())
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// Stops the ticker and the poller, pauses the camera and releases the model.
    pub async fn unmount(&mut self) -> Result<()> {
        if self.unmounted {
            return Ok(());
        }

        let halted = self.controller.shutdown().await;
        if let Some(guard) = self.model.as_mut() {
            guard.release();
        }
        self.unmounted = true;
        info!("yoga screen unmounted");
        halted
    }
}

impl Drop for YogaScreen {
    fn drop(&mut self) {
        if !self.unmounted {
            self.controller.abort_background();
        }
        // `ModelGuard` disposes the model when dropped.
    }
}
