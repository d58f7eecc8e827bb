use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::{LightConfig, ModelConfig, SceneConfig};

/// Shared handle to the scene configuration.
///
/// Cloning the store yields another handle to the same configuration, so the
/// binder can write while the render loop pulls snapshots.
#[derive(Debug, Default)]
pub struct ConfigStore {
    config: Arc<RwLock<SceneConfig>>,
}

impl Clone for ConfigStore {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

impl ConfigStore {
    /// Creates a store holding the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: SceneConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Returns a copy of the whole configuration.
    pub fn snapshot(&self) -> SceneConfig {
        self.config.read().clone()
    }

    /// Replaces the stored configuration wholesale.
    pub fn replace(&self, config: SceneConfig) {
        *self.config.write() = config;
    }

    pub fn model(&self, slot: usize) -> Option<ModelConfig> {
        self.config.read().models.get(slot).cloned()
    }

    pub fn light(&self, slot: usize) -> Option<LightConfig> {
        self.config.read().lights.get(slot).copied()
    }

    /// Applies a mutation to the model in `slot`, in place.
    pub fn update_model<F, R>(&self, slot: usize, updater: F) -> Option<R>
    where
        F: FnOnce(&mut ModelConfig) -> R,
    {
        let mut guard = self.config.write();
        let model = guard.models.get_mut(slot)?;
        Some(updater(model))
    }

    /// Applies a mutation to the light in `slot`, in place.
    pub fn update_light<F, R>(&self, slot: usize, updater: F) -> Option<R>
    where
        F: FnOnce(&mut LightConfig) -> R,
    {
        let mut guard = self.config.write();
        let light = guard.lights.get_mut(slot)?;
        Some(updater(light))
    }
}
