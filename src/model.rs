use std::path::{Path, PathBuf};

use crate::error::SceneError;
use crate::presets::{PresetTable, DEFAULT_PRESET};
use crate::scene::Scene;
use crate::scene_file;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneSource {
    Preset(&'static str),
    File(PathBuf),
}

/// Owns the scene currently on screen. Every load replaces it wholesale,
/// already recentered; a failed load leaves it as it was.
pub struct SceneModel {
    presets: PresetTable,
    scene: Scene,
    source: SceneSource,
}

impl SceneModel {
    pub fn new() -> Self {
        let presets = PresetTable::new();
        let scene = presets.load(DEFAULT_PRESET).recenter();
        Self {
            presets,
            scene,
            source: SceneSource::Preset(DEFAULT_PRESET),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn source(&self) -> &SceneSource {
        &self.source
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    pub fn load_preset(&self, name: &str) -> Scene {
        self.presets.load(name)
    }

    pub fn select_preset(&mut self, name: &str) -> &Scene {
        let canonical = self
            .presets
            .resolve(name)
            .unwrap_or(DEFAULT_PRESET);
        self.scene = self.presets.load(name).recenter();
        self.source = SceneSource::Preset(canonical);
        log::info!(
            "showing {canonical}: {} atoms, {} bonds",
            self.scene.atoms().len(),
            self.scene.bonds().len()
        );
        &self.scene
    }

    pub fn load_file(&mut self, path: &Path) -> Result<&Scene, SceneError> {
        let scene = scene_file::load_from_file(path)?;
        self.scene = scene.recenter();
        self.source = SceneSource::File(path.to_path_buf());
        log::info!(
            "loaded {}: {} atoms, {} bonds",
            path.display(),
            self.scene.atoms().len(),
            self.scene.bonds().len()
        );
        Ok(&self.scene)
    }
}

impl Default for SceneModel {
    fn default() -> Self {
        Self::new()
    }
}
