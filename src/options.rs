//! Viewer options with TOML file support.
//!
//! Every field has a default, so a partial file (for example only a
//! `[camera]` table) is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::CameraController;
use crate::error::ViewerError;
use crate::presets::DEFAULT_PRESET;

pub const DEFAULT_OPTIONS_FILE: &str = "molview.toml";
pub const OPTIONS_ENV_VAR: &str = "MOLVIEW_CONFIG";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Accelerated when a hardware adapter is available, fallback otherwise.
    #[default]
    Auto,
    Accelerated,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayOptions {
    pub initial_molecule: String,
    pub backend: BackendPreference,
    /// Linear RGB viewport background.
    pub background: [f32; 3],
    pub show_axes: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            initial_molecule: DEFAULT_PRESET.to_string(),
            backend: BackendPreference::Auto,
            background: [0.75, 0.85, 0.72],
            show_axes: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraOptions {
    /// Degrees of orbit per pixel of drag.
    pub drag_sensitivity: f32,
    /// Distance units per wheel notch.
    pub scroll_step: f32,
    /// Fraction of the camera distance moved per pixel of pan.
    pub pan_sensitivity: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.3,
            scroll_step: 2.0,
            pan_sensitivity: 0.002,
        }
    }
}

impl CameraOptions {
    pub fn controller(&self) -> CameraController {
        CameraController::new(self.drag_sensitivity, self.scroll_step, self.pan_sensitivity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ViewerOptions {
    pub display: DisplayOptions,
    pub camera: CameraOptions,
}

impl ViewerOptions {
    pub fn load(path: &Path) -> Result<Self, ViewerError> {
        let content = std::fs::read_to_string(path).map_err(|source| ViewerError::OptionsRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ViewerError> {
        Ok(toml::from_str(content)?)
    }

    /// The file named by `MOLVIEW_CONFIG`, else `molview.toml` in the working
    /// directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(OPTIONS_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OPTIONS_FILE))
    }

    /// Loads `path` if it exists; a missing file means defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ViewerError> {
        if path.exists() {
            log::info!("loading options from {}", path.display());
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let options = ViewerOptions::default();
        let text = toml::to_string_pretty(&options).unwrap();
        let parsed = ViewerOptions::parse(&text).unwrap();
        assert_eq!(options, parsed);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let parsed = ViewerOptions::parse(
            "[display]\nbackend = \"fallback\"\n\n[camera]\nscroll_step = 4.0\n",
        )
        .unwrap();
        assert_eq!(parsed.display.backend, BackendPreference::Fallback);
        assert_eq!(parsed.display.initial_molecule, "H2O");
        assert!(parsed.display.show_axes);
        assert_eq!(parsed.camera.scroll_step, 4.0);
        assert_eq!(parsed.camera.drag_sensitivity, 0.3);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(matches!(
            ViewerOptions::parse("[display]\nbackend = \"vulkan\"\n"),
            Err(ViewerError::OptionsParse(_))
        ));
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let options = ViewerOptions::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(options, ViewerOptions::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("molview.toml");
        std::fs::write(&path, "[display]\ninitial_molecule = \"Benzene\"\n").unwrap();
        let options = ViewerOptions::load(&path).unwrap();
        assert_eq!(options.display.initial_molecule, "Benzene");
    }
}
