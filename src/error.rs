use std::path::PathBuf;

use thiserror::Error;

/// A scene file could not be turned into a scene. The viewer keeps showing
/// whatever it showed before.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scene file: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for SceneError {
    fn from(err: serde_json::Error) -> Self {
        SceneError::Parse(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("failed to read options file {path}: {source}")]
    OptionsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid options file: {0}")]
    OptionsParse(#[from] toml::de::Error),

    #[error("failed to create window: {0}")]
    Window(String),

    #[error("GPU initialization failed: {0}")]
    Gpu(String),

    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}
