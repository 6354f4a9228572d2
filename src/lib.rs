pub mod camera;
pub mod elements;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod model;
pub mod options;
pub mod presets;
pub mod render;
pub mod scene;
pub mod scene_file;
pub mod viewer;

pub use camera::{CameraController, CameraState};
pub use error::{SceneError, ViewerError};
pub use geometry::{BondGeometryBuilder, CylinderSegment};
pub use model::{SceneModel, SceneSource};
pub use options::{BackendPreference, ViewerOptions};
pub use render::{choose_backend, create_backend, BackendKind, RenderBackend};
pub use scene::{Atom, Bond, BondOrder, Scene};
pub use viewer::Viewer;
