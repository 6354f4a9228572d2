use std::fs;

use molview::render::FallbackBackend;
use molview::{BondGeometryBuilder, BondOrder, SceneError, SceneModel, SceneSource, Viewer, ViewerOptions};

const METHANOL: &str = r#"{
    "atoms": [
        {"element": "C", "x": 0.0, "y": 0.0, "z": 0.0},
        {"element": "O", "x": 1.43, "y": 0.0, "z": 0.0},
        {"element": "H", "x": 1.75, "y": 0.9, "z": 0.0},
        {"element": "H", "x": -0.5, "y": 0.9, "z": 0.0},
        {"element": "H", "x": -0.5, "y": -0.9, "z": 0.0},
        {"x": -0.5, "y": 0.0, "z": 0.9}
    ],
    "bonds": [[0, 1], [1, 2], [0, 3], [0, 4], [0, 5], [0, 1, 2.7], "skip", [4]]
}"#;

#[test]
fn json_scene_is_recentered_and_expanded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("methanol.json");
    fs::write(&path, METHANOL).unwrap();

    let mut model = SceneModel::new();
    let scene = model.load_file(&path).unwrap().clone();
    assert_eq!(model.source(), &SceneSource::File(path.clone()));
    assert_eq!(scene.atoms().len(), 6);
    assert_eq!(scene.atoms()[5].element, "C");
    assert!(scene.centroid().length() < 1e-5);
    assert_eq!(scene.bonds().len(), 6);
    assert_eq!(scene.bonds()[5].order, BondOrder::Double);

    let segments = BondGeometryBuilder::default().build_scene(&scene);
    assert_eq!(segments.len(), 7);
}

#[test]
fn missing_file_reports_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut model = SceneModel::new();
    let err = model.load_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SceneError::Read { .. }));
    assert_eq!(model.source(), &SceneSource::Preset("H2O"));
}

#[test]
fn software_viewer_draws_loaded_scene() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("methanol.json");
    fs::write(&path, METHANOL).unwrap();

    let mut options = ViewerOptions::default();
    options.display.show_axes = false;
    let mut viewer = Viewer::new(Box::new(FallbackBackend::new([0.0, 0.0, 0.0])), &options);
    viewer.load_file(&path).unwrap();
    assert!(viewer.camera().state().distance >= 10.0);
    viewer.redraw();
    assert_eq!(viewer.backend().kind(), molview::BackendKind::Fallback);
}
