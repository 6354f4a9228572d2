use glam::{Mat4, Vec2, Vec3};

use crate::scene::Scene;

pub const MIN_DISTANCE: f32 = 5.0;
pub const MAX_DISTANCE: f32 = 60.0;
pub const DEFAULT_DISTANCE: f32 = 20.0;
pub const DEFAULT_AZIMUTH: f32 = 35.0;
pub const DEFAULT_ELEVATION: f32 = 20.0;
const MAX_ELEVATION: f32 = 89.0;
const FIT_MIN_DISTANCE: f32 = 10.0;
const FIT_SCALE: f32 = 2.6;

pub const FOV_Y_DEGREES: f32 = 45.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub distance: f32,
    pub azimuth_deg: f32,
    pub elevation_deg: f32,
    pub target: Vec3,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            distance: DEFAULT_DISTANCE,
            azimuth_deg: DEFAULT_AZIMUTH,
            elevation_deg: DEFAULT_ELEVATION,
            target: Vec3::ZERO,
        }
    }
}

impl CameraState {
    /// Pull back by `distance`, tilt by elevation about X, spin by azimuth
    /// about Y, all around `target`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance))
            * Mat4::from_rotation_x(self.elevation_deg.to_radians())
            * Mat4::from_rotation_y(self.azimuth_deg.to_radians())
            * Mat4::from_translation(-self.target)
    }

    pub fn eye(&self) -> Vec3 {
        let (azimuth_sin, azimuth_cos) = self.azimuth_deg.to_radians().sin_cos();
        let (elevation_sin, elevation_cos) = self.elevation_deg.to_radians().sin_cos();
        self.target
            + Vec3::new(
                -self.distance * elevation_cos * azimuth_sin,
                self.distance * elevation_sin,
                self.distance * elevation_cos * azimuth_cos,
            )
    }

    pub fn projection(aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect.max(1e-3), Z_NEAR, Z_FAR)
    }
}

pub fn fit_distance(scene: &Scene) -> f32 {
    (scene.bounding_radius() * FIT_SCALE)
        .max(FIT_MIN_DISTANCE)
        .clamp(MIN_DISTANCE, MAX_DISTANCE)
}

#[derive(Debug, Clone)]
pub struct CameraController {
    state: CameraState,
    last_drag: Option<Vec2>,
    drag_sensitivity: f32,
    scroll_step: f32,
    pan_sensitivity: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(0.3, 2.0, 0.002)
    }
}

impl CameraController {
    pub fn new(drag_sensitivity: f32, scroll_step: f32, pan_sensitivity: f32) -> Self {
        Self {
            state: CameraState::default(),
            last_drag: None,
            drag_sensitivity,
            scroll_step,
            pan_sensitivity,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.state.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn on_drag_start(&mut self, x: f32, y: f32) {
        self.last_drag = Some(Vec2::new(x, y));
    }

    /// Orbits by the pixel delta since the previous drag position. Returns
    /// whether the camera moved.
    pub fn on_drag_move(&mut self, x: f32, y: f32) -> bool {
        let position = Vec2::new(x, y);
        let Some(last) = self.last_drag.replace(position) else {
            return false;
        };
        let delta = position - last;
        if delta == Vec2::ZERO {
            return false;
        }
        self.state.azimuth_deg = (self.state.azimuth_deg + delta.x * self.drag_sensitivity) % 360.0;
        self.state.elevation_deg = (self.state.elevation_deg + delta.y * self.drag_sensitivity)
            .clamp(-MAX_ELEVATION, MAX_ELEVATION);
        true
    }

    pub fn on_drag_end(&mut self) {
        self.last_drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.last_drag.is_some()
    }

    /// Positive deltas (wheel away from the user) move the camera closer.
    pub fn on_scroll(&mut self, delta: f32) {
        self.set_distance(self.state.distance - delta * self.scroll_step);
    }

    /// Slides the orbit target in the view plane by a pixel delta.
    pub fn on_pan(&mut self, dx: f32, dy: f32) {
        let rotation = self.state.view_matrix().inverse();
        let right = rotation.transform_vector3(Vec3::X).normalize_or_zero();
        let up = rotation.transform_vector3(Vec3::Y).normalize_or_zero();
        let scale = self.state.distance * self.pan_sensitivity;
        self.state.target += (-right * dx + up * dy) * scale;
    }

    pub fn auto_fit(&mut self, scene: &Scene) {
        self.state.target = Vec3::ZERO;
        self.state.distance = fit_distance(scene);
    }

    pub fn reset(&mut self, scene: &Scene) {
        self.state.azimuth_deg = DEFAULT_AZIMUTH;
        self.state.elevation_deg = DEFAULT_ELEVATION;
        self.auto_fit(scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Atom;

    #[test]
    fn scroll_step_and_clamp() {
        let mut camera = CameraController::default();
        assert_eq!(camera.state().distance, 20.0);
        camera.on_scroll(1.0);
        assert_eq!(camera.state().distance, 18.0);
        for _ in 0..50 {
            camera.on_scroll(-10.0);
        }
        assert_eq!(camera.state().distance, 60.0);
        for _ in 0..50 {
            camera.on_scroll(10.0);
        }
        assert_eq!(camera.state().distance, 5.0);
    }

    #[test]
    fn drag_orbits_proportionally() {
        let mut camera = CameraController::default();
        assert!(!camera.on_drag_move(10.0, 10.0));
        camera.on_drag_start(100.0, 100.0);
        assert!(camera.on_drag_move(110.0, 90.0));
        assert!((camera.state().azimuth_deg - 38.0).abs() < 1e-4);
        assert!((camera.state().elevation_deg - 17.0).abs() < 1e-4);
        camera.on_drag_end();
        assert!(!camera.is_dragging());
        assert!(!camera.on_drag_move(500.0, 500.0));
    }

    #[test]
    fn elevation_is_clamped() {
        let mut camera = CameraController::default();
        camera.on_drag_start(0.0, 0.0);
        camera.on_drag_move(0.0, 10_000.0);
        assert_eq!(camera.state().elevation_deg, 89.0);
    }

    #[test]
    fn auto_fit_uses_bounding_radius() {
        let mut camera = CameraController::default();
        let small = Scene::new(vec![Atom::new("H", [0.5, 0.0, 0.0])], []);
        camera.auto_fit(&small);
        assert_eq!(camera.state().distance, 10.0);

        let wide = Scene::new(
            vec![Atom::new("C", [-6.0, 0.0, 0.0]), Atom::new("C", [6.0, 0.0, 0.0])],
            [],
        );
        camera.auto_fit(&wide);
        assert!((camera.state().distance - 15.6).abs() < 1e-4);

        let huge = Scene::new(vec![Atom::new("C", [100.0, 0.0, 0.0])], []);
        camera.auto_fit(&huge);
        assert_eq!(camera.state().distance, MAX_DISTANCE);
    }

    #[test]
    fn eye_matches_view_matrix() {
        let state = CameraState {
            distance: 12.0,
            azimuth_deg: 70.0,
            elevation_deg: -30.0,
            target: Vec3::new(1.0, 2.0, 3.0),
        };
        let eye_in_view = state.view_matrix().transform_point3(state.eye());
        assert!(eye_in_view.length() < 1e-4);
        let target_in_view = state.view_matrix().transform_point3(state.target);
        assert!((target_in_view - Vec3::new(0.0, 0.0, -12.0)).length() < 1e-4);
    }

    #[test]
    fn pan_moves_target_and_fit_resets_it() {
        let mut camera = CameraController::default();
        camera.on_pan(100.0, 0.0);
        assert!(camera.state().target.length() > 0.0);
        camera.auto_fit(&Scene::default());
        assert_eq!(camera.state().target, Vec3::ZERO);
    }
}
