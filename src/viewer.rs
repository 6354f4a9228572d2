use std::path::Path;

use glam::Vec3;

use crate::camera::CameraController;
use crate::elements::{element_color, element_radius, BOND_COLOR};
use crate::error::SceneError;
use crate::geometry::{BondGeometryBuilder, CylinderSegment};
use crate::model::{SceneModel, SceneSource};
use crate::options::ViewerOptions;
use crate::render::RenderBackend;

pub const AXIS_LENGTH: f32 = 5.0;
const AXIS_RADIUS: f32 = 0.03;
const AXES: [(Vec3, [f32; 3]); 3] = [
    (Vec3::X, [0.0, 0.0, 1.0]),
    (Vec3::Y, [1.0, 1.0, 0.0]),
    (Vec3::Z, [0.0, 1.0, 0.0]),
];
/// egui reports one wheel notch as this many points of scroll.
const SCROLL_POINTS_PER_NOTCH: f32 = 50.0;

/// Owns the scene, the camera and the backend chosen at startup, and turns
/// them into one complete frame per redraw.
pub struct Viewer {
    model: SceneModel,
    camera: CameraController,
    backend: Box<dyn RenderBackend>,
    bonds: BondGeometryBuilder,
    segments: Vec<CylinderSegment>,
    show_axes: bool,
    on_back: Option<Box<dyn FnMut()>>,
}

impl Viewer {
    pub fn new(backend: Box<dyn RenderBackend>, options: &ViewerOptions) -> Self {
        let mut viewer = Self {
            model: SceneModel::new(),
            camera: options.camera.controller(),
            backend,
            bonds: BondGeometryBuilder::default(),
            segments: Vec::new(),
            show_axes: options.display.show_axes,
            on_back: None,
        };
        viewer.select_molecule(&options.display.initial_molecule);
        viewer
    }

    pub fn model(&self) -> &SceneModel {
        &self.model
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    pub fn show_axes(&self) -> bool {
        self.show_axes
    }

    pub fn set_show_axes(&mut self, show: bool) {
        self.show_axes = show;
    }

    pub fn select_molecule(&mut self, name: &str) {
        self.model.select_preset(name);
        self.scene_changed();
    }

    /// On error the previous scene and camera stay as they were.
    pub fn load_file(&mut self, path: &Path) -> Result<(), SceneError> {
        if let Err(err) = self.model.load_file(path) {
            log::warn!("{err}");
            return Err(err);
        }
        self.scene_changed();
        Ok(())
    }

    pub fn reset_view(&mut self) {
        self.camera.reset(self.model.scene());
    }

    fn scene_changed(&mut self) {
        self.segments = self.bonds.build_scene(self.model.scene());
        self.camera.auto_fit(self.model.scene());
    }

    pub fn set_back_handler(&mut self, handler: impl FnMut() + 'static) {
        self.on_back = Some(Box::new(handler));
    }

    pub fn go_back(&mut self) {
        match self.on_back.as_mut() {
            Some(handler) => handler(),
            None => log::debug!("back requested without a handler"),
        }
    }

    pub fn status_line(&self) -> String {
        let scene = self.model.scene();
        let name = match self.model.source() {
            SceneSource::Preset(name) => (*name).to_string(),
            SceneSource::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        };
        format!(
            "{name}: {} atoms, {} bonds ({} renderer)",
            scene.atoms().len(),
            scene.bonds().len(),
            self.backend.kind().label()
        )
    }

    pub fn redraw(&mut self) {
        self.backend.sync_camera(self.camera.state());
        self.backend.clear();
        for segment in &self.segments {
            let color = segment.color_hint.unwrap_or(BOND_COLOR);
            self.backend.draw_cylinder_segment(segment, color);
        }
        for atom in self.model.scene().atoms() {
            self.backend.draw_sphere(
                atom.position,
                element_radius(&atom.element),
                element_color(&atom.element),
            );
        }
        if self.show_axes {
            for (axis, color) in AXES {
                let segment = CylinderSegment::new(Vec3::ZERO, axis * AXIS_LENGTH, AXIS_RADIUS);
                self.backend.draw_cylinder_segment(&segment, color);
            }
        }
        self.backend.present();
    }

    /// Lays the viewport out over the remaining space of `ui`, applies
    /// pointer input to the camera and paints a fresh frame.
    pub fn show(&mut self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        if response.drag_started_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.camera.on_drag_start(pos.x, pos.y);
            }
        }
        if response.dragged_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.camera.on_drag_move(pos.x, pos.y);
            }
        } else if self.camera.is_dragging() {
            self.camera.on_drag_end();
        }
        if response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.drag_delta();
            self.camera.on_pan(delta.x, delta.y);
        }
        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll != 0.0 {
                self.camera.on_scroll(scroll / SCROLL_POINTS_PER_NOTCH);
            }
        }

        let pixels_per_point = ui.ctx().pixels_per_point();
        self.backend.set_viewport(
            (rect.width() * pixels_per_point).round() as u32,
            (rect.height() * pixels_per_point).round() as u32,
        );
        self.redraw();
        self.backend.show(ui, rect);
        response
    }
}
