//! Rendering backends.
//!
//! The viewer talks to a single [`RenderBackend`] chosen once at startup.
//! [`AcceleratedBackend`] keeps retained instance lists on the GPU;
//! [`FallbackBackend`] rasterizes every draw call on the CPU. Both share the
//! element table, template tessellation and bond geometry so a molecule looks
//! the same either way.

mod accelerated;
mod fallback;
pub mod mesh;

use glam::Vec3;

pub use accelerated::{AcceleratedBackend, CylinderInstance, OrbitCamera, SphereInstance};
pub use fallback::{FallbackBackend, Framebuffer};

use crate::camera::CameraState;
use crate::geometry::CylinderSegment;
use crate::options::BackendPreference;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Accelerated,
    Fallback,
}

impl BackendKind {
    pub fn label(self) -> &'static str {
        match self {
            BackendKind::Accelerated => "accelerated",
            BackendKind::Fallback => "software",
        }
    }
}

/// Draw-call contract shared by both backends. A frame is
/// `clear`, any number of `draw_*`, then `present`; `show` puts the last
/// presented frame on screen.
pub trait RenderBackend {
    fn kind(&self) -> BackendKind;

    /// Viewport size in physical pixels.
    fn set_viewport(&mut self, width: u32, height: u32);

    fn sync_camera(&mut self, camera: &CameraState);

    fn clear(&mut self);

    fn draw_sphere(&mut self, center: Vec3, radius: f32, color: [f32; 3]);

    fn draw_cylinder_segment(&mut self, segment: &CylinderSegment, color: [f32; 3]);

    fn present(&mut self);

    fn show(&mut self, ui: &mut egui::Ui, rect: egui::Rect);
}

pub fn choose_backend(preference: BackendPreference, hardware_available: bool) -> BackendKind {
    match preference {
        BackendPreference::Fallback => BackendKind::Fallback,
        BackendPreference::Auto | BackendPreference::Accelerated if hardware_available => {
            BackendKind::Accelerated
        }
        BackendPreference::Accelerated => {
            log::warn!("accelerated rendering requested but no hardware adapter is available");
            BackendKind::Fallback
        }
        BackendPreference::Auto => BackendKind::Fallback,
    }
}

/// Builds the selected backend. Never fails: the accelerated backend only
/// needs a device, which the caller already has.
pub fn create_backend(
    kind: BackendKind,
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    egui_renderer: &mut egui_wgpu::Renderer,
    background: [f32; 3],
) -> Box<dyn RenderBackend> {
    log::info!("using {} renderer", kind.label());
    match kind {
        BackendKind::Accelerated => Box::new(AcceleratedBackend::new(
            device,
            color_format,
            egui_renderer,
            background,
        )),
        BackendKind::Fallback => Box::new(FallbackBackend::new(background)),
    }
}

pub(crate) fn color32(color: [f32; 3]) -> egui::Color32 {
    let [r, g, b] = color.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8);
    egui::Color32::from_rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_choice() {
        use BackendPreference::*;
        assert_eq!(choose_backend(Auto, true), BackendKind::Accelerated);
        assert_eq!(choose_backend(Auto, false), BackendKind::Fallback);
        assert_eq!(choose_backend(Accelerated, true), BackendKind::Accelerated);
        assert_eq!(choose_backend(Accelerated, false), BackendKind::Fallback);
        assert_eq!(choose_backend(Fallback, true), BackendKind::Fallback);
        assert_eq!(choose_backend(Fallback, false), BackendKind::Fallback);
    }

    #[test]
    fn color32_rounds_channels() {
        assert_eq!(color32([1.0, 0.2, 0.0]), egui::Color32::from_rgb(255, 51, 0));
        assert_eq!(color32([2.0, -1.0, 0.5]), egui::Color32::from_rgb(255, 0, 128));
    }
}
