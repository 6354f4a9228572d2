use glam::{Mat4, Vec3, Vec4};

use super::mesh::{create_cylinder_mesh, create_sphere_mesh, Mesh};
use super::{color32, BackendKind, RenderBackend};
use crate::camera::{CameraState, Z_NEAR};
use crate::geometry::CylinderSegment;

const SPHERE_SLICES: u32 = 20;
const SPHERE_STACKS: u32 = 20;
const CYLINDER_SLICES: u32 = 20;
const AMBIENT: f32 = 0.3;
const DIFFUSE: f32 = 0.7;

/// CPU color + depth target.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let len = (width * height) as usize;
        Self {
            width,
            height,
            color: vec![[0, 0, 0, 255]; len],
            depth: vec![f32::INFINITY; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.color[(y * self.width + x) as usize]
    }

    pub fn as_rgba(&self) -> &[u8] {
        bytemuck::cast_slice(&self.color)
    }

    fn clear(&mut self, color: [u8; 4]) {
        self.color.fill(color);
        self.depth.fill(f32::INFINITY);
    }

    /// Fills one screen-space triangle with a flat color. Points are
    /// `(x, y, depth)` in pixels.
    fn fill_triangle(&mut self, points: [Vec3; 3], color: [u8; 4]) {
        let [p0, p1, p2] = points;
        let area = edge(p0, p1, p2);
        if area.abs() < 1e-8 {
            return;
        }
        let min_x = p0.x.min(p1.x).min(p2.x).floor().max(0.0) as u32;
        let min_y = p0.y.min(p1.y).min(p2.y).floor().max(0.0) as u32;
        let max_x = (p0.x.max(p1.x).max(p2.x).ceil() as i64).min(self.width as i64 - 1);
        let max_y = (p0.y.max(p1.y).max(p2.y).ceil() as i64).min(self.height as i64 - 1);
        if max_x < 0 || max_y < 0 {
            return;
        }
        for y in min_y..=max_y as u32 {
            for x in min_x..=max_x as u32 {
                let p = Vec3::new(x as f32 + 0.5, y as f32 + 0.5, 0.0);
                let w0 = edge(p1, p2, p) / area;
                let w1 = edge(p2, p0, p) / area;
                let w2 = edge(p0, p1, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let depth = w0 * p0.z + w1 * p1.z + w2 * p2.z;
                let index = (y * self.width + x) as usize;
                if depth < self.depth[index] {
                    self.depth[index] = depth;
                    self.color[index] = color;
                }
            }
        }
    }
}

fn edge(a: Vec3, b: Vec3, p: Vec3) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Immediate-mode software renderer. Each draw call tessellates its quadric
/// and rasterizes it straight into the framebuffer.
pub struct FallbackBackend {
    background: [f32; 3],
    camera: CameraState,
    framebuffer: Framebuffer,
    sphere: Mesh,
    cylinder: Mesh,
    view_proj: Mat4,
    texture: Option<egui::TextureHandle>,
    needs_upload: bool,
}

impl FallbackBackend {
    pub fn new(background: [f32; 3]) -> Self {
        let mut backend = Self {
            background,
            camera: CameraState::default(),
            framebuffer: Framebuffer::new(1, 1),
            sphere: create_sphere_mesh(SPHERE_SLICES, SPHERE_STACKS),
            cylinder: create_cylinder_mesh(CYLINDER_SLICES),
            view_proj: Mat4::IDENTITY,
            texture: None,
            needs_upload: false,
        };
        backend.update_view_proj();
        backend
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    fn update_view_proj(&mut self) {
        let aspect = self.framebuffer.width as f32 / self.framebuffer.height as f32;
        self.view_proj = CameraState::projection(aspect) * self.camera.view_matrix();
    }

    fn draw_mesh(&mut self, which: Template, model: Mat4, color: [f32; 3]) {
        let eye = self.camera.eye();
        let mesh = match which {
            Template::Sphere => &self.sphere,
            Template::Cylinder => &self.cylinder,
        };
        let width = self.framebuffer.width as f32;
        let height = self.framebuffer.height as f32;
        let mut triangles = Vec::with_capacity(mesh.indices.len() / 3);
        for [a, b, c] in mesh.triangles() {
            let world = [a, b, c].map(|vertex| model.transform_point3(Vec3::from(vertex.position)));
            let clip = world.map(|point| self.view_proj * point.extend(1.0));
            if clip.iter().any(|point| point.w <= Z_NEAR) {
                continue;
            }
            let normal = [a, b, c]
                .iter()
                .map(|vertex| model.transform_vector3(Vec3::from(vertex.normal)).normalize_or_zero())
                .sum::<Vec3>()
                .normalize_or_zero();
            let centroid = (world[0] + world[1] + world[2]) / 3.0;
            let light = (eye - centroid).normalize_or_zero();
            let intensity = AMBIENT + DIFFUSE * normal.dot(light).max(0.0);
            let shaded = color.map(|channel| channel * intensity);
            let points = clip.map(|point| to_screen(point, width, height));
            triangles.push((points, color32(shaded).to_array()));
        }
        for (points, color) in triangles {
            self.framebuffer.fill_triangle(points, color);
        }
    }
}

#[derive(Clone, Copy)]
enum Template {
    Sphere,
    Cylinder,
}

fn to_screen(clip: Vec4, width: f32, height: f32) -> Vec3 {
    let ndc = clip.truncate() / clip.w;
    Vec3::new(
        (ndc.x * 0.5 + 0.5) * width,
        (0.5 - ndc.y * 0.5) * height,
        ndc.z,
    )
}

impl RenderBackend for FallbackBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Fallback
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if width != self.framebuffer.width || height != self.framebuffer.height {
            self.framebuffer = Framebuffer::new(width, height);
            self.update_view_proj();
        }
    }

    fn sync_camera(&mut self, camera: &CameraState) {
        if self.camera != *camera {
            self.camera = *camera;
            self.update_view_proj();
        }
    }

    fn clear(&mut self) {
        self.framebuffer.clear(color32(self.background).to_array());
    }

    fn draw_sphere(&mut self, center: Vec3, radius: f32, color: [f32; 3]) {
        let model = Mat4::from_translation(center) * Mat4::from_scale(Vec3::splat(radius));
        self.draw_mesh(Template::Sphere, model, color);
    }

    fn draw_cylinder_segment(&mut self, segment: &CylinderSegment, color: [f32; 3]) {
        if let Some(model) = segment.transform() {
            self.draw_mesh(Template::Cylinder, model, color);
        }
    }

    fn present(&mut self) {
        self.needs_upload = true;
    }

    fn show(&mut self, ui: &mut egui::Ui, rect: egui::Rect) {
        if self.needs_upload || self.texture.is_none() {
            let image = egui::ColorImage::from_rgba_unmultiplied(
                [
                    self.framebuffer.width as usize,
                    self.framebuffer.height as usize,
                ],
                self.framebuffer.as_rgba(),
            );
            match &mut self.texture {
                Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                None => {
                    self.texture = Some(ui.ctx().load_texture(
                        "molview-software-frame",
                        image,
                        egui::TextureOptions::LINEAR,
                    ))
                }
            }
            self.needs_upload = false;
        }
        if let Some(texture) = &self.texture {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            ui.painter()
                .image(texture.id(), rect, uv, egui::Color32::WHITE);
        }
    }
}
