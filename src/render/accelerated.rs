use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use super::mesh::{create_cylinder_mesh, create_sphere_mesh, Vertex};
use super::{color32, BackendKind, RenderBackend, DEPTH_FORMAT};
use crate::camera::CameraState;
use crate::geometry::CylinderSegment;

const SPHERE_SEGMENTS: u32 = 32;
const SPHERE_RINGS: u32 = 16;
const CYLINDER_SEGMENTS: u32 = 24;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable, PartialEq)]
pub struct SphereInstance {
    pub position: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
    _pad: u32,
}

impl SphereInstance {
    pub fn new(position: Vec3, radius: f32, color: [f32; 3]) -> Self {
        Self {
            position: position.to_array(),
            radius,
            color,
            _pad: 0,
        }
    }

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32,
                },
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// The unit cylinder template placed by a full model matrix.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable, PartialEq)]
pub struct CylinderInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl CylinderInstance {
    pub fn new(model: Mat4, color: [f32; 3]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: [color[0], color[1], color[2], 1.0],
        }
    }

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CylinderInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 32,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 48,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 64,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
}

/// Yaw/pitch/distance orbit camera driven from the shared camera state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub target: Vec3,
}

impl OrbitCamera {
    pub fn from_state(state: &CameraState) -> Self {
        Self {
            yaw: (state.azimuth_deg + 90.0).to_radians(),
            pitch: state.elevation_deg.to_radians(),
            distance: state.distance,
            target: state.target,
        }
    }

    pub fn position(&self) -> Vec3 {
        let (yaw_sin, yaw_cos) = self.yaw.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.sin_cos();
        Vec3::new(
            self.distance * pitch_cos * yaw_cos,
            self.distance * pitch_sin,
            self.distance * pitch_cos * yaw_sin,
        ) + self.target
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        CameraState::projection(aspect) * self.view()
    }
}

/// Retained scene graph: the sphere and cylinder templates live on the GPU
/// once; each frame only the instance lists are rebuilt, and they are
/// uploaded only when they differ from the last presented frame.
pub struct AcceleratedBackend {
    background: [f32; 3],
    camera: OrbitCamera,
    aspect: f32,
    spheres: Vec<SphereInstance>,
    cylinders: Vec<CylinderInstance>,
    presented_spheres: Arc<[SphereInstance]>,
    presented_cylinders: Arc<[CylinderInstance]>,
    generation: u64,
}

impl AcceleratedBackend {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        egui_renderer: &mut egui_wgpu::Renderer,
        background: [f32; 3],
    ) -> Self {
        egui_renderer
            .callback_resources
            .insert(SceneResources::new(device, color_format));
        Self {
            background,
            camera: OrbitCamera::from_state(&CameraState::default()),
            aspect: 1.0,
            spheres: Vec::new(),
            cylinders: Vec::new(),
            presented_spheres: Arc::from(Vec::new()),
            presented_cylinders: Arc::from(Vec::new()),
            generation: 0,
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }
}

impl RenderBackend for AcceleratedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Accelerated
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    fn sync_camera(&mut self, camera: &CameraState) {
        self.camera = OrbitCamera::from_state(camera);
    }

    fn clear(&mut self) {
        self.spheres.clear();
        self.cylinders.clear();
    }

    fn draw_sphere(&mut self, center: Vec3, radius: f32, color: [f32; 3]) {
        self.spheres.push(SphereInstance::new(center, radius, color));
    }

    fn draw_cylinder_segment(&mut self, segment: &CylinderSegment, color: [f32; 3]) {
        if let Some(model) = segment.transform() {
            self.cylinders.push(CylinderInstance::new(model, color));
        }
    }

    fn present(&mut self) {
        if *self.presented_spheres != *self.spheres
            || *self.presented_cylinders != *self.cylinders
        {
            self.presented_spheres = Arc::from(self.spheres.as_slice());
            self.presented_cylinders = Arc::from(self.cylinders.as_slice());
            self.generation += 1;
        }
    }

    fn show(&mut self, ui: &mut egui::Ui, rect: egui::Rect) {
        ui.painter()
            .rect_filled(rect, 0.0, color32(self.background));
        let camera_pos = self.camera.position();
        let frame = SceneFrame {
            generation: self.generation,
            spheres: Arc::clone(&self.presented_spheres),
            cylinders: Arc::clone(&self.presented_cylinders),
            camera: CameraUniform {
                view_proj: self.camera.view_proj(self.aspect).to_cols_array_2d(),
                camera_pos: [camera_pos.x, camera_pos.y, camera_pos.z, 1.0],
            },
        };
        ui.painter()
            .add(egui_wgpu::Callback::new_paint_callback(rect, frame));
    }
}

struct SceneFrame {
    generation: u64,
    spheres: Arc<[SphereInstance]>,
    cylinders: Arc<[CylinderInstance]>,
    camera: CameraUniform,
}

impl egui_wgpu::CallbackTrait for SceneFrame {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        _screen_descriptor: &egui_wgpu::ScreenDescriptor,
        _egui_encoder: &mut wgpu::CommandEncoder,
        callback_resources: &mut egui_wgpu::CallbackResources,
    ) -> Vec<wgpu::CommandBuffer> {
        if let Some(resources) = callback_resources.get_mut::<SceneResources>() {
            queue.write_buffer(&resources.camera_buffer, 0, bytemuck::bytes_of(&self.camera));
            if resources.generation != Some(self.generation) {
                resources.upload(device, queue, &self.spheres, &self.cylinders);
                resources.generation = Some(self.generation);
            }
        }
        Vec::new()
    }

    fn paint<'a>(
        &'a self,
        _info: egui::PaintCallbackInfo,
        render_pass: &mut wgpu::RenderPass<'a>,
        callback_resources: &'a egui_wgpu::CallbackResources,
    ) {
        if let Some(resources) = callback_resources.get::<SceneResources>() {
            resources.draw(render_pass);
        }
    }
}

struct InstanceBuffer {
    label: &'static str,
    buffer: Option<wgpu::Buffer>,
    capacity: usize,
    len: u32,
}

impl InstanceBuffer {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            buffer: None,
            capacity: 0,
            len: 0,
        }
    }

    fn write<T: Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[T]) {
        if data.len() > self.capacity {
            let new_capacity = data.len().next_power_of_two().max(1);
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: (new_capacity * std::mem::size_of::<T>()) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.capacity = new_capacity;
        }
        if let Some(buffer) = &self.buffer {
            if !data.is_empty() {
                queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
            }
        }
        self.len = data.len() as u32;
    }

    fn slice(&self) -> Option<wgpu::BufferSlice<'_>> {
        match &self.buffer {
            Some(buffer) if self.len > 0 => Some(buffer.slice(..)),
            _ => None,
        }
    }
}

struct TemplateMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl TemplateMesh {
    fn new(device: &wgpu::Device, name: &str, mesh: &super::mesh::Mesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name}_vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name}_indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

/// GPU half of the backend, stored in egui's callback resources.
struct SceneResources {
    sphere_pipeline: wgpu::RenderPipeline,
    cylinder_pipeline: wgpu::RenderPipeline,
    sphere_mesh: TemplateMesh,
    cylinder_mesh: TemplateMesh,
    sphere_instances: InstanceBuffer,
    cylinder_instances: InstanceBuffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    generation: Option<u64>,
}

impl SceneResources {
    fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let sphere_mesh = TemplateMesh::new(
            device,
            "sphere",
            &create_sphere_mesh(SPHERE_SEGMENTS, SPHERE_RINGS),
        );
        let cylinder_mesh =
            TemplateMesh::new(device, "cylinder", &create_cylinder_mesh(CYLINDER_SEGMENTS));

        let camera_uniform = CameraUniform {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            camera_pos: [0.0; 4],
        };
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_buffer"),
            contents: bytemuck::bytes_of(&camera_uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("camera_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });
        let sphere_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            color_format,
            "sphere_pipeline",
            "vs_sphere",
            SphereInstance::desc(),
        );
        let cylinder_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            color_format,
            "cylinder_pipeline",
            "vs_cylinder",
            CylinderInstance::desc(),
        );

        Self {
            sphere_pipeline,
            cylinder_pipeline,
            sphere_mesh,
            cylinder_mesh,
            sphere_instances: InstanceBuffer::new("sphere_instance_buffer"),
            cylinder_instances: InstanceBuffer::new("cylinder_instance_buffer"),
            camera_buffer,
            camera_bind_group,
            generation: None,
        }
    }

    fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        spheres: &[SphereInstance],
        cylinders: &[CylinderInstance],
    ) {
        self.sphere_instances.write(device, queue, spheres);
        self.cylinder_instances.write(device, queue, cylinders);
    }

    fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        for (pipeline, mesh, instances) in [
            (
                &self.cylinder_pipeline,
                &self.cylinder_mesh,
                &self.cylinder_instances,
            ),
            (
                &self.sphere_pipeline,
                &self.sphere_mesh,
                &self.sphere_instances,
            ),
        ] {
            let Some(instance_slice) = instances.slice() else {
                continue;
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, instance_slice);
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.index_count, 0, 0..instances.len);
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    label: &str,
    vertex_entry: &str,
    instance_layout: wgpu::VertexBufferLayout<'static>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: vertex_entry,
            buffers: &[Vertex::desc(), instance_layout],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_camera_matches_camera_state() {
        let states = [
            CameraState::default(),
            CameraState {
                distance: 42.0,
                azimuth_deg: -120.0,
                elevation_deg: 60.0,
                target: Vec3::new(0.5, -1.0, 2.0),
            },
        ];
        for state in states {
            let orbit = OrbitCamera::from_state(&state);
            assert!((orbit.position() - state.eye()).length() < 1e-4);
            let expected = state.view_matrix();
            let actual = orbit.view();
            for (a, b) in expected
                .to_cols_array()
                .iter()
                .zip(actual.to_cols_array().iter())
            {
                assert!((a - b).abs() < 1e-4, "{expected:?} vs {actual:?}");
            }
        }
    }

    #[test]
    fn instance_layouts_match_struct_sizes() {
        assert_eq!(std::mem::size_of::<SphereInstance>(), 32);
        assert_eq!(std::mem::size_of::<CylinderInstance>(), 80);
        let cylinder = CylinderInstance::new(Mat4::IDENTITY, [0.6, 0.6, 0.6]);
        assert_eq!(cylinder.color, [0.6, 0.6, 0.6, 1.0]);
    }
}
