use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use molview::gpu::GpuContext;
use molview::render::DEPTH_FORMAT;
use molview::{choose_backend, create_backend, SceneSource, Viewer, ViewerError, ViewerOptions};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), ViewerError> {
    let options = ViewerOptions::load_or_default(&ViewerOptions::default_path())?;
    let scene_path = std::env::args_os().nth(1).map(PathBuf::from);

    let event_loop = EventLoop::new().map_err(|err| ViewerError::Window(err.to_string()))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("molview")
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0))
            .build(&event_loop)
            .map_err(|err| ViewerError::Window(err.to_string()))?,
    );

    let mut gpu = pollster::block_on(GpuContext::new(Arc::clone(&window)))?;
    let egui_ctx = egui::Context::default();
    let viewport_id = egui_ctx.viewport_id();
    let mut egui_state = egui_winit::State::new(
        egui_ctx.clone(),
        viewport_id,
        &window,
        Some(window.scale_factor() as f32),
        None,
    );
    let mut egui_renderer =
        egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, Some(DEPTH_FORMAT), 1);

    let kind = choose_backend(options.display.backend, gpu.hardware_available());
    let backend = create_backend(
        kind,
        &gpu.device,
        gpu.config.format,
        &mut egui_renderer,
        options.display.background,
    );
    let mut viewer = Viewer::new(backend, &options);
    let mut load_error: Option<String> = None;
    if let Some(path) = scene_path {
        if let Err(err) = viewer.load_file(&path) {
            load_error = Some(err.to_string());
        }
    }

    let back_requested = Rc::new(Cell::new(false));
    let flag = Rc::clone(&back_requested);
    viewer.set_back_handler(move || flag.set(true));

    let background = options.display.background;
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run(move |event, target| match event {
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                window_id,
            } if window_id == window.id() => {
                let raw_input = egui_state.take_egui_input(&window);
                let output = egui_ctx.run(raw_input, |ctx| {
                    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
                        ui.horizontal(|ui| {
                            if ui.button("← Back").clicked() {
                                viewer.go_back();
                            }
                            ui.separator();

                            let current = match viewer.model().source() {
                                SceneSource::Preset(name) => *name,
                                SceneSource::File(_) => "custom",
                            };
                            let names: Vec<&'static str> =
                                viewer.model().presets().names().collect();
                            let mut selected = None;
                            egui::ComboBox::from_label("Molecule")
                                .selected_text(current)
                                .show_ui(ui, |ui| {
                                    for name in names {
                                        if ui.selectable_label(name == current, name).clicked() {
                                            selected = Some(name);
                                        }
                                    }
                                });
                            if let Some(name) = selected {
                                viewer.select_molecule(name);
                                load_error = None;
                            }

                            if ui.button("Load JSON…").clicked() {
                                if let Some(path) = rfd::FileDialog::new()
                                    .add_filter("JSON scene", &["json"])
                                    .pick_file()
                                {
                                    load_error = viewer.load_file(&path).err().map(|err| err.to_string());
                                }
                            }
                            if ui.button("Reset view").clicked() {
                                viewer.reset_view();
                            }
                            let mut show_axes = viewer.show_axes();
                            if ui.checkbox(&mut show_axes, "Axes").changed() {
                                viewer.set_show_axes(show_axes);
                            }
                            ui.separator();
                            match &load_error {
                                Some(err) => {
                                    ui.colored_label(egui::Color32::RED, err);
                                }
                                None => {
                                    ui.label(viewer.status_line());
                                }
                            }
                        });
                    });
                    egui::CentralPanel::default()
                        .frame(egui::Frame::none())
                        .show(ctx, |ui| {
                            viewer.show(ui);
                        });
                });
                egui_state.handle_platform_output(&window, output.platform_output);
                if back_requested.get() {
                    target.exit();
                    return;
                }

                let paint_jobs = egui_ctx.tessellate(output.shapes, output.pixels_per_point);
                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [gpu.config.width, gpu.config.height],
                    pixels_per_point: output.pixels_per_point,
                };
                for (id, image_delta) in &output.textures_delta.set {
                    egui_renderer.update_texture(&gpu.device, &gpu.queue, *id, image_delta);
                }

                match gpu.render(&mut egui_renderer, &paint_jobs, &screen_descriptor, background) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost) => gpu.resize(gpu.size()),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("surface out of memory");
                        target.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        std::thread::sleep(Duration::from_millis(16));
                    }
                    Err(wgpu::SurfaceError::Outdated) => {}
                }

                for id in &output.textures_delta.free {
                    egui_renderer.free_texture(id);
                }
            }
            Event::WindowEvent { event, window_id } if window_id == window.id() => {
                if egui_state.on_window_event(&window, &event).consumed {
                    return;
                }
                match event {
                    WindowEvent::CloseRequested => target.exit(),
                    WindowEvent::Resized(size) => gpu.resize(size),
                    WindowEvent::ScaleFactorChanged { .. } => gpu.resize(window.inner_size()),
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|err| ViewerError::Window(err.to_string()))
}
