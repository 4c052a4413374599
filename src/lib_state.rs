use crate::camera;
use crate::config;
use crate::lib_render::{CameraUniform, LightUniform};
use crate::mesh::Bounds;
use crate::model_mesh::{MeshModel, ModelVertex, Vertex};
use crate::scene::Scene;
use anyhow::Context;
use std::time::Duration;
use wgpu::util::DeviceExt;
use winit::event::WindowEvent;
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// GPU resources plus the scene they draw.
pub struct State<'a> {
    pub window: &'a Window,
    pub surface: wgpu::Surface<'a>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub scene: Scene,
    // Camera as the scene was built, restored by `reset_view`
    initial_camera: camera::Camera,
    bounds: Bounds,
    pub projection: camera::Projection,
    pub camera_controller: camera::CameraController,
    pub camera_uniform: CameraUniform,
    pub camera_buffer: wgpu::Buffer,
    pub light_uniform: LightUniform,
    pub light_buffer: wgpu::Buffer,
    pub camera_bind_group: wgpu::BindGroup,
    pub culled_pipeline: wgpu::RenderPipeline,
    pub two_sided_pipeline: wgpu::RenderPipeline,
    pub models: Vec<MeshModel>,
    pub sample_count: u32,
    pub depth_texture_view: wgpu::TextureView,
    pub multisample_texture_view: Option<wgpu::TextureView>,
}

impl<'a> State<'a> {
    /// Create a new State instance with full GPU initialization
    pub async fn new(window: &'a Window, scene: Scene) -> anyhow::Result<State<'a>> {
        let size = window.inner_size();
        let render_config = config::render_config();

        let (surface, adapter, device, queue, config) = init_gpu_context(window, size, render_config.vsync).await?;
        surface.configure(&device, &config);

        let sample_count = supported_sample_count(&adapter, config.format, render_config.msaa_samples);
        if sample_count != render_config.msaa_samples {
            config::set_msaa_samples(sample_count);
        }
        log::info!(
            "surface {}x{} {:?}, {}x MSAA",
            config.width,
            config.height,
            config.format,
            sample_count
        );

        let bounds = scene.bounds();
        let projection = camera::Projection::new(config.width, config.height);
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&scene.camera, &projection, &bounds);
        let light_uniform = LightUniform::headlight(&scene.camera);

        let (camera_buffer, light_buffer, camera_bind_group, camera_bind_group_layout) =
            init_camera_and_light(&device, &camera_uniform, &light_uniform);

        let material_bind_group_layout = create_material_bind_group_layout(&device);

        let (culled_pipeline, two_sided_pipeline) = init_pipelines(
            &device,
            config.format,
            sample_count,
            &camera_bind_group_layout,
            &material_bind_group_layout,
        );

        let models = scene
            .actors
            .iter()
            .map(|actor| MeshModel::new(&device, &material_bind_group_layout, actor))
            .collect();

        let depth_texture_view = create_depth_texture(&device, &config, sample_count);
        let multisample_texture_view = create_multisample_texture(&device, &config, sample_count);

        Ok(State {
            window,
            surface,
            device,
            queue,
            config,
            size,
            initial_camera: scene.camera,
            scene,
            bounds,
            projection,
            camera_controller: camera::CameraController::default(),
            camera_uniform,
            camera_buffer,
            light_uniform,
            light_buffer,
            camera_bind_group,
            culled_pipeline,
            two_sided_pipeline,
            models,
            sample_count,
            depth_texture_view,
            multisample_texture_view,
        })
    }

    pub fn window(&self) -> &Window {
        self.window
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.projection.resize(new_size.width, new_size.height);
            self.depth_texture_view = create_depth_texture(&self.device, &self.config, self.sample_count);
            self.multisample_texture_view =
                create_multisample_texture(&self.device, &self.config, self.sample_count);
        }
    }

    pub fn input(&mut self, event: &WindowEvent) -> bool {
        crate::lib_input::handle_input(self, event)
    }

    /// Put the camera back where the scene placed it.
    pub fn reset_view(&mut self) {
        self.scene.camera = self.initial_camera;
        log::info!("view reset");
    }

    pub fn update(&mut self, dt: Duration) {
        if self.camera_controller.is_active() {
            let viewport = (self.size.width, self.size.height);
            self.camera_controller
                .update_camera(&mut self.scene.camera, dt, viewport);
        }

        self.camera_uniform
            .update_view_proj(&self.scene.camera, &self.projection, &self.bounds);
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );

        self.light_uniform.follow(&self.scene.camera);
        self.queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::cast_slice(&[self.light_uniform]),
        );
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        crate::lib_render::render(self)
    }
}

/// Initialize GPU context (surface, adapter, device, queue, config)
async fn init_gpu_context<'w>(
    window: &'w Window,
    size: winit::dpi::PhysicalSize<u32>,
    vsync: bool,
) -> anyhow::Result<(
    wgpu::Surface<'w>,
    wgpu::Adapter,
    wgpu::Device,
    wgpu::Queue,
    wgpu::SurfaceConfiguration,
)> {
    // The instance is a handle to our GPU
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });

    let surface = instance
        .create_surface(window)
        .context("failed to create a rendering surface for the window")?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .context("no GPU adapter can present to this window")?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await
        .context("failed to open the GPU device")?;

    let surface_caps = surface.get_capabilities(&adapter);
    // Colors are given in display space, so prefer a non-sRGB target
    let surface_format = surface_caps
        .formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| surface_caps.formats.first().copied())
        .context("surface reports no texture formats")?;
    let alpha_mode = surface_caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        },
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };

    Ok((surface, adapter, device, queue, config))
}

fn supported_sample_count(adapter: &wgpu::Adapter, format: wgpu::TextureFormat, requested: u32) -> u32 {
    if requested <= 1 {
        return 1;
    }
    let color = adapter.get_texture_format_features(format).flags;
    let depth = adapter.get_texture_format_features(DEPTH_FORMAT).flags;
    if color.sample_count_supported(requested) && depth.sample_count_supported(requested) {
        requested
    } else {
        log::warn!("{}x MSAA not supported for {:?}; rendering without it", requested, format);
        1
    }
}

/// Camera at binding 0 and headlight at binding 1 of group 0
fn init_camera_and_light(
    device: &wgpu::Device,
    camera_uniform: &CameraUniform,
    light_uniform: &LightUniform,
) -> (wgpu::Buffer, wgpu::Buffer, wgpu::BindGroup, wgpu::BindGroupLayout) {
    let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Camera Buffer"),
        contents: bytemuck::cast_slice(&[*camera_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[*light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };

    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_entry(0), uniform_entry(1)],
        label: Some("camera_bind_group_layout"),
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: light_buffer.as_entire_binding(),
            },
        ],
        label: Some("camera_bind_group"),
    });

    (camera_buffer, light_buffer, bind_group, layout)
}

fn create_material_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("material_bind_group_layout"),
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> wgpu::TextureView {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: surface_extent(config),
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_multisample_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> Option<wgpu::TextureView> {
    if sample_count <= 1 {
        return None;
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("multisample_texture"),
        size: surface_extent(config),
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: config.format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
}

fn surface_extent(config: &wgpu::SurfaceConfiguration) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: config.width.max(1),
        height: config.height.max(1),
        depth_or_array_layers: 1,
    }
}

/// One pipeline culls back faces, the other draws both sides.
fn init_pipelines(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    sample_count: u32,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    material_bind_group_layout: &wgpu::BindGroupLayout,
) -> (wgpu::RenderPipeline, wgpu::RenderPipeline) {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Actor Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout, material_bind_group_layout],
        push_constant_ranges: &[],
    });

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Actor Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/actor.wgsl").into()),
    });

    let culled = create_actor_pipeline(device, &layout, &shader, format, sample_count, Some(wgpu::Face::Back));
    let two_sided = create_actor_pipeline(device, &layout, &shader, format, sample_count, None);
    (culled, two_sided)
}

fn create_actor_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    sample_count: u32,
    cull_mode: Option<wgpu::Face>,
) -> wgpu::RenderPipeline {
    let label = if cull_mode.is_some() {
        "Culled Actor Pipeline"
    } else {
        "Two-Sided Actor Pipeline"
    };
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[ModelVertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
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
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}
