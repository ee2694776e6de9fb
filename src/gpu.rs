//! The wgpu implementation of [`RenderBackend`].
//!
//! Owns the surface, device and queue plus one set of buffers per placed
//! object. Object buffers are keyed by the scene graph id and dropped as soon
//! as the object leaves the scene. The particle instance buffer is recreated
//! whenever the field was rebuilt, so a stale particle count is never drawn.

use std::{
    collections::{HashMap, HashSet},
    iter,
    sync::Arc,
};

use anyhow::Context as _;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::CameraUniform,
    data_structures::{mesh::MeshResource, scene_graph::SceneObject},
    pipelines::{
        basic::{self, MeshVertex},
        light::{self, LightUniform},
    },
    render::{Frame, RenderBackend},
};

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    num_indices: u32,
}

impl MeshBuffers {
    fn new(device: &wgpu::Device, mesh: &MeshResource) -> Self {
        let vertices: Vec<MeshVertex> = mesh
            .positions
            .iter()
            .enumerate()
            .map(|(i, position)| MeshVertex {
                position: *position,
                normal: mesh.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect();
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            num_indices: mesh.indices.len() as u32,
        }
    }
}

struct ObjectBuffers {
    mesh: MeshBuffers,
    instance: wgpu::Buffer,
}

impl ObjectBuffers {
    fn new(device: &wgpu::Device, object: &SceneObject) -> Self {
        let instance = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object Instance Buffer"),
            contents: bytemuck::cast_slice(&[Frame::object_instance(object)]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            mesh: MeshBuffers::new(device, object.geometry()),
            instance,
        }
    }
}

/// Instance buffer sized for one particle field generation.
struct ParticleBuffer {
    instance: Option<wgpu::Buffer>,
    generation: u64,
    count: u32,
}

pub struct GpuBackend {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    is_surface_configured: bool,
    depth_texture: (wgpu::Texture, wgpu::TextureView),
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    light_buffer: wgpu::Buffer,
    light_bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    objects: HashMap<u64, ObjectBuffers>,
    cube: MeshBuffers,
    particles: Option<ParticleBuffer>,
}

impl GpuBackend {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("creating the window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("requesting the GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colour and relies on an sRGB surface for the conversion.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface supports no texture format")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera_bind_group_layout"),
            });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let light_buffer = light::mk_buffer(&device, LightUniform::default());
        let light_bind_group_layout = light::mk_bind_group_layout(&device);
        let light_bind_group =
            light::mk_bind_group(&device, &light_bind_group_layout, &light_buffer);

        let pipeline = basic::mk_basic_pipeline(
            &device,
            &config,
            &camera_bind_group_layout,
            &light_bind_group_layout,
        );
        let depth_texture =
            basic::create_depth_texture(&device, [config.width, config.height], "depth_texture");
        let cube = MeshBuffers::new(&device, &MeshResource::cuboid("particle", 1.0, 1.0, 1.0));

        let mut backend = Self {
            window,
            surface,
            device,
            queue,
            config,
            is_surface_configured: false,
            depth_texture,
            camera_buffer,
            camera_bind_group,
            light_buffer,
            light_bind_group,
            pipeline,
            objects: HashMap::new(),
            cube,
            particles: None,
        };
        backend.resize(size.width, size.height);
        Ok(backend)
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Uploads new objects, refreshes instance data and drops buffers of removed objects.
    fn sync_objects(&mut self, frame: &Frame<'_>) {
        let live: HashSet<u64> = frame.scene.iter().map(|o| o.id()).collect();
        self.objects.retain(|id, _| live.contains(id));
        for object in frame.scene.iter() {
            if object.geometry().indices.is_empty() {
                continue;
            }
            let buffers = self
                .objects
                .entry(object.id())
                .or_insert_with(|| ObjectBuffers::new(&self.device, object));
            self.queue.write_buffer(
                &buffers.instance,
                0,
                bytemuck::cast_slice(&[Frame::object_instance(object)]),
            );
        }
    }

    fn sync_particles(&mut self, frame: &Frame<'_>) {
        let instances = frame.particle_instances();
        let generation = frame.particles.generation();
        let stale = self
            .particles
            .as_ref()
            .is_none_or(|buffer| buffer.generation != generation);
        if stale {
            let instance = (!instances.is_empty()).then(|| {
                self.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Particle Instance Buffer"),
                        contents: bytemuck::cast_slice(&instances),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    })
            });
            self.particles = Some(ParticleBuffer {
                instance,
                generation,
                count: instances.len() as u32,
            });
        } else if let Some(ParticleBuffer {
            instance: Some(instance),
            ..
        }) = &self.particles
        {
            self.queue
                .write_buffer(instance, 0, bytemuck::cast_slice(&instances));
        }
    }
}

impl RenderBackend for GpuBackend {
    fn render(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[frame.camera_uniform()]),
        );
        self.queue
            .write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(&[frame.light]));
        self.sync_objects(frame);
        self.sync_particles(frame);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.window.inner_size();
                self.resize(size.width, size.height);
                return Ok(());
            }
            Err(e) => return Err(e).context("acquiring the next surface texture"),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.1,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_bind_group(1, &self.light_bind_group, &[]);

            for buffers in self.objects.values() {
                render_pass.set_vertex_buffer(0, buffers.mesh.vertex.slice(..));
                render_pass.set_vertex_buffer(1, buffers.instance.slice(..));
                render_pass.set_index_buffer(buffers.mesh.index.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..buffers.mesh.num_indices, 0, 0..1);
            }

            if let Some(ParticleBuffer {
                instance: Some(instance),
                count,
                ..
            }) = &self.particles
            {
                render_pass.set_vertex_buffer(0, self.cube.vertex.slice(..));
                render_pass.set_vertex_buffer(1, instance.slice(..));
                render_pass.set_index_buffer(self.cube.index.slice(..), wgpu::IndexFormat::Uint32);
                let live = (*count).min(frame.particles.count() as u32);
                render_pass.draw_indexed(0..self.cube.num_indices, 0, 0..live);
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.is_surface_configured = true;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture =
                basic::create_depth_texture(&self.device, [width, height], "depth_texture");
        }
    }
}
