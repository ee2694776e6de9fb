use cgmath::InnerSpace;
use wgpu::util::DeviceExt;

use crate::{config::Config, data_structures::scene_graph::hex_to_linear, params::LightParams};

/// Spotlight aimed at the origin plus a flat ambient term.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub intensity: f32,
    pub direction: [f32; 3],
    /// Cosine of the cone half angle.
    pub cos_outer: f32,
    pub color: [f32; 3],
    /// Cosine of the angle where the penumbra fade starts.
    pub cos_inner: f32,
    /// Ambient colour premultiplied by its intensity, `w` unused.
    pub ambient: [f32; 4],
}

impl LightUniform {
    pub fn new(light: &LightParams, config: &Config) -> Self {
        let to_target = -light.position;
        let direction = if to_target.magnitude2() > f32::EPSILON {
            to_target.normalize()
        } else {
            cgmath::Vector3::new(0.0, -1.0, 0.0)
        };
        let [ar, ag, ab] = hex_to_linear(config.ambient_colour);
        let ai = config.ambient_intensity;
        Self {
            position: light.position.into(),
            intensity: light.intensity,
            direction: direction.into(),
            cos_outer: light.angle.cos(),
            color: hex_to_linear(config.spot_colour),
            cos_inner: (light.angle * (1.0 - light.penumbra)).cos(),
            ambient: [ar * ai, ag * ai, ab * ai, 0.0],
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
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
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}
