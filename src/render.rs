//! The boundary between the tableau and whatever draws it.
//!
//! Every tick the [`FrameDriver`](crate::flow::FrameDriver) assembles a
//! [`Frame`] that borrows the current scene graph, camera and particle field,
//! and hands it to a [`RenderBackend`]. The backend owns all GPU state; the
//! frame only describes what should be on screen.

use crate::{
    camera::{Camera, CameraUniform, Projection},
    data_structures::{
        instance::{InstanceRaw, Transform},
        particle::ParticleField,
        scene_graph::{SceneGraph, SceneObject, srgb_to_linear},
    },
    pipelines::light::LightUniform,
};

/// Everything a backend needs to draw one tick.
pub struct Frame<'a> {
    pub camera: &'a Camera,
    pub projection: &'a Projection,
    pub scene: &'a SceneGraph,
    pub particles: &'a ParticleField,
    /// Edge length of a particle cube.
    pub particle_size: f32,
    pub light: LightUniform,
    pub clear_colour: wgpu::Color,
}

impl Frame<'_> {
    pub fn camera_uniform(&self) -> CameraUniform {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(self.camera, self.projection);
        uniform
    }

    /// Instance data of a single placed object.
    pub fn object_instance(object: &SceneObject) -> InstanceRaw {
        object.transform().to_raw(object.material())
    }

    /// One unlit instance per particle, all sharing the field tint.
    pub fn particle_instances(&self) -> Vec<InstanceRaw> {
        let [r, g, b] = self.particles.tint().map(srgb_to_linear);
        let size = self.particle_size;
        self.particles
            .particles()
            .iter()
            .map(|particle| {
                let transform = Transform {
                    position: particle.display_position(),
                    scale: cgmath::Vector3::new(size, size, size),
                    ..Default::default()
                };
                InstanceRaw {
                    model: transform.to_matrix().into(),
                    normal: transform.normal_matrix().into(),
                    color: [r, g, b, 1.0],
                    surface: [0.0, 1.0, 1.0],
                }
            })
            .collect()
    }
}

/// Draws frames. Implemented by the wgpu backend and by test doubles.
pub trait RenderBackend {
    fn render(&mut self, frame: &Frame<'_>) -> anyhow::Result<()>;

    /// New viewport size in physical pixels. Zero sizes may be ignored.
    fn resize(&mut self, width: u32, height: u32);
}
