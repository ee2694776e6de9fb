//! Object transforms and their GPU instance representation.
//!
//! A [`Transform`] is the CPU-side position/rotation/scale of one scene object
//! or particle. Before drawing it is packed into an [`InstanceRaw`] together
//! with the material so many copies of a mesh go out in one instanced draw.

use cgmath::{Matrix3, One, Rad, SquareMatrix, Vector3};

use crate::{data_structures::scene_graph::Material, pipelines::basic::Vertex};

/// Position, rotation (as quaternion) and scale of a single object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Builds a transform from Euler angles in radians applied in X, Y, Z order
    /// (the rotation matrix is `Rx * Ry * Rz`).
    pub fn from_euler(position: Vector3<f32>, euler: Vector3<f32>, scale: Vector3<f32>) -> Self {
        Self {
            position,
            rotation: euler_to_quaternion(euler),
            scale,
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Rotation combined with the inverse scale, so normals survive non-uniform scaling.
    pub fn normal_matrix(&self) -> Matrix3<f32> {
        let inv = |s: f32| if s.abs() > f32::EPSILON { 1.0 / s } else { 0.0 };
        Matrix3::from(self.rotation)
            * Matrix3::from_diagonal(Vector3::new(
                inv(self.scale.x),
                inv(self.scale.y),
                inv(self.scale.z),
            ))
    }

    pub fn to_raw(&self, material: &Material) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
            normal: self.normal_matrix().into(),
            color: material.linear_rgba(),
            surface: [material.metalness, material.roughness, 0.0],
        }
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

pub fn euler_to_quaternion(euler: Vector3<f32>) -> cgmath::Quaternion<f32> {
    use cgmath::Rotation3;
    cgmath::Quaternion::from_angle_x(Rad(euler.x))
        * cgmath::Quaternion::from_angle_y(Rad(euler.y))
        * cgmath::Quaternion::from_angle_z(Rad(euler.z))
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 3]; 3],
    pub color: [f32; 4],
    /// metalness, roughness, emissive (1.0 skips lighting)
    pub surface: [f32; 3],
}

impl InstanceRaw {
    /// Model matrix as four vec4s, normal matrix as three vec3s, then colour
    /// and the metalness/roughness/emissive triple.
    const ATTRIBUTES: [wgpu::VertexAttribute; 9] = wgpu::vertex_attr_array![
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
        9 => Float32x3,
        10 => Float32x3,
        11 => Float32x3,
        12 => Float32x4,
        13 => Float32x3,
    ];
}

impl Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Shaders only advance to the next element when a new instance starts
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
