//! Orbiting camera, projection and the uniform both are packed into.

use cgmath::{Deg, EuclideanSpace, Matrix4, Point3, Rad, Vector3, perspective};

use crate::{config::CameraConfig, params::CameraSpin};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A camera that always looks at `target`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Camera {
    pub fn new(position: impl Into<Point3<f32>>) -> Self {
        Self {
            position: position.into(),
            target: Point3::origin(),
        }
    }

    /// Moves the camera onto its circular orbit around the target for `now_millis`.
    pub fn orbit(&mut self, now_millis: f64, spin: &CameraSpin, height: f32) {
        let angle = spin.angle(now_millis);
        let distance = spin.distance as f64;
        self.position = Point3::new(
            (angle.cos() * distance) as f32,
            height,
            (angle.sin() * distance) as f32,
        );
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, Vector3::unit_y())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, config: &CameraConfig) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: Deg(config.fovy).into(),
            znear: config.znear,
            zfar: config.zfar,
        }
    }

    /// Zero sized viewports (minimised windows) keep the previous aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}
