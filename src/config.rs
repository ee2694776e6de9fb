//! Settings that are fixed for the lifetime of a session.

use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub clear_colour: wgpu::Color,
    /// Directory the mesh loader resolves manifest paths against.
    pub assets_root: PathBuf,
    pub camera: CameraConfig,
    /// sRGB `0xRRGGBB`.
    pub spot_colour: u32,
    pub ambient_colour: u32,
    pub ambient_intensity: f32,
    /// Seed for particle sampling; `None` seeds from the OS.
    pub particle_seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
    /// The orbit runs in the horizontal plane at this height.
    pub height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy: 75.0,
            znear: 0.1,
            zfar: 10000.0,
            height: 3.0,
        }
    }
}

/// The build script's copy of `assets/` natively, the page-relative `assets/` on the web.
fn default_assets_root() -> PathBuf {
    #[cfg(not(target_arch = "wasm32"))]
    {
        PathBuf::from(env!("TABLEAU_ASSETS_DIR"))
    }
    #[cfg(target_arch = "wasm32")]
    {
        PathBuf::from("assets")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // 0xeeeeee
            clear_colour: wgpu::Color {
                r: 0.855,
                g: 0.855,
                b: 0.855,
                a: 1.0,
            },
            assets_root: default_assets_root(),
            camera: CameraConfig::default(),
            spot_colour: 0xe09322,
            ambient_colour: 0x36354d,
            ambient_intensity: 2.0,
            particle_seed: None,
        }
    }
}
