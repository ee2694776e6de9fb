//! tableau
//!
//! A small real-time scene: a table with a set of independently loaded,
//! normalised models on it, a spotlight, an orbiting camera and a field of
//! drifting particles, all tunable while it runs. Rendering goes through
//! wgpu; the same code runs natively and in the browser.
//!
//! High-level modules
//! - `camera`: orbiting camera, projection and their uniform
//! - `config`: settings fixed for a session
//! - `context`: the application state passed to everything else
//! - `data_structures`: meshes, transforms, scene graph and particle field
//! - `error`: domain error taxonomy
//! - `flow`: frame driver and the winit event loop
//! - `gpu`: the wgpu render backend
//! - `params`: live parameters and their ranges
//! - `pipelines`: render pipeline and light uniform
//! - `render`: the frame handed to a render backend each tick
//! - `resources`: mesh loading, normalisation, placement and load coordination
//! - `scene`: the default tableau
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod gpu;
pub mod params;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

pub use error::{Result, TableauError};
