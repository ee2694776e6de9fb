//! Engine data structures: meshes, transforms, the scene graph and the particle field.
//!
//! - `mesh` holds raw loader output and its bounding box
//! - `instance` holds per-object transforms and their GPU layout
//! - `scene_graph` owns the placed objects and their materials
//! - `particle` is the animated particle field

pub mod instance;
pub mod mesh;
pub mod particle;
pub mod scene_graph;
