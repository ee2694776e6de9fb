//! Uniform scaling and centring of freshly loaded meshes.
//!
//! Source models come in wildly different units. Every loaded mesh is scaled
//! so that its largest bounding box edge becomes [`TARGET_SIZE`], which gives
//! all plated objects a comparable footprint on the table.

use cgmath::Vector3;

use crate::{
    data_structures::mesh::{BoundingInfo, MeshResource},
    error::{Result, TableauError},
};

/// Edge length of the largest bounding box side after normalisation.
pub const TARGET_SIZE: f32 = 2.0;

/// Result of normalising one mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalization {
    pub scale_factor: f32,
    /// Translation that moves the scaled bounding box centre to the origin.
    pub center_offset: Vector3<f32>,
    pub bounds: BoundingInfo,
}

pub fn normalize(mesh: &MeshResource) -> Result<Normalization> {
    let bounds = mesh.bounding_info()?;
    let max_extent = bounds.max_extent();
    if !(max_extent > 0.0) {
        return Err(TableauError::invalid_geometry(format!(
            "mesh '{}' has zero extent on every axis",
            mesh.name
        )));
    }
    let scale_factor = TARGET_SIZE / max_extent;
    if !scale_factor.is_finite() {
        return Err(TableauError::invalid_geometry(format!(
            "mesh '{}' is too small to scale (extent {})",
            mesh.name, max_extent
        )));
    }
    Ok(Normalization {
        scale_factor,
        center_offset: -bounds.center * scale_factor,
        bounds,
    })
}
