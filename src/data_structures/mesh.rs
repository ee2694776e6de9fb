//! Raw mesh geometry as delivered by a loader, before any transform is applied.

use cgmath::{InnerSpace, Vector3, Zero};

use crate::error::{Result, TableauError};

/// Raw triangle geometry.
///
/// Positions and normals are stored per vertex, `indices` refers to them in
/// triangle-list order. Normals may be empty when the source format did not
/// carry any; call [`MeshResource::ensure_normals`] before uploading.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshResource {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

/// Axis aligned bounds of a mesh in its own coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingInfo {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
    pub center: Vector3<f32>,
    pub size: Vector3<f32>,
}

impl BoundingInfo {
    /// Largest edge of the box.
    pub fn max_extent(&self) -> f32 {
        self.size.x.max(self.size.y).max(self.size.z)
    }
}

impl MeshResource {
    pub fn new(name: impl Into<String>, positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            positions,
            normals: Vec::new(),
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Computes the bounding box over all vertices.
    pub fn bounding_info(&self) -> Result<BoundingInfo> {
        let mut positions = self.positions.iter();
        let first = positions.next().ok_or_else(|| {
            TableauError::invalid_geometry(format!("mesh '{}' has no vertices", self.name))
        })?;
        let mut min = Vector3::from(*first);
        let mut max = min;
        for p in positions {
            min.x = min.x.min(p[0]);
            min.y = min.y.min(p[1]);
            min.z = min.z.min(p[2]);
            max.x = max.x.max(p[0]);
            max.y = max.y.max(p[1]);
            max.z = max.z.max(p[2]);
        }
        let finite = [min.x, min.y, min.z, max.x, max.y, max.z]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(TableauError::invalid_geometry(format!(
                "mesh '{}' contains non-finite coordinates",
                self.name
            )));
        }
        Ok(BoundingInfo {
            min,
            max,
            center: (min + max) * 0.5,
            size: max - min,
        })
    }

    /// Fills in smooth per-vertex normals when the mesh came without them.
    ///
    /// Face normals are accumulated area-weighted on each vertex of the
    /// triangle and normalised afterwards.
    pub fn ensure_normals(&mut self) {
        if self.normals.len() == self.positions.len() {
            return;
        }
        let mut normals = vec![Vector3::<f32>::zero(); self.positions.len()];
        for c in self.indices.chunks_exact(3) {
            let (a, b, d) = (c[0] as usize, c[1] as usize, c[2] as usize);
            let (Some(p0), Some(p1), Some(p2)) = (
                self.positions.get(a),
                self.positions.get(b),
                self.positions.get(d),
            ) else {
                log::warn!("Mesh '{}' references a vertex out of range", self.name);
                continue;
            };
            let p0 = Vector3::from(*p0);
            let face = (Vector3::from(*p1) - p0).cross(Vector3::from(*p2) - p0);
            normals[a] += face;
            normals[b] += face;
            normals[d] += face;
        }
        self.normals = normals
            .into_iter()
            .map(|n| {
                if n.magnitude2() > f32::EPSILON {
                    n.normalize().into()
                } else {
                    [0.0, 1.0, 0.0]
                }
            })
            .collect();
    }

    /// Axis aligned box centred on the origin with flat-shaded faces.
    pub fn cuboid(name: impl Into<String>, width: f32, height: f32, depth: f32) -> Self {
        let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);
        // (normal, u axis, v axis) for each face, wound counter-clockwise.
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        let half = Vector3::new(hx, hy, hz);
        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (n, u, v) in faces {
            let (n, u, v) = (Vector3::from(n), Vector3::from(u), Vector3::from(v));
            let base = positions.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let corner = n + u * su + v * sv;
                positions.push([corner.x * half.x, corner.y * half.y, corner.z * half.z]);
                normals.push(n.into());
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self {
            name: name.into(),
            positions,
            normals,
            indices,
        }
    }
}
