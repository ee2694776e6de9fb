//! Authored placements for loaded objects.
//!
//! A placement is the final word on where an object sits: once a mesh is
//! normalised, its position and rotation come from here. The table is built
//! once at startup and only read afterwards.

use std::collections::HashMap;

use cgmath::{Deg, Rad, Vector3};

use crate::{data_structures::instance::Transform, resources::normalize::Normalization};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementSpec {
    pub offset: Vector3<f32>,
    /// Euler angles in radians, applied in X, Y, Z order.
    pub rotation: Vector3<f32>,
    /// Replaces the normalised uniform scale when set.
    pub scale: Option<Vector3<f32>>,
}

impl PlacementSpec {
    pub fn new(offset: impl Into<Vector3<f32>>) -> Self {
        Self {
            offset: offset.into(),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: None,
        }
    }

    /// Sets the rotation from angles given in degrees.
    pub fn rotated_deg(mut self, x: f32, y: f32, z: f32) -> Self {
        let rad = |d: f32| Rad::from(Deg(d)).0;
        self.rotation = Vector3::new(rad(x), rad(y), rad(z));
        self
    }

    pub fn scaled(mut self, scale: impl Into<Vector3<f32>>) -> Self {
        self.scale = Some(scale.into());
        self
    }

    /// Final transform of a normalised object.
    ///
    /// Position and rotation are taken from the placement alone; the centring
    /// offset of the normalisation does not compose with it.
    pub fn resolve(&self, normalization: &Normalization) -> Transform {
        let s = normalization.scale_factor;
        let scale = self.scale.unwrap_or(Vector3::new(s, s, s));
        Transform::from_euler(self.offset, self.rotation, scale)
    }
}

/// Placements keyed by object identity.
#[derive(Clone, Debug, Default)]
pub struct PlacementTable {
    entries: HashMap<String, PlacementSpec>,
}

impl PlacementTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, identity: impl Into<String>, spec: PlacementSpec) -> Self {
        self.insert(identity, spec);
        self
    }

    pub fn insert(&mut self, identity: impl Into<String>, spec: PlacementSpec) {
        let identity = identity.into();
        if self.entries.insert(identity.clone(), spec).is_some() {
            log::warn!("Placement '{}' was defined twice, keeping the last one", identity);
        }
    }

    pub fn get(&self, identity: &str) -> Option<&PlacementSpec> {
        self.entries.get(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
