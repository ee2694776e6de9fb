//! Scene graph of placed objects.
//!
//! The scene graph is a flat, insertion-ordered collection of [`SceneObject`]s.
//! Membership is keyed by [`ObjectKey`]: fixtures such as the table use a
//! static name, loaded objects use the manifest slot they were issued for.
//! Objects are immutable once added; the only mutations are `add` and `remove`.

use crate::{
    data_structures::{instance::Transform, mesh::MeshResource},
    resources::normalize::Normalization,
};

/// Surface description used by the lit pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// sRGB colour as `0xRRGGBB`.
    pub color: u32,
    pub metalness: f32,
    pub roughness: f32,
}

impl Material {
    pub const fn new(color: u32, metalness: f32, roughness: f32) -> Self {
        Self {
            color,
            metalness,
            roughness,
        }
    }

    /// Colour converted to linear space with full opacity.
    pub fn linear_rgba(&self) -> [f32; 4] {
        let [r, g, b] = hex_to_linear(self.color);
        [r, g, b, 1.0]
    }
}

/// Converts an sRGB `0xRRGGBB` value to linear floating point channels.
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Identity of an object in the scene graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKey {
    /// Procedural geometry that is part of the scene from the start.
    Fixture(&'static str),
    /// An object produced by the manifest slot with this index.
    Slot(usize),
}

/// A mesh with its material and final transform.
#[derive(Clone, Debug)]
pub struct SceneObject {
    id: u64,
    key: ObjectKey,
    geometry: MeshResource,
    material: Material,
    transform: Transform,
    normalization: Option<Normalization>,
}

impl SceneObject {
    pub fn new(
        key: ObjectKey,
        geometry: MeshResource,
        material: Material,
        transform: Transform,
    ) -> Self {
        Self {
            id: 0,
            key,
            geometry,
            material,
            transform,
            normalization: None,
        }
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = Some(normalization);
        self
    }

    /// Unique id assigned by the scene graph when the object was added.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    pub fn geometry(&self) -> &MeshResource {
        &self.geometry
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Scale and centring derived for loaded objects; `None` for fixtures.
    pub fn normalization(&self) -> Option<&Normalization> {
        self.normalization.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: Vec<SceneObject>,
    next_id: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `object` and returns the id assigned to it.
    ///
    /// An object already registered under the same key is replaced.
    pub fn add(&mut self, mut object: SceneObject) -> u64 {
        self.next_id += 1;
        object.id = self.next_id;
        let id = object.id;
        if let Some(existing) = self.objects.iter_mut().find(|o| o.key == object.key) {
            log::warn!("Replacing scene object registered as {:?}", object.key);
            *existing = object;
        } else {
            self.objects.push(object);
        }
        id
    }

    pub fn remove(&mut self, key: &ObjectKey) -> Option<SceneObject> {
        let idx = self.objects.iter().position(|o| &o.key == key)?;
        Some(self.objects.remove(idx))
    }

    pub fn get(&self, key: &ObjectKey) -> Option<&SceneObject> {
        self.objects.iter().find(|o| &o.key == key)
    }

    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}
