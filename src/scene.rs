//! The default tableau: a table, three mooncakes around a tall one, a
//! leaning cake and the plate underneath them.

use cgmath::Vector3;

use crate::{
    data_structures::{
        instance::Transform,
        mesh::MeshResource,
        scene_graph::{Material, ObjectKey, SceneObject},
    },
    resources::{
        coordinator::ManifestEntry,
        placement::{PlacementSpec, PlacementTable},
    },
};

pub const TABLE_KEY: ObjectKey = ObjectKey::Fixture("table");

const TABLE_MATERIAL: Material = Material::new(0x7a3d00, 0.0, 0.8);
const MOONCAKE: Material = Material::new(0xa86002, 0.005, 0.5);
const TALL_MOONCAKE: Material = Material::new(0xeaa221, 0.005, 0.5);
const PLATE: Material = Material::new(0xffffff, 0.3, 0.2);

/// Mooncakes sit on a circle of this radius around the tall one.
const RING_RADIUS: f32 = 1.2;

pub fn default_manifest() -> Vec<ManifestEntry> {
    vec![
        ManifestEntry::new("mooncake.obj", "mooncake_0", MOONCAKE),
        ManifestEntry::new("mooncake.obj", "mooncake_1", MOONCAKE),
        ManifestEntry::new("mooncake.obj", "mooncake_2", MOONCAKE),
        ManifestEntry::new("mooncake_tall.obj", "mooncake_tall", TALL_MOONCAKE),
        ManifestEntry::new("mooncake_tall.obj", "mooncake_leaning", TALL_MOONCAKE),
        ManifestEntry::new("plate.obj", "plate", PLATE),
    ]
}

pub fn default_placements() -> PlacementTable {
    let half = RING_RADIUS / 2.0;
    let h = half * 3f32.sqrt();
    PlacementTable::new()
        .with(
            "mooncake_0",
            PlacementSpec::new([RING_RADIUS, 0.25, 0.0]).rotated_deg(-90.0, 0.0, 240.0),
        )
        .with(
            "mooncake_1",
            PlacementSpec::new([-half, 0.25, h]).rotated_deg(-90.0, 0.0, 120.0),
        )
        .with(
            "mooncake_2",
            PlacementSpec::new([-half, 0.25, -h]).rotated_deg(-90.0, 0.0, 0.0),
        )
        .with(
            "mooncake_tall",
            PlacementSpec::new([0.0, 0.75, 0.0]).rotated_deg(-90.0, 0.0, 0.0),
        )
        .with(
            "mooncake_leaning",
            PlacementSpec::new([2.5, 0.1, 2.5]).rotated_deg(-80.0, 6.0, 170.0),
        )
        .with(
            "plate",
            PlacementSpec::new([0.0, -0.02, 0.0])
                .rotated_deg(-90.0, 0.0, 0.0)
                .scaled([0.08, 0.08, 0.027]),
        )
}

/// The table top. Its upper face is the `y = 0` plane.
pub fn table() -> SceneObject {
    SceneObject::new(
        TABLE_KEY,
        MeshResource::cuboid("table", 10.0, 0.5, 10.0),
        TABLE_MATERIAL,
        Transform::from(Vector3::new(0.0, -0.25, 0.0)),
    )
}
