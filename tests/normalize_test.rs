use tableau::{
    TableauError,
    data_structures::mesh::MeshResource,
    resources::normalize::{TARGET_SIZE, normalize},
};

use crate::common::test_utils::{assert_close, assert_vec_close, box_mesh, point_mesh};

mod common;

#[test]
fn largest_edge_becomes_target_size() {
    let sizes = [
        [1.0, 1.0, 1.0],
        [4.0, 2.0, 1.0],
        [0.01, 0.3, 0.02],
        [120.0, 3.0, 640.0],
        [2.0, 0.0, 5.0],
    ];
    for size in sizes {
        let mesh = box_mesh("box", size, [3.0, -7.0, 0.5]);
        let n = match normalize(&mesh) {
            Ok(n) => n,
            Err(e) => panic!("{:?} should normalise: {}", size, e),
        };
        assert_close(n.scale_factor * n.bounds.max_extent(), TARGET_SIZE);
    }
}

#[test]
fn center_offset_moves_scaled_center_to_origin() {
    let mesh = box_mesh("box", [4.0, 2.0, 1.0], [10.0, 2.0, -6.0]);
    let n = normalize(&mesh).expect("valid box");

    assert_close(n.scale_factor, 0.5);
    assert_vec_close(n.bounds.center, cgmath::Vector3::new(10.0, 2.0, -6.0));
    assert_vec_close(n.center_offset, cgmath::Vector3::new(-5.0, -1.0, 3.0));
}

#[test]
fn zero_extent_mesh_is_invalid_geometry() {
    let err = normalize(&point_mesh("dot")).expect_err("a point has no extent");
    assert!(matches!(err, TableauError::InvalidGeometry { .. }), "{}", err);
}

#[test]
fn empty_mesh_is_invalid_geometry() {
    let mesh = MeshResource::new("empty", Vec::new(), Vec::new());
    let err = normalize(&mesh).expect_err("nothing to measure");
    assert!(matches!(err, TableauError::InvalidGeometry { .. }), "{}", err);
}

#[test]
fn non_finite_coordinates_are_rejected() {
    let mesh = MeshResource::new(
        "broken",
        vec![[0.0, 0.0, 0.0], [f32::NAN, 1.0, 0.0], [1.0, f32::INFINITY, 0.0]],
        vec![0, 1, 2],
    );
    assert!(matches!(
        normalize(&mesh),
        Err(TableauError::InvalidGeometry { .. })
    ));
}
