// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Neighbouring zones agree on their shared faces

use ahash::AHashMap;
use nalgebra::Point3;
use std::collections::BTreeSet;
use tetmir::analytics::{is_closed_surface, material_surface, vertices_on_plane};
use tetmir::geometry::{low_tets_for_hex, low_tris};
use tetmir::synthetic;
use tetmir::{
    reconstruct, CellType, MaterialVolumeFractions, MirOptions, ReconstructedMesh,
    SubdivisionLevel,
};

/// Vertices on the plane `axis = value` seen from the zones below and above it
fn plane_sides(
    out: &ReconstructedMesh,
    n: usize,
    axis: usize,
    value: usize,
) -> (BTreeSet<usize>, BTreeSet<usize>) {
    // Grid index of an input zone along an axis (x fastest)
    let along = move |zone: usize| match axis {
        0 => zone % n,
        1 => (zone / n) % n,
        _ => zone / (n * n),
    };
    let below = vertices_on_plane(out, axis, value as f64, 1e-9, |z| {
        along(z.orig_zone) + 1 == value
    });
    let above = vertices_on_plane(out, axis, value as f64, 1e-9, |z| along(z.orig_zone) == value);
    (below, above)
}

#[test]
fn test_shared_faces_have_matching_vertices() {
    let n = 4;
    let mesh = synthetic::hex_grid(n, n, n, 1.0);
    let materials =
        synthetic::sphere_fractions(&mesh, Point3::new(2.0, 2.0, 2.0), 1.3, 3);

    // Whole clean zones only conform at the level without face centres
    let configurations = SubdivisionLevel::ALL
        .into_iter()
        .map(|level| (level, false))
        .chain([(SubdivisionLevel::Low, true)]);
    for (level, leave_whole) in configurations {
        let options = MirOptions::default()
            .with_level(level)
            .with_leave_clean_zones_whole(leave_whole);
        let out = reconstruct(&mesh, &materials, &options).unwrap();
        for axis in 0..3 {
            for value in 1..n {
                let (below, above) = plane_sides(&out, n, axis, value);
                assert!(below.len() >= (n + 1) * (n + 1));
                assert_eq!(
                    below, above,
                    "level {} whole {} axis {} plane {}",
                    level, leave_whole, axis, value
                );
            }
        }
    }
}

#[test]
fn test_interface_between_slabs_is_shared() {
    // A | mixed | mixed | B along x
    let mesh = synthetic::hex_grid(4, 1, 1, 1.0);
    let materials = MaterialVolumeFractions::from_rows(
        2,
        &[
            vec![1.0, 0.0],
            vec![0.7, 0.3],
            vec![0.4, 0.6],
            vec![0.0, 1.0],
        ],
    )
    .unwrap();
    let out = reconstruct(&mesh, &materials, &MirOptions::default()).unwrap();

    for plane in 1..4 {
        let left = vertices_on_plane(&out, 0, plane as f64, 1e-9, |z| z.orig_zone + 1 == plane);
        let right = vertices_on_plane(&out, 0, plane as f64, 1e-9, |z| z.orig_zone == plane);
        assert_eq!(left, right);
        assert_eq!(left.len(), 4);
    }
}

#[test]
fn test_clean_block_surface_is_closed() {
    let mesh = synthetic::hex_grid(3, 2, 2, 1.0);
    let materials = MaterialVolumeFractions::from_clean(1, &[0; 12]).unwrap();
    let out = reconstruct(&mesh, &materials, &MirOptions::default()).unwrap();
    let surface = material_surface(&out, 0);
    assert_eq!(surface.len(), 2 * 2 * (3 * 2 + 3 * 2 + 2 * 2));
    assert!(is_closed_surface(&surface));
}

#[test]
fn test_hex_splits_agree_across_shared_faces() {
    // Every interior triangle of a tetrahedralized block is shared by exactly two tetrahedra
    let mesh = synthetic::tet_grid(3, 3, 3, 1.0);
    let mut faces: AHashMap<[usize; 3], usize> = AHashMap::new();
    for cell in mesh.cells() {
        for face in CellType::Tetra.faces() {
            let mut key = [cell.nodes[face[0]], cell.nodes[face[1]], cell.nodes[face[2]]];
            key.sort_unstable();
            *faces.entry(key).or_insert(0) += 1;
        }
    }
    let boundary = faces.values().filter(|&&count| count == 1).count();
    assert!(faces.values().all(|&count| count <= 2));
    // 6 sides x 9 quads x 2 triangles
    assert_eq!(boundary, 108);
}

#[test]
fn test_hex_split_is_independent_of_local_numbering() {
    // Rotating a hexahedron's local numbering must not change its tetrahedra
    let ids = [10, 14, 11, 12, 17, 13, 15, 16];
    let canonical = tets_as_sets(&ids, &low_tets_for_hex(&ids));

    let rotations: [[usize; 8]; 3] = [
        [1, 2, 3, 0, 5, 6, 7, 4],
        [4, 7, 6, 5, 0, 3, 2, 1],
        [3, 2, 6, 7, 0, 1, 5, 4],
    ];
    for rotation in rotations {
        let rotated: Vec<usize> = rotation.iter().map(|&l| ids[l]).collect();
        let tets = low_tets_for_hex(&rotated);
        assert_eq!(tets_as_sets(&rotated, &tets), canonical);
    }
}

#[test]
fn test_quad_split_is_independent_of_local_numbering() {
    let ids = [7, 3, 9, 5];
    let canonical = tris_as_sets(&ids);
    for shift in 1..4 {
        let rotated: Vec<usize> = (0..4).map(|k| ids[(k + shift) % 4]).collect();
        assert_eq!(tris_as_sets(&rotated), canonical);
    }
}

fn tets_as_sets(ids: &[usize], tets: &[[usize; 4]]) -> BTreeSet<[usize; 4]> {
    tets.iter()
        .map(|tet| {
            let mut global = tet.map(|local| ids[local]);
            global.sort_unstable();
            global
        })
        .collect()
}

fn tris_as_sets(ids: &[usize]) -> BTreeSet<[usize; 3]> {
    low_tris(CellType::Quad, ids)
        .unwrap()
        .iter()
        .map(|tri| {
            let mut global = tri.map(|local| ids[local]);
            global.sort_unstable();
            global
        })
        .collect()
}
