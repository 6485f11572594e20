// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end reconstruction properties

use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};
use tetmir::analytics::{self, analyze};
use tetmir::mir::ReconstructionMode;
use tetmir::synthetic::{self, RandomFractions};
use tetmir::{
    reconstruct, CellType, MaterialVolumeFractions, MirOptions, Reconstructor, SubdivisionLevel,
    UnstructuredMesh,
};

fn sphere_case(n: usize) -> (UnstructuredMesh, MaterialVolumeFractions) {
    let mesh = synthetic::hex_grid(n, n, n, 1.0);
    let c = n as f64 / 2.0;
    let materials = synthetic::sphere_fractions(&mesh, Point3::new(c, c, c), n as f64 / 3.0, 3);
    (mesh, materials)
}

#[test]
fn test_clean_input_is_returned_unchanged() {
    let mesh = synthetic::hex_grid(3, 2, 2, 0.5);
    let zone_materials: Vec<usize> = (0..mesh.cell_count()).map(|z| z % 3).collect();
    let materials = MaterialVolumeFractions::from_clean(3, &zone_materials).unwrap();

    for level in SubdivisionLevel::ALL {
        let options = MirOptions::default()
            .with_level(level)
            .with_leave_clean_zones_whole(false);
        let out = reconstruct(&mesh, &materials, &options).unwrap();

        assert_eq!(out.stats.mode, ReconstructionMode::AllClean);
        assert_eq!(out.zone_count(), mesh.cell_count());
        assert_eq!(out.points(), mesh.points);
        for zone in 0..mesh.cell_count() {
            assert_eq!(out.zone_nodes(zone), mesh.cell(zone).nodes);
            assert_eq!(out.zones[zone].cell_type, CellType::Hexahedron);
            assert_eq!(out.zones[zone].material, zone_materials[zone]);
            assert_eq!(out.zones[zone].mixed_var_index, None);
        }
    }
}

#[test]
fn test_volume_is_conserved_at_every_level() {
    let (mesh, materials) = sphere_case(4);
    for level in SubdivisionLevel::ALL {
        let out = Reconstructor::new(MirOptions::default().with_level(level))
            .reconstruct(&mesh, &materials)
            .unwrap();
        let stats = analyze(&out);

        assert_eq!(out.stats.mode, ReconstructionMode::Mixed);
        assert_relative_eq!(stats.total_measure, 64.0, epsilon = 1e-6);
        let by_material: f64 = stats.materials.iter().map(|m| m.measure).sum();
        assert_relative_eq!(by_material, 64.0, epsilon = 1e-6);
        assert_eq!(stats.materials.len(), 2);
    }
}

#[test]
fn test_planar_interface_is_reproduced() {
    // x = 1.5 halves the second column; every other column is pure
    let mesh = synthetic::hex_grid(4, 2, 2, 1.0);
    let materials =
        synthetic::plane_fractions(&mesh, Point3::new(1.5, 0.0, 0.0), Vector3::x(), 4);
    assert_relative_eq!(materials.get(1, 0), 0.5);
    let out = reconstruct(&mesh, &materials, &MirOptions::default()).unwrap();

    let measures = analytics::material_measures(&out);
    assert_eq!(measures.len(), 2);
    assert_relative_eq!(measures[0].1, 6.0, epsilon = 1e-9);
    assert_relative_eq!(measures[1].1, 10.0, epsilon = 1e-9);

    // The cut lies on the plane
    let on_plane = analytics::vertices_on_plane(&out, 0, 1.5, 1e-9, |_| true);
    assert!(on_plane.len() >= 9);
    assert!(on_plane.iter().all(|&i| out.coords[i].orig_node.is_none()));
}

#[test]
fn test_weights_are_partitions_of_unity() {
    let (mesh, materials) = sphere_case(4);
    for level in SubdivisionLevel::ALL {
        let options = MirOptions::default().with_level(level);
        let out = reconstruct(&mesh, &materials, &options).unwrap();
        assert!(analytics::weights_are_partitions(&out, 1e-9));
        assert!(out.stats.coordinates > mesh.point_count());

        // Every synthesized point sits where its weights put it
        for coord in out.coords.iter().filter(|c| c.orig_node.is_none()) {
            let corners = mesh.cell_points(coord.orig_zone);
            let expected = coord.weight.apply(&corners);
            assert!((expected - coord.point).norm() < 1e-5);
        }
    }
}

#[test]
fn test_no_degenerate_or_inverted_cells() {
    let (mesh, materials) = sphere_case(5);
    for level in SubdivisionLevel::ALL {
        for smoothing in [false, true] {
            let options = MirOptions::default()
                .with_level(level)
                .with_smoothing(smoothing);
            let out = reconstruct(&mesh, &materials, &options).unwrap();
            let stats = analyze(&out);
            assert_eq!(stats.degenerate_zones, 0);
            assert_eq!(stats.inverted_zones, 0);
        }
    }
}

#[test]
fn test_random_layouts_keep_orientation_and_volume() {
    let meshes = [
        ("tet grid", synthetic::tet_grid(3, 3, 3, 1.0)),
        ("hex grid", synthetic::hex_grid(3, 3, 3, 1.0)),
    ];
    for (name, mesh) in &meshes {
        for material_count in 2..=4 {
            for seed in [2, 27] {
                let materials =
                    RandomFractions::new(seed, material_count).generate(mesh.cell_count(), 0.5);
                for level in SubdivisionLevel::ALL {
                    let options = MirOptions::default()
                        .with_level(level)
                        .with_leave_clean_zones_whole(false);
                    let out = reconstruct(mesh, &materials, &options).unwrap();
                    let stats = analyze(&out);
                    let case = format!(
                        "{} with {} materials, seed {}, level {}",
                        name, material_count, seed, level
                    );
                    assert_eq!(stats.degenerate_zones, 0, "{}", case);
                    assert_eq!(stats.inverted_zones, 0, "{}", case);
                    assert!((stats.total_measure - 27.0).abs() < 1e-6, "{}", case);
                }
            }
        }
    }
}

#[test]
fn test_output_cell_types_by_dimension() {
    let (mesh, materials) = sphere_case(3);
    let out = reconstruct(&mesh, &materials, &MirOptions::default()).unwrap();
    for (cell_type, _) in analytics::cell_type_counts(&out) {
        assert!(matches!(
            cell_type,
            CellType::Tetra | CellType::Wedge | CellType::Hexahedron
        ));
    }

    let mesh = synthetic::quad_grid(6, 6, 1.0);
    let materials = RandomFractions::new(3, 3).generate(mesh.cell_count(), 0.5);
    let out = reconstruct(&mesh, &materials, &MirOptions::default()).unwrap();
    for (cell_type, _) in analytics::cell_type_counts(&out) {
        assert!(matches!(cell_type, CellType::Triangle | CellType::Quad));
    }
    assert_relative_eq!(analyze(&out).total_measure, 36.0, epsilon = 1e-6);
    assert_eq!(analyze(&out).inverted_zones, 0);
}

#[test]
fn test_subdividing_clean_zones_keeps_their_material() {
    let (mesh, materials) = sphere_case(4);
    let options = MirOptions::default().with_leave_clean_zones_whole(false);
    let out = reconstruct(&mesh, &materials, &options).unwrap();

    assert_eq!(out.stats.clean_zones, 0);
    assert!(out.zones.iter().all(|z| z.cell_type != CellType::Hexahedron));
    for zone in &out.zones {
        if let Some(material) = materials.clean_material(zone.orig_zone) {
            assert_eq!(zone.material, material);
        }
    }
}

#[test]
fn test_mixed_variable_indices_follow_the_layout() {
    let mesh = synthetic::quad_grid(3, 1, 1.0);
    let materials = MaterialVolumeFractions::from_rows(
        3,
        &[vec![1.0, 0.0, 0.0], vec![0.2, 0.5, 0.3], vec![0.0, 0.6, 0.4]],
    )
    .unwrap();
    let out = reconstruct(&mesh, &materials, &MirOptions::default()).unwrap();

    for zone in &out.zones {
        let expected = match (zone.orig_zone, zone.material) {
            (1, 0) => Some(0),
            (1, 1) => Some(1),
            (1, 2) => Some(2),
            (2, 1) => Some(3),
            (2, 2) => Some(4),
            _ => None,
        };
        assert_eq!(zone.mixed_var_index, expected);
    }

    let zonal = [5.0, 6.0, 7.0];
    let mixed = [0.1, 0.2, 0.3, 0.4, 0.5];
    for (i, zone) in out.zones.iter().enumerate() {
        let value = out.mixed_field_value(i, &zonal, &mixed);
        match zone.mixed_var_index {
            Some(index) => assert_eq!(value, mixed[index]),
            None => assert_eq!(value, zonal[zone.orig_zone]),
        }
    }
}

#[test]
fn test_reconstruction_is_deterministic() {
    let (mesh, materials) = sphere_case(4);
    let options = MirOptions::default().with_level(SubdivisionLevel::High);
    let a = reconstruct(&mesh, &materials, &options).unwrap();
    let b = reconstruct(&mesh, &materials, &options).unwrap();
    assert_eq!(a.indices, b.indices);
    assert_eq!(a.zones, b.zones);
    assert_eq!(a.coords, b.coords);
    assert_eq!(a.stats, b.stats);
}

#[test]
fn test_bad_inputs_are_rejected() {
    let mesh = synthetic::hex_grid(2, 1, 1, 1.0);
    let short = MaterialVolumeFractions::from_rows(2, &[vec![0.5, 0.5]]).unwrap();
    assert!(reconstruct(&mesh, &short, &MirOptions::default()).is_err());

    let mut lines = UnstructuredMesh::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
    lines.add_cell(CellType::Line, &[0, 1]).unwrap();
    let materials = MaterialVolumeFractions::from_rows(2, &[vec![0.5, 0.5]]).unwrap();
    assert!(reconstruct(&lines, &materials, &MirOptions::default()).is_err());
}
