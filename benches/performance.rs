// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{Point3, Vector3};
use tetmir::geometry::{
    subdivide, CellVolumeFractions, FragmentLists, FragmentMerger, MaterialNode, MaterialTet,
    NodeWeight, SlotMaterial,
};
use tetmir::mir::VertexDeduplicator;
use tetmir::synthetic::{self, RandomFractions};
use tetmir::{CellType, MirOptions, Reconstructor, SubdivisionLevel};

fn bench_subdivide(c: &mut Criterion) {
    let mut group = c.benchmark_group("subdivide");

    let mesh = synthetic::hex_grid(1, 1, 1, 1.0);
    let cell = mesh.cell(0);
    let zone = [0.5, 0.5];
    let nodes: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64 / 7.0, 1.0 - i as f64 / 7.0]).collect();
    let faces: Vec<Vec<f64>> = vec![vec![0.5, 0.5]; CellType::Hexahedron.faces().len()];
    let edges: Vec<Vec<f64>> = vec![vec![0.5, 0.5]; CellType::Hexahedron.edges(8).len()];
    let vf = CellVolumeFractions {
        zone: &zone,
        nodes: &nodes,
        faces: &faces,
        edges: &edges,
    };

    for level in SubdivisionLevel::ALL {
        group.bench_with_input(BenchmarkId::new("hexahedron", level), &level, |b, &level| {
            b.iter(|| subdivide(black_box(level), &cell, &vf).unwrap());
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    let mesh = synthetic::tet_grid(1, 1, 1, 1.0);
    let corners = mesh.cell_points(0);
    let cell = mesh.cell(0);
    let fractions = [
        [0.9, 0.1, 0.0],
        [0.2, 0.5, 0.3],
        [0.0, 0.4, 0.6],
        [0.3, 0.3, 0.4],
    ];
    let composite = MaterialTet::new(std::array::from_fn(|k| {
        MaterialNode::new(
            Some(cell.nodes[k]),
            NodeWeight::corner(k),
            fractions[k].to_vec(),
        )
    }));
    let slots: Vec<SlotMaterial> = (0..3)
        .map(|slot| SlotMaterial {
            slot,
            material: slot,
            fake: false,
        })
        .collect();
    let merger = FragmentMerger::new(false);

    group.bench_function("three_materials", |b| {
        let mut dedup = VertexDeduplicator::new(&mesh, 1.0e6);
        let mut lists = FragmentLists::new();
        b.iter(|| {
            let mut resolver = dedup.for_zone(0, &corners);
            merger
                .merge_composite_tet(black_box(&composite), 0, &slots, &mut lists, &mut resolver)
                .unwrap();
            lists.len()
        });
    });

    group.finish();
}

fn bench_reconstruct(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruct");
    group.sample_size(20);

    for size in [4, 8, 12] {
        let extent = size as f64;
        let mesh = synthetic::hex_grid(size, size, size, 1.0);
        let center = Point3::new(extent / 2.0, extent / 2.0, extent / 2.0);
        let materials = synthetic::sphere_fractions(&mesh, center, extent / 3.0, 3);
        let reconstructor = Reconstructor::default();
        group.bench_with_input(BenchmarkId::new("sphere", size), &size, |b, _| {
            b.iter(|| reconstructor.reconstruct(black_box(&mesh), &materials).unwrap());
        });
    }

    let mesh = synthetic::hex_grid(8, 8, 8, 1.0);
    let materials = synthetic::plane_fractions(
        &mesh,
        Point3::new(4.0, 4.0, 4.0),
        Vector3::new(1.0, 1.0, 0.5),
        3,
    );
    for level in SubdivisionLevel::ALL {
        let reconstructor = Reconstructor::new(MirOptions::default().with_level(level));
        group.bench_with_input(BenchmarkId::new("plane", level), &level, |b, _| {
            b.iter(|| reconstructor.reconstruct(black_box(&mesh), &materials).unwrap());
        });
    }

    let mesh = synthetic::quad_grid(64, 64, 1.0);
    let materials = RandomFractions::new(7, 4).generate(mesh.cell_count(), 0.4);
    let reconstructor = Reconstructor::default();
    group.bench_function("random_quads_64", |b| {
        b.iter(|| reconstructor.reconstruct(black_box(&mesh), &materials).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_subdivide, bench_merge, bench_reconstruct);
criterion_main!(benches);
