// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Synthetic meshes and material layouts for tests, benchmarks and demos

use crate::geometry::low_tets_for_hex;
use crate::mesh::{CellType, MaterialVolumeFractions, UnstructuredMesh};
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Structured block of `nx * ny * nz` hexahedra (VTK corner order)
pub fn hex_grid(nx: usize, ny: usize, nz: usize, spacing: f64) -> UnstructuredMesh {
    let mut mesh = UnstructuredMesh::new(grid_points(nx, ny, nz, spacing));
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let nodes = hex_nodes(nx, ny, i, j, k);
                // Indices come from the grid itself
                let _ = mesh.add_cell(CellType::Hexahedron, &nodes);
            }
        }
    }
    mesh
}

/// Structured block of hexahedra, each split into 5 or 6 conforming tetrahedra
pub fn tet_grid(nx: usize, ny: usize, nz: usize, spacing: f64) -> UnstructuredMesh {
    let mut mesh = UnstructuredMesh::new(grid_points(nx, ny, nz, spacing));
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let nodes = hex_nodes(nx, ny, i, j, k);
                for tet in low_tets_for_hex(&nodes) {
                    let _ = mesh.add_cell(CellType::Tetra, &tet.map(|local| nodes[local]));
                }
            }
        }
    }
    mesh
}

/// Structured `nx * ny` quads in the z = 0 plane
pub fn quad_grid(nx: usize, ny: usize, spacing: f64) -> UnstructuredMesh {
    let mut mesh = UnstructuredMesh::new(grid_points(nx, ny, 0, spacing));
    let row = nx + 1;
    for j in 0..ny {
        for i in 0..nx {
            let n0 = j * row + i;
            let _ = mesh.add_cell(CellType::Quad, &[n0, n0 + 1, n0 + row + 1, n0 + row]);
        }
    }
    mesh
}

fn grid_points(nx: usize, ny: usize, nz: usize, spacing: f64) -> Vec<Point3<f64>> {
    let mut points = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                points.push(Point3::new(
                    i as f64 * spacing,
                    j as f64 * spacing,
                    k as f64 * spacing,
                ));
            }
        }
    }
    points
}

fn hex_nodes(nx: usize, ny: usize, i: usize, j: usize, k: usize) -> [usize; 8] {
    let row = nx + 1;
    let layer = row * (ny + 1);
    let n0 = k * layer + j * row + i;
    let n4 = n0 + layer;
    [
        n0,
        n0 + 1,
        n0 + row + 1,
        n0 + row,
        n4,
        n4 + 1,
        n4 + row + 1,
        n4 + row,
    ]
}

/// Sample positions inside a zone: a `samples`-per-axis lattice for hexahedra
/// and quads, otherwise the centroid and the midpoints towards each corner
pub fn zone_samples(mesh: &UnstructuredMesh, zone: usize, samples: usize) -> Vec<Point3<f64>> {
    let corners = mesh.cell_points(zone);
    let samples = samples.max(1);
    let at = |s: usize| (s as f64 + 0.5) / samples as f64;

    match mesh.cell(zone).cell_type {
        CellType::Hexahedron => {
            let mut out = Vec::with_capacity(samples.pow(3));
            for a in 0..samples {
                for b in 0..samples {
                    for c in 0..samples {
                        out.push(trilinear(&corners, at(a), at(b), at(c)));
                    }
                }
            }
            out
        }
        CellType::Quad => {
            let mut out = Vec::with_capacity(samples.pow(2));
            for a in 0..samples {
                for b in 0..samples {
                    out.push(trilinear(&corners, at(a), at(b), 0.0));
                }
            }
            out
        }
        _ => {
            let centroid = corners
                .iter()
                .fold(Vector3::zeros(), |acc, p| acc + p.coords)
                / corners.len() as f64;
            let centroid = Point3::from(centroid);
            let mut out = vec![centroid];
            out.extend(corners.iter().map(|p| centroid + (p - centroid) * 0.5));
            out
        }
    }
}

// Quads use the first four corners with w = 0
fn trilinear(corners: &[Point3<f64>], u: f64, v: f64, w: f64) -> Point3<f64> {
    let weights = [
        (1.0 - u) * (1.0 - v) * (1.0 - w),
        u * (1.0 - v) * (1.0 - w),
        u * v * (1.0 - w),
        (1.0 - u) * v * (1.0 - w),
        (1.0 - u) * (1.0 - v) * w,
        u * (1.0 - v) * w,
        u * v * w,
        (1.0 - u) * v * w,
    ];
    let sum = corners
        .iter()
        .zip(weights)
        .fold(Vector3::zeros(), |acc, (p, weight)| acc + p.coords * weight);
    Point3::from(sum)
}

/// Two materials split by a plane: material 0 on the side `normal` points away from
pub fn plane_fractions(
    mesh: &UnstructuredMesh,
    origin: Point3<f64>,
    normal: Vector3<f64>,
    samples: usize,
) -> MaterialVolumeFractions {
    two_material_fractions(mesh, samples, |p| (p - origin).dot(&normal) < 0.0)
}

/// Two materials: material 0 inside the sphere
pub fn sphere_fractions(
    mesh: &UnstructuredMesh,
    center: Point3<f64>,
    radius: f64,
    samples: usize,
) -> MaterialVolumeFractions {
    two_material_fractions(mesh, samples, |p| (p - center).norm() < radius)
}

fn two_material_fractions(
    mesh: &UnstructuredMesh,
    samples: usize,
    inside: impl Fn(&Point3<f64>) -> bool,
) -> MaterialVolumeFractions {
    let mut table = MaterialVolumeFractions::new(2, mesh.cell_count());
    for zone in 0..mesh.cell_count() {
        let points = zone_samples(mesh, zone, samples);
        let hits = points.iter().filter(|p| inside(p)).count();
        let vf = hits as f64 / points.len() as f64;
        table.set(zone, 0, vf);
        table.set(zone, 1, 1.0 - vf);
    }
    table
}

/// Seeded random volume fractions
pub struct RandomFractions {
    rng: StdRng,
    material_count: usize,
}

impl RandomFractions {
    pub fn new(seed: u64, material_count: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            material_count: material_count.max(1),
        }
    }

    /// Each zone is mixed with probability `mixed_probability`, otherwise
    /// clean in a random material. Mixed rows sum to one.
    pub fn generate(&mut self, zone_count: usize, mixed_probability: f64) -> MaterialVolumeFractions {
        let mut table = MaterialVolumeFractions::new(self.material_count, zone_count);
        let p = mixed_probability.clamp(0.0, 1.0);
        for zone in 0..zone_count {
            if self.material_count > 1 && self.rng.gen_bool(p) {
                let raw: Vec<f64> = (0..self.material_count)
                    .map(|_| self.rng.gen_range(0.0..1.0))
                    .collect();
                let total: f64 = raw.iter().sum();
                for (material, value) in raw.iter().enumerate() {
                    table.set(zone, material, value / total);
                }
            } else {
                let material = self.rng.gen_range(0..self.material_count);
                table.set(zone, material, 1.0);
            }
        }
        table
    }
}
