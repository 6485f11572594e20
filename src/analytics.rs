// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reconstruction analytics and verification helpers

use crate::geometry::{has_repeated_index, low_tets, low_tris};
use crate::mesh::{CellType, Dimension};
use crate::mir::{ReconstructedMesh, ReconstructedZone};
use crate::utils::math::{tet_volume, triangle_area_xy};
use ahash::AHashMap;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// Signed measures above this are rounding noise on slivers
const INVERTED_TOLERANCE: f64 = 1e-12;

/// Volume (3D) or area (2D) held by one material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialMeasure {
    pub material: usize,
    pub zones: usize,
    pub measure: f64,
}

/// Summary of a reconstructed mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionAnalytics {
    /// Sum of signed cell measures
    pub total_measure: f64,
    pub materials: Vec<MaterialMeasure>,
    pub output_zones: usize,
    pub coordinates: usize,
    pub synthesized_coordinates: usize,
    /// Zones with a repeated vertex index
    pub degenerate_zones: usize,
    /// Zones with clearly negative signed measure
    pub inverted_zones: usize,
    /// Every coordinate weight is a partition of unity
    pub weights_valid: bool,
}

impl ReconstructionAnalytics {
    pub fn empty() -> Self {
        Self {
            total_measure: 0.0,
            materials: Vec::new(),
            output_zones: 0,
            coordinates: 0,
            synthesized_coordinates: 0,
            degenerate_zones: 0,
            inverted_zones: 0,
            weights_valid: true,
        }
    }

    /// Pretty print statistics
    pub fn print(&self) {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║              RECONSTRUCTION ANALYTICS                    ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!(
            "║ Total measure:   {:>12.6}                            ║",
            self.total_measure
        );
        println!(
            "║ Output zones:    {:>12}                            ║",
            self.output_zones
        );
        println!(
            "║ Coordinates:     {:>12} ({:>10} synthesized)     ║",
            self.coordinates, self.synthesized_coordinates
        );
        println!("║                                                          ║");
        for m in &self.materials {
            println!(
                "║   material {:>4}: {:>8} zones  {:>14.6}            ║",
                m.material, m.zones, m.measure
            );
        }
        println!("║                                                          ║");
        println!(
            "║ Degenerate:      {:>12}                            ║",
            self.degenerate_zones
        );
        println!(
            "║ Inverted:        {:>12}                            ║",
            self.inverted_zones
        );
        println!(
            "║ Weights valid:   {:>12}                            ║",
            if self.weights_valid { "Yes" } else { "No" }
        );
        println!("╚══════════════════════════════════════════════════════════╝");
    }
}

/// Analyze a reconstruction
pub fn analyze(out: &ReconstructedMesh) -> ReconstructionAnalytics {
    if out.zones.is_empty() {
        return ReconstructionAnalytics::empty();
    }

    let mut per_material: AHashMap<usize, MaterialMeasure> = AHashMap::new();
    let mut total_measure = 0.0;
    let mut inverted_zones = 0;
    for (zone, z) in out.zones.iter().enumerate() {
        let measure = zone_measure(out, zone);
        total_measure += measure;
        if measure < -INVERTED_TOLERANCE {
            inverted_zones += 1;
        }
        let entry = per_material
            .entry(z.material)
            .or_insert_with(|| MaterialMeasure {
                material: z.material,
                zones: 0,
                measure: 0.0,
            });
        entry.zones += 1;
        entry.measure += measure;
    }
    let mut materials: Vec<MaterialMeasure> = per_material.into_values().collect();
    materials.sort_by_key(|m| m.material);

    ReconstructionAnalytics {
        total_measure,
        materials,
        output_zones: out.zone_count(),
        coordinates: out.coord_count(),
        synthesized_coordinates: out.coords.iter().filter(|c| c.orig_node.is_none()).count(),
        degenerate_zones: degenerate_zones(out).len(),
        inverted_zones,
        weights_valid: weights_are_partitions(out, 1e-5),
    }
}

/// Signed volume (3D cells) or signed xy area (2D cells) of an output zone
pub fn zone_measure(out: &ReconstructedMesh, zone: usize) -> f64 {
    let cell_type = out.zones[zone].cell_type;
    let nodes = out.zone_nodes(zone);
    let p = out.zone_points(zone);
    match cell_type.dimension() {
        Some(Dimension::Three) => low_tets(cell_type, nodes)
            .map(|tets| {
                tets.iter()
                    .map(|t| tet_volume(&p[t[0]], &p[t[1]], &p[t[2]], &p[t[3]]))
                    .sum()
            })
            .unwrap_or(0.0),
        Some(Dimension::Two) => low_tris(cell_type, nodes)
            .map(|tris| {
                tris.iter()
                    .map(|t| triangle_area_xy(&p[t[0]], &p[t[1]], &p[t[2]]))
                    .sum()
            })
            .unwrap_or(0.0),
        None => 0.0,
    }
}

/// Measure per material, ascending by material id
pub fn material_measures(out: &ReconstructedMesh) -> Vec<(usize, f64)> {
    analyze(out)
        .materials
        .into_iter()
        .map(|m| (m.material, m.measure))
        .collect()
}

/// Output zones with a repeated vertex index
pub fn degenerate_zones(out: &ReconstructedMesh) -> Vec<usize> {
    (0..out.zone_count())
        .filter(|&z| has_repeated_index(out.zone_nodes(z)))
        .collect()
}

/// Every coordinate weight is non-negative and sums to one
pub fn weights_are_partitions(out: &ReconstructedMesh, tolerance: f64) -> bool {
    out.coords
        .iter()
        .all(|c| c.weight.is_partition_of_unity(tolerance))
}

/// Vertices on the plane `axis = value` used by the output zones `keep` accepts
pub fn vertices_on_plane(
    out: &ReconstructedMesh,
    axis: usize,
    value: f64,
    tolerance: f64,
    keep: impl Fn(&ReconstructedZone) -> bool,
) -> BTreeSet<usize> {
    (0..out.zone_count())
        .filter(|&zone| keep(&out.zones[zone]))
        .flat_map(|zone| out.zone_nodes(zone).iter().copied())
        .filter(|&i| (out.coords[i].point[axis] - value).abs() <= tolerance)
        .collect()
}

/// Outward triangles bounding the zones of one material.
///
/// Faces shared by two zones of the material cancel. 2D zones are returned
/// as their own triangulation.
pub fn material_surface(out: &ReconstructedMesh, material: usize) -> Vec<[Point3<f64>; 3]> {
    let mut faces: AHashMap<Vec<usize>, (usize, Vec<usize>)> = AHashMap::new();
    let mut flat = Vec::new();

    for zone in out.zones_for_material(material) {
        let cell_type = out.zones[zone].cell_type;
        let nodes = out.zone_nodes(zone);
        match cell_type.dimension() {
            Some(Dimension::Three) => {
                for face in cell_type.faces() {
                    let ordered: Vec<usize> = face.iter().map(|&l| nodes[l]).collect();
                    let mut key = ordered.clone();
                    key.sort_unstable();
                    faces.entry(key).or_insert((0, ordered)).0 += 1;
                }
            }
            Some(Dimension::Two) => {
                if let Ok(tris) = low_tris(cell_type, nodes) {
                    flat.extend(tris.iter().map(|t| [nodes[t[0]], nodes[t[1]], nodes[t[2]]]));
                }
            }
            None => {}
        }
    }

    let mut boundary: Vec<(Vec<usize>, Vec<usize>)> = faces
        .into_iter()
        .filter(|(_, (count, _))| *count == 1)
        .map(|(key, (_, ordered))| (key, ordered))
        .collect();
    boundary.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let point = |i: usize| out.coords[i].point;
    let mut triangles: Vec<[Point3<f64>; 3]> = flat
        .into_iter()
        .map(|[a, b, c]| [point(a), point(b), point(c)])
        .collect();
    for (_, ordered) in boundary {
        for k in 1..ordered.len() - 1 {
            triangles.push([point(ordered[0]), point(ordered[k]), point(ordered[k + 1])]);
        }
    }
    triangles
}

/// Whether every triangle edge is shared by exactly two triangles
pub fn is_closed_surface(triangles: &[[Point3<f64>; 3]]) -> bool {
    let key = |p: &Point3<f64>| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
    let mut edge_count: AHashMap<([u64; 3], [u64; 3]), usize> = AHashMap::new();
    for tri in triangles {
        for i in 0..3 {
            let a = key(&tri[i]);
            let b = key(&tri[(i + 1) % 3]);
            let edge = if a < b { (a, b) } else { (b, a) };
            *edge_count.entry(edge).or_insert(0) += 1;
        }
    }
    !edge_count.is_empty() && edge_count.values().all(|&count| count == 2)
}

/// Cell type histogram of the output
pub fn cell_type_counts(out: &ReconstructedMesh) -> Vec<(CellType, usize)> {
    let mut counts: Vec<(CellType, usize)> = Vec::new();
    for z in &out.zones {
        match counts.iter_mut().find(|(t, _)| *t == z.cell_type) {
            Some((_, n)) => *n += 1,
            None => counts.push((z.cell_type, 1)),
        }
    }
    counts
}
